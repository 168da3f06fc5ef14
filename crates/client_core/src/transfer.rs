//! Turns a selection into associate/disassociate calls and runs them in order.

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::anyhow;
use shared::{
    domain::{Group, GroupId, PathContext, TransferMode},
    protocol::RelationshipCall,
};
use tracing::{info, warn};

use crate::{
    config::TransferSettings, error::TransferError, selection::Selection, RelationshipService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPlan {
    /// Link the group under `target`, keeping every existing parent.
    Copy { group: Group, target: GroupId },
    /// Move a root-level group under `target`; there is no parent to leave.
    Adopt { group: Group, target: GroupId },
    /// Drop the link to `parent`, which leaves the group at the root level.
    PromoteToRoot { group: GroupId, parent: GroupId },
    /// Link under `target`, then drop the link to `parent`.
    Relocate {
        group: Group,
        target: GroupId,
        parent: GroupId,
    },
}

impl TransferPlan {
    pub fn group_id(&self) -> GroupId {
        match self {
            TransferPlan::Copy { group, .. }
            | TransferPlan::Adopt { group, .. }
            | TransferPlan::Relocate { group, .. } => group.id,
            TransferPlan::PromoteToRoot { group, .. } => *group,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TransferPlan::Copy { .. } => "copy",
            TransferPlan::Adopt { .. } => "adopt",
            TransferPlan::PromoteToRoot { .. } => "promote_to_root",
            TransferPlan::Relocate { .. } => "relocate",
        }
    }
}

pub fn plan_transfer(
    mode: TransferMode,
    selection: &Selection,
    group: &Group,
    path: &PathContext,
) -> Result<TransferPlan, TransferError> {
    let parent = path.immediate_parent();

    match (mode, selection) {
        (_, Selection::None) => Err(TransferError::NoTargetSelected),
        (TransferMode::Copy, Selection::RootTarget) => Err(TransferError::CopyToRoot),
        (TransferMode::Move, Selection::RootTarget) => match parent {
            Some(parent) => Ok(TransferPlan::PromoteToRoot {
                group: group.id,
                parent,
            }),
            None => Err(TransferError::AlreadyAtRoot(group.id)),
        },
        (mode, Selection::Candidate(target)) => {
            if target.id == group.id {
                return Err(TransferError::SelfTarget(group.id));
            }
            match (mode, parent) {
                (TransferMode::Copy, _) => Ok(TransferPlan::Copy {
                    group: group.clone(),
                    target: target.id,
                }),
                (TransferMode::Move, None) => Ok(TransferPlan::Adopt {
                    group: group.clone(),
                    target: target.id,
                }),
                // Relocating under the current parent would drop the only
                // link to it once the disassociate runs.
                (TransferMode::Move, Some(parent)) if parent == target.id => {
                    Err(TransferError::AlreadyUnderTarget {
                        group: group.id,
                        target: target.id,
                    })
                }
                (TransferMode::Move, Some(parent)) => Ok(TransferPlan::Relocate {
                    group: group.clone(),
                    target: target.id,
                    parent,
                }),
            }
        }
    }
}

/// Calls that completed, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub calls: Vec<RelationshipCall>,
}

pub struct TransferExecutor {
    service: Arc<dyn RelationshipService>,
    step_timeout: Option<Duration>,
}

impl TransferExecutor {
    pub fn new(service: Arc<dyn RelationshipService>) -> Self {
        Self {
            service,
            step_timeout: None,
        }
    }

    pub fn with_settings(
        service: Arc<dyn RelationshipService>,
        settings: &TransferSettings,
    ) -> Self {
        Self {
            service,
            step_timeout: settings.step_timeout(),
        }
    }

    pub async fn submit(
        &self,
        mode: TransferMode,
        selection: &Selection,
        group: &Group,
        path: &PathContext,
    ) -> Result<TransferReport, TransferError> {
        let plan = plan_transfer(mode, selection, group, path)?;
        self.execute(&plan).await
    }

    pub async fn execute(&self, plan: &TransferPlan) -> Result<TransferReport, TransferError> {
        info!(group = %plan.group_id(), plan = plan.kind(), "executing group transfer");
        let mut report = TransferReport::default();

        match plan {
            TransferPlan::Copy { group, target } | TransferPlan::Adopt { group, target } => {
                self.associate(group, *target, &mut report).await?;
            }
            TransferPlan::PromoteToRoot { group, parent } => {
                self.disassociate(*group, *parent, &mut report).await?;
            }
            TransferPlan::Relocate {
                group,
                target,
                parent,
            } => {
                self.associate_then_disassociate(group, *target, *parent, &mut report)
                    .await?;
            }
        }

        Ok(report)
    }

    /// Associates before disassociating so the group always keeps at least
    /// one parent. The disassociate is only issued after the associate
    /// completed successfully; a failed disassociate is not rolled back and
    /// leaves the group under both parents.
    pub async fn associate_then_disassociate(
        &self,
        group: &Group,
        target: GroupId,
        parent: GroupId,
        report: &mut TransferReport,
    ) -> Result<(), TransferError> {
        self.associate(group, target, report).await?;
        self.disassociate(group.id, parent, report).await
    }

    async fn associate(
        &self,
        group: &Group,
        target: GroupId,
        report: &mut TransferReport,
    ) -> Result<(), TransferError> {
        info!(group = %group.id, target_group = %target, "associating group");
        match self.bounded(self.service.associate(group, target)).await {
            Ok(()) => {
                report.calls.push(RelationshipCall::Associate {
                    group: group.id,
                    target,
                });
                Ok(())
            }
            Err(source) => {
                warn!(
                    group = %group.id,
                    target_group = %target,
                    error = %source,
                    "associate failed"
                );
                Err(TransferError::AssociationFailure {
                    group: group.id,
                    target,
                    source,
                })
            }
        }
    }

    async fn disassociate(
        &self,
        group: GroupId,
        parent: GroupId,
        report: &mut TransferReport,
    ) -> Result<(), TransferError> {
        info!(%group, %parent, "disassociating group");
        match self.bounded(self.service.disassociate(group, parent)).await {
            Ok(()) => {
                report
                    .calls
                    .push(RelationshipCall::Disassociate { group, parent });
                Ok(())
            }
            Err(source) => {
                warn!(%group, %parent, error = %source, "disassociate failed");
                Err(TransferError::DisassociationFailure {
                    group,
                    parent,
                    source,
                })
            }
        }
    }

    async fn bounded<F>(&self, step: F) -> anyhow::Result<()>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        match self.step_timeout {
            Some(limit) => tokio::time::timeout(limit, step)
                .await
                .map_err(|_| anyhow!("timed out after {}ms", limit.as_millis()))?,
            None => step.await,
        }
    }
}

#[cfg(test)]
#[path = "tests/transfer_tests.rs"]
mod tests;
