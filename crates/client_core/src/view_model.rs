//! Request-scoped state for one copy/move view.

use std::sync::Arc;

use shared::domain::{Group, GroupId, PathContext, TransferMode};
use tracing::{info, warn};

use crate::{
    error::TransferError,
    selection::{CandidateList, Selection, SelectionTracker},
    transfer::{plan_transfer, TransferExecutor, TransferPlan, TransferReport},
    Navigator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationState {
    Idle,
    CandidateSelected,
    RootTargeted,
    Submitting,
    Done,
    Cancelled,
}

impl RelocationState {
    fn is_terminal(self) -> bool {
        matches!(self, RelocationState::Done | RelocationState::Cancelled)
    }
}

pub struct RelocationViewModel {
    group: Group,
    path: PathContext,
    candidates: CandidateList,
    tracker: SelectionTracker,
    state: RelocationState,
    last_error: Option<String>,
    navigator: Arc<dyn Navigator>,
}

impl RelocationViewModel {
    pub fn new(
        group: Group,
        path: PathContext,
        candidates: CandidateList,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let tracker = SelectionTracker::new(&path);
        Self {
            group,
            path,
            candidates,
            tracker,
            state: RelocationState::Idle,
            last_error: None,
            navigator,
        }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn path(&self) -> &PathContext {
        &self.path
    }

    pub fn breadcrumb_label(&self) -> &str {
        &self.group.name
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn selection(&self) -> &Selection {
        self.tracker.selection()
    }

    pub fn mode(&self) -> TransferMode {
        self.tracker.mode()
    }

    pub fn state(&self) -> RelocationState {
        self.state
    }

    /// Message of the last failed submission; cleared when the next one begins.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn candidate_selection_enabled(&self) -> bool {
        self.tracker.candidate_selection_enabled()
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_terminal()
            && self.state != RelocationState::Submitting
            && *self.tracker.selection() != Selection::None
    }

    pub fn select_candidate(&mut self, target: GroupId) -> Result<Group, TransferError> {
        self.ensure_interactive()?;
        let group = self.tracker.select_candidate(&mut self.candidates, target)?;
        self.settle_state();
        Ok(group)
    }

    pub fn toggle_root_target(&mut self) -> Result<bool, TransferError> {
        self.ensure_interactive()?;
        let targeted = self.tracker.toggle_root_target(&mut self.candidates);
        self.settle_state();
        Ok(targeted)
    }

    pub fn set_mode(&mut self, mode: TransferMode) -> Result<(), TransferError> {
        self.ensure_interactive()?;
        self.tracker.set_mode(mode)
    }

    /// Computes the plan for the current selection and enters `Submitting`.
    /// Rejected plans leave the state untouched.
    pub fn begin_submit(&mut self) -> Result<TransferPlan, TransferError> {
        self.ensure_interactive()?;
        let plan = plan_transfer(
            self.tracker.mode(),
            self.tracker.selection(),
            &self.group,
            &self.path,
        )?;
        self.state = RelocationState::Submitting;
        self.last_error = None;
        Ok(plan)
    }

    pub fn finish_submit(
        &mut self,
        result: Result<TransferReport, TransferError>,
    ) -> Result<TransferReport, TransferError> {
        if self.state != RelocationState::Submitting {
            return Err(TransferError::NotSubmitting);
        }

        match result {
            Ok(report) => {
                self.state = RelocationState::Done;
                info!(
                    group = %self.group.id,
                    calls = report.calls.len(),
                    "group transfer finished"
                );
                self.navigator.go_to_parent(true);
                Ok(report)
            }
            Err(err) => {
                warn!(group = %self.group.id, error = %err, "group transfer failed");
                self.last_error = Some(err.to_string());
                self.settle_state();
                Err(err)
            }
        }
    }

    pub async fn submit(
        &mut self,
        executor: &TransferExecutor,
    ) -> Result<TransferReport, TransferError> {
        let plan = self.begin_submit()?;
        let result = executor.execute(&plan).await;
        self.finish_submit(result)
    }

    pub fn cancel(&mut self) -> Result<(), TransferError> {
        self.ensure_interactive()?;
        self.state = RelocationState::Cancelled;
        self.navigator.go_to_parent(false);
        Ok(())
    }

    fn ensure_interactive(&self) -> Result<(), TransferError> {
        match self.state {
            RelocationState::Submitting => Err(TransferError::SubmitInProgress),
            state if state.is_terminal() => Err(TransferError::Finished),
            _ => Ok(()),
        }
    }

    fn settle_state(&mut self) {
        self.state = match self.tracker.selection() {
            Selection::None => RelocationState::Idle,
            Selection::Candidate(_) => RelocationState::CandidateSelected,
            Selection::RootTarget => RelocationState::RootTargeted,
        };
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
