use std::{sync::Mutex as StdMutex, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Group, GroupId},
    protocol::RelationshipCall,
};
use tokio::sync::Mutex;

use crate::{Navigator, RelationshipService};

pub(crate) fn group(id: i64, name: &str) -> Group {
    Group::new(GroupId(id), name)
}

/// Records every attempted call, including the ones it fails.
#[derive(Default)]
pub(crate) struct RecordingRelationshipService {
    calls: Mutex<Vec<RelationshipCall>>,
    fail_associate: Option<String>,
    fail_disassociate: Option<String>,
    delay: Option<Duration>,
}

impl RecordingRelationshipService {
    pub(crate) fn ok() -> Self {
        Self::default()
    }

    pub(crate) fn failing_associate(err: impl Into<String>) -> Self {
        Self {
            fail_associate: Some(err.into()),
            ..Self::default()
        }
    }

    pub(crate) fn failing_disassociate(err: impl Into<String>) -> Self {
        Self {
            fail_disassociate: Some(err.into()),
            ..Self::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) async fn calls(&self) -> Vec<RelationshipCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RelationshipService for RecordingRelationshipService {
    async fn associate(&self, group: &Group, target: GroupId) -> Result<()> {
        self.calls.lock().await.push(RelationshipCall::Associate {
            group: group.id,
            target,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.fail_associate {
            return Err(anyhow!(err.clone()));
        }
        Ok(())
    }

    async fn disassociate(&self, group: GroupId, parent: GroupId) -> Result<()> {
        self.calls
            .lock()
            .await
            .push(RelationshipCall::Disassociate { group, parent });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.fail_disassociate {
            return Err(anyhow!(err.clone()));
        }
        Ok(())
    }
}

pub(crate) struct UnavailableRelationshipService;

#[async_trait]
impl RelationshipService for UnavailableRelationshipService {
    async fn associate(&self, group: &Group, target: GroupId) -> Result<()> {
        Err(anyhow!(
            "relationship service unavailable for group {} target {}",
            group.id,
            target
        ))
    }

    async fn disassociate(&self, group: GroupId, parent: GroupId) -> Result<()> {
        Err(anyhow!(
            "relationship service unavailable for group {group} parent {parent}"
        ))
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    visits: StdMutex<Vec<bool>>,
}

impl RecordingNavigator {
    pub(crate) fn visits(&self) -> Vec<bool> {
        self.visits.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to_parent(&self, reload: bool) {
        self.visits.lock().expect("navigator lock").push(reload);
    }
}
