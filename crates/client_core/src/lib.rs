use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Group, GroupId};

pub mod config;
pub mod error;
pub mod selection;
pub mod transfer;
pub mod view_model;

pub use config::{load_settings, TransferSettings};
pub use error::TransferError;
pub use selection::{Candidate, CandidateList, Selection, SelectionTracker};
pub use transfer::{plan_transfer, TransferExecutor, TransferPlan, TransferReport};
pub use view_model::{RelocationState, RelocationViewModel};

/// The remote collection of parent/child group relationships.
#[async_trait]
pub trait RelationshipService: Send + Sync {
    async fn associate(&self, group: &Group, target: GroupId) -> Result<()>;
    async fn disassociate(&self, group: GroupId, parent: GroupId) -> Result<()>;
}

pub trait Navigator: Send + Sync {
    fn go_to_parent(&self, reload: bool);
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
