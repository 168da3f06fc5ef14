use shared::domain::GroupId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to associate group {group} with group {target}: {source}")]
    AssociationFailure {
        group: GroupId,
        target: GroupId,
        source: anyhow::Error,
    },
    #[error("failed to disassociate group {group} from parent {parent}: {source}")]
    DisassociationFailure {
        group: GroupId,
        parent: GroupId,
        source: anyhow::Error,
    },
    #[error("no target group selected")]
    NoTargetSelected,
    #[error("groups cannot be copied to the root level")]
    CopyToRoot,
    #[error("group {0} is already at the root level")]
    AlreadyAtRoot(GroupId),
    #[error("group {group} is already a child of {target}")]
    AlreadyUnderTarget { group: GroupId, target: GroupId },
    #[error("group {0} cannot be its own target")]
    SelfTarget(GroupId),
    #[error("group {0} is not in the candidate list")]
    UnknownCandidate(GroupId),
    #[error("a transfer is already being submitted")]
    SubmitInProgress,
    #[error("no transfer is being submitted")]
    NotSubmitting,
    #[error("relocation view is finished")]
    Finished,
}
