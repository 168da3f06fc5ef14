use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathContextError {
    #[error("invalid group id in path context: '{0}'")]
    InvalidSegment(String),
}
