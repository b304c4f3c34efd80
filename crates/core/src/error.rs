use thiserror::Error;

/// Errors that can occur while planning with BAMCP.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BamcpError {
    #[error("search root must not have a parent")]
    InvalidRoot,

    #[error("cannot select from an empty candidate set")]
    EmptyInput,

    #[error("inconsistent belief: {0}")]
    InconsistentBelief(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("illegal action: {0}")]
    IllegalAction(String),
}

/// Convenience Result type for BAMCP operations
pub type Result<T> = std::result::Result<T, BamcpError>;
