//! Error types for the quality-check engine.

use thiserror::Error;

use crate::sink::{CheckerStatus, IssueId};

/// Errors produced by the engine, the issue sink and the run configuration.
#[derive(Debug, Error)]
pub enum QcError {
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("invalid version expression '{expr}': {reason}")]
    InvalidVersionExpression { expr: String, reason: String },

    #[error("invalid rule uid '{0}'")]
    InvalidRuleUid(String),

    #[error("unknown checker '{0}'")]
    UnknownChecker(String),

    #[error("unknown issue id {0}")]
    UnknownIssue(IssueId),

    /// A rule wrote to a checker other than the one currently running.
    #[error("checker '{0}' is not running")]
    InactiveChecker(String),

    #[error("status of checker '{checker}' is already {status}")]
    StatusAlreadySet {
        checker: String,
        status: CheckerStatus,
    },

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("duplicate checker id '{0}'")]
    DuplicateChecker(String),

    #[error("document error: {0}")]
    Document(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, QcError>;
