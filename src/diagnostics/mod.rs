use std::path::PathBuf;
use thiserror::Error;

use crate::types::Type;

/// Fatal rewrite failures. A rewrite that fails produces no tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("unsupported node kind `{0}`")]
    UnsupportedNodeKind(String),

    #[error("type `{owner}` has no member named `{member}`")]
    MemberNotFound { owner: Type, member: String },
}

impl RewriteError {
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedNodeKind(kind.into())
    }

    pub fn member_not_found(owner: Type, member: impl Into<String>) -> Self {
        Self::MemberNotFound { owner, member: member.into() }
    }
}

/// Errors from the document and request surface around the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl Error {
    pub fn config(msg: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Config { msg: msg.into(), path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
