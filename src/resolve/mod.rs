//! Import path → repository resolution.
//!
//! - [`classifier`] — pure routing of an import path to a resolution strategy.
//! - [`vanity`] — `go-import` meta-tag discovery with a per-run memo.
//! - [`aggregator`] — folds raw import paths into deduplicated
//!   [`DependencyRecord`](crate::models::DependencyRecord)s.

pub mod aggregator;
pub mod classifier;
pub mod vanity;

use thiserror::Error;

/// Why an import path has no repository identity. Never fatal to a scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("malformed import path `{0}`")]
    Malformed(String),

    #[error("cannot resolve `{path}`: {reason}")]
    Unreachable { path: String, reason: String },
}

impl ResolveError {
    pub(crate) fn unreachable(path: &str, reason: impl Into<String>) -> Self {
        ResolveError::Unreachable {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
