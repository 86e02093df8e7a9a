use crate::key::{AssetKey, GroupKey};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by the underlying loader
///
/// Shared between every caller awaiting the same coalesced load.
#[derive(Debug, Clone)]
pub struct LoadFailure(Arc<anyhow::Error>);

impl LoadFailure {
    pub fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.0
    }
}

impl Display for LoadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Expected a known group '{0}', got none")]
    GroupNotFound(GroupKey),
    #[error("Expected a registered entry for '{1}' in group '{0}', got none")]
    EntryNotFound(GroupKey, AssetKey),
    #[error("Underlying load for '{key}' failed: {failure}")]
    LoadFailed { key: AssetKey, failure: LoadFailure },
    #[error("Cannot read '{key}' as {requested}, the stored value has a different type")]
    TypeMismatch {
        key: AssetKey,
        requested: &'static str,
    },
    #[error("Handle for '{0}' was released")]
    Released(AssetKey),
    #[error("Handle for '{0}' has not settled yet")]
    Unsettled(AssetKey),
}
