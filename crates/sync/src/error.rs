//! Error type shared by the catalog reader and the reconciler.

use stdsync_api::ApiError;
use stdsync_model::{ConfigError, DocumentError};

/// Failure reported by a [`StandardPicker`](crate::StandardPicker).
pub type PickError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A referenced standard, tool or pattern does not exist remotely.
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    #[error("standard selection failed: {0}")]
    Selection(#[source] PickError),
}

impl SyncError {
    pub(crate) fn standard_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "standard",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
