//! Error types for loading and writing documents.

use std::path::PathBuf;

/// A configuration document that is syntactically or structurally invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Not JSON, or a field has the wrong type.
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required identifier is absent or empty.
    #[error("missing required field `{field}` at {location}")]
    MissingField {
        field: &'static str,
        location: String,
    },

    /// The same identifier appears twice where it must be unique.
    #[error("duplicate {kind} `{id}` at {location}")]
    Duplicate {
        kind: &'static str,
        id: String,
        location: String,
    },
}

/// Local file failures while reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}
