//! Shared data model for stdsync.
//!
//! Extraction and application both work on the same types: a [`Standard`]
//! owns [`Tool`]s, and each tool owns [`Pattern`]s. A [`TargetConfig`] is the
//! declarative projection read from disk, an [`ExtractedDocument`] the one
//! produced from remote state. Because both hold plain `Vec<Tool>`, the
//! reconciler can diff either side against the remote without caring where it
//! came from.
//!
//! # Examples
//!
//! ```
//! use stdsync_model::TargetConfig;
//!
//! let target = TargetConfig::parse(
//!     r#"{
//!         "languages": ["python"],
//!         "tools": [{
//!             "uuid": "t1",
//!             "isEnabled": true,
//!             "patterns": [{"patternDefinition": {"id": "p1"}, "enabled": true, "parameters": {}}]
//!         }]
//!     }"#,
//! )
//! .unwrap();
//!
//! assert!(target.languages.contains("python"));
//! assert_eq!(target.tools[0].patterns[0].id(), "p1");
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod document;
pub mod error;
pub mod standard;
pub mod tool;
pub mod writer;

pub use config::{load_config, TargetConfig};
pub use document::ExtractedDocument;
pub use error::{ConfigError, DocumentError};
pub use standard::{Standard, StandardId};
pub use tool::{NamedParameter, Parameters, Pattern, PatternDefinition, Tool};
pub use writer::{default_output_name, write_document};
