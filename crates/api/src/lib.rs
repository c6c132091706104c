//! Remote API access for stdsync.
//!
//! [`ApiClient`] is the transport: it scopes every request to
//! `organizations/{provider}/{organization}`, attaches the credential, retries
//! transient failures and walks pagination cursors. [`StandardsClient`] binds
//! the coding-standard endpoints on top of it and implements
//! [`StandardsApi`], the seam the catalog reader and reconciler are written
//! against.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod settings;
pub mod standards;

pub use client::ApiClient;
pub use error::ApiError;
pub use settings::{ApiSettings, CredentialHeader, SettingsError};
pub use standards::{PatternUpdate, StandardsApi, StandardsClient, ToolUpdate};

#[cfg(any(test, feature = "mock"))]
pub use standards::MockStandardsApi;

pub type Result<T> = std::result::Result<T, ApiError>;
