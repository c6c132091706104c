//! Coding-standard synchronization for stdsync.
//!
//! [`Catalog`] reads standards, tools and patterns from the remote and
//! assembles them into an [`ExtractedDocument`](stdsync_model::ExtractedDocument).
//! [`Reconciler`] drives the remote towards a
//! [`TargetConfig`](stdsync_model::TargetConfig) and reports every step in an
//! [`ApplyResult`]. Both work against any [`StandardsApi`](stdsync_api::StandardsApi)
//! implementation.
//!
//! # Examples
//!
//! ```
//! use stdsync_sync::{ApplyOptions, Catalog, ExtractOptions, Reconciler};
//! use stdsync_test_utils::{acme_target, FakeRemote};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let remote = FakeRemote::new().with_catalog_tool("t1", &["p1"]);
//! let target = acme_target();
//!
//! let reconciler = Reconciler::new(&remote);
//! let standard = reconciler
//!     .ensure_standard("baseline", &target.languages)
//!     .await
//!     .unwrap();
//! let result = reconciler
//!     .apply(&standard, &target, &ApplyOptions::default())
//!     .await
//!     .unwrap();
//! assert!(result.success);
//!
//! let standard = reconciler.promote(&standard).await.unwrap();
//! let document = Catalog::new(&remote)
//!     .extract(&standard, &ExtractOptions::default())
//!     .await
//!     .unwrap();
//! assert!(document.tool("t1").unwrap().pattern("p1").unwrap().enabled);
//! # });
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod reconcile;
pub mod report;

pub use catalog::{latest_by_name, Catalog, ExtractOptions, Selector, StandardPicker};
pub use error::{PickError, Result, SyncError};
pub use reconcile::{ApplyOptions, Reconciler};
pub use report::{ApplyResult, PatternAction, PatternOutcome, ToolAction, ToolOutcome};
