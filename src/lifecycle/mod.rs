//! Lifecycle of long-lived client activity.
//!
//! # Data Flow
//! ```text
//! CallScope (scope.rs):
//!     root token → child token per call → close/drop cancels all
//!     late results → guard() → discarded
//!
//! AutoSync (auto_sync.rs):
//!     tick → sync_all → get_sync_status → channel
//!     shutdown token → abort in-flight call → exit
//! ```

pub mod auto_sync;
pub mod scope;

pub use auto_sync::AutoSync;
pub use scope::CallScope;
