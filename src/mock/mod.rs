//! In-process mock of the assistant backend.
//!
//! # Data Flow
//! ```text
//! request → SetRequestId → Trace → router
//!     → handler (validate → MockStore / query interpreter / ETP calculator)
//!     → JSON body, or {error, message, details} with 400/404
//! ```
//!
//! # Design Decisions
//! - State lives in `dashmap` maps so handlers never hold a global lock
//! - Sheet rows are seeded once and read-only
//! - Wire types are the client's own, so both sides cannot drift

pub mod error;
pub mod etp;
pub mod query;
pub mod server;
pub mod sheets;
pub mod store;

pub use error::MockError;
pub use server::{router, serve, MockState};
pub use store::{MockStore, SheetRow};
