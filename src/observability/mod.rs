//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RequestClient / AutoSync / mock backend produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every attempt log line
//! - JSON format optional, human format by default
//! - Log level configurable via config and RUST_LOG

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
