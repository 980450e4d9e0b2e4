//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! typed API call
//!     → request.rs (method, query, JSON body, cancellation token)
//!     → client.rs (join URL, attempt loop with deadline + backoff)
//!     → response.rs (buffered body, error-body normalization)
//!     → typed result or ClientError
//! ```

pub mod client;
pub mod request;
pub mod response;

pub use client::RequestClient;
pub use request::{RequestOptions, X_REQUEST_ID};
pub use response::{ApiResponse, ErrorBody};
