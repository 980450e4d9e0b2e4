//! Resilient HTTP client for the assistant backend.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod observability;
pub mod resilience;
pub mod session;

pub use api::AssistantApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use http::RequestClient;
pub use lifecycle::{AutoSync, CallScope};
pub use session::ChatSession;
