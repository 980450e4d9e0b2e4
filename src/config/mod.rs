//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → RequestClient / AutoSync / logging
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Only the base URL and auto-sync flag come from the environment
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, load_config, ConfigError};
pub use schema::{
    ApiConfig, ClientConfig, ObservabilityConfig, RetryConfig, SyncConfig, TimeoutConfig,
};
pub use validation::ValidationError;
