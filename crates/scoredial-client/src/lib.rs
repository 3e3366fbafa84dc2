//! scoredial-client: scoring service integrations.
//!
//! Implements the `ScoringService` trait over HTTP, plus an in-memory mock
//! for demos and tests, and loads the scoredial configuration file.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_service, load_config, ScoredialConfig, ServiceConfig};
pub use http::HttpScoringService;
pub use mock::MockScoringService;
pub use scoredial_core::ServiceError;
