//! scoredial-core: prediction workflow, score model, and gauge animation.
//!
//! This crate defines the data model, the workflow controller that owns the
//! single in-flight prediction request, and the animation engine that eases
//! a resolved score onto the gauge.

pub mod error;
pub mod gauge;
pub mod model;
pub mod traits;
pub mod view;
pub mod workflow;

pub use error::ServiceError;
pub use model::{FieldValue, FormSnapshot, PerformanceTier, PredictionState, Score, StudentProfile};
pub use traits::ScoringService;
