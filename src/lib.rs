//! TherapEase - Mental wellness activity suggestions
//!
//! TherapEase turns a short self-report (mood, energy, stress, sleep, free
//! time) into one suggested activity through a linear pipeline:
//! category encoding → feature assembly → prediction → decoding.
//!
//! ## Modules
//!
//! - **Pipeline**: [`ActivityAdvisor`] runs submissions against a shared predictor
//! - **Model**: [`ForestModel`] loads the pre-trained decision forest artifact

pub mod categories;
pub mod decoder;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use categories::{CategoryTable, ENERGY, MOOD, STRESS, SUGGESTED_ACTIVITY};
pub use error::SuggestError;
pub use model::{ActivityPredictor, ForestModel};
pub use pipeline::{suggest_activity, ActivityAdvisor};
pub use types::{FeatureVector, Suggestion, SuggestionRecord, WellnessInput};

/// TherapEase version embedded in all suggestion records
pub const THERAPEASE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for suggestion records
pub const PRODUCER_NAME: &str = "therapease";
