//! Feature assembly
//!
//! Encodes the three categorical answers and appends the two numeric ones,
//! producing the single record the predictor was trained on.

use crate::categories::{ENERGY, MOOD, STRESS};
use crate::error::SuggestError;
use crate::types::{FeatureVector, WellnessInput};

/// Assembler for turning a submission into a feature vector
pub struct FeatureAssembler;

impl FeatureAssembler {
    /// Assemble `(Mood, Energy, Stress, SleepHours, TimeAvailable)`.
    ///
    /// Numeric fields pass through unchanged; range checks belong to the
    /// input surface.
    pub fn assemble(input: &WellnessInput) -> Result<FeatureVector, SuggestError> {
        Ok(FeatureVector {
            mood: MOOD.encode(&input.mood)?,
            energy: ENERGY.encode(&input.energy)?,
            stress: STRESS.encode(&input.stress)?,
            sleep_hours: input.sleep_hours,
            time_available: input.time_available,
        })
    }
}
