//! Core types for the TherapEase pipeline
//!
//! This module defines the data structures that flow through each stage:
//! the user's submission, the assembled feature vector, and the suggestion.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::categories::{ENERGY, MOOD, STRESS};
use crate::error::SuggestError;

/// Allowed hours of sleep last night
pub const SLEEP_HOURS_RANGE: RangeInclusive<u32> = 0..=12;

/// Allowed minutes available for the activity
pub const TIME_AVAILABLE_RANGE: RangeInclusive<u32> = 5..=60;

/// Pre-selected hours of sleep on the input form
pub const DEFAULT_SLEEP_HOURS: u32 = 6;

/// Pre-selected minutes available on the input form
pub const DEFAULT_TIME_AVAILABLE: u32 = 15;

/// Field order the model was trained with
pub const FEATURE_NAMES: [&str; 5] = ["Mood", "Energy", "Stress", "SleepHours", "TimeAvailable"];

/// A single form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessInput {
    /// One of the Mood table labels
    pub mood: String,
    /// One of the Energy table labels
    pub energy: String,
    /// One of the Stress table labels
    pub stress: String,
    /// Hours of sleep last night
    #[serde(default = "default_sleep_hours")]
    pub sleep_hours: u32,
    /// Minutes the user can spend on the activity
    #[serde(default = "default_time_available")]
    pub time_available: u32,
}

fn default_sleep_hours() -> u32 {
    DEFAULT_SLEEP_HOURS
}

fn default_time_available() -> u32 {
    DEFAULT_TIME_AVAILABLE
}

impl WellnessInput {
    pub fn new(
        mood: impl Into<String>,
        energy: impl Into<String>,
        stress: impl Into<String>,
        sleep_hours: u32,
        time_available: u32,
    ) -> Self {
        Self {
            mood: mood.into(),
            energy: energy.into(),
            stress: stress.into(),
            sleep_hours,
            time_available,
        }
    }

    /// Check the submission the way the input form constrains it.
    ///
    /// The pipeline itself does not call this; it is the job of whichever
    /// surface collects the input (CLI value parsers, `validate` command).
    pub fn validate(&self) -> Result<(), SuggestError> {
        MOOD.encode(&self.mood)?;
        ENERGY.encode(&self.energy)?;
        STRESS.encode(&self.stress)?;

        if !SLEEP_HOURS_RANGE.contains(&self.sleep_hours) {
            return Err(SuggestError::InvalidInput(format!(
                "sleep_hours {} outside {}..={}",
                self.sleep_hours,
                SLEEP_HOURS_RANGE.start(),
                SLEEP_HOURS_RANGE.end()
            )));
        }

        if !TIME_AVAILABLE_RANGE.contains(&self.time_available) {
            return Err(SuggestError::InvalidInput(format!(
                "time_available {} outside {}..={}",
                self.time_available,
                TIME_AVAILABLE_RANGE.start(),
                TIME_AVAILABLE_RANGE.end()
            )));
        }

        Ok(())
    }
}

/// Ordered numeric record handed to the predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub mood: usize,
    pub energy: usize,
    pub stress: usize,
    pub sleep_hours: u32,
    pub time_available: u32,
}

impl FeatureVector {
    /// Values in training-time order, see [`FEATURE_NAMES`]
    pub fn as_row(&self) -> [f64; 5] {
        [
            self.mood as f64,
            self.energy as f64,
            self.stress as f64,
            f64::from(self.sleep_hours),
            f64::from(self.time_available),
        ]
    }
}

/// Result of one pass through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested activity name
    pub activity: String,
    /// Echo of the minutes the user has available
    pub time_available: u32,
    /// Class id exactly as the predictor returned it
    pub raw_prediction: i64,
    /// Index into the activity table after normalization
    pub class_index: usize,
    /// Whether the raw prediction fell outside the activity table
    pub wrapped: bool,
    /// Features the predictor saw
    pub features: FeatureVector,
}

/// Producer metadata embedded in serialized suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Serialized suggestion with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub producer: SuggestionProducer,
    pub computed_at_utc: String,
    #[serde(flatten)]
    pub suggestion: Suggestion,
}
