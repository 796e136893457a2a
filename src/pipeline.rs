//! Pipeline orchestration
//!
//! This module provides the public API for TherapEase.
//! It runs one submission through encode → assemble → predict → decode.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::categories::SUGGESTED_ACTIVITY;
use crate::decoder::decode_prediction;
use crate::error::SuggestError;
use crate::features::FeatureAssembler;
use crate::model::{ActivityPredictor, ForestModel};
use crate::types::{Suggestion, SuggestionProducer, SuggestionRecord, WellnessInput};
use crate::{PRODUCER_NAME, THERAPEASE_VERSION};

/// Suggest an activity for one JSON submission using a forest artifact.
///
/// # Arguments
/// * `model_json` - Forest model artifact JSON
/// * `input_json` - A single [`WellnessInput`] as JSON
///
/// # Returns
/// The suggestion record as JSON
///
/// # Example
/// ```ignore
/// let record = suggest_activity(
///     model_json,
///     r#"{"mood":"Happy","energy":"High","stress":"Low","sleep_hours":6,"time_available":15}"#.to_string(),
/// )?;
/// ```
pub fn suggest_activity(model_json: String, input_json: String) -> Result<String, SuggestError> {
    let model = ForestModel::from_json(&model_json)?;
    ActivityAdvisor::new(Arc::new(model)).suggest_json(&input_json)
}

/// Runs submissions through a shared, read-only predictor.
///
/// Cloning is cheap; clones share the loaded model.
#[derive(Clone)]
pub struct ActivityAdvisor {
    predictor: Arc<dyn ActivityPredictor>,
    instance_id: String,
}

impl ActivityAdvisor {
    /// Create an advisor around any predictor
    pub fn new(predictor: Arc<dyn ActivityPredictor>) -> Self {
        Self {
            predictor,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Load a forest artifact from disk and wrap it
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self, SuggestError> {
        let model = ForestModel::load(path)?;
        Ok(Self::new(Arc::new(model)))
    }

    /// Use a fixed instance ID in produced records
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Run one submission through the pipeline.
    ///
    /// Pipeline stages:
    /// 1. FeatureAssembler - Encode categories and build the feature row
    /// 2. ActivityPredictor - Obtain a raw class id
    /// 3. decode_prediction - Normalize the id onto the activity table
    pub fn suggest(&self, input: &WellnessInput) -> Result<Suggestion, SuggestError> {
        // Stage 1: Encode and assemble
        let features = FeatureAssembler::assemble(input)?;
        log::debug!("Assembled features {:?}", features.as_row());

        // Stage 2: Predict
        let raw_prediction = self.predictor.predict(&features)?;

        // Stage 3: Decode
        let decoded = decode_prediction(raw_prediction, SUGGESTED_ACTIVITY.classes())?;

        Ok(Suggestion {
            activity: decoded.name.to_string(),
            time_available: input.time_available,
            raw_prediction,
            class_index: decoded.index,
            wrapped: decoded.wrapped,
            features,
        })
    }

    /// Run a submission and attach producer provenance
    pub fn suggest_record(&self, input: &WellnessInput) -> Result<SuggestionRecord, SuggestError> {
        let suggestion = self.suggest(input)?;
        Ok(self.record(suggestion))
    }

    /// JSON submission in, JSON suggestion record out
    pub fn suggest_json(&self, input_json: &str) -> Result<String, SuggestError> {
        let input: WellnessInput = serde_json::from_str(input_json)?;
        let record = self.suggest_record(&input)?;
        Ok(serde_json::to_string(&record)?)
    }

    fn record(&self, suggestion: Suggestion) -> SuggestionRecord {
        SuggestionRecord {
            producer: SuggestionProducer {
                name: PRODUCER_NAME.to_string(),
                version: THERAPEASE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            suggestion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FOREST_FORMAT;
    use crate::types::{FeatureVector, FEATURE_NAMES};
    use pretty_assertions::assert_eq;

    fn fixed(raw: i64) -> ActivityAdvisor {
        ActivityAdvisor::new(Arc::new(move |_: &FeatureVector| -> Result<i64, SuggestError> {
            Ok(raw)
        }))
    }

    fn single_leaf_model_json(class: i64) -> String {
        serde_json::json!({
            "format": FOREST_FORMAT,
            "feature_names": FEATURE_NAMES,
            "classes": [class],
            "trees": [{ "nodes": [{ "value": [1.0] }] }]
        })
        .to_string()
    }

    #[test]
    fn test_happy_high_low_wraps_nine() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let captured = Arc::clone(&seen);
        let advisor = ActivityAdvisor::new(Arc::new(
            move |f: &FeatureVector| -> Result<i64, SuggestError> {
                *captured.lock().unwrap() = Some(*f);
                Ok(9)
            },
        ));

        let input = WellnessInput::new("Happy", "High", "Low", 6, 15);
        let suggestion = advisor.suggest(&input).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            Some(FeatureVector {
                mood: 2,
                energy: 2,
                stress: 0,
                sleep_hours: 6,
                time_available: 15,
            })
        );
        assert_eq!(suggestion.activity, "Deep Breathing");
        assert_eq!(suggestion.class_index, 2);
        assert_eq!(suggestion.raw_prediction, 9);
        assert_eq!(suggestion.time_available, 15);
        assert!(suggestion.wrapped);
    }

    #[test]
    fn test_negative_prediction_is_gratitude() {
        let input = WellnessInput::new("Sad", "Low", "High", 4, 30);
        let suggestion = fixed(-1).suggest(&input).unwrap();
        assert_eq!(suggestion.activity, "Gratitude");
        assert_eq!(suggestion.class_index, 6);
    }

    #[test]
    fn test_boundary_values_accepted() {
        let input = WellnessInput::new("Anxious", "Medium", "Medium", 0, 60);
        let suggestion = fixed(3).suggest(&input).unwrap();
        assert_eq!(suggestion.activity, "Call Friend");
        assert_eq!(suggestion.time_available, 60);
        assert!(!suggestion.wrapped);
    }

    #[test]
    fn test_unknown_category_stops_before_predict() {
        let advisor = ActivityAdvisor::new(Arc::new(
            |_: &FeatureVector| -> Result<i64, SuggestError> {
                panic!("predictor must not run for invalid input")
            },
        ));
        let input = WellnessInput::new("Bored", "High", "Low", 6, 15);
        let err = advisor.suggest(&input).unwrap_err();
        assert!(matches!(err, SuggestError::UnknownCategory { table: "Mood", .. }));
    }

    #[test]
    fn test_predictor_failure_propagates() {
        let advisor = ActivityAdvisor::new(Arc::new(
            |_: &FeatureVector| -> Result<i64, SuggestError> {
                Err(SuggestError::PredictorInvocation("model crashed".to_string()))
            },
        ));
        let input = WellnessInput::new("Happy", "High", "Low", 6, 15);
        let err = advisor.suggest(&input).unwrap_err();
        assert!(matches!(err, SuggestError::PredictorInvocation(_)));
    }

    #[test]
    fn test_suggest_json_record() {
        let advisor = fixed(4).with_instance_id("test-instance".to_string());
        let json = advisor
            .suggest_json(r#"{"mood":"Angry","energy":"Low","stress":"High","sleep_hours":2,"time_available":20}"#)
            .unwrap();

        let record: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(record["producer"]["name"], PRODUCER_NAME);
        assert_eq!(record["producer"]["instance_id"], "test-instance");
        assert_eq!(record["activity"], "Walk");
        assert_eq!(record["time_available"], 20);
        assert_eq!(record["features"]["stress"], 2);
        assert!(record["computed_at_utc"].is_string());
    }

    #[test]
    fn test_suggest_json_invalid() {
        let err = fixed(0).suggest_json("not json").unwrap_err();
        assert!(matches!(err, SuggestError::Json(_)));
    }

    #[test]
    fn test_suggest_activity_one_shot() {
        let json = suggest_activity(
            single_leaf_model_json(5),
            r#"{"mood":"Sad","energy":"Medium","stress":"Low"}"#.to_string(),
        )
        .unwrap();

        let record: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(record["activity"], "Music Therapy");
        assert_eq!(record["time_available"], 15);
    }

    #[test]
    fn test_from_model_path() {
        let path = std::env::temp_dir().join(format!("therapease-model-{}.json", Uuid::new_v4()));
        std::fs::write(&path, single_leaf_model_json(0)).unwrap();

        let advisor = ActivityAdvisor::from_model_path(&path).unwrap();
        let suggestion = advisor
            .suggest(&WellnessInput::new("Happy", "Low", "Low", 8, 10))
            .unwrap();
        assert_eq!(suggestion.activity, "Journaling");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_advisor_shared_across_threads() {
        let advisor = fixed(1);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let advisor = advisor.clone();
                std::thread::spawn(move || {
                    advisor
                        .suggest(&WellnessInput::new("Sad", "Low", "Low", i, 15))
                        .unwrap()
                        .activity
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "CBT Worksheet");
        }
    }
}
