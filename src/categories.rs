//! Category tables
//!
//! Fixed, ordered label lists for every categorical field. A label's position
//! in its table is its integer code, so codes are always dense `0..n-1`.

use serde::Serialize;

use crate::error::SuggestError;

/// Fixed ordered list mapping label strings to integer codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTable {
    name: &'static str,
    classes: &'static [&'static str],
}

/// Mood the user reports feeling right now
pub static MOOD: CategoryTable = CategoryTable {
    name: "Mood",
    classes: &["Angry", "Sad", "Happy", "Anxious"],
};

/// Current energy level
pub static ENERGY: CategoryTable = CategoryTable {
    name: "Energy",
    classes: &["Low", "Medium", "High"],
};

/// Current stress level
pub static STRESS: CategoryTable = CategoryTable {
    name: "Stress",
    classes: &["Low", "Medium", "High"],
};

/// Activities the model can suggest, in class-id order
pub static SUGGESTED_ACTIVITY: CategoryTable = CategoryTable {
    name: "SuggestedActivity",
    classes: &[
        "Journaling",
        "CBT Worksheet",
        "Deep Breathing",
        "Call Friend",
        "Walk",
        "Music Therapy",
        "Gratitude",
    ],
};

/// Every table, in the order the `categories` listing prints them
pub static ALL_TABLES: [&CategoryTable; 4] = [&MOOD, &ENERGY, &STRESS, &SUGGESTED_ACTIVITY];

impl CategoryTable {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn classes(&self) -> &'static [&'static str] {
        self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Zero-based code of `label`. Matching is exact and case-sensitive.
    pub fn encode(&self, label: &str) -> Result<usize, SuggestError> {
        self.classes
            .iter()
            .position(|class| *class == label)
            .ok_or_else(|| SuggestError::UnknownCategory {
                table: self.name,
                label: label.to_string(),
            })
    }

    /// Label stored at `code`, if the code is in range
    pub fn decode(&self, code: usize) -> Option<&'static str> {
        self.classes.get(code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_every_label() {
        for table in ALL_TABLES {
            for label in table.classes() {
                let code = table.encode(label).unwrap();
                assert_eq!(table.decode(code), Some(*label));
            }
        }
    }

    #[test]
    fn test_codes_follow_table_order() {
        assert_eq!(MOOD.encode("Angry").unwrap(), 0);
        assert_eq!(MOOD.encode("Sad").unwrap(), 1);
        assert_eq!(MOOD.encode("Happy").unwrap(), 2);
        assert_eq!(MOOD.encode("Anxious").unwrap(), 3);
        assert_eq!(ENERGY.encode("High").unwrap(), 2);
        assert_eq!(STRESS.encode("Low").unwrap(), 0);
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(MOOD.len(), 4);
        assert_eq!(ENERGY.len(), 3);
        assert_eq!(STRESS.len(), 3);
        assert_eq!(SUGGESTED_ACTIVITY.len(), 7);
    }

    #[test]
    fn test_unknown_label() {
        let err = MOOD.encode("Ecstatic").unwrap_err();
        match err {
            SuggestError::UnknownCategory { table, label } => {
                assert_eq!(table, "Mood");
                assert_eq!(label, "Ecstatic");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_encode_is_case_sensitive() {
        assert!(ENERGY.encode("low").is_err());
        assert!(STRESS.encode(" Low").is_err());
    }

    #[test]
    fn test_decode_out_of_range() {
        assert_eq!(STRESS.decode(3), None);
    }
}
