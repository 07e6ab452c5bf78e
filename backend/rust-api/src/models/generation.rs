use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use validator::Validate;

/// Difficulty of an AI generated exercise. The wire values are the French
/// labels the prompt is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Facile")]
    Easy,
    #[default]
    #[serde(rename = "Moyen")]
    Medium,
    #[serde(rename = "Difficile")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Facile",
            Difficulty::Medium => "Moyen",
            Difficulty::Hard => "Difficile",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MISSING_PARAMETERS: &str = "Missing required parameters: topic, level, difficulty";

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body of `POST /api/generate`. Missing, `null` and empty fields all end up
/// as `""` so that `validate` rejects them the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub level: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1))]
    pub difficulty: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn difficulty_round_trips_french_labels() {
        assert_eq!(serde_json::to_value(Difficulty::Hard).unwrap(), "Difficile");
        let parsed: Difficulty = serde_json::from_value(json!("Facile")).unwrap();
        assert_eq!(parsed, Difficulty::Easy);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn missing_or_empty_fields_fail_validation() {
        let missing: GenerateRequest =
            serde_json::from_value(json!({ "topic": "le futur", "level": "BAC" })).unwrap();
        assert!(missing.validate().is_err());

        let empty: GenerateRequest = serde_json::from_value(
            json!({ "topic": "", "level": "BAC", "difficulty": "Moyen" }),
        )
        .unwrap();
        assert!(empty.validate().is_err());

        let null: GenerateRequest = serde_json::from_value(
            json!({ "topic": null, "level": "BAC", "difficulty": "Moyen" }),
        )
        .unwrap();
        assert_eq!(null.topic, "");
        assert!(null.validate().is_err());

        let complete: GenerateRequest = serde_json::from_value(
            json!({ "topic": "le futur", "level": "Baccalauréat", "difficulty": "Moyen" }),
        )
        .unwrap();
        assert!(complete.validate().is_ok());
    }
}
