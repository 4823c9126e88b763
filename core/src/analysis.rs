//! Photo analysis: the instruction sent to the model and parsing of its reply.
//!
//! The model is an untrusted source. Its output is parsed leniently per item
//! and anything unusable is dropped rather than failing the whole response.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::TrackerError;
use crate::models::{Food, validate_food_data};

pub const ANALYSIS_PROMPT: &str = "Identify every food item visible in this image. \
Respond with a JSON array only. Each element must be an object with the keys \
\"id\", \"name\", \"calories\", \"protein\", \"carbs\", \"fat\" and \"servingSize\". \
\"calories\" is kcal per 100 g; \"protein\", \"carbs\" and \"fat\" are grams per 100 g. \
\"servingSize\" is your estimate of the grams of that food shown in the image. \
If no food is visible, respond with an empty array.";

/// Turns a photo into a list of candidate foods.
///
/// Implementations call out to a hosted model and may block; errors are
/// surfaced to the user as-is and never retried.
pub trait ImageAnalysisProvider {
    fn analyze(&self, image: &[u8], mime_type: &str) -> Result<Vec<Food>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedFood {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    calories: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    carbs: f64,
    #[serde(default)]
    fat: f64,
    serving_size: f64,
}

impl DetectedFood {
    fn into_food(self, index: usize) -> Food {
        let id = match self.id {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("ai-{index}"),
        };
        Food {
            id,
            name: self.name.trim().to_string(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            serving_size: self.serving_size,
        }
    }
}

/// Removes a surrounding Markdown code fence (```` ```json ... ``` ````) if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse the model's reply into foods.
///
/// A reply that is not a JSON array is [`TrackerError::MalformedAnalysis`]; an
/// empty array, or one where no item is usable, is
/// [`TrackerError::NoFoodDetected`].
pub fn parse_detected_foods(text: &str) -> Result<Vec<Food>> {
    let body = strip_code_fence(text);
    let items: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| TrackerError::MalformedAnalysis(e.to_string()))?;

    let mut foods = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let detected = match serde_json::from_value::<DetectedFood>(item) {
            Ok(d) => d,
            Err(e) => {
                debug!(index, error = %e, "dropping unreadable detected food");
                continue;
            }
        };
        let food = detected.into_food(index);
        if let Err(e) = validate_food_data(&food) {
            debug!(index, error = %e, "dropping invalid detected food");
            continue;
        }
        // The estimated serving is what gets logged, so it must be positive.
        if food.serving_size <= 0.0 {
            debug!(index, "dropping detected food without a serving size");
            continue;
        }
        foods.push(food);
    }

    if foods.is_empty() {
        return Err(TrackerError::NoFoodDetected.into());
    }
    Ok(foods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::tracker_error;

    const REPLY: &str = r#"[
        {"id": "banana-1", "name": "Banana", "calories": 89, "protein": 1.1, "carbs": 23, "fat": 0.3, "servingSize": 120},
        {"name": "Peanut Butter", "calories": 588, "protein": 25, "carbs": 20, "fat": 50, "servingSize": 16}
    ]"#;

    #[test]
    fn test_parse_plain_array() {
        let foods = parse_detected_foods(REPLY).unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[0].id, "banana-1");
        assert_eq!(foods[0].name, "Banana");
        assert!((foods[0].serving_size - 120.0).abs() < f64::EPSILON);
        assert_eq!(foods[1].id, "ai-1");
        assert!((foods[1].calories - 588.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let fenced = format!("```json\n{REPLY}\n```");
        assert_eq!(parse_detected_foods(&fenced).unwrap().len(), 2);

        let bare_fence = format!("```\n{REPLY}\n```\n");
        assert_eq!(parse_detected_foods(&bare_fence).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_numeric_id() {
        let foods = parse_detected_foods(
            r#"[{"id": 7, "name": "Egg", "calories": 155, "protein": 13, "carbs": 1.1, "fat": 11, "servingSize": 50}]"#,
        )
        .unwrap();
        assert_eq!(foods[0].id, "7");
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_detected_foods("I see a banana!").unwrap_err();
        assert!(matches!(
            tracker_error(&err),
            Some(TrackerError::MalformedAnalysis(_))
        ));

        // An object is not an array.
        let err = parse_detected_foods(r#"{"name": "Banana"}"#).unwrap_err();
        assert!(matches!(
            tracker_error(&err),
            Some(TrackerError::MalformedAnalysis(_))
        ));
    }

    #[test]
    fn test_parse_empty_array() {
        let err = parse_detected_foods("[]").unwrap_err();
        assert_eq!(tracker_error(&err), Some(&TrackerError::NoFoodDetected));
    }

    #[test]
    fn test_parse_drops_invalid_items() {
        let reply = r#"[
            {"name": "", "calories": 10, "servingSize": 10},
            {"name": "Mystery", "calories": -5, "servingSize": 10},
            {"name": "No numbers"},
            "banana",
            {"name": "Rice", "calories": 130, "protein": 2.7, "carbs": 28, "fat": 0.3, "servingSize": 150}
        ]"#;
        let foods = parse_detected_foods(reply).unwrap();
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Rice");
        // Index in the original reply, not among survivors.
        assert_eq!(foods[0].id, "ai-4");
    }

    #[test]
    fn test_parse_drops_zero_serving() {
        let reply = r#"[
            {"name": "Soup", "calories": 40, "servingSize": 0},
            {"name": "Bread", "calories": 265, "servingSize": 30}
        ]"#;
        let foods = parse_detected_foods(reply).unwrap();
        assert_eq!(foods.len(), 1);
        assert_eq!(foods[0].name, "Bread");

        let err = parse_detected_foods(r#"[{"name": "Soup", "calories": 40, "servingSize": 0}]"#)
            .unwrap_err();
        assert_eq!(tracker_error(&err), Some(&TrackerError::NoFoodDetected));
    }

    #[test]
    fn test_parse_nothing_usable() {
        let err = parse_detected_foods(r#"[{"name": ""}]"#).unwrap_err();
        assert_eq!(tracker_error(&err), Some(&TrackerError::NoFoodDetected));
    }
}
