//! Detected food items and the single meal they are refined into.
//!
//! Detection payloads come from outside the service; everything is checked
//! here before a coach or a handler sees it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::meals::repo_types::MealType;
use crate::meals::services::MAX_DESCRIPTION_CHARS;

pub const MAX_DETECTED_ITEMS: usize = 20;
/// Confidence reported when the description is a plain list of item names.
pub const FALLBACK_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionData {
    pub calories: f64,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub name: String,
    /// Detector confidence, `0..=100`.
    pub confidence: f64,
    #[serde(default)]
    pub nutrition: Option<NutritionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinedMeal {
    pub description: String,
    pub total_calories: i64,
    pub suggested_meal_type: MealType,
    pub confidence: u8,
}

fn non_negative(value: Option<f64>) -> bool {
    value.map_or(true, |v| v.is_finite() && v >= 0.0)
}

/// Rejects empty or malformed detections and trims item names.
pub fn validate_items(items: Vec<DetectedItem>) -> Result<Vec<DetectedItem>> {
    if items.is_empty() {
        return Err(Error::Validation("no detected items to refine".into()));
    }
    if items.len() > MAX_DETECTED_ITEMS {
        return Err(Error::Validation(format!(
            "at most {MAX_DETECTED_ITEMS} detected items can be refined"
        )));
    }

    items
        .into_iter()
        .map(|item| {
            let name = item.name.trim();
            if name.is_empty() {
                return Err(Error::Validation("detected item name is required".into()));
            }
            if !item.confidence.is_finite() || !(0.0..=100.0).contains(&item.confidence) {
                return Err(Error::Validation(format!(
                    "confidence for {name:?} must be between 0 and 100"
                )));
            }
            if let Some(n) = &item.nutrition {
                let ok = non_negative(Some(n.calories))
                    && non_negative(n.protein)
                    && non_negative(n.carbs)
                    && non_negative(n.fat);
                if !ok {
                    return Err(Error::Validation(format!(
                        "nutrition for {name:?} must be non-negative numbers"
                    )));
                }
            }
            Ok(DetectedItem {
                name: name.to_string(),
                ..item
            })
        })
        .collect()
}

/// Meal type implied by the local hour of day.
pub fn suggest_meal_type(local_hour: u8) -> MealType {
    match local_hour {
        6..=10 => MealType::Breakfast,
        11..=15 => MealType::Lunch,
        16..=21 => MealType::Dinner,
        _ => MealType::Snack,
    }
}

pub fn total_calories(items: &[DetectedItem]) -> i64 {
    items
        .iter()
        .filter_map(|i| i.nutrition.as_ref())
        .map(|n| n.calories)
        .sum::<f64>()
        .round() as i64
}

fn average_confidence(items: &[DetectedItem]) -> u8 {
    if items.is_empty() {
        return 0;
    }
    let mean = items.iter().map(|i| i.confidence).sum::<f64>() / items.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

pub fn item_names(items: &[DetectedItem]) -> String {
    items
        .iter()
        .map(|i| i.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl RefinedMeal {
    /// A model-written description; confidence is the detector average.
    pub fn described(items: &[DetectedItem], meal_type: MealType, description: String) -> Self {
        Self {
            description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            total_calories: total_calories(items),
            suggested_meal_type: meal_type,
            confidence: average_confidence(items),
        }
    }

    pub fn fallback(items: &[DetectedItem], meal_type: MealType) -> Self {
        Self {
            description: truncate_chars(&item_names(items), MAX_DESCRIPTION_CHARS),
            total_calories: total_calories(items),
            suggested_meal_type: meal_type,
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

/// Turns a raw completion into a one-line meal description.
pub fn clean_description(reply: &str) -> Result<String> {
    let text = reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '“' || c == '”')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return Err(Error::ExternalServiceDegraded("empty meal description".into()));
    }
    Ok(truncate_chars(&text, MAX_DESCRIPTION_CHARS))
}

pub fn refine_prompt(items: &[DetectedItem], local_hour: u8, meal_type: MealType) -> String {
    format!(
        "Based on the following detected food items, create a natural meal description (1-2 sentences).\n\n\
         Detected items: {}\n\
         Time of day: {local_hour}:00 (suggested meal type: {})\n\
         Total estimated calories: {}\n\n\
         Create a concise, natural description that sounds like a person describing their meal. \
         Do not include calories in the description.\n\n\
         Return ONLY the description, nothing else.",
        item_names(items),
        meal_type.as_str(),
        total_calories(items),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, confidence: f64, calories: Option<f64>) -> DetectedItem {
        DetectedItem {
            name: name.into(),
            confidence,
            nutrition: calories.map(|calories| NutritionData {
                calories,
                protein: None,
                carbs: None,
                fat: None,
            }),
        }
    }

    #[test]
    fn payload_deserializes_with_optional_nutrition() {
        let items: Vec<DetectedItem> = serde_json::from_str(
            r#"[
                {"name": "burger", "confidence": 85, "nutrition": {"calories": 500, "protein": 25}},
                {"name": "fries", "confidence": 70.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(items[0].nutrition.as_ref().unwrap().protein, Some(25.0));
        assert_eq!(items[1].nutrition, None);
        assert_eq!(total_calories(&items), 500);
    }

    #[test]
    fn rejects_malformed_detections() {
        assert!(matches!(validate_items(vec![]), Err(Error::Validation(_))));
        assert!(validate_items(vec![item("  ", 80.0, None)]).is_err());
        assert!(validate_items(vec![item("rice", 180.0, None)]).is_err());
        assert!(validate_items(vec![item("rice", f64::NAN, None)]).is_err());
        assert!(validate_items(vec![item("rice", 80.0, Some(-5.0))]).is_err());
        let many = (0..=MAX_DETECTED_ITEMS).map(|i| item(&format!("i{i}"), 50.0, None)).collect();
        assert!(validate_items(many).is_err());

        let ok = validate_items(vec![item(" rice ", 80.0, Some(200.0))]).unwrap();
        assert_eq!(ok[0].name, "rice");
    }

    #[test]
    fn meal_type_follows_local_hour() {
        assert_eq!(suggest_meal_type(5), MealType::Snack);
        assert_eq!(suggest_meal_type(6), MealType::Breakfast);
        assert_eq!(suggest_meal_type(10), MealType::Breakfast);
        assert_eq!(suggest_meal_type(11), MealType::Lunch);
        assert_eq!(suggest_meal_type(16), MealType::Dinner);
        assert_eq!(suggest_meal_type(21), MealType::Dinner);
        assert_eq!(suggest_meal_type(22), MealType::Snack);
    }

    #[test]
    fn fallback_lists_names_with_fixed_confidence() {
        let items = vec![item("burger", 85.0, Some(500.4)), item("fries", 70.0, Some(320.3))];
        let meal = RefinedMeal::fallback(&items, MealType::Dinner);
        assert_eq!(meal.description, "burger, fries");
        assert_eq!(meal.total_calories, 821);
        assert_eq!(meal.confidence, FALLBACK_CONFIDENCE);

        let meal = RefinedMeal::described(&items, MealType::Dinner, "A burger with fries".into());
        assert_eq!(meal.confidence, 78);
        assert_eq!(meal.total_calories, 821);
    }

    #[test]
    fn completion_is_cleaned_before_use() {
        assert_eq!(
            clean_description("  \"Grilled chicken\n with rice\"  ").unwrap(),
            "Grilled chicken with rice"
        );
        assert!(matches!(
            clean_description(" \"\" "),
            Err(Error::ExternalServiceDegraded(_))
        ));
        assert_eq!(
            clean_description(&"a".repeat(900)).unwrap().chars().count(),
            MAX_DESCRIPTION_CHARS
        );
    }

    #[test]
    fn prompt_names_items_and_meal_type() {
        let items = vec![item("oatmeal", 90.0, Some(300.0))];
        let prompt = refine_prompt(&items, 8, MealType::Breakfast);
        assert!(prompt.contains("Detected items: oatmeal"));
        assert!(prompt.contains("8:00 (suggested meal type: Breakfast)"));
        assert!(prompt.contains("Total estimated calories: 300"));
    }
}
