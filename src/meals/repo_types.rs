use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::Error;

/// Meal category; fixed once the entry is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Breakfast" => Ok(MealType::Breakfast),
            "Lunch" => Ok(MealType::Lunch),
            "Dinner" => Ok(MealType::Dinner),
            "Snack" => Ok(MealType::Snack),
            other => Err(Error::Validation(format!("unknown meal type {other:?}"))),
        }
    }
}

/// Raw `meal_entry` row.
#[derive(Debug, FromRow)]
pub struct MealEntryRow {
    pub meal_entry_id: Uuid,
    pub user_id: String,
    pub meal_type: String,
    pub description_text: String,
    pub calories_value: Option<i32>,
    pub consumed_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// A logged meal. `meal_type` and `created_at` never change after insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealEntry {
    pub meal_entry_id: Uuid,
    pub user_id: String,
    pub meal_type: MealType,
    pub description_text: String,
    pub calories_value: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub consumed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<MealEntryRow> for MealEntry {
    type Error = Error;

    fn try_from(r: MealEntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meal_entry_id: r.meal_entry_id,
            user_id: r.user_id,
            meal_type: r.meal_type.parse()?,
            description_text: r.description_text,
            calories_value: r.calories_value,
            consumed_at: r.consumed_at,
            created_at: r.created_at,
        })
    }
}

/// Insert payload for a meal; `consumed_at` defaults to the insert time.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub meal_type: MealType,
    pub description: String,
    pub calories: Option<i32>,
    pub consumed_at: Option<OffsetDateTime>,
}
