use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::meals::repo_types::{MealEntry, MealType};
use crate::metrics::daily::DailySummary;

#[derive(Debug, Deserialize)]
pub struct LogMealRequest {
    pub description: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub calories: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub consumed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaloriesSource {
    Manual,
    Estimated,
}

#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub meal: MealEntry,
    pub calories_source: Option<CaloriesSource>,
    /// Stored streak after this log.
    pub current_streak: u32,
}

#[derive(Debug, Deserialize)]
pub struct SummariesQuery {
    pub timezone: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize { 30 }

#[derive(Debug, Serialize)]
pub struct SummariesResponse {
    pub summaries: Vec<DailySummary>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TimezoneQuery {
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub timezone: Option<String>,
    #[serde(default, with = "crate::timezone::calendar_date::option")]
    pub date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub meals: Vec<MealEntry>,
    #[serde(with = "crate::timezone::calendar_date")]
    pub date: Date,
    pub is_today: bool,
    pub count: usize,
}
