use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::metrics::trend::{TrendSummary, WeightTrendPoint};
use crate::weight::repo_types::{WeightSnapshot, WeightUnit};

#[derive(Debug, Deserialize)]
pub struct LogWeightRequest {
    pub weight_value: f64,
    pub weight_unit_hint: WeightUnit,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub recorded_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogWeightResponse {
    pub weight: WeightSnapshot,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub points: Vec<WeightTrendPoint>,
    pub delta_kg: Option<f64>,
    pub summary: TrendSummary,
}
