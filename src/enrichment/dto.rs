use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::detection::DetectedItem;

#[derive(Debug, Deserialize)]
pub struct TipRequest {
    #[serde(alias = "healthGoal")]
    pub health_goal: String,
}

#[derive(Debug, Serialize)]
pub struct TipResponse {
    pub tip: String,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(alias = "detectedItems")]
    pub detected_items: Vec<DetectedItem>,
    /// Moment the photo was taken; defaults to now.
    #[serde(default, alias = "currentTime", with = "time::serde::rfc3339::option")]
    pub current_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub timezone: Option<String>,
}
