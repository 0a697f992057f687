use serde::Serialize;

use crate::metrics::trend::{TrendSummary, WeightTrendPoint};

/// Everything the dashboard shows, each field independently degradable.
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub calories_today: i64,
    pub entries_today: u32,
    pub current_streak: u32,
    pub weight_trend_7d: Vec<WeightTrendPoint>,
    pub weight_delta_7d: Option<f64>,
    pub weight_summary: TrendSummary,
    /// Metrics that fell back to their empty value.
    pub degraded: Vec<&'static str>,
}
