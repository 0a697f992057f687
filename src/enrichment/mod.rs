//! Best-effort enrichment calls: calorie estimation, nutrition tips and
//! refining detected food items into a meal.
//!
//! Nothing here may block logging: callers turn every failure into a fallback.

pub mod detection;
pub mod dto;
mod handlers;
mod openrouter;

pub use openrouter::OpenRouterCoach;

use async_trait::async_trait;
use axum::Router;

use crate::error::{Error, Result};
use crate::state::AppState;
use detection::{DetectedItem, RefinedMeal};

pub const FALLBACK_TIP: &str = "Stay hydrated and eat balanced meals throughout the day.";

pub fn router() -> Router<AppState> {
    handlers::enrichment_routes()
}

#[async_trait]
pub trait NutritionCoach: Send + Sync {
    /// Estimated kilocalories for a free-text meal description.
    async fn estimate_calories(&self, description: &str) -> Result<i32>;

    /// A short, actionable tip for the given health goal.
    async fn generate_tip(&self, health_goal: &str) -> Result<String>;

    /// Describes validated detected items as one meal eaten at `local_hour`.
    async fn refine_detection(&self, items: &[DetectedItem], local_hour: u8) -> Result<RefinedMeal>;
}

/// Used when no language-model credentials are configured.
#[derive(Debug, Clone, Default)]
pub struct OfflineCoach;

#[async_trait]
impl NutritionCoach for OfflineCoach {
    async fn estimate_calories(&self, _description: &str) -> Result<i32> {
        Err(Error::ExternalServiceDegraded(
            "calorie estimation is not configured".into(),
        ))
    }

    async fn generate_tip(&self, _health_goal: &str) -> Result<String> {
        Err(Error::ExternalServiceDegraded("tips are not configured".into()))
    }

    async fn refine_detection(&self, _items: &[DetectedItem], _local_hour: u8) -> Result<RefinedMeal> {
        Err(Error::ExternalServiceDegraded(
            "detection refinement is not configured".into(),
        ))
    }
}
