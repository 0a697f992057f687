use axum::{extract::State, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::detection::{suggest_meal_type, validate_items, RefinedMeal};
use super::dto::{RefineRequest, TipRequest, TipResponse};
use super::FALLBACK_TIP;
use crate::{
    auth::AuthUser,
    error::{Error, Result},
    extract::ValidJson,
    state::AppState,
    timezone::Timezone,
};

pub fn enrichment_routes() -> Router<AppState> {
    Router::new()
        .route("/tips", post(generate_tip))
        .route("/food-detection/refine", post(refine_detection))
}

/// POST /tips; never fails because of the language model.
#[instrument(skip(state, body))]
pub async fn generate_tip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(body): ValidJson<TipRequest>,
) -> Result<Json<TipResponse>> {
    let goal = body.health_goal.trim();
    if goal.is_empty() {
        return Err(Error::Validation("health_goal must be a non-empty string".into()));
    }

    let tip = match state.coach.generate_tip(goal).await {
        Ok(tip) => tip,
        Err(e) => {
            warn!(error = %e, %user_id, "tip generation failed, using fallback");
            FALLBACK_TIP.to_string()
        }
    };
    Ok(Json(TipResponse { tip }))
}

/// POST /food-detection/refine; falls back to listing the item names.
#[instrument(skip(state, body))]
pub async fn refine_detection(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(body): ValidJson<RefineRequest>,
) -> Result<Json<RefinedMeal>> {
    let items = validate_items(body.detected_items)?;
    let tz = Timezone::require(body.timezone.as_deref())?;
    let local_hour = tz
        .local(body.current_time.unwrap_or_else(OffsetDateTime::now_utc))
        .hour();

    let refined = match state.coach.refine_detection(&items, local_hour).await {
        Ok(refined) => refined,
        Err(e) => {
            warn!(error = %e, %user_id, items = items.len(), "refinement failed, using fallback");
            RefinedMeal::fallback(&items, suggest_meal_type(local_hour))
        }
    };
    info!(%user_id, description = %refined.description, "detection refined");
    Ok(Json(refined))
}
