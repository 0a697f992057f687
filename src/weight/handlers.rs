use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{LogWeightRequest, LogWeightResponse, TrendResponse};
use super::services::{log_weight, validate_weight};
use crate::{
    auth::AuthUser,
    error::Result,
    extract::{ValidJson, ValidQuery},
    meals::dto::TimezoneQuery,
    metrics::trend::{self, DEFAULT_WINDOW_DAYS},
    state::AppState,
    store::bounded,
    timezone::Timezone,
};

pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route("/weight", post(create_weight))
        .route("/weight/trend", get(weight_trend))
}

/// POST /weight
#[instrument(skip(state, body))]
pub async fn create_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(body): ValidJson<LogWeightRequest>,
) -> Result<(StatusCode, Json<LogWeightResponse>)> {
    let weight = validate_weight(body.weight_value, body.weight_unit_hint, body.recorded_at)?;
    Timezone::require(body.timezone.as_deref())?;

    let weight = log_weight(&state, &user_id, weight).await?;
    Ok((StatusCode::CREATED, Json(LogWeightResponse { weight })))
}

/// GET /weight/trend?timezone=..
#[instrument(skip(state))]
pub async fn weight_trend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<TimezoneQuery>,
) -> Result<Json<TrendResponse>> {
    let tz = Timezone::require(q.timezone.as_deref())?;
    let weights = bounded(state.config.store_timeout, state.store.list_weights(&user_id)).await?;

    let points = trend::weight_trend(&weights, tz, DEFAULT_WINDOW_DAYS);
    Ok(Json(TrendResponse {
        delta_kg: trend::delta(&points),
        summary: trend::summarize_trend(&points),
        points,
    }))
}
