use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::DashboardMetrics;
use super::services::compose_dashboard;
use crate::{
    auth::AuthUser, error::Result, extract::ValidQuery, meals::dto::TimezoneQuery,
    state::AppState, timezone::Timezone,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET /dashboard?timezone=..
#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<TimezoneQuery>,
) -> Result<Json<DashboardMetrics>> {
    let tz = Timezone::require(q.timezone.as_deref())?;
    let metrics =
        compose_dashboard(state.store.as_ref(), &user_id, tz, state.config.store_timeout).await;
    Ok(Json(metrics))
}
