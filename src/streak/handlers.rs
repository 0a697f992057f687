use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use time::Date;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::Result,
    extract::ValidQuery,
    meals::dto::TimezoneQuery,
    state::AppState,
    store::bounded,
    timezone::Timezone,
};

pub fn streak_routes() -> Router<AppState> {
    Router::new().route("/streak", get(get_streak))
}

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub current_streak: u32,
    #[serde(with = "crate::timezone::calendar_date::option")]
    pub last_logged_date: Option<Date>,
}

/// GET /streak?timezone=..
#[instrument(skip(state))]
pub async fn get_streak(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<TimezoneQuery>,
) -> Result<Json<StreakResponse>> {
    let tz = Timezone::require(q.timezone.as_deref())?;
    let counter = bounded(state.config.store_timeout, state.store.streak_counter(&user_id))
        .await?
        .unwrap_or_default();
    Ok(Json(StreakResponse {
        current_streak: counter.effective_days(tz.today()),
        last_logged_date: counter.last_logged_date,
    }))
}
