use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    HistoryQuery, HistoryResponse, LogMealRequest, LogMealResponse, SummariesQuery,
    SummariesResponse, TimezoneQuery,
};
use super::services::{log_meal, MealDraft};
use crate::{
    auth::AuthUser,
    error::Result,
    extract::{ValidJson, ValidQuery},
    metrics::daily::{self, TodaysTotals},
    state::AppState,
    store::bounded,
    timezone::Timezone,
};

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/meals/summaries", get(list_summaries))
        .route("/meals/today", get(todays_totals))
        .route("/meals/history", get(meal_history))
}

pub fn write_router() -> Router<AppState> {
    Router::new().route("/meals", post(create_meal))
}

/// POST /meals
#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(body): ValidJson<LogMealRequest>,
) -> Result<(StatusCode, Json<LogMealResponse>)> {
    let draft = MealDraft::new(body.meal_type, &body.description, body.calories, body.consumed_at)?;
    let tz = Timezone::require(body.timezone.as_deref())?;

    let (meal, calories_source) = log_meal(&state, &user_id, draft, tz).await?;
    let current_streak = bounded(
        state.config.store_timeout,
        state.store.current_streak(&user_id),
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(LogMealResponse {
            meal,
            calories_source,
            current_streak,
        }),
    ))
}

/// GET /meals/summaries?timezone=..&limit=30
#[instrument(skip(state))]
pub async fn list_summaries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<SummariesQuery>,
) -> Result<Json<SummariesResponse>> {
    let tz = Timezone::require(q.timezone.as_deref())?;
    daily::check_limit(q.limit)?;

    let meals = bounded(state.config.store_timeout, state.store.list_meals(&user_id)).await?;
    let summaries = daily::summarize(&meals, tz, q.limit)?;
    Ok(Json(SummariesResponse {
        count: summaries.len(),
        summaries,
    }))
}

/// GET /meals/today?timezone=..
#[instrument(skip(state))]
pub async fn todays_totals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<TimezoneQuery>,
) -> Result<Json<TodaysTotals>> {
    let tz = Timezone::require(q.timezone.as_deref())?;
    let meals = bounded(state.config.store_timeout, state.store.list_meals(&user_id)).await?;
    Ok(Json(daily::todays_totals(&meals, tz)))
}

/// GET /meals/history?timezone=..&date=YYYY-MM-DD (defaults to today)
#[instrument(skip(state))]
pub async fn meal_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidQuery(q): ValidQuery<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let tz = Timezone::require(q.timezone.as_deref())?;
    let date = q.date.unwrap_or_else(|| tz.today());

    let meals = bounded(state.config.store_timeout, state.store.list_meals(&user_id)).await?;
    let meals = daily::meals_on(meals, tz, date);
    Ok(Json(HistoryResponse {
        count: meals.len(),
        is_today: tz.is_today(date),
        meals,
        date,
    }))
}
