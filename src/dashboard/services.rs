use std::time::Duration;

use tracing::{debug, error, warn};

use super::dto::DashboardMetrics;
use crate::error::Result;
use crate::metrics::daily::{self, TodaysTotals};
use crate::metrics::trend::{self, DEFAULT_WINDOW_DAYS};
use crate::store::{bounded, EventStore};
use crate::timezone::Timezone;

fn or_default<T: Default>(
    metric: &'static str,
    user_id: &str,
    result: Result<T>,
    degraded: &mut Vec<&'static str>,
) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            if e.is_store_failure() {
                warn!(error = %e, %user_id, metric, "metric unavailable, using fallback");
            } else {
                error!(error = %e, %user_id, metric, "metric failed, using fallback");
            }
            degraded.push(metric);
            T::default()
        }
    }
}

/// Reads today's totals, the streak and the weight trend concurrently.
///
/// A failing or slow metric falls back to zero/empty on its own; the rest of
/// the dashboard is still returned.
pub async fn compose_dashboard(
    store: &dyn EventStore,
    user_id: &str,
    tz: Timezone,
    timeout: Duration,
) -> DashboardMetrics {
    let today = tz.today();

    let (totals, streak, weight_trend) = tokio::join!(
        bounded(timeout, async {
            let meals = store.list_meals(user_id).await?;
            Ok(daily::todays_totals_on(&meals, tz, today))
        }),
        bounded(timeout, async {
            let counter = store.streak_counter(user_id).await?;
            Ok(counter.unwrap_or_default().effective_days(today))
        }),
        bounded(timeout, async {
            let weights = store.list_weights(user_id).await?;
            Ok(trend::weight_trend_on(&weights, tz, DEFAULT_WINDOW_DAYS, today))
        }),
    );

    let mut degraded = Vec::new();
    let TodaysTotals {
        calories_today,
        entries_today,
    } = or_default("todays_totals", user_id, totals, &mut degraded);
    let current_streak = or_default("current_streak", user_id, streak, &mut degraded);
    let weight_trend_7d = or_default("weight_trend_7d", user_id, weight_trend, &mut degraded);

    debug!(
        %user_id,
        tz = %tz,
        calories_today,
        entries_today,
        current_streak,
        trend_points = weight_trend_7d.len(),
        "dashboard composed"
    );

    DashboardMetrics {
        calories_today,
        entries_today,
        current_streak,
        weight_delta_7d: trend::delta(&weight_trend_7d),
        weight_summary: trend::summarize_trend(&weight_trend_7d),
        weight_trend_7d,
        degraded,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::Error;
    use crate::meals::repo_types::{MealEntry, MealType, NewMeal};
    use crate::metrics::trend::TrendSummary;
    use crate::store::MemoryStore;
    use crate::streak::StreakCounter;
    use crate::weight::repo_types::{NewWeight, WeightSnapshot, WeightUnit};

    /// Wraps a memory store and breaks selected reads.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_meals: bool,
        fail_weights: bool,
        stall_streak: bool,
    }

    #[async_trait]
    impl EventStore for FlakyStore {
        async fn insert_meal(&self, user_id: &str, meal: NewMeal, tz: Timezone) -> Result<MealEntry> {
            self.inner.insert_meal(user_id, meal, tz).await
        }
        async fn list_meals(&self, user_id: &str) -> Result<Vec<MealEntry>> {
            if self.fail_meals {
                return Err(Error::StoreUnavailable(sqlx::Error::PoolTimedOut));
            }
            self.inner.list_meals(user_id).await
        }
        async fn insert_weight(&self, user_id: &str, weight: NewWeight) -> Result<WeightSnapshot> {
            self.inner.insert_weight(user_id, weight).await
        }
        async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightSnapshot>> {
            if self.fail_weights {
                return Err(Error::StoreUnavailable(sqlx::Error::PoolClosed));
            }
            self.inner.list_weights(user_id).await
        }
        async fn streak_counter(&self, user_id: &str) -> Result<Option<StreakCounter>> {
            if self.stall_streak {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.inner.streak_counter(user_id).await
        }
    }

    async fn seed(store: &dyn EventStore) {
        for kcal in [Some(400), None, Some(250)] {
            store
                .insert_meal(
                    "u",
                    NewMeal {
                        meal_type: MealType::Snack,
                        description: "nuts".into(),
                        calories: kcal,
                        consumed_at: None,
                    },
                    Timezone::UTC,
                )
                .await
                .unwrap();
        }
        store
            .insert_weight("u", NewWeight { value: 70.5, unit: WeightUnit::Kg, recorded_at: None })
            .await
            .unwrap();
    }

    const TIMEOUT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn healthy_store_fills_every_metric() {
        let store = FlakyStore::default();
        seed(&store).await;

        let m = compose_dashboard(&store, "u", Timezone::UTC, TIMEOUT).await;
        assert_eq!(m.calories_today, 650);
        assert_eq!(m.entries_today, 3);
        assert_eq!(m.current_streak, 1);
        assert_eq!(m.weight_trend_7d.len(), 1);
        assert_eq!(m.weight_delta_7d, None);
        assert!(matches!(m.weight_summary, TrendSummary::SinglePoint { .. }));
        assert!(m.degraded.is_empty());
    }

    #[tokio::test]
    async fn new_user_gets_zeroes_not_errors() {
        let store = MemoryStore::new();
        let m = compose_dashboard(&store, "fresh", Timezone::UTC, TIMEOUT).await;
        assert_eq!((m.calories_today, m.entries_today, m.current_streak), (0, 0, 0));
        assert!(m.weight_trend_7d.is_empty());
        assert!(matches!(m.weight_summary, TrendSummary::NoData { .. }));
        assert!(m.degraded.is_empty());
    }

    #[tokio::test]
    async fn one_failing_metric_does_not_block_the_rest() {
        let store = FlakyStore {
            fail_meals: true,
            ..Default::default()
        };
        seed(&store).await;

        let m = compose_dashboard(&store, "u", Timezone::UTC, TIMEOUT).await;
        assert_eq!((m.calories_today, m.entries_today), (0, 0));
        assert_eq!(m.current_streak, 1);
        assert_eq!(m.weight_trend_7d.len(), 1);
        assert_eq!(m.degraded, vec!["todays_totals"]);
    }

    #[tokio::test]
    async fn slow_and_failing_metrics_degrade_independently() {
        let store = FlakyStore {
            fail_weights: true,
            stall_streak: true,
            ..Default::default()
        };
        seed(&store).await;

        let m = compose_dashboard(&store, "u", Timezone::UTC, TIMEOUT).await;
        assert_eq!(m.entries_today, 3);
        assert_eq!(m.current_streak, 0);
        assert!(m.weight_trend_7d.is_empty());
        assert_eq!(m.degraded, vec!["current_streak", "weight_trend_7d"]);
    }
}
