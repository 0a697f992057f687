use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::EventStore;
use crate::error::Result;
use crate::meals::repo_types::{MealEntry, NewMeal};
use crate::streak::StreakCounter;
use crate::timezone::Timezone;
use crate::weight::repo_types::{NewWeight, WeightSnapshot};

#[derive(Default)]
struct Inner {
    meals: Vec<MealEntry>,
    weights: Vec<WeightSnapshot>,
    streaks: HashMap<String, StreakCounter>,
}

/// Process-local store for `STORE_BACKEND=memory` and tests.
///
/// One mutex guards everything, which also serializes streak updates.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_meal(&self, user_id: &str, meal: NewMeal, tz: Timezone) -> Result<MealEntry> {
        let now = OffsetDateTime::now_utc();
        let entry = MealEntry {
            meal_entry_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            meal_type: meal.meal_type,
            description_text: meal.description,
            calories_value: meal.calories,
            consumed_at: meal.consumed_at.unwrap_or(now),
            created_at: now,
        };

        let mut inner = self.inner.lock().await;
        let counter = inner.streaks.entry(user_id.to_string()).or_default();
        *counter = counter.record(tz.date_of(entry.consumed_at));
        inner.meals.push(entry.clone());
        Ok(entry)
    }

    async fn list_meals(&self, user_id: &str) -> Result<Vec<MealEntry>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .meals
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_weight(&self, user_id: &str, weight: NewWeight) -> Result<WeightSnapshot> {
        let snapshot = WeightSnapshot {
            weight_snapshot_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            weight_value: weight.value,
            weight_unit_hint: weight.unit,
            recorded_at: weight.recorded_at.unwrap_or_else(OffsetDateTime::now_utc),
        };
        self.inner.lock().await.weights.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightSnapshot>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .weights
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn streak_counter(&self, user_id: &str) -> Result<Option<StreakCounter>> {
        Ok(self.inner.lock().await.streaks.get(user_id).copied())
    }
}
