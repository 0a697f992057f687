//! Access to the two event collections (meals, weights) and the streak counter.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgEventStore;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::meals::repo_types::{MealEntry, NewMeal};
use crate::streak::StreakCounter;
use crate::timezone::Timezone;
use crate::weight::repo_types::{NewWeight, WeightSnapshot};

/// Durable storage for one user's tracking events.
///
/// Implementations never retry; failures surface as `StoreUnavailable` and the
/// caller decides whether to degrade.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts a meal and advances the user's streak counter for the meal's
    /// local date in `tz`, atomically and serialized per user.
    async fn insert_meal(&self, user_id: &str, meal: NewMeal, tz: Timezone) -> Result<MealEntry>;

    /// All meals of the user, in no particular order.
    async fn list_meals(&self, user_id: &str) -> Result<Vec<MealEntry>>;

    async fn insert_weight(&self, user_id: &str, weight: NewWeight) -> Result<WeightSnapshot>;

    /// All weight snapshots of the user, in no particular order.
    async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightSnapshot>>;

    async fn streak_counter(&self, user_id: &str) -> Result<Option<StreakCounter>>;

    /// Stored streak length, `0` when the user never logged a meal.
    async fn current_streak(&self, user_id: &str) -> Result<u32> {
        Ok(self
            .streak_counter(user_id)
            .await?
            .map(|c| c.current_streak_days.max(0) as u32)
            .unwrap_or(0))
    }
}

/// Runs a store call with an upper bound; an elapsed bound is `StoreTimeout`.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(Error::StoreTimeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_turns_a_stalled_call_into_a_timeout() {
        let stalled = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        };
        let err = bounded(Duration::from_millis(20), stalled).await.unwrap_err();
        assert!(matches!(err, Error::StoreTimeout));

        let quick = bounded(Duration::from_millis(20), async { Ok(7) }).await;
        assert_eq!(quick.unwrap(), 7);
    }
}
