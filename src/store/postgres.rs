use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;

use super::EventStore;
use crate::error::Result;
use crate::meals::repo_types::{MealEntry, MealEntryRow, NewMeal};
use crate::streak::StreakCounter;
use crate::timezone::Timezone;
use crate::weight::repo_types::{NewWeight, WeightSnapshot, WeightSnapshotRow};

#[derive(Clone)]
pub struct PgEventStore {
    db: PgPool,
}

impl PgEventStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert_meal(&self, user_id: &str, meal: NewMeal, tz: Timezone) -> Result<MealEntry> {
        let now = OffsetDateTime::now_utc();
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, MealEntryRow>(
            r#"
            INSERT INTO meal_entry (user_id, meal_type, description_text, calories_value, consumed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING meal_entry_id, user_id, meal_type, description_text, calories_value, consumed_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(meal.meal_type.as_str())
        .bind(&meal.description)
        .bind(meal.calories)
        .bind(meal.consumed_at.unwrap_or(now))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        let entry = MealEntry::try_from(row)?;

        // Make sure the counter row exists, then lock it so concurrent inserts
        // for the same user apply one after another.
        sqlx::query(
            r#"
            INSERT INTO streak_counter (user_id, current_streak_days, last_logged_date)
            VALUES ($1, 0, NULL)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let counter = sqlx::query_as::<_, StreakCounter>(
            r#"
            SELECT current_streak_days, last_logged_date
              FROM streak_counter
             WHERE user_id = $1
               FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let day = tz.date_of(entry.consumed_at);
        let next = counter.record(day);
        if next != counter {
            sqlx::query(
                r#"
                UPDATE streak_counter
                   SET current_streak_days = $2, last_logged_date = $3, updated_at = now()
                 WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .bind(next.current_streak_days)
            .bind(next.last_logged_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(%user_id, meal_id = %entry.meal_entry_id, streak = next.current_streak_days, "meal inserted");
        Ok(entry)
    }

    async fn list_meals(&self, user_id: &str) -> Result<Vec<MealEntry>> {
        let rows = sqlx::query_as::<_, MealEntryRow>(
            r#"
            SELECT meal_entry_id, user_id, meal_type, description_text, calories_value, consumed_at, created_at
              FROM meal_entry
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(MealEntry::try_from).collect()
    }

    async fn insert_weight(&self, user_id: &str, weight: NewWeight) -> Result<WeightSnapshot> {
        let row = sqlx::query_as::<_, WeightSnapshotRow>(
            r#"
            INSERT INTO weight_snapshot (user_id, weight_value, weight_unit_hint, recorded_at)
            VALUES ($1, $2, $3, $4)
            RETURNING weight_snapshot_id, user_id, weight_value, weight_unit_hint, recorded_at
            "#,
        )
        .bind(user_id)
        .bind(weight.value)
        .bind(weight.unit.as_str())
        .bind(weight.recorded_at.unwrap_or_else(OffsetDateTime::now_utc))
        .fetch_one(&self.db)
        .await?;
        WeightSnapshot::try_from(row)
    }

    async fn list_weights(&self, user_id: &str) -> Result<Vec<WeightSnapshot>> {
        let rows = sqlx::query_as::<_, WeightSnapshotRow>(
            r#"
            SELECT weight_snapshot_id, user_id, weight_value, weight_unit_hint, recorded_at
              FROM weight_snapshot
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(WeightSnapshot::try_from).collect()
    }

    async fn streak_counter(&self, user_id: &str) -> Result<Option<StreakCounter>> {
        let counter = sqlx::query_as::<_, StreakCounter>(
            r#"
            SELECT current_streak_days, last_logged_date
              FROM streak_counter
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(counter)
    }
}
