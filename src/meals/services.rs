use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::meals::dto::CaloriesSource;
use crate::meals::repo_types::{MealEntry, MealType, NewMeal};
use crate::state::AppState;
use crate::timezone::Timezone;
use time::OffsetDateTime;

pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_CALORIES: i32 = 10_000;

/// Validated meal write, before calorie enrichment.
#[derive(Debug, Clone)]
pub struct MealDraft {
    pub meal_type: MealType,
    pub description: String,
    pub calories: Option<i32>,
    pub consumed_at: Option<OffsetDateTime>,
}

impl MealDraft {
    pub fn new(
        meal_type: MealType,
        description: &str,
        calories: Option<i32>,
        consumed_at: Option<OffsetDateTime>,
    ) -> Result<Self> {
        let description = description.trim();
        let chars = description.chars().count();
        if chars == 0 {
            return Err(Error::Validation("meal description is required".into()));
        }
        if chars > MAX_DESCRIPTION_CHARS {
            return Err(Error::Validation(format!(
                "description must be {MAX_DESCRIPTION_CHARS} characters or less"
            )));
        }
        if let Some(kcal) = calories {
            if !(0..=MAX_CALORIES).contains(&kcal) {
                return Err(Error::Validation(format!(
                    "calories must be between 0 and {MAX_CALORIES}"
                )));
            }
        }
        Ok(Self {
            meal_type,
            description: description.to_string(),
            calories,
            consumed_at,
        })
    }
}

/// Stores a meal, estimating calories first when none were given.
///
/// Estimation is best-effort: on failure the meal is stored without calories.
pub async fn log_meal(
    st: &AppState,
    user_id: &str,
    draft: MealDraft,
    tz: Timezone,
) -> Result<(MealEntry, Option<CaloriesSource>)> {
    let (calories, source) = match draft.calories {
        Some(kcal) => (Some(kcal), Some(CaloriesSource::Manual)),
        None => match st.coach.estimate_calories(&draft.description).await {
            Ok(kcal) => {
                info!(%user_id, kcal, "calories estimated");
                (Some(kcal), Some(CaloriesSource::Estimated))
            }
            Err(e) => {
                warn!(error = %e, %user_id, "calorie estimation failed, storing without calories");
                (None, None)
            }
        },
    };

    let meal = NewMeal {
        meal_type: draft.meal_type,
        description: draft.description,
        calories,
        consumed_at: draft.consumed_at,
    };
    let entry = st.store.insert_meal(user_id, meal, tz).await?;
    info!(%user_id, meal_id = %entry.meal_entry_id, tz = %tz, "meal logged");
    Ok((entry, source))
}
