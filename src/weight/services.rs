use tracing::info;

use crate::error::{Error, Result};
use crate::state::AppState;
use crate::weight::repo_types::{NewWeight, WeightSnapshot, WeightUnit};
use time::OffsetDateTime;

pub const MAX_WEIGHT_VALUE: f64 = 500.0;

/// Checks the weight write contract: positive, bounded, at most two decimals.
pub fn validate_weight(
    value: f64,
    unit: WeightUnit,
    recorded_at: Option<OffsetDateTime>,
) -> Result<NewWeight> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation("weight must be greater than 0".into()));
    }
    if value > MAX_WEIGHT_VALUE {
        return Err(Error::Validation(format!(
            "weight must be at most {MAX_WEIGHT_VALUE}"
        )));
    }
    let hundredths = value * 100.0;
    if (hundredths - hundredths.round()).abs() > 1e-6 {
        return Err(Error::Validation(
            "weight can have at most 2 decimal places".into(),
        ));
    }
    Ok(NewWeight {
        value,
        unit,
        recorded_at,
    })
}

pub async fn log_weight(st: &AppState, user_id: &str, weight: NewWeight) -> Result<WeightSnapshot> {
    let snapshot = st.store.insert_weight(user_id, weight).await?;
    info!(
        %user_id,
        weight_id = %snapshot.weight_snapshot_id,
        unit = snapshot.weight_unit_hint.as_str(),
        "weight logged"
    );
    Ok(snapshot)
}
