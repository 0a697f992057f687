use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::Error;

pub const LBS_PER_KG: f64 = 2.20462;

/// Unit attached to a single snapshot. There is no user-wide unit setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }

    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value / LBS_PER_KG,
        }
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(WeightUnit::Kg),
            "lbs" => Ok(WeightUnit::Lbs),
            other => Err(Error::Validation(format!("unknown weight unit {other:?}"))),
        }
    }
}

/// Raw `weight_snapshot` row.
#[derive(Debug, FromRow)]
pub struct WeightSnapshotRow {
    pub weight_snapshot_id: Uuid,
    pub user_id: String,
    pub weight_value: f64,
    pub weight_unit_hint: String,
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSnapshot {
    pub weight_snapshot_id: Uuid,
    pub user_id: String,
    pub weight_value: f64,
    pub weight_unit_hint: WeightUnit,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl TryFrom<WeightSnapshotRow> for WeightSnapshot {
    type Error = Error;

    fn try_from(r: WeightSnapshotRow) -> Result<Self, Self::Error> {
        Ok(Self {
            weight_snapshot_id: r.weight_snapshot_id,
            user_id: r.user_id,
            weight_value: r.weight_value,
            weight_unit_hint: r.weight_unit_hint.parse()?,
            recorded_at: r.recorded_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewWeight {
    pub value: f64,
    pub unit: WeightUnit,
    pub recorded_at: Option<OffsetDateTime>,
}
