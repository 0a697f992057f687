use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Duration};

use crate::timezone::Timezone;
use crate::weight::repo_types::{WeightSnapshot, WeightUnit};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;
const CHANGE_EPSILON_KG: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTrendPoint {
    #[serde(with = "crate::timezone::calendar_date")]
    pub date: Date,
    pub weight_kg: f64,
    pub original_value: f64,
    pub original_unit: WeightUnit,
}

/// What the trend says, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendSummary {
    NoData {
        message: String,
    },
    SinglePoint {
        #[serde(with = "crate::timezone::calendar_date")]
        date: Date,
        weight_kg: f64,
        message: String,
    },
    Change {
        delta_kg: f64,
        span_days: i64,
        message: String,
    },
}

/// One point per local date over the trailing `window_days` ending today,
/// oldest first. Days without a snapshot are skipped.
pub fn weight_trend(weights: &[WeightSnapshot], tz: Timezone, window_days: u32) -> Vec<WeightTrendPoint> {
    weight_trend_on(weights, tz, window_days, tz.today())
}

pub fn weight_trend_on(
    weights: &[WeightSnapshot],
    tz: Timezone,
    window_days: u32,
    today: Date,
) -> Vec<WeightTrendPoint> {
    if window_days == 0 {
        return Vec::new();
    }
    let first_day = today - Duration::days(i64::from(window_days) - 1);

    let mut latest: BTreeMap<Date, &WeightSnapshot> = BTreeMap::new();
    for snapshot in weights {
        let date = tz.date_of(snapshot.recorded_at);
        if date < first_day || date > today {
            continue;
        }
        latest
            .entry(date)
            .and_modify(|kept| {
                if snapshot.recorded_at > kept.recorded_at {
                    *kept = snapshot;
                }
            })
            .or_insert(snapshot);
    }

    latest
        .into_iter()
        .map(|(date, s)| WeightTrendPoint {
            date,
            weight_kg: s.weight_unit_hint.to_kg(s.weight_value),
            original_value: s.weight_value,
            original_unit: s.weight_unit_hint,
        })
        .collect()
}

/// Newest minus oldest weight in kg; `None` below two points.
pub fn delta(points: &[WeightTrendPoint]) -> Option<f64> {
    let (first, last) = endpoints(points)?;
    Some(last.weight_kg - first.weight_kg)
}

fn endpoints(points: &[WeightTrendPoint]) -> Option<(&WeightTrendPoint, &WeightTrendPoint)> {
    if points.len() < 2 {
        return None;
    }
    let first = points.iter().min_by_key(|p| p.date)?;
    let last = points.iter().max_by_key(|p| p.date)?;
    Some((first, last))
}

pub fn summarize_trend(points: &[WeightTrendPoint]) -> TrendSummary {
    if let Some((first, last)) = endpoints(points) {
        let delta_kg = last.weight_kg - first.weight_kg;
        let span_days = (last.date - first.date).whole_days();
        let days = format!("{span_days} day{}", if span_days == 1 { "" } else { "s" });
        // below display precision (0.1 kg) there is no direction to report
        let message = if delta_kg.abs() < CHANGE_EPSILON_KG {
            format!("unchanged over {days}")
        } else {
            let direction = if delta_kg < 0.0 { "down" } else { "up" };
            format!("{direction} {:.1} kg over {days}", delta_kg.abs())
        };
        return TrendSummary::Change {
            delta_kg,
            span_days,
            message,
        };
    }

    match points.first() {
        None => TrendSummary::NoData {
            message: "No weight logged yet".into(),
        },
        Some(only) => TrendSummary::SinglePoint {
            date: only.date,
            weight_kg: only.weight_kg,
            message: format!(
                "{:.1} kg logged; log again on another day to see a trend",
                only.weight_kg
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn snap(at: OffsetDateTime, value: f64, unit: WeightUnit) -> WeightSnapshot {
        WeightSnapshot {
            weight_snapshot_id: Uuid::new_v4(),
            user_id: "u".into(),
            weight_value: value,
            weight_unit_hint: unit,
            recorded_at: at,
        }
    }

    const TODAY: Date = date!(2025 - 06 - 07);

    #[test]
    fn empty_trend_has_no_delta() {
        let points = weight_trend(&[], Timezone::UTC, DEFAULT_WINDOW_DAYS);
        assert!(points.is_empty());
        assert_eq!(delta(&points), None);
        assert!(matches!(summarize_trend(&points), TrendSummary::NoData { .. }));
    }

    #[test]
    fn latest_snapshot_of_the_day_wins() {
        let weights = vec![
            snap(datetime!(2025-06-05 20:00 UTC), 81.0, WeightUnit::Kg),
            snap(datetime!(2025-06-05 07:00 UTC), 82.0, WeightUnit::Kg),
        ];
        let points = weight_trend_on(&weights, Timezone::UTC, 7, TODAY);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].weight_kg, 81.0);
    }

    #[test]
    fn pounds_are_normalized_and_originals_kept() {
        let weights = vec![snap(datetime!(2025-06-06 08:00 UTC), 154.3, WeightUnit::Lbs)];
        let points = weight_trend_on(&weights, Timezone::UTC, 7, TODAY);
        assert!((points[0].weight_kg - 70.0).abs() < 0.1);
        assert_eq!(points[0].original_value, 154.3);
        assert_eq!(points[0].original_unit, WeightUnit::Lbs);
        assert_eq!(
            serde_json::to_value(&points[0]).unwrap()["original_unit"],
            "lbs"
        );
    }

    #[test]
    fn window_is_trailing_seven_local_days() {
        let weights = vec![
            snap(datetime!(2025-05-31 12:00 UTC), 90.0, WeightUnit::Kg), // too old
            snap(datetime!(2025-06-01 12:00 UTC), 80.0, WeightUnit::Kg),
            snap(datetime!(2025-06-04 12:00 UTC), 79.5, WeightUnit::Kg),
            snap(datetime!(2025-06-07 12:00 UTC), 78.8, WeightUnit::Kg),
            snap(datetime!(2025-06-08 12:00 UTC), 60.0, WeightUnit::Kg), // future
        ];
        let points = weight_trend_on(&weights, Timezone::UTC, 7, TODAY);
        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date!(2025 - 06 - 01), date!(2025 - 06 - 04), date!(2025 - 06 - 07)]
        );
        let d = delta(&points).unwrap();
        assert!((d - (-1.2)).abs() < 1e-9);
        match summarize_trend(&points) {
            TrendSummary::Change { span_days, message, .. } => {
                assert_eq!(span_days, 6);
                assert_eq!(message, "down 1.2 kg over 6 days");
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn window_uses_local_dates() {
        // 2025-05-31 23:00 UTC is already June 1 in Paris
        let weights = vec![snap(datetime!(2025-05-31 23:00 UTC), 80.0, WeightUnit::Kg)];
        let paris = Timezone::parse("Europe/Paris").unwrap();
        assert_eq!(weight_trend_on(&weights, paris, 7, TODAY).len(), 1);
        assert!(weight_trend_on(&weights, Timezone::UTC, 7, TODAY).is_empty());
    }

    #[test]
    fn single_point_has_no_delta_but_a_reason() {
        let weights = vec![snap(datetime!(2025-06-07 06:00 UTC), 72.0, WeightUnit::Kg)];
        let points = weight_trend_on(&weights, Timezone::UTC, 7, TODAY);
        assert_eq!(delta(&points), None);
        match summarize_trend(&points) {
            TrendSummary::SinglePoint { weight_kg, message, .. } => {
                assert_eq!(weight_kg, 72.0);
                assert!(message.contains("another day"));
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn delta_sorts_by_date_and_keeps_sign() {
        let p = |date, kg| WeightTrendPoint {
            date,
            weight_kg: kg,
            original_value: kg,
            original_unit: WeightUnit::Kg,
        };
        let unordered = vec![p(date!(2025 - 06 - 07), 81.0), p(date!(2025 - 06 - 02), 80.0)];
        assert!((delta(&unordered).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sub_display_changes_read_as_unchanged() {
        let weights = vec![
            snap(datetime!(2025-06-05 08:00 UTC), 80.03, WeightUnit::Kg),
            snap(datetime!(2025-06-07 08:00 UTC), 80.0, WeightUnit::Kg),
        ];
        let points = weight_trend_on(&weights, Timezone::UTC, 7, TODAY);
        match summarize_trend(&points) {
            TrendSummary::Change { delta_kg, message, .. } => {
                assert!(delta_kg < 0.0);
                assert_eq!(message, "unchanged over 2 days");
            }
            other => panic!("unexpected summary {other:?}"),
        }

        let weights = vec![
            snap(datetime!(2025-06-06 08:00 UTC), 80.0, WeightUnit::Kg),
            snap(datetime!(2025-06-07 08:00 UTC), 80.1, WeightUnit::Kg),
        ];
        let points = weight_trend_on(&weights, Timezone::UTC, 7, TODAY);
        match summarize_trend(&points) {
            TrendSummary::Change { message, .. } => assert_eq!(message, "up 0.1 kg over 1 day"),
            other => panic!("unexpected summary {other:?}"),
        }
    }
}
