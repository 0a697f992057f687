use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::error::{Error, Result};
use crate::meals::repo_types::MealEntry;
use crate::timezone::Timezone;

pub const MAX_SUMMARY_DAYS: usize = 365;

/// Meals of one local calendar day, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    #[serde(with = "crate::timezone::calendar_date")]
    pub date: Date,
    pub meal_count: u32,
    pub total_calories: i64,
    pub is_today: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodaysTotals {
    pub calories_today: i64,
    pub entries_today: u32,
}

/// Summary limits outside `1..=365` are rejected, never clamped.
pub fn check_limit(limit: usize) -> Result<()> {
    if !(1..=MAX_SUMMARY_DAYS).contains(&limit) {
        return Err(Error::Validation(format!(
            "limit must be between 1 and {MAX_SUMMARY_DAYS}, got {limit}"
        )));
    }
    Ok(())
}

/// Buckets meals by local date, newest date first, at most `limit` days.
pub fn summarize(meals: &[MealEntry], tz: Timezone, limit: usize) -> Result<Vec<DailySummary>> {
    summarize_on(meals, tz, limit, OffsetDateTime::now_utc())
}

/// [`summarize`] as observed at instant `now`.
pub fn summarize_on(
    meals: &[MealEntry],
    tz: Timezone,
    limit: usize,
    now: OffsetDateTime,
) -> Result<Vec<DailySummary>> {
    check_limit(limit)?;

    let mut days: BTreeMap<Date, (u32, i64)> = BTreeMap::new();
    for meal in meals {
        let bucket = days.entry(tz.date_of(meal.consumed_at)).or_default();
        bucket.0 += 1;
        bucket.1 += i64::from(meal.calories_value.unwrap_or(0));
    }

    Ok(days
        .into_iter()
        .rev()
        .take(limit)
        .map(|(date, (meal_count, total_calories))| DailySummary {
            date,
            meal_count,
            total_calories,
            is_today: tz.is_today_at(date, now),
        })
        .collect())
}

/// Calories and entry count for today; the dashboard's hot path.
pub fn todays_totals(meals: &[MealEntry], tz: Timezone) -> TodaysTotals {
    todays_totals_on(meals, tz, tz.today())
}

pub fn todays_totals_on(meals: &[MealEntry], tz: Timezone, today: Date) -> TodaysTotals {
    meals
        .iter()
        .filter(|m| tz.date_of(m.consumed_at) == today)
        .fold(TodaysTotals::default(), |acc, m| TodaysTotals {
            calories_today: acc.calories_today + i64::from(m.calories_value.unwrap_or(0)),
            entries_today: acc.entries_today + 1,
        })
}

/// Meals eaten on local `date`, most recent first.
pub fn meals_on(meals: Vec<MealEntry>, tz: Timezone, date: Date) -> Vec<MealEntry> {
    let mut day: Vec<MealEntry> = meals
        .into_iter()
        .filter(|m| tz.date_of(m.consumed_at) == date)
        .collect();
    day.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
    day
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::MealType;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn meal(at: OffsetDateTime, calories: Option<i32>) -> MealEntry {
        MealEntry {
            meal_entry_id: Uuid::new_v4(),
            user_id: "u".into(),
            meal_type: MealType::Dinner,
            description_text: "soup".into(),
            calories_value: calories,
            consumed_at: at,
            created_at: at,
        }
    }

    fn paris() -> Timezone {
        Timezone::parse("Europe/Paris").unwrap()
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        assert!(summarize(&[], Timezone::UTC, 30).unwrap().is_empty());
        assert_eq!(todays_totals(&[], Timezone::UTC), TodaysTotals::default());
    }

    #[test]
    fn limit_out_of_range_is_rejected() {
        for limit in [0, 366, 1000] {
            assert!(matches!(
                summarize(&[], Timezone::UTC, limit),
                Err(Error::Validation(_))
            ));
        }
        assert!(summarize(&[], Timezone::UTC, 1).is_ok());
        assert!(summarize(&[], Timezone::UTC, 365).is_ok());
    }

    #[test]
    fn groups_by_local_date_newest_first() {
        let meals = vec![
            meal(datetime!(2025-01-15 08:00 UTC), Some(300)),
            // 23:30 UTC is Jan 16 in Paris
            meal(datetime!(2025-01-15 23:30 UTC), Some(500)),
            meal(datetime!(2025-01-16 12:00 UTC), None),
            meal(datetime!(2025-01-14 12:00 UTC), Some(700)),
        ];
        let out = summarize_on(&meals, paris(), 30, datetime!(2025-01-16 12:00 UTC)).unwrap();
        assert_eq!(
            out,
            vec![
                DailySummary {
                    date: date!(2025 - 01 - 16),
                    meal_count: 2,
                    total_calories: 500,
                    is_today: true,
                },
                DailySummary {
                    date: date!(2025 - 01 - 15),
                    meal_count: 1,
                    total_calories: 300,
                    is_today: false,
                },
                DailySummary {
                    date: date!(2025 - 01 - 14),
                    meal_count: 1,
                    total_calories: 700,
                    is_today: false,
                },
            ]
        );

        let utc = summarize_on(&meals, Timezone::UTC, 30, datetime!(2025-01-16 12:00 UTC)).unwrap();
        assert_eq!(utc[1].date, date!(2025 - 01 - 15));
        assert_eq!(utc[1].meal_count, 2);
    }

    #[test]
    fn is_today_follows_the_local_calendar() {
        let meals = vec![meal(datetime!(2025-01-15 23:30 UTC), Some(500))];
        // 23:45 UTC on the 15th is already the 16th in Paris
        let now = datetime!(2025-01-15 23:45 UTC);
        let paris_rows = summarize_on(&meals, paris(), 30, now).unwrap();
        assert_eq!(paris_rows[0].date, date!(2025 - 01 - 16));
        assert!(paris_rows[0].is_today);
        let utc_rows = summarize_on(&meals, Timezone::UTC, 30, now).unwrap();
        assert_eq!(utc_rows[0].date, date!(2025 - 01 - 15));
        assert!(utc_rows[0].is_today);
        let next_morning = summarize_on(&meals, Timezone::UTC, 30, datetime!(2025-01-16 00:00 UTC)).unwrap();
        assert!(!next_morning[0].is_today);
    }

    #[test]
    fn truncates_to_limit() {
        let meals: Vec<_> = (1..=10)
            .map(|d| meal(datetime!(2025-03-01 12:00 UTC) + time::Duration::days(d), Some(100)))
            .collect();
        let out = summarize_on(&meals, Timezone::UTC, 3, datetime!(2025-03-11 12:00 UTC)).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].date, date!(2025 - 03 - 11));
        assert!(out[0].is_today);
        assert_eq!(out[2].date, date!(2025 - 03 - 09));
    }

    #[test]
    fn null_calories_count_as_entries() {
        let meals = vec![
            meal(datetime!(2025-06-02 07:00 UTC), None),
            meal(datetime!(2025-06-02 12:00 UTC), Some(650)),
            meal(datetime!(2025-06-01 12:00 UTC), Some(900)),
        ];
        let totals = todays_totals_on(&meals, Timezone::UTC, date!(2025 - 06 - 02));
        assert_eq!(
            totals,
            TodaysTotals {
                calories_today: 650,
                entries_today: 2
            }
        );
        assert_eq!(
            todays_totals_on(&meals, Timezone::UTC, date!(2025 - 06 - 03)),
            TodaysTotals::default()
        );
    }

    #[test]
    fn fast_path_agrees_with_summary() {
        let meals = vec![
            meal(datetime!(2025-06-01 22:30 UTC), Some(200)),
            meal(datetime!(2025-06-02 21:00 UTC), Some(400)),
            meal(datetime!(2025-06-02 23:00 UTC), Some(800)),
        ];
        let tz = Timezone::parse("Asia/Kolkata").unwrap();
        let now = datetime!(2025-06-03 06:00 UTC);
        let totals = todays_totals_on(&meals, tz, tz.date_of(now));
        let summary = summarize_on(&meals, tz, 30, now).unwrap();
        let today_row = summary.iter().find(|s| s.is_today).unwrap();
        assert_eq!(totals.entries_today, today_row.meal_count);
        assert_eq!(totals.calories_today, today_row.total_calories);
    }

    #[test]
    fn meals_on_filters_and_orders() {
        let meals = vec![
            meal(datetime!(2025-06-02 07:00 UTC), Some(1)),
            meal(datetime!(2025-06-02 19:00 UTC), Some(2)),
            meal(datetime!(2025-06-01 19:00 UTC), Some(3)),
        ];
        let day = meals_on(meals, Timezone::UTC, date!(2025 - 06 - 02));
        let cals: Vec<_> = day.iter().map(|m| m.calories_value).collect();
        assert_eq!(cals, vec![Some(2), Some(1)]);
    }
}
