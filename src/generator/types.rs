//! Type-based fallback generators.
//!
//! Used when no name-based rule claims a column. Ranges, windows, formats
//! and word counts come from `data_types` in the configuration.

use crate::config::{CountRange, DataTypeOptions, TimeWindow};
use crate::schema::{ColumnDefinition, ColumnType, Value};
use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, Months, NaiveDateTime};
use fake::faker::lorem::en::{Paragraphs, Words};
use fake::Fake;
use rand::Rng;

pub const DEFAULT_WINDOW_FROM: &str = "-6 months";
pub const DEFAULT_WINDOW_TO: &str = "+6 months";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_MIN_COUNT: usize = 1;
pub const DEFAULT_MAX_COUNT: usize = 3;

/// Unit of a relative time offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Point in time relative to "now": `now`, `today`, `-6 months`, `+30 days`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeTime {
    Now,
    /// Midnight of the current day
    Today,
    Offset { amount: i64, unit: TimeUnit },
}

impl std::str::FromStr for RelativeTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        match trimmed.as_str() {
            "now" => return Ok(RelativeTime::Now),
            "today" => return Ok(RelativeTime::Today),
            _ => {}
        }

        let invalid = || {
            format!(
                "Invalid relative time: '{}'. Use now, today or [+|-]N unit (e.g. -6 months)",
                s
            )
        };

        let mut parts = trimmed.split_whitespace();
        let amount: i64 = parts
            .next()
            .and_then(|n| n.strip_prefix('+').unwrap_or(n).parse().ok())
            .ok_or_else(invalid)?;
        let unit = match parts.next().map(|u| u.trim_end_matches('s')) {
            Some("second" | "sec") => TimeUnit::Second,
            Some("minute" | "min") => TimeUnit::Minute,
            Some("hour") => TimeUnit::Hour,
            Some("day") => TimeUnit::Day,
            Some("week") => TimeUnit::Week,
            Some("month") => TimeUnit::Month,
            Some("year") => TimeUnit::Year,
            _ => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(RelativeTime::Offset { amount, unit })
    }
}

impl RelativeTime {
    /// Resolve against `now`; out-of-range offsets clamp to `now`
    pub fn resolve(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            RelativeTime::Now => now,
            RelativeTime::Today => now.date().and_hms_opt(0, 0, 0).unwrap_or(now),
            RelativeTime::Offset { amount, unit } => {
                let delta = match unit {
                    TimeUnit::Second => Duration::try_seconds(amount),
                    TimeUnit::Minute => Duration::try_minutes(amount),
                    TimeUnit::Hour => Duration::try_hours(amount),
                    TimeUnit::Day => Duration::try_days(amount),
                    TimeUnit::Week => Duration::try_weeks(amount),
                    TimeUnit::Month | TimeUnit::Year => {
                        let months = if unit == TimeUnit::Year {
                            amount.saturating_mul(12)
                        } else {
                            amount
                        };
                        let magnitude =
                            Months::new(u32::try_from(months.unsigned_abs()).unwrap_or(u32::MAX));
                        let shifted = if months >= 0 {
                            now.checked_add_months(magnitude)
                        } else {
                            now.checked_sub_months(magnitude)
                        };
                        return shifted.unwrap_or(now);
                    }
                };
                delta
                    .and_then(|d| now.checked_add_signed(d))
                    .unwrap_or(now)
            }
        }
    }
}

/// Reject strftime strings chrono cannot render
pub fn validate_format(format: &str) -> Result<(), String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("Invalid date format: '{}'", format));
    }
    Ok(())
}

/// Random instant in `window`, formatted with the window's format
fn random_in_window<R: Rng + ?Sized>(
    window: &TimeWindow,
    default_format: &str,
    now: NaiveDateTime,
    rng: &mut R,
) -> Value {
    let resolve = |expr: &Option<String>, default: &str| {
        expr.as_deref()
            .unwrap_or(default)
            .parse::<RelativeTime>()
            .map(|t| t.resolve(now))
            .unwrap_or(now)
    };

    let mut from = resolve(&window.from, DEFAULT_WINDOW_FROM).and_utc().timestamp();
    let mut to = resolve(&window.to, DEFAULT_WINDOW_TO).and_utc().timestamp();
    if from > to {
        std::mem::swap(&mut from, &mut to);
    }

    let picked = chrono::DateTime::from_timestamp(rng.random_range(from..=to), 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or(now);

    let format = window.format.as_deref().unwrap_or(default_format);
    Value::Text(picked.format(format).to_string())
}

/// Pick a count from a configured range (defaults 1..=3)
fn pick_count<R: Rng + ?Sized>(range: &CountRange, rng: &mut R) -> usize {
    let min = range.min.unwrap_or(DEFAULT_MIN_COUNT).max(1);
    let max = range.max.unwrap_or(DEFAULT_MAX_COUNT.max(min)).max(min);
    rng.random_range(min..=max)
}

/// Generate a value from the column's declared type.
///
/// Returns `None` for types without a generator; the caller records the
/// warning and stores NULL.
pub fn generate_for_type<R: Rng + ?Sized>(
    column: &ColumnDefinition,
    options: &DataTypeOptions,
    now: NaiveDateTime,
    rng: &mut R,
) -> Option<Value> {
    let value = match &column.data_type {
        ColumnType::BigInt => {
            // Configured ranges are clamped to what the column can store
            let (floor, ceiling) = column.int_bounds();
            let default_min = if column.unsigned { 1 } else { floor };
            let min = options.bigint.min.unwrap_or(default_min).clamp(floor, ceiling);
            let max = options
                .bigint
                .max
                .unwrap_or(ceiling)
                .clamp(floor, ceiling)
                .max(min);
            Value::Int(rng.random_range(min..=max))
        }
        ColumnType::Boolean => Value::Bool(rng.random_bool(0.5)),
        ColumnType::Date => random_in_window(&options.date, DEFAULT_DATE_FORMAT, now, rng),
        ColumnType::DateTime => {
            random_in_window(&options.datetime, DEFAULT_DATETIME_FORMAT, now, rng)
        }
        ColumnType::String => {
            let count = pick_count(&options.string, rng);
            let words: Vec<String> = Words(count..count + 1).fake_with_rng(rng);
            Value::Text(words.join(" "))
        }
        ColumnType::Text => {
            let count = pick_count(&options.text, rng);
            let paragraphs: Vec<String> = Paragraphs(count..count + 1).fake_with_rng(rng);
            Value::Text(paragraphs.join("\n\n"))
        }
        ColumnType::Other(_) => return None,
    };
    Some(value)
}
