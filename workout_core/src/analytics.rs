//! Performance analytics over the history log.
//!
//! Reads the full log (hidden entries included, they are still real
//! training) and averages recorded weights per bucket:
//! - `week-days`: each day of one week-of-month
//! - `month-days`: each day of one month
//! - `month-weeks`: weeks 1-4 of one month, week 4 absorbing days 22-31
//! - `year-months`: each month of one year
//! - `years`: each year

use crate::{Error, HistoryEntry, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    WeekDays,
    MonthDays,
    MonthWeeks,
    YearMonths,
    Years,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::WeekDays => "week-days",
            Granularity::MonthDays => "month-days",
            Granularity::MonthWeeks => "month-weeks",
            Granularity::YearMonths => "year-months",
            Granularity::Years => "years",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "week-days" => Ok(Granularity::WeekDays),
            "month-days" => Ok(Granularity::MonthDays),
            "month-weeks" => Ok(Granularity::MonthWeeks),
            "year-months" => Ok(Granularity::YearMonths),
            "years" => Ok(Granularity::Years),
            other => Err(Error::Validation(format!("unknown granularity '{}'", other))),
        }
    }
}

/// Which month/year (and week-of-month) the user is looking at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavContext {
    pub year: i32,
    pub month: u32,
    /// 1-4, only read by `week-days`
    pub week: u32,
}

impl NavContext {
    pub fn new(year: i32, month: u32, week: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(format!("month must be 1-12 (got {})", month)));
        }
        if !(1..=4).contains(&week) {
            return Err(Error::Validation(format!("week must be 1-4 (got {})", week)));
        }
        check_year(year)?;
        Ok(Self { year, month, week })
    }

    /// Context containing `date`
    pub fn around(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            week: week_of_month(date.day()),
        }
    }
}

/// Week bucket of a day of month; days 22 onwards fall in week 4
pub fn week_of_month(day: u32) -> u32 {
    ((day.saturating_sub(1)) / 7 + 1).min(4)
}

/// Years a calendar date can be built for, with room for the window before
fn check_year(year: i32) -> Result<()> {
    let supported = NaiveDate::MIN.year() + 1..NaiveDate::MAX.year();
    if !supported.contains(&year) {
        return Err(Error::Validation(format!("year {} is out of range", year)));
    }
    Ok(())
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
}

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ============================================================================
// Windows
// ============================================================================

/// A span of calendar time used for filtering and comparison
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Window {
    Week { year: i32, month: u32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl Window {
    fn current(granularity: Granularity, nav: &NavContext) -> Self {
        match granularity {
            Granularity::WeekDays => Window::Week {
                year: nav.year,
                month: nav.month,
                week: nav.week,
            },
            Granularity::MonthDays | Granularity::MonthWeeks => Window::Month {
                year: nav.year,
                month: nav.month,
            },
            Granularity::YearMonths | Granularity::Years => Window::Year { year: nav.year },
        }
    }

    fn previous(self) -> Self {
        let prev_month = |year: i32, month: u32| {
            if month == 1 {
                (year.saturating_sub(1), 12)
            } else {
                (year, month - 1)
            }
        };
        match self {
            Window::Week { year, month, week } if week > 1 => Window::Week {
                year,
                month,
                week: week - 1,
            },
            Window::Week { year, month, .. } => {
                let (year, month) = prev_month(year, month);
                Window::Week { year, month, week: 4 }
            }
            Window::Month { year, month } => {
                let (year, month) = prev_month(year, month);
                Window::Month { year, month }
            }
            Window::Year { year } => Window::Year {
                year: year.saturating_sub(1),
            },
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Window::Week { year, month, week } => {
                date.year() == year && date.month() == month && week_of_month(date.day()) == week
            }
            Window::Month { year, month } => date.year() == year && date.month() == month,
            Window::Year { year } => date.year() == year,
        }
    }
}

/// Whether a date belongs in the series for this view
fn in_scope(granularity: Granularity, nav: &NavContext, date: NaiveDate) -> bool {
    match granularity {
        Granularity::Years => true,
        _ => Window::current(granularity, nav).contains(date),
    }
}

// ============================================================================
// Series
// ============================================================================

/// Averaged value for one aggregation unit
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub full_date: String,
    pub value: f64,
    pub samples: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub latest: Option<f64>,
    pub earliest: Option<f64>,
    pub change_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    pub current_average: f64,
    pub previous_average: f64,
    /// The previous window had nothing to compare against
    pub no_data: bool,
    pub percent: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub exercise: String,
    pub granularity: Granularity,
    pub series: Vec<Bucket>,
    pub metrics: Metrics,
    pub comparison: Comparison,
}

/// Every (date, weight) recorded for an exercise, any visibility
fn samples<'a>(history: &'a [HistoryEntry], exercise: &'a str) -> impl Iterator<Item = (NaiveDate, f64)> + 'a {
    history
        .iter()
        .filter_map(move |e| e.weight_for(exercise).map(|w| (e.date, w)))
}

fn bucket_key(granularity: Granularity, date: NaiveDate) -> (i32, u32, u32) {
    match granularity {
        Granularity::WeekDays | Granularity::MonthDays => (date.year(), date.month(), date.day()),
        Granularity::MonthWeeks => (date.year(), date.month(), week_of_month(date.day())),
        Granularity::YearMonths => (date.year(), date.month(), 0),
        Granularity::Years => (date.year(), 0, 0),
    }
}

fn bucket_labels(granularity: Granularity, key: (i32, u32, u32)) -> (String, String) {
    let (year, month, sub) = key;
    let day_string = |day: u32| format!("{:02}/{:02}/{}", day, month, year);
    match granularity {
        Granularity::WeekDays => {
            let label = NaiveDate::from_ymd_opt(year, month, sub)
                .map(|d| d.weekday().to_string())
                .unwrap_or_default();
            (label, day_string(sub))
        }
        Granularity::MonthDays => (sub.to_string(), day_string(sub)),
        Granularity::MonthWeeks => {
            let first = (sub - 1) * 7 + 1;
            let last = if sub == 4 {
                days_in_month(year, month).unwrap_or(31)
            } else {
                sub * 7
            };
            (
                format!("W{}", sub),
                format!("{} - {}", day_string(first), day_string(last)),
            )
        }
        Granularity::YearMonths => (
            MONTH_ABBR[(month as usize).saturating_sub(1) % 12].to_string(),
            format!("{:02}/{}", month, year),
        ),
        Granularity::Years => (year.to_string(), year.to_string()),
    }
}

/// Mean weight per bucket, oldest first
pub fn series(
    history: &[HistoryEntry],
    exercise: &str,
    granularity: Granularity,
    nav: &NavContext,
) -> Vec<Bucket> {
    let mut buckets: BTreeMap<(i32, u32, u32), (f64, usize)> = BTreeMap::new();
    for (date, weight) in samples(history, exercise).filter(|(d, _)| in_scope(granularity, nav, *d)) {
        let slot = buckets.entry(bucket_key(granularity, date)).or_insert((0.0, 0));
        slot.0 += weight;
        slot.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(key, (sum, count))| {
            let (label, full_date) = bucket_labels(granularity, key);
            Bucket {
                label,
                full_date,
                value: sum / count as f64,
                samples: count,
            }
        })
        .collect()
}

/// Latest value and change from the first to the last bucket
pub fn metrics(series: &[Bucket]) -> Metrics {
    let earliest = series.first().map(|b| b.value);
    let latest = series.last().map(|b| b.value);
    let change_percent = match (earliest, latest) {
        (Some(first), Some(last)) if first != 0.0 => (last - first) / first * 100.0,
        _ => 0.0,
    };
    Metrics {
        latest,
        earliest,
        change_percent,
    }
}

fn window_average(history: &[HistoryEntry], exercise: &str, window: Window) -> f64 {
    let (sum, count) = samples(history, exercise)
        .filter(|(d, _)| window.contains(*d))
        .fold((0.0, 0usize), |(s, c), (_, w)| (s + w, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Current window average against the window right before it
pub fn compare(
    history: &[HistoryEntry],
    exercise: &str,
    granularity: Granularity,
    nav: &NavContext,
) -> Comparison {
    let current = Window::current(granularity, nav);
    let current_average = window_average(history, exercise, current);
    let previous_average = window_average(history, exercise, current.previous());

    if previous_average == 0.0 {
        return Comparison {
            current_average,
            previous_average,
            no_data: true,
            percent: None,
        };
    }
    Comparison {
        current_average,
        previous_average,
        no_data: false,
        percent: Some((current_average - previous_average) / previous_average * 100.0),
    }
}

/// Series, headline metrics and period comparison in one go
pub fn query(
    history: &[HistoryEntry],
    exercise: &str,
    granularity: Granularity,
    nav: &NavContext,
) -> AnalyticsReport {
    let series = series(history, exercise, granularity, nav);
    let metrics = metrics(&series);
    let comparison = compare(history, exercise, granularity, nav);
    tracing::debug!(
        "Analytics for '{}' ({}): {} buckets",
        exercise,
        granularity,
        series.len()
    );
    AnalyticsReport {
        exercise: exercise.to_string(),
        granularity,
        series,
        metrics,
        comparison,
    }
}

// ============================================================================
// Calendar
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Any visible session that day, whatever the plan
    pub has_session: bool,
    /// A weight for the selected exercise, any visibility
    pub has_exercise_weight: bool,
}

/// One mark per day of the month
pub fn calendar(history: &[HistoryEntry], exercise: &str, year: i32, month: u32) -> Result<Vec<CalendarDay>> {
    check_year(year)?;
    let days = days_in_month(year, month)
        .filter(|_| (1..=12).contains(&month))
        .ok_or_else(|| Error::Validation(format!("invalid month {}/{}", month, year)))?;

    let mut marks = Vec::with_capacity(days as usize);
    for day in 1..=days {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let on_day = history.iter().filter(|e| e.date == date);
        marks.push(CalendarDay {
            date,
            has_session: on_day.clone().any(|e| e.visible),
            has_exercise_weight: on_day.clone().any(|e| e.weight_for(exercise).is_some()),
        });
    }
    Ok(marks)
}
