use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Shift;

/// Billing period granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Weekly,
    Biweekly,
    Monthly,
}

/// One aggregation card: a billing period with its totals and per-project
/// breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCard {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: f64,
    pub total_amount: Decimal,
    pub projects: Vec<ProjectBreakdown>,
}

/// Per-project bucket within a card, merged by project name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBreakdown {
    pub name: String,
    pub hours: f64,
    pub amount: Decimal,
}

/// Formats a shift length in seconds as the display label, e.g. "2h 30m".
///
/// Seconds below a full minute are dropped; the label is minute-precise.
pub fn format_duration_label(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

/// Parses a duration label ("2h 30m", "2h", "45m") back into fractional
/// hours. Returns `None` when no hour or minute component can be read.
pub fn parse_duration_label(label: &str) -> Option<f64> {
    let mut hours: Option<f64> = None;
    let mut minutes: Option<f64> = None;

    for part in label.split_whitespace() {
        if let Some(h) = part.strip_suffix('h') {
            hours = h.parse::<f64>().ok();
        } else if let Some(m) = part.strip_suffix('m') {
            minutes = m.parse::<f64>().ok();
        }
    }

    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some(h.unwrap_or(0.0) + m.unwrap_or(0.0) / 60.0),
    }
}

/// Computes the billing period containing `date` for the given granularity.
///
/// Weekly periods run Sunday through Saturday. Monthly periods are calendar
/// months. Biweekly periods are anchored to the first Sunday on/after the 1st
/// of each month: block one runs 14 days from that anchor, block two runs
/// from day 15 up to the day before the next month's anchor, which also
/// absorbs the dates of the next month that precede its anchor. Every date
/// falls in exactly one period.
pub fn period_bounds(date: NaiveDate, granularity: Granularity) -> (NaiveDate, NaiveDate) {
    match granularity {
        Granularity::Weekly => {
            let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
            (start, start + Duration::days(6))
        }
        Granularity::Monthly => {
            let start = month_start(date);
            (start, next_month_start(date) - Duration::days(1))
        }
        Granularity::Biweekly => biweekly_bounds(date),
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    // The 1st of the month always exists.
    date.with_day(1).unwrap_or(date)
}

fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn prev_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// First Sunday on or after the given date.
fn first_sunday_on_or_after(date: NaiveDate) -> NaiveDate {
    let mut d = date;
    while d.weekday() != Weekday::Sun {
        d += Duration::days(1);
    }
    d
}

fn biweekly_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let anchor = first_sunday_on_or_after(month_start(date));

    if date < anchor {
        // Tail of the previous month's second block.
        let prev_anchor = first_sunday_on_or_after(prev_month_start(date));
        (prev_anchor + Duration::days(14), anchor - Duration::days(1))
    } else if date < anchor + Duration::days(14) {
        (anchor, anchor + Duration::days(13))
    } else {
        let next_anchor = first_sunday_on_or_after(next_month_start(date));
        (anchor + Duration::days(14), next_anchor - Duration::days(1))
    }
}

/// Fractional hours contributed by a shift at aggregation time.
///
/// Closed shifts are parsed from their displayed duration label, so the
/// aggregate matches what the shift list shows. An open shift contributes the
/// live elapsed time against `now`.
fn shift_hours(shift: &Shift, now: DateTime<Utc>) -> f64 {
    match &shift.duration {
        Some(label) => parse_duration_label(label).unwrap_or(0.0),
        None => ((now - shift.clock_in).num_seconds().max(0) as f64) / 3600.0,
    }
}

fn to_amount(hours: f64, rate: Decimal) -> Decimal {
    (Decimal::from_f64_retain(hours).unwrap_or_default() * rate).round_dp(2)
}

/// Groups shifts into billing-period cards.
///
/// Shifts are bucketed by the period containing their clock-in date. Within
/// a card, project buckets are merged by project name; untagged time is
/// excluded from every bucket but still counted in the card total. Cards come
/// back sorted by start date descending.
pub fn aggregate(
    shifts: &[Shift],
    granularity: Granularity,
    rate: Decimal,
    now: DateTime<Utc>,
) -> Vec<PeriodCard> {
    struct CardAcc {
        end: NaiveDate,
        total_hours: f64,
        by_project: BTreeMap<String, f64>,
    }

    let mut cards: BTreeMap<NaiveDate, CardAcc> = BTreeMap::new();

    for shift in shifts {
        let (start, end) = period_bounds(shift.clock_in.date_naive(), granularity);
        let hours = shift_hours(shift, now);

        let acc = cards.entry(start).or_insert(CardAcc {
            end,
            total_hours: 0.0,
            by_project: BTreeMap::new(),
        });
        acc.total_hours += hours;

        if let Some(name) = &shift.project_name {
            *acc.by_project.entry(name.clone()).or_insert(0.0) += hours;
        }
    }

    // Most recent period first.
    cards
        .into_iter()
        .rev()
        .map(|(start, acc)| PeriodCard {
            start_date: start,
            end_date: acc.end,
            total_hours: acc.total_hours,
            total_amount: to_amount(acc.total_hours, rate),
            projects: acc
                .by_project
                .into_iter()
                .map(|(name, hours)| ProjectBreakdown {
                    name,
                    hours,
                    amount: to_amount(hours, rate),
                })
                .collect(),
        })
        .collect()
}
