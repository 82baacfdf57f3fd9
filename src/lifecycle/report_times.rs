use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime, NaiveTime};

use crate::errors::ValidationError;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// A report timestamp: either a full instant (what the job form sends) or a
/// bare time of day on the service date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTime {
    At(NaiveDateTime),
    TimeOfDay(NaiveTime),
}

impl ReportTime {
    fn compare(&self, other: &ReportTime) -> Option<Ordering> {
        match (self, other) {
            (ReportTime::At(a), ReportTime::At(b)) => Some(a.cmp(b)),
            (ReportTime::TimeOfDay(a), ReportTime::TimeOfDay(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub arrival: ReportTime,
    pub start: ReportTime,
    pub end: ReportTime,
}

pub fn parse_report_time(
    field: &'static str,
    raw: Option<&str>,
) -> Result<ReportTime, ValidationError> {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(ReportTime::At(dt.naive_utc()));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ReportTime::At(dt));
        }
    }
    for format in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(value, format) {
            return Ok(ReportTime::TimeOfDay(t));
        }
    }

    Err(ValidationError::InvalidValue {
        field,
        reason: format!("'{value}' is not a valid time"),
    })
}

/// Requires all three times and `arrival <= start <= end`.
pub fn validate_report_times(
    arrival: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<ReportWindow, ValidationError> {
    let window = ReportWindow {
        arrival: parse_report_time("arrivalTime", arrival)?,
        start: parse_report_time("startTime", start)?,
        end: parse_report_time("endTime", end)?,
    };

    ensure_order(("arrivalTime", &window.arrival), ("startTime", &window.start))?;
    ensure_order(("startTime", &window.start), ("endTime", &window.end))?;

    Ok(window)
}

fn ensure_order(
    (earlier_field, earlier): (&'static str, &ReportTime),
    (later_field, later): (&'static str, &ReportTime),
) -> Result<(), ValidationError> {
    match earlier.compare(later) {
        Some(Ordering::Greater) => Err(ValidationError::InvalidOrdering {
            earlier: earlier_field,
            later: later_field,
        }),
        Some(_) => Ok(()),
        None => Err(ValidationError::InvalidValue {
            field: later_field,
            reason: format!(
                "cannot compare a time of day with a full timestamp in {earlier_field}"
            ),
        }),
    }
}
