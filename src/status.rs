use crate::models::{AttendanceRecord, AttendanceStatus, Settings};
use chrono::{NaiveTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub late: NaiveTime,
    pub half_day: NaiveTime,
}

impl Thresholds {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            late: settings.late_threshold,
            half_day: settings.half_day_threshold,
        }
    }
}

/// Parses `H:MM`, `HH:MM`, `HH:MM:SS` and 12-hour labels like `10:45 AM`.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    let (clock, period) = match text.split_once(char::is_whitespace) {
        Some((clock, period)) => (clock, Some(period.trim().to_ascii_uppercase())),
        None => (text, None),
    };

    let mut parts = clock.split(':');
    let hours = digits(parts.next()?, 1..=2)?;
    let minutes = digits(parts.next()?, 2..=2)?;
    let seconds = match parts.next() {
        Some(value) => digits(value, 2..=2)?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let hours = match period.as_deref() {
        None => hours,
        Some("AM") if (1..=12).contains(&hours) => hours % 12,
        Some("PM") if (1..=12).contains(&hours) => hours % 12 + 12,
        Some(_) => return None,
    };

    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

fn digits(field: &str, width: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&field.len()) || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Clock times are kept to the minute, the precision they are stored at.
pub fn to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|time| time.with_nanosecond(0))
        .unwrap_or(time)
}

pub fn classify(clock_in: NaiveTime, thresholds: &Thresholds) -> AttendanceStatus {
    if clock_in >= thresholds.half_day {
        AttendanceStatus::HalfDay
    } else if clock_in > thresholds.late {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

pub fn day_status(
    record: Option<&AttendanceRecord>,
    is_working_day: bool,
    thresholds: &Thresholds,
) -> Option<AttendanceStatus> {
    match record {
        Some(record) => Some(classify(record.clock_in, thresholds)),
        None if is_working_day => Some(AttendanceStatus::Absent),
        None => None,
    }
}

pub fn worked_hours(clock_in: NaiveTime, clock_out: NaiveTime) -> f64 {
    let seconds = (clock_out - clock_in).num_seconds().max(0);
    seconds as f64 / 3600.0
}

pub fn is_early_departure(clock_out: NaiveTime, working_day_end: NaiveTime) -> bool {
    clock_out < working_day_end
}

pub fn duration_label(clock_in: NaiveTime, until: NaiveTime) -> String {
    let minutes = (until - clock_in).num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

pub fn clock_label(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}
