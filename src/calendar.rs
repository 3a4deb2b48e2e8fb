use crate::errors::AppError;
use crate::models::Settings;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Decides which dates count as working days.
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    system_start: NaiveDate,
    weekly_offs: Vec<Weekday>,
    holidays: BTreeSet<NaiveDate>,
}

impl WorkCalendar {
    pub fn new(settings: &Settings, system_start: NaiveDate) -> Self {
        Self {
            system_start,
            weekly_offs: settings.weekly_offs.clone(),
            holidays: settings.holidays.iter().map(|holiday| holiday.date).collect(),
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        date >= self.system_start
            && !self.weekly_offs.contains(&date.weekday())
            && !self.holidays.contains(&date)
    }

    /// Clamps `[start, end]` to `[system start, today]`, or `None` if nothing remains.
    pub fn clamp(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = start.max(self.system_start);
        let end = end.min(today);
        (start <= end).then_some((start, end))
    }

    pub fn working_dates(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
        let Some((start, end)) = self.clamp(start, end, today) else {
            return Vec::new();
        };
        dates_between(start, end)
            .filter(|date| self.is_working_day(*date))
            .collect()
    }

    pub fn working_days(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> u32 {
        self.working_dates(start, end, today).len() as u32
    }
}

pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days = (end - start).num_days().max(-1) + 1;
    (0..days).map(move |offset| start + Duration::days(offset))
}

pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))?;
    Ok((first, next - Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Holiday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar(settings: &Settings) -> WorkCalendar {
        WorkCalendar::new(settings, date(2026, 2, 2))
    }

    #[test]
    fn february_2026_excludes_sundays_and_pre_start_days() {
        let settings = Settings::default();
        let cal = calendar(&settings);
        // Feb 2026: Feb 1 is a Sunday, system starts Monday Feb 2. 24 Mon-Sat days remain.
        let days = cal.working_days(date(2026, 2, 1), date(2026, 2, 28), date(2026, 3, 15));
        assert_eq!(days, 24);
    }

    #[test]
    fn range_is_cut_at_today() {
        let settings = Settings::default();
        let cal = calendar(&settings);
        // Mon 2 .. Sat 7 Feb.
        assert_eq!(cal.working_days(date(2026, 2, 1), date(2026, 2, 28), date(2026, 2, 7)), 6);
    }

    #[test]
    fn future_and_pre_start_ranges_are_empty() {
        let settings = Settings::default();
        let cal = calendar(&settings);
        assert_eq!(cal.working_days(date(2026, 5, 1), date(2026, 5, 31), date(2026, 3, 1)), 0);
        assert_eq!(cal.working_days(date(2025, 12, 1), date(2025, 12, 31), date(2026, 3, 1)), 0);
    }

    #[test]
    fn holidays_and_extra_weekly_offs_are_skipped() {
        let settings = Settings {
            weekly_offs: vec![Weekday::Sat, Weekday::Sun],
            holidays: vec![Holiday {
                date: date(2026, 2, 4),
                name: "Founders day".into(),
            }],
            ..Settings::default()
        };
        let cal = calendar(&settings);
        assert!(!cal.is_working_day(date(2026, 2, 4)));
        assert!(!cal.is_working_day(date(2026, 2, 7)));
        assert_eq!(cal.working_days(date(2026, 2, 2), date(2026, 2, 8), date(2026, 3, 1)), 4);
    }

    #[test]
    fn month_bounds_handles_december_and_leap_years() {
        assert_eq!(month_bounds(2026, 12).unwrap(), (date(2026, 12, 1), date(2026, 12, 31)));
        assert_eq!(month_bounds(2028, 2).unwrap().1, date(2028, 2, 29));
        assert!(month_bounds(2026, 13).is_err());
    }
}
