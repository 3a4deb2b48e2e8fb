use crate::errors::AppError;
use crate::models::Settings;
use std::collections::BTreeSet;

pub fn validate(settings: &Settings) -> Result<(), AppError> {
    if settings.company_name.trim().is_empty() {
        return Err(AppError::bad_request("company_name is required"));
    }
    if settings.working_hours.start >= settings.working_hours.end {
        return Err(AppError::bad_request("working hours must start before they end"));
    }
    if settings.late_threshold >= settings.half_day_threshold {
        return Err(AppError::bad_request("late_threshold must be before half_day_threshold"));
    }
    let distinct_offs: BTreeSet<u32> = settings
        .weekly_offs
        .iter()
        .map(|day| day.num_days_from_monday())
        .collect();
    if distinct_offs.len() >= 7 {
        return Err(AppError::bad_request("at least one weekday must be a working day"));
    }
    if !(settings.standard_hours_per_day > 0.0 && settings.standard_hours_per_day <= 24.0) {
        return Err(AppError::bad_request("standard_hours_per_day must be within (0, 24]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&Settings::default()).is_ok());
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let settings = Settings {
            late_threshold: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn repeated_weekly_offs_count_once() {
        use chrono::Weekday;

        let settings = Settings {
            weekly_offs: vec![Weekday::Sun; 7],
            ..Settings::default()
        };
        assert!(validate(&settings).is_ok());

        let settings = Settings {
            weekly_offs: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"late_threshold":"10:15 AM","weekly_offs":["Saturday","Sunday"]}"#).unwrap();
        assert_eq!(settings.late_threshold, NaiveTime::from_hms_opt(10, 15, 0).unwrap());
        assert_eq!(settings.weekly_offs.len(), 2);
        assert_eq!(settings.company_name, Settings::default().company_name);
        assert!(validate(&settings).is_ok());

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["late_threshold"], "10:15");
    }
}
