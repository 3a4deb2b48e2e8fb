use crate::errors::AppError;
use crate::models::{
    AppData, AttendanceRecord, AttendanceStatus, ClockAction, Notification, ToggleResponse,
};
use crate::notifications;
use crate::status::{Thresholds, classify, duration_label, to_minute};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use tracing::info;

/// Clocks out if the employee has an open record today, otherwise clocks in.
pub fn toggle(
    data: &mut AppData,
    employee_id: &str,
    now: NaiveDateTime,
) -> Result<(ToggleResponse, Notification), AppError> {
    let today = now.date();
    let open = data
        .attendance
        .iter()
        .any(|record| record.employee_id == employee_id && record.date == today && record.is_open());

    if open {
        clock_out(data, employee_id, now)
    } else {
        clock_in(data, employee_id, now)
    }
}

pub fn clock_in(
    data: &mut AppData,
    employee_id: &str,
    now: NaiveDateTime,
) -> Result<(ToggleResponse, Notification), AppError> {
    let employee = data
        .employee(employee_id)
        .ok_or_else(|| AppError::not_found(format!("employee {employee_id} not found")))?;
    if !employee.is_active() {
        return Err(AppError::forbidden("inactive employees cannot clock in"));
    }
    let employee_name = employee.name.clone();

    let today = now.date();
    if let Some(existing) = find_today(data, employee_id, today) {
        return Err(if existing.is_open() {
            AppError::conflict("already clocked in")
        } else {
            AppError::conflict("attendance for today is already closed")
        });
    }

    let clock_in = to_minute(now.time());
    let thresholds = Thresholds::from_settings(&data.settings);
    let status = classify(clock_in, &thresholds);
    let record = AttendanceRecord {
        id: format!("ATT-{}", notifications::short_id()),
        employee_id: employee_id.to_string(),
        employee_name: employee_name.clone(),
        date: today,
        clock_in,
        clock_out: None,
        status,
        created_at: Utc::now(),
    };
    data.attendance.push(record.clone());
    info!(employee = employee_id, status = ?status, "clock in");

    let annotation = match status {
        AttendanceStatus::Late => Some("Late"),
        AttendanceStatus::HalfDay => Some("Half day"),
        _ => None,
    };
    let notification = notifications::record(
        data,
        notifications::clock_in(&employee_name, clock_in, annotation),
    );

    Ok((
        ToggleResponse {
            action: ClockAction::In,
            record,
        },
        notification,
    ))
}

pub fn clock_out(
    data: &mut AppData,
    employee_id: &str,
    now: NaiveDateTime,
) -> Result<(ToggleResponse, Notification), AppError> {
    let today = now.date();
    let at = to_minute(now.time());
    let record = data
        .attendance
        .iter_mut()
        .find(|record| record.employee_id == employee_id && record.date == today && record.is_open())
        .ok_or_else(|| AppError::conflict("not clocked in"))?;

    if at < record.clock_in {
        return Err(AppError::bad_request("clock-out time is before clock-in"));
    }
    record.clock_out = Some(at);
    let record = record.clone();
    info!(employee = employee_id, "clock out");

    let duration = duration_label(record.clock_in, at);
    let notification = notifications::record(
        data,
        notifications::clock_out(&record.employee_name, at, &duration),
    );

    Ok((
        ToggleResponse {
            action: ClockAction::Out,
            record,
        },
        notification,
    ))
}

pub fn find_today<'a>(data: &'a AppData, employee_id: &str, today: NaiveDate) -> Option<&'a AttendanceRecord> {
    data.attendance
        .iter()
        .find(|record| record.employee_id == employee_id && record.date == today)
}

/// Records for one employee, newest first, optionally limited to `[start, end]`.
pub fn records_for(
    data: &AppData,
    employee_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<AttendanceRecord> {
    let mut records: Vec<AttendanceRecord> = data
        .attendance
        .iter()
        .filter(|record| record.employee_id == employee_id)
        .filter(|record| start.is_none_or(|start| record.date >= start))
        .filter(|record| end.is_none_or(|end| record.date <= end))
        .cloned()
        .collect();
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.clock_in.cmp(&a.clock_in)));
    records
}

pub fn today_records(data: &AppData, today: NaiveDate) -> Vec<AttendanceRecord> {
    let mut records: Vec<AttendanceRecord> = data
        .attendance
        .iter()
        .filter(|record| record.date == today)
        .cloned()
        .collect();
    records.sort_by(|a, b| b.clock_in.cmp(&a.clock_in));
    records
}
