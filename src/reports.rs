use crate::calendar::{WorkCalendar, month_bounds};
use crate::errors::AppError;
use crate::leaves;
use crate::models::{AppData, AttendanceStatus, Employee, Report, ReportQuery, ReportRow, ReportSummary};
use crate::status::{Thresholds, classify, is_early_departure, worked_hours};
use chrono::NaiveDate;
use csv::Writer;
use std::collections::BTreeSet;

const LATE_NOTE_AFTER: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    Monthly { year: i32, month: u32 },
    Custom { start: NaiveDate, end: NaiveDate },
}

impl ReportRange {
    /// Custom dates win over year/month. With neither, the month containing `today`.
    pub fn from_query(query: &ReportQuery, today: NaiveDate) -> Result<Self, AppError> {
        use chrono::Datelike;

        match (query.start, query.end, query.year, query.month) {
            (Some(start), Some(end), _, _) => Ok(ReportRange::Custom { start, end }),
            (Some(_), None, _, _) | (None, Some(_), _, _) => {
                Err(AppError::bad_request("start and end must be given together"))
            }
            (None, None, year, month) => Ok(ReportRange::Monthly {
                year: year.unwrap_or(today.year()),
                month: month.unwrap_or(today.month()),
            }),
        }
    }

    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), AppError> {
        match *self {
            ReportRange::Monthly { year, month } => month_bounds(year, month),
            ReportRange::Custom { start, end } if start <= end => Ok((start, end)),
            ReportRange::Custom { .. } => Err(AppError::bad_request("start must not be after end")),
        }
    }
}

pub fn build_report(
    data: &AppData,
    range: ReportRange,
    employee_filter: Option<&str>,
    today: NaiveDate,
    calendar: &WorkCalendar,
) -> Result<Report, AppError> {
    let (start, end) = range.bounds()?;

    let employees: Vec<&Employee> = match employee_filter {
        Some(id) => vec![
            data.employee(id)
                .ok_or_else(|| AppError::not_found(format!("employee {id} not found")))?,
        ],
        None => data.employees.iter().collect(),
    };

    let working_dates = calendar.working_dates(start, end, today);
    let working_days = working_dates.len() as u32;

    let rows: Vec<ReportRow> = employees
        .into_iter()
        .map(|employee| employee_row(data, employee, start, end, &working_dates))
        .collect();
    let summary = summarize(&rows);

    Ok(Report {
        start,
        end,
        working_days,
        rows,
        summary,
    })
}

/// Work on a weekly off or holiday still counts as a day present, so
/// `attendance_percentage` can exceed 100 for someone who works extra days.
fn employee_row(
    data: &AppData,
    employee: &Employee,
    start: NaiveDate,
    end: NaiveDate,
    working_dates: &[NaiveDate],
) -> ReportRow {
    let settings = &data.settings;
    let thresholds = Thresholds::from_settings(settings);

    let records: Vec<_> = data
        .attendance
        .iter()
        .filter(|record| record.employee_id == employee.id && record.date >= start && record.date <= end)
        .collect();

    let mut days_present = 0u32;
    let mut late_arrivals = 0u32;
    let mut half_days = 0u32;
    let mut early_departures = 0u32;
    let mut total_hours = 0.0f64;
    let mut attended: BTreeSet<NaiveDate> = BTreeSet::new();

    for record in &records {
        let status = classify(record.clock_in, &thresholds);
        if status.counts_as_present() {
            days_present += 1;
            attended.insert(record.date);
        }
        match status {
            AttendanceStatus::Late => late_arrivals += 1,
            AttendanceStatus::HalfDay => half_days += 1,
            _ => {}
        }
        if let Some(clock_out) = record.clock_out {
            if is_early_departure(clock_out, settings.working_hours.end) {
                early_departures += 1;
            }
            total_hours += worked_hours(record.clock_in, clock_out);
        }
    }

    let mut days_on_leave = 0u32;
    let mut paid_leave_days = 0u32;
    for date in working_dates.iter().filter(|date| !attended.contains(*date)) {
        if let Some(paid) = leaves::paid_leave_on(data, &employee.id, *date) {
            days_on_leave += 1;
            if paid {
                paid_leave_days += 1;
            }
        }
    }

    let total_days = working_dates.len() as u32;
    let days_absent = total_days.saturating_sub(days_present + days_on_leave);
    let expected_hours = f64::from(days_present) * settings.standard_hours_per_day;
    let overtime_hours = (total_hours - expected_hours).max(0.0);
    let payable_days =
        f64::from(days_present) - f64::from(half_days) * 0.5 + f64::from(paid_leave_days);
    let attendance_percentage = if total_days > 0 {
        round2(f64::from(days_present) / f64::from(total_days) * 100.0)
    } else {
        0.0
    };

    ReportRow {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        department: employee.department.clone(),
        total_days,
        days_present,
        days_absent,
        days_on_leave,
        late_arrivals,
        half_days,
        early_departures,
        total_hours: round2(total_hours),
        overtime_hours: round2(overtime_hours),
        payable_days,
        attendance_percentage,
        notes: notes(late_arrivals, half_days, early_departures),
    }
}

fn notes(late_arrivals: u32, half_days: u32, early_departures: u32) -> String {
    let mut parts = Vec::new();
    if late_arrivals > LATE_NOTE_AFTER {
        parts.push(format!("{late_arrivals} late arrivals"));
    }
    if half_days > 0 {
        parts.push(format!("{half_days} half days"));
    }
    if early_departures > 0 {
        parts.push(format!("{early_departures} early exits"));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

fn summarize(rows: &[ReportRow]) -> ReportSummary {
    rows.iter().fold(
        ReportSummary {
            employees: rows.len(),
            ..ReportSummary::default()
        },
        |mut sum, row| {
            sum.total_days += row.total_days;
            sum.days_present += row.days_present;
            sum.days_absent += row.days_absent;
            sum.days_on_leave += row.days_on_leave;
            sum.late_arrivals += row.late_arrivals;
            sum.half_days += row.half_days;
            sum.early_departures += row.early_departures;
            sum.total_hours = round2(sum.total_hours + row.total_hours);
            sum.overtime_hours = round2(sum.overtime_hours + row.overtime_hours);
            sum.payable_days += row.payable_days;
            sum
        },
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn to_csv(report: &Report) -> Result<String, AppError> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record([
        "Employee ID",
        "Employee Name",
        "Department",
        "Total Days",
        "Days Present",
        "Days Absent",
        "Days on Leave",
        "Late Arrivals",
        "Half Days",
        "Early Departures",
        "Total Hours",
        "Overtime Hours",
        "Payable Days",
        "Attendance %",
        "Notes",
    ])?;

    for row in &report.rows {
        wtr.write_record([
            row.employee_id.clone(),
            row.employee_name.clone(),
            row.department.clone(),
            row.total_days.to_string(),
            row.days_present.to_string(),
            row.days_absent.to_string(),
            row.days_on_leave.to_string(),
            row.late_arrivals.to_string(),
            row.half_days.to_string(),
            row.early_departures.to_string(),
            format!("{:.2}", row.total_hours),
            format!("{:.2}", row.overtime_hours),
            row.payable_days.to_string(),
            format!("{:.2}", row.attendance_percentage),
            row.notes.clone(),
        ])?;
    }

    let sum = &report.summary;
    wtr.write_record([
        "SUMMARY".to_string(),
        format!("{} employees", sum.employees),
        "All Depts".to_string(),
        sum.total_days.to_string(),
        sum.days_present.to_string(),
        sum.days_absent.to_string(),
        sum.days_on_leave.to_string(),
        sum.late_arrivals.to_string(),
        sum.half_days.to_string(),
        sum.early_departures.to_string(),
        format!("{:.2}", sum.total_hours),
        format!("{:.2}", sum.overtime_hours),
        sum.payable_days.to_string(),
        String::new(),
        String::new(),
    ])?;

    let bytes = wtr
        .into_inner()
        .map_err(|err| AppError::internal(err.into_error()))?;
    String::from_utf8(bytes).map_err(AppError::internal)
}

pub fn csv_filename(report: &Report) -> String {
    format!("attendance_report_{}_{}.csv", report.start, report.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceRecord, EmployeeStatus, LeaveRequest, LeaveStatus, LeaveType, Role,
        default_leave_balance,
    };
    use chrono::{NaiveTime, Utc};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn person(id: &str, department: &str) -> Employee {
        Employee {
            id: id.into(),
            name: format!("{id} name"),
            email: format!("{id}@example.com"),
            phone: String::new(),
            designation: String::new(),
            department: department.into(),
            salary: 0,
            role: Role::Employee,
            status: EmployeeStatus::Active,
            date_joined: date(1, 1),
            date_of_birth: None,
            leave_balance: default_leave_balance(),
        }
    }

    fn punch(employee_id: &str, day: NaiveDate, clock_in: NaiveTime, clock_out: Option<NaiveTime>) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{employee_id}-{day}"),
            employee_id: employee_id.into(),
            employee_name: employee_id.into(),
            date: day,
            clock_in,
            clock_out,
            // Stale on purpose: reports re-derive status from the clock-in time.
            status: AttendanceStatus::Present,
            created_at: Utc::now(),
        }
    }

    fn calendar(data: &AppData) -> WorkCalendar {
        WorkCalendar::new(&data.settings, date(2, 2))
    }

    fn sample() -> AppData {
        let mut data = AppData::default();
        data.employees.push(person("E1", "Legal"));
        data.employees.push(person("E2", "Accounts"));

        // E1: Mon 2 on time, long day; Tue 3 late, early exit; Wed 4 half day; Thu 5 open.
        data.attendance.push(punch("E1", date(2, 2), t(10, 0), Some(t(20, 0))));
        data.attendance.push(punch("E1", date(2, 3), t(10, 50), Some(t(17, 50))));
        data.attendance.push(punch("E1", date(2, 4), t(14, 0), Some(t(18, 30))));
        data.attendance.push(punch("E1", date(2, 5), t(9, 45), None));
        // Outside the range.
        data.attendance.push(punch("E1", date(3, 2), t(9, 45), Some(t(18, 45))));
        data
    }

    #[test]
    fn work_on_a_weekly_off_counts_as_present() {
        let mut data = AppData::default();
        data.employees.push(person("E1", "Legal"));
        // Sunday 8 is a weekly off, Monday 9 is the only working day.
        data.attendance.push(punch("E1", date(2, 8), t(10, 0), Some(t(14, 0))));
        data.attendance.push(punch("E1", date(2, 9), t(10, 0), Some(t(18, 30))));

        let range = ReportRange::Custom { start: date(2, 8), end: date(2, 9) };
        let report = build_report(&data, range, None, date(2, 28), &calendar(&data)).unwrap();
        let row = &report.rows[0];
        assert_eq!(row.total_days, 1);
        assert_eq!(row.days_present, 2);
        assert_eq!(row.days_absent, 0);
        assert_eq!(row.attendance_percentage, 200.0);
    }

    #[test]
    fn aggregates_one_employee_over_a_week() {
        let data = sample();
        let range = ReportRange::Custom { start: date(2, 2), end: date(2, 7) };
        let report = build_report(&data, range, Some("E1"), date(2, 28), &calendar(&data)).unwrap();

        assert_eq!(report.working_days, 6);
        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.total_days, 6);
        assert_eq!(row.days_present, 4);
        assert_eq!(row.days_absent, 2);
        assert_eq!(row.late_arrivals, 1);
        assert_eq!(row.half_days, 1);
        assert_eq!(row.early_departures, 1);
        // 10h + 7h + 4.5h
        assert_eq!(row.total_hours, 21.5);
        assert_eq!(row.overtime_hours, 0.0);
        assert_eq!(row.payable_days, 3.5);
        assert_eq!(row.notes, "1 half days, 1 early exits");
    }

    #[test]
    fn overtime_counts_hours_beyond_standard_day() {
        let mut data = AppData::default();
        data.employees.push(person("E1", "Legal"));
        data.attendance.push(punch("E1", date(2, 2), t(9, 0), Some(t(20, 0))));
        data.attendance.push(punch("E1", date(2, 3), t(9, 0), Some(t(19, 0))));

        let range = ReportRange::Custom { start: date(2, 2), end: date(2, 3) };
        let report = build_report(&data, range, None, date(2, 28), &calendar(&data)).unwrap();
        assert_eq!(report.rows[0].total_hours, 21.0);
        assert_eq!(report.rows[0].overtime_hours, 5.0);
        assert_eq!(report.rows[0].attendance_percentage, 100.0);
    }

    #[test]
    fn approved_leave_reduces_absence_and_paid_leave_is_payable() {
        let mut data = sample();
        data.leaves.push(LeaveRequest {
            id: "LR1".into(),
            employee_id: "E1".into(),
            employee_name: "E1".into(),
            leave_type: LeaveType::Casual,
            start_date: date(2, 6),
            end_date: date(2, 6),
            reason: "errand".into(),
            status: LeaveStatus::Approved,
            applied_date: date(2, 1),
            decided_by: Some("M1".into()),
        });
        data.leaves.push(LeaveRequest {
            id: "LR2".into(),
            employee_id: "E1".into(),
            employee_name: "E1".into(),
            leave_type: LeaveType::Lop,
            start_date: date(2, 7),
            end_date: date(2, 7),
            reason: "travel".into(),
            status: LeaveStatus::Approved,
            applied_date: date(2, 1),
            decided_by: Some("M1".into()),
        });

        let range = ReportRange::Custom { start: date(2, 2), end: date(2, 7) };
        let report = build_report(&data, range, Some("E1"), date(2, 28), &calendar(&data)).unwrap();
        let row = &report.rows[0];
        assert_eq!(row.days_on_leave, 2);
        assert_eq!(row.days_absent, 0);
        assert_eq!(row.payable_days, 4.5);
    }

    #[test]
    fn monthly_report_covers_roster_and_sums() {
        let data = sample();
        let range = ReportRange::Monthly { year: 2026, month: 2 };
        let report = build_report(&data, range, None, date(3, 15), &calendar(&data)).unwrap();

        assert_eq!(report.working_days, 24);
        assert_eq!(report.rows.len(), 2);
        let quiet = report.rows.iter().find(|row| row.employee_id == "E2").unwrap();
        assert_eq!(quiet.days_absent, 24);
        assert_eq!(quiet.notes, "-");
        assert_eq!(report.summary.employees, 2);
        assert_eq!(report.summary.days_present, 4);
        assert_eq!(report.summary.days_absent, 20 + 24);
    }

    #[test]
    fn many_late_arrivals_are_noted() {
        let mut data = AppData::default();
        data.employees.push(person("E1", "Legal"));
        for day in 2..=5 {
            data.attendance.push(punch("E1", date(2, day), t(11, 0), None));
        }
        let range = ReportRange::Custom { start: date(2, 2), end: date(2, 5) };
        let report = build_report(&data, range, None, date(2, 28), &calendar(&data)).unwrap();
        assert_eq!(report.rows[0].notes, "4 late arrivals");
    }

    #[test]
    fn future_month_has_no_working_days() {
        let data = sample();
        let range = ReportRange::Monthly { year: 2026, month: 6 };
        let report = build_report(&data, range, None, date(3, 15), &calendar(&data)).unwrap();
        assert_eq!(report.working_days, 0);
        assert!(report.rows.iter().all(|row| row.days_absent == 0 && row.attendance_percentage == 0.0));
    }

    #[test]
    fn unknown_employee_and_inverted_range_fail() {
        let data = sample();
        let cal = calendar(&data);
        let range = ReportRange::Monthly { year: 2026, month: 2 };
        assert!(build_report(&data, range, Some("nobody"), date(3, 1), &cal).is_err());

        let inverted = ReportRange::Custom { start: date(2, 9), end: date(2, 2) };
        assert!(build_report(&data, inverted, None, date(3, 1), &cal).is_err());
    }

    #[test]
    fn query_selects_range() {
        let today = date(2, 10);
        let monthly = ReportRange::from_query(&ReportQuery::default(), today).unwrap();
        assert_eq!(monthly, ReportRange::Monthly { year: 2026, month: 2 });

        let query = ReportQuery {
            start: Some(date(2, 2)),
            ..ReportQuery::default()
        };
        assert!(ReportRange::from_query(&query, today).is_err());
    }

    #[test]
    fn csv_has_header_rows_and_summary() {
        let data = sample();
        let range = ReportRange::Monthly { year: 2026, month: 2 };
        let report = build_report(&data, range, None, date(3, 15), &calendar(&data)).unwrap();

        let csv = to_csv(&report).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Employee ID,Employee Name,Department"));
        assert!(lines[1].contains("E1 name"));
        assert!(lines[3].starts_with("SUMMARY,2 employees,All Depts,48,4,"));
        assert_eq!(csv_filename(&report), "attendance_report_2026-02-01_2026-02-28.csv");
    }
}
