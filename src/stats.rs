use crate::attendance::find_today;
use crate::calendar::WorkCalendar;
use crate::leaves::count_on_leave;
use crate::models::{
    AppData, AttendanceStatus, BirthdayEntry, CalendarDayStats, DayStats, DepartmentStats,
    LiveRow, LiveStatus, SummaryMetrics,
};
use crate::status::{Thresholds, classify, clock_label, duration_label};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

const WEEK_DAYS: i64 = 7;

/// Present/late/absent counts for the seven days ending at `today`, oldest first.
pub fn weekly_stats(data: &AppData, today: NaiveDate, calendar: &WorkCalendar) -> Vec<DayStats> {
    let thresholds = Thresholds::from_settings(&data.settings);
    let headcount = data.active_employees().count();

    let mut days = Vec::with_capacity(WEEK_DAYS as usize);
    for offset in (0..WEEK_DAYS).rev() {
        let date = today - Duration::days(offset);
        let mut present = 0;
        let mut late = 0;
        let mut half_day = 0;
        for record in data.attendance.iter().filter(|record| record.date == date) {
            present += 1;
            match classify(record.clock_in, &thresholds) {
                AttendanceStatus::Late => late += 1,
                AttendanceStatus::HalfDay => half_day += 1,
                _ => {}
            }
        }
        let on_leave = count_on_leave(data, date);
        let absent = if calendar.is_working_day(date) {
            headcount.saturating_sub(present + on_leave)
        } else {
            0
        };

        days.push(DayStats {
            date: date.to_string(),
            weekday: date.format("%a").to_string(),
            present,
            late,
            half_day,
            on_leave,
            absent,
        });
    }
    days
}

pub fn department_stats(data: &AppData, today: NaiveDate) -> Vec<DepartmentStats> {
    let mut departments: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for employee in data.active_employees() {
        let entry = departments.entry(employee.department.as_str()).or_default();
        entry.0 += 1;
        if find_today(data, &employee.id, today).is_some() {
            entry.1 += 1;
        }
    }

    departments
        .into_iter()
        .map(|(name, (headcount, present))| DepartmentStats {
            name: name.to_string(),
            headcount,
            attendance_percentage: percent(present, headcount),
        })
        .collect()
}

pub fn summary_metrics(data: &AppData, today: NaiveDate) -> SummaryMetrics {
    let thresholds = Thresholds::from_settings(&data.settings);
    let total_employees = data.active_employees().count();

    // Only active employees count, so the rate stays within 0..=100.
    let mut present = 0;
    let mut late = 0;
    let records = data.attendance.iter().filter(|record| {
        record.date == today
            && data
                .employee(&record.employee_id)
                .is_some_and(|employee| employee.is_active())
    });
    for record in records {
        present += 1;
        if classify(record.clock_in, &thresholds) == AttendanceStatus::Late {
            late += 1;
        }
    }
    let on_leave = count_on_leave(data, today);

    SummaryMetrics {
        date: today.to_string(),
        total_employees,
        present,
        late,
        on_leave,
        absent: total_employees.saturating_sub(present + on_leave),
        attendance_rate: percent(present, total_employees),
    }
}

/// Counts for one calendar date. Everyone on the roster without a record is absent.
pub fn day_stats(data: &AppData, date: NaiveDate) -> CalendarDayStats {
    let thresholds = Thresholds::from_settings(&data.settings);
    let records: Vec<_> = data.attendance.iter().filter(|record| record.date == date).collect();

    let mut present = 0;
    let mut late = 0;
    let mut half_day = 0;
    for record in &records {
        match classify(record.clock_in, &thresholds) {
            AttendanceStatus::Present => present += 1,
            AttendanceStatus::Late => late += 1,
            AttendanceStatus::HalfDay => half_day += 1,
            AttendanceStatus::Absent => {}
        }
    }

    CalendarDayStats {
        date: date.to_string(),
        present,
        late,
        half_day,
        absent: data.employees.len().saturating_sub(records.len()),
        total: records.len(),
    }
}

pub fn live_board(data: &AppData, now: NaiveDateTime) -> Vec<LiveRow> {
    let thresholds = Thresholds::from_settings(&data.settings);
    let today = now.date();

    let mut rows: Vec<LiveRow> = data
        .active_employees()
        .map(|employee| {
            let record = find_today(data, &employee.id, today);
            let (status, clock_in, clock_out, duration) = match record {
                None => (LiveStatus::NotStarted, None, None, None),
                Some(record) => {
                    let until = record.clock_out.unwrap_or_else(|| now.time());
                    let status = match (record.clock_out, classify(record.clock_in, &thresholds)) {
                        (Some(_), _) => LiveStatus::ClockedOut,
                        (None, AttendanceStatus::HalfDay) => LiveStatus::HalfDay,
                        (None, AttendanceStatus::Late) => LiveStatus::Late,
                        (None, _) => LiveStatus::ClockedIn,
                    };
                    (
                        status,
                        Some(clock_label(record.clock_in)),
                        record.clock_out.map(clock_label),
                        Some(duration_label(record.clock_in, until)),
                    )
                }
            };
            LiveRow {
                employee_id: employee.id.clone(),
                name: employee.name.clone(),
                department: employee.department.clone(),
                status,
                clock_in,
                clock_out,
                duration,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.status.cmp(&b.status).then_with(|| a.name.cmp(&b.name)));
    rows
}

pub fn birthdays_on(data: &AppData, date: NaiveDate) -> Vec<BirthdayEntry> {
    data.active_employees()
        .filter(|employee| {
            employee
                .date_of_birth
                .is_some_and(|dob| dob.month() == date.month() && dob.day() == date.day())
        })
        .map(|employee| BirthdayEntry {
            employee_id: employee.id.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
        })
        .collect()
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceRecord, Employee, EmployeeStatus, LeaveRequest, LeaveStatus, LeaveType, Role,
        default_leave_balance,
    };
    use chrono::{NaiveTime, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn person(id: &str, name: &str, department: &str) -> Employee {
        Employee {
            id: id.into(),
            name: name.into(),
            email: format!("{id}@example.com"),
            phone: String::new(),
            designation: String::new(),
            department: department.into(),
            salary: 0,
            role: Role::Employee,
            status: EmployeeStatus::Active,
            date_joined: date(2),
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
            status: AttendanceStatus::Present,
            created_at: Utc::now(),
        }
    }

    fn sample() -> AppData {
        let mut data = AppData::default();
        data.employees.push(person("E1", "Asha", "Legal"));
        data.employees.push(person("E2", "Bilal", "Legal"));
        data.employees.push(person("E3", "Chen", "Accounts"));
        data.employees.push(person("E4", "Dev", "Accounts"));
        data.attendance.push(punch("E1", date(10), t(9, 50), None));
        data.attendance.push(punch("E2", date(10), t(11, 5), None));
        data.attendance.push(punch("E3", date(10), t(9, 30), Some(t(18, 40))));
        data.leaves.push(LeaveRequest {
            id: "LR1".into(),
            employee_id: "E4".into(),
            employee_name: "Dev".into(),
            leave_type: LeaveType::Sick,
            start_date: date(9),
            end_date: date(11),
            reason: "flu".into(),
            status: LeaveStatus::Approved,
            applied_date: date(8),
            decided_by: None,
        });
        data
    }

    #[test]
    fn weekly_series_is_seven_days_oldest_first() {
        let data = sample();
        let calendar = WorkCalendar::new(&data.settings, date(2));
        let stats = weekly_stats(&data, date(10), &calendar);
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].date, "2026-02-04");

        let today = stats.last().unwrap();
        assert_eq!(today.weekday, "Tue");
        assert_eq!(today.present, 3);
        assert_eq!(today.late, 1);
        assert_eq!(today.on_leave, 1);
        assert_eq!(today.absent, 0);

        // Sunday the 8th is a weekly off.
        let sunday = stats.iter().find(|day| day.date == "2026-02-08").unwrap();
        assert_eq!(sunday.absent, 0);
        let monday = stats.iter().find(|day| day.date == "2026-02-09").unwrap();
        assert_eq!(monday.absent, 3);
    }

    #[test]
    fn department_percentages_round() {
        let data = sample();
        let stats = department_stats(&data, date(10));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Accounts");
        assert_eq!(stats[0].attendance_percentage, 50);
        assert_eq!(stats[1].name, "Legal");
        assert_eq!(stats[1].attendance_percentage, 100);
    }

    #[test]
    fn summary_counts_today() {
        let data = sample();
        let summary = summary_metrics(&data, date(10));
        assert_eq!(summary.total_employees, 4);
        assert_eq!(summary.present, 3);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.on_leave, 1);
        assert_eq!(summary.absent, 0);
        assert_eq!(summary.attendance_rate, 75);
    }

    #[test]
    fn summary_ignores_inactive_and_removed_employees() {
        let mut data = sample();
        data.employees[1].status = EmployeeStatus::Inactive;
        data.attendance.push(punch("GONE", date(10), t(9, 0), None));

        let summary = summary_metrics(&data, date(10));
        assert_eq!(summary.total_employees, 3);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.late, 0);
        assert_eq!(summary.attendance_rate, 67);
        assert!(summary.attendance_rate <= 100);
    }

    #[test]
    fn calendar_day_counts() {
        let data = sample();
        let stats = day_stats(&data, date(10));
        assert_eq!(stats.present, 2);
        assert_eq!(stats.late, 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.absent, 1);
        assert_eq!(day_stats(&data, date(11)).absent, 4);
    }

    #[test]
    fn live_board_orders_by_status() {
        let data = sample();
        let now = date(10).and_time(t(12, 0));
        let rows = live_board(&data, now);
        let statuses: Vec<_> = rows.iter().map(|row| row.status).collect();
        assert_eq!(
            statuses,
            vec![
                LiveStatus::ClockedIn,
                LiveStatus::Late,
                LiveStatus::ClockedOut,
                LiveStatus::NotStarted
            ]
        );
        assert_eq!(rows[0].duration.as_deref(), Some("2h 10m"));
        assert_eq!(rows[2].clock_out.as_deref(), Some("18:40"));
    }

    #[test]
    fn birthdays_match_month_and_day() {
        let mut data = sample();
        data.employees[1].date_of_birth = NaiveDate::from_ymd_opt(1990, 2, 10);
        data.employees[2].date_of_birth = NaiveDate::from_ymd_opt(1991, 3, 10);
        let found = birthdays_on(&data, date(10));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bilal");
    }
}
