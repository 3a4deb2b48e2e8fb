use crate::calendar::{WorkCalendar, dates_between};
use crate::errors::AppError;
use crate::models::{
    AppData, Employee, LeaveApplication, LeaveRequest, LeaveStatus, Notification,
};
use crate::notifications;
use chrono::NaiveDate;
use tracing::info;

/// Longest leave request, in calendar days.
pub const MAX_LEAVE_SPAN_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

pub fn submit(
    data: &mut AppData,
    employee: &Employee,
    application: LeaveApplication,
    today: NaiveDate,
) -> Result<(LeaveRequest, Notification), AppError> {
    check_span(application.start_date, application.end_date)?;
    let reason = application.reason.trim();
    if reason.is_empty() {
        return Err(AppError::bad_request("reason is required"));
    }

    let clash = data.leaves.iter().any(|existing| {
        existing.employee_id == employee.id
            && existing.status != LeaveStatus::Rejected
            && existing.overlaps(application.start_date, application.end_date)
    });
    if clash {
        return Err(AppError::conflict("overlaps an existing leave request"));
    }

    let request = LeaveRequest {
        id: format!("LR{}", notifications::short_id()),
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        leave_type: application.leave_type,
        start_date: application.start_date,
        end_date: application.end_date,
        reason: reason.to_string(),
        status: LeaveStatus::Pending,
        applied_date: today,
        decided_by: None,
    };
    data.leaves.push(request.clone());
    info!(leave = %request.id, employee = %employee.id, "leave submitted");

    let notification = notifications::record(data, notifications::leave_requested(&request));
    Ok((request, notification))
}

pub fn decide(
    data: &mut AppData,
    leave_id: &str,
    decision: Decision,
    approver: &Employee,
    calendar: &WorkCalendar,
) -> Result<(LeaveRequest, Notification), AppError> {
    if !approver.role.is_staff_viewer() {
        return Err(AppError::forbidden("only managers and admins decide leave"));
    }

    let index = data
        .leaves
        .iter()
        .position(|request| request.id == leave_id)
        .ok_or_else(|| AppError::not_found(format!("leave request {leave_id} not found")))?;

    let request = data.leaves[index].clone();
    if request.status != LeaveStatus::Pending {
        return Err(AppError::conflict("leave request has already been decided"));
    }
    if request.employee_id == approver.id {
        return Err(AppError::forbidden("cannot decide your own leave request"));
    }

    if decision == Decision::Approve {
        check_span(request.start_date, request.end_date)?;
        let days = leave_days(&request, calendar);
        let employee = data
            .employee_mut(&request.employee_id)
            .ok_or_else(|| AppError::not_found(format!("employee {} not found", request.employee_id)))?;
        let balance = employee.leave_balance.entry(request.leave_type).or_insert(0);
        if request.leave_type.is_paid() {
            if *balance < days {
                return Err(AppError::bad_request(format!(
                    "insufficient {} balance: {} day(s) left, {days} requested",
                    request.leave_type.label(),
                    *balance
                )));
            }
            *balance -= days;
        } else {
            *balance += days;
        }
    }

    let updated = {
        let entry = &mut data.leaves[index];
        entry.status = match decision {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject => LeaveStatus::Rejected,
        };
        entry.decided_by = Some(approver.id.clone());
        entry.clone()
    };
    info!(leave = leave_id, status = ?updated.status, by = %approver.id, "leave decided");

    let notification = notifications::record(
        data,
        notifications::leave_decided(&updated, decision == Decision::Approve),
    );
    Ok((updated, notification))
}

fn check_span(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::bad_request("start_date must not be after end_date"));
    }
    if (end - start).num_days() >= MAX_LEAVE_SPAN_DAYS {
        return Err(AppError::bad_request(format!(
            "a leave request may cover at most {MAX_LEAVE_SPAN_DAYS} days"
        )));
    }
    Ok(())
}

/// Working days the request takes out of the employee's schedule.
pub fn leave_days(request: &LeaveRequest, calendar: &WorkCalendar) -> u32 {
    dates_between(request.start_date, request.end_date)
        .filter(|date| calendar.is_working_day(*date))
        .count() as u32
}

pub fn approved_leave_on<'a>(data: &'a AppData, employee_id: &str, date: NaiveDate) -> Option<&'a LeaveRequest> {
    data.leaves.iter().find(|request| {
        request.employee_id == employee_id
            && request.status == LeaveStatus::Approved
            && request.covers(date)
    })
}

pub fn on_leave(data: &AppData, employee_id: &str, date: NaiveDate) -> bool {
    approved_leave_on(data, employee_id, date).is_some()
}

pub fn paid_leave_on(data: &AppData, employee_id: &str, date: NaiveDate) -> Option<bool> {
    approved_leave_on(data, employee_id, date).map(|request| request.leave_type.is_paid())
}

fn newest_first(mut requests: Vec<LeaveRequest>) -> Vec<LeaveRequest> {
    requests.sort_by(|a, b| b.applied_date.cmp(&a.applied_date).then(b.id.cmp(&a.id)));
    requests
}

pub fn all(data: &AppData) -> Vec<LeaveRequest> {
    newest_first(data.leaves.clone())
}

pub fn pending(data: &AppData) -> Vec<LeaveRequest> {
    newest_first(
        data.leaves
            .iter()
            .filter(|request| request.status == LeaveStatus::Pending)
            .cloned()
            .collect(),
    )
}

pub fn for_employee(data: &AppData, employee_id: &str) -> Vec<LeaveRequest> {
    newest_first(
        data.leaves
            .iter()
            .filter(|request| request.employee_id == employee_id)
            .cloned()
            .collect(),
    )
}

pub fn count_on_leave(data: &AppData, date: NaiveDate) -> usize {
    data.active_employees()
        .filter(|employee| on_leave(data, &employee.id, date))
        .count()
}
