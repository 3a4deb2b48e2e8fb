use crate::errors::AppError;
use crate::models::{AppData, Employee, LeaveRequest, Notification, NotificationKind};
use chrono::{NaiveTime, Utc};

pub const MAX_NOTIFICATIONS: usize = 200;

/// Stores `notification` newest-first and returns a copy for publishing.
pub fn record(data: &mut AppData, notification: Notification) -> Notification {
    data.notifications.insert(0, notification.clone());
    data.notifications.truncate(MAX_NOTIFICATIONS);
    notification
}

pub fn is_visible_to(notification: &Notification, viewer: &Employee) -> bool {
    match &notification.recipient_id {
        Some(recipient) => *recipient == viewer.id,
        None => viewer.role.is_staff_viewer(),
    }
}

pub fn visible<'a>(data: &'a AppData, viewer: &'a Employee) -> impl Iterator<Item = &'a Notification> {
    data.notifications
        .iter()
        .filter(move |notification| is_visible_to(notification, viewer))
}

pub fn mark_read(data: &mut AppData, id: &str, viewer: &Employee) -> Result<Notification, AppError> {
    let notification = data
        .notifications
        .iter_mut()
        .find(|notification| notification.id == id && is_visible_to(notification, viewer))
        .ok_or_else(|| AppError::not_found(format!("notification {id} not found")))?;
    notification.read = true;
    Ok(notification.clone())
}

/// Removes every notification the viewer can see. Returns how many were removed.
pub fn clear_visible(data: &mut AppData, viewer: &Employee) -> usize {
    let before = data.notifications.len();
    data.notifications
        .retain(|notification| !is_visible_to(notification, viewer));
    before - data.notifications.len()
}

fn build(
    kind: NotificationKind,
    title: &str,
    message: String,
    employee_name: Option<&str>,
    recipient_id: Option<&str>,
) -> Notification {
    Notification {
        id: format!("NOTIF-{}", short_id()),
        kind,
        title: title.to_string(),
        message,
        created_at: Utc::now(),
        read: false,
        employee_name: employee_name.map(str::to_string),
        recipient_id: recipient_id.map(str::to_string),
    }
}

pub fn clock_in(employee_name: &str, at: NaiveTime, annotation: Option<&str>) -> Notification {
    let suffix = annotation.map(|text| format!(" ({text})")).unwrap_or_default();
    build(
        NotificationKind::ClockIn,
        "Employee Clocked In",
        format!("{employee_name} clocked in at {}{suffix}", at.format("%H:%M")),
        Some(employee_name),
        None,
    )
}

pub fn clock_out(employee_name: &str, at: NaiveTime, duration: &str) -> Notification {
    build(
        NotificationKind::ClockOut,
        "Employee Clocked Out",
        format!(
            "{employee_name} clocked out at {} (Duration: {duration})",
            at.format("%H:%M")
        ),
        Some(employee_name),
        None,
    )
}

pub fn leave_requested(request: &LeaveRequest) -> Notification {
    build(
        NotificationKind::LeaveRequest,
        "New Leave Request",
        format!(
            "{} requested {} leave from {} to {}",
            request.employee_name,
            request.leave_type.label(),
            request.start_date,
            request.end_date
        ),
        Some(&request.employee_name),
        None,
    )
}

pub fn leave_decided(request: &LeaveRequest, approved: bool) -> Notification {
    let (kind, title, verb) = if approved {
        (NotificationKind::LeaveApproved, "Leave Approved", "approved")
    } else {
        (NotificationKind::LeaveRejected, "Leave Rejected", "rejected")
    };
    build(
        kind,
        title,
        format!(
            "Your {} leave request has been {verb}",
            request.leave_type.label()
        ),
        Some(&request.employee_name),
        Some(&request.employee_id),
    )
}

pub fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase()
}
