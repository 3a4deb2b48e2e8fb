use crate::attendance;
use crate::auth::{bearer_token, require_admin, require_self_or_staff, require_staff};
use crate::employees;
use crate::errors::AppError;
use crate::leaves::{self, Decision};
use crate::models::{
    AttendanceQuery, AttendanceRecord, BirthdayEntry, CalendarDayStats, DayQuery, DayStats,
    DepartmentStats, Employee, EmployeeUpdate, EventsQuery, LeaveApplication, LeaveRequest,
    LiveRow, LoginRequest, LoginResponse, NewEmployee, Notification, Report, ReportQuery,
    Settings, SummaryMetrics, ToggleResponse,
};
use crate::notifications;
use crate::reports::{self, ReportRange};
use crate::settings;
use crate::state::AppState;
use crate::stats;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = today();
    let data = state.data.lock().await;
    let summary = stats::summary_metrics(&data, today);
    Html(render_index(&data.settings.company_name, &summary))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// Sessions

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.login(&payload.email).await?))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(token) = bearer_token(&headers) else {
        return StatusCode::UNAUTHORIZED;
    };
    if state.logout(token).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Employee>, AppError> {
    Ok(Json(state.current_user(&headers).await?))
}

// Employees

pub async fn list_employees(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Employee>>, AppError> {
    state.current_user(&headers).await?;
    let data = state.data.lock().await;
    Ok(Json(employees::list(&data)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    state.current_user(&headers).await?;
    let data = state.data.lock().await;
    data.employee(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("employee {id} not found")))
}

pub async fn create_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewEmployee>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let user = state.current_user(&headers).await?;
    require_admin(&user)?;

    let mut data = state.data.lock().await;
    let employee = employees::create(&mut data, payload, today())?;
    state.persist(&data).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> Result<Json<Employee>, AppError> {
    let user = state.current_user(&headers).await?;
    require_admin(&user)?;

    let mut data = state.data.lock().await;
    let employee = employees::update(&mut data, &id, payload)?;
    state.persist(&data).await?;
    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = state.current_user(&headers).await?;
    require_admin(&user)?;

    let mut data = state.data.lock().await;
    employees::delete(&mut data, &id, &user)?;
    state.persist(&data).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Attendance

pub async fn toggle_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ToggleResponse>, AppError> {
    let user = state.current_user(&headers).await?;

    let (response, notification) = {
        let mut data = state.data.lock().await;
        let outcome = attendance::toggle(&mut data, &user.id, now())?;
        state.persist(&data).await?;
        outcome
    };
    state.publish(notification);
    Ok(Json(response))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let user = state.current_user(&headers).await?;
    let employee_id = query.employee_id.unwrap_or_else(|| user.id.clone());
    require_self_or_staff(&user, &employee_id)?;

    let data = state.data.lock().await;
    Ok(Json(attendance::records_for(&data, &employee_id, query.start, query.end)))
}

pub async fn today_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    Ok(Json(attendance::today_records(&data, today())))
}

pub async fn live_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LiveRow>>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    Ok(Json(stats::live_board(&data, now())))
}

// Leave

pub async fn list_leaves(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    let user = state.current_user(&headers).await?;
    let data = state.data.lock().await;
    let requests = if user.role.is_staff_viewer() {
        leaves::all(&data)
    } else {
        leaves::for_employee(&data, &user.id)
    };
    Ok(Json(requests))
}

pub async fn pending_leaves(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    Ok(Json(leaves::pending(&data)))
}

pub async fn apply_leave(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LeaveApplication>,
) -> Result<(StatusCode, Json<LeaveRequest>), AppError> {
    let user = state.current_user(&headers).await?;

    let (request, notification) = {
        let mut data = state.data.lock().await;
        let outcome = leaves::submit(&mut data, &user, payload, today())?;
        state.persist(&data).await?;
        outcome
    };
    state.publish(notification);
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn approve_leave(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide_leave(state, headers, id, Decision::Approve).await
}

pub async fn reject_leave(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<LeaveRequest>, AppError> {
    decide_leave(state, headers, id, Decision::Reject).await
}

async fn decide_leave(
    state: AppState,
    headers: HeaderMap,
    id: String,
    decision: Decision,
) -> Result<Json<LeaveRequest>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let (request, notification) = {
        let mut data = state.data.lock().await;
        let calendar = state.calendar(&data);
        let outcome = leaves::decide(&mut data, &id, decision, &user, &calendar)?;
        state.persist(&data).await?;
        outcome
    };
    state.publish(notification);
    Ok(Json(request))
}

// Reports and analytics

pub async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let today = today();
    let range = ReportRange::from_query(&query, today)?;
    let report: Report = {
        let data = state.data.lock().await;
        let calendar = state.calendar(&data);
        reports::build_report(&data, range, query.employee_id.as_deref(), today, &calendar)?
    };

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(report).into_response()),
        Some("csv") => {
            let body = reports::to_csv(&report)?;
            let disposition = format!("attachment; filename=\"{}\"", reports::csv_filename(&report));
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
        Some(other) => Err(AppError::bad_request(format!("unsupported format {other:?}"))),
    }
}

pub async fn weekly_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DayStats>>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    let calendar = state.calendar(&data);
    Ok(Json(stats::weekly_stats(&data, today(), &calendar)))
}

pub async fn department_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DepartmentStats>>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    Ok(Json(stats::department_stats(&data, today())))
}

pub async fn summary_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SummaryMetrics>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    Ok(Json(stats::summary_metrics(&data, today())))
}

pub async fn day_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DayQuery>,
) -> Result<Json<CalendarDayStats>, AppError> {
    let user = state.current_user(&headers).await?;
    require_staff(&user)?;

    let data = state.data.lock().await;
    Ok(Json(stats::day_stats(&data, query.date)))
}

pub async fn birthdays(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BirthdayEntry>>, AppError> {
    state.current_user(&headers).await?;
    let data = state.data.lock().await;
    Ok(Json(stats::birthdays_on(&data, today())))
}

// Settings

pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Settings>, AppError> {
    state.current_user(&headers).await?;
    let data = state.data.lock().await;
    Ok(Json(data.settings.clone()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    let user = state.current_user(&headers).await?;
    require_admin(&user)?;
    settings::validate(&payload)?;

    let mut data = state.data.lock().await;
    data.settings = payload;
    state.persist(&data).await?;
    info!(by = %user.id, "settings updated");
    Ok(Json(data.settings.clone()))
}

// Notifications

pub async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user = state.current_user(&headers).await?;
    let data = state.data.lock().await;
    Ok(Json(notifications::visible(&data, &user).cloned().collect()))
}

pub async fn read_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let user = state.current_user(&headers).await?;
    let mut data = state.data.lock().await;
    let notification = notifications::mark_read(&mut data, &id, &user)?;
    state.persist(&data).await?;
    Ok(Json(notification))
}

pub async fn clear_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let user = state.current_user(&headers).await?;
    let mut data = state.data.lock().await;
    let removed = notifications::clear_visible(&mut data, &user);
    state.persist(&data).await?;
    Ok(Json(json!({ "removed": removed })))
}

pub async fn events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let user = match query.token.as_deref() {
        Some(token) => state.user_for_token(token).await?,
        None => state.current_user(&headers).await?,
    };
    info!(employee = %user.id, "live feed opened");

    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |message| {
        let notification = message.ok()?;
        if !notifications::is_visible_to(&notification, &user) {
            return None;
        }
        Event::default()
            .event("notification")
            .json_data(&notification)
            .ok()
            .map(Ok::<_, Infallible>)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
