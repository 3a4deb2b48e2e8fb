use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/me", get(handlers::me))
        .route(
            "/api/employees",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route(
            "/api/employees/:id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        .route("/api/attendance", get(handlers::list_attendance))
        .route("/api/attendance/toggle", post(handlers::toggle_attendance))
        .route("/api/attendance/today", get(handlers::today_attendance))
        .route("/api/attendance/live", get(handlers::live_attendance))
        .route(
            "/api/leaves",
            get(handlers::list_leaves).post(handlers::apply_leave),
        )
        .route("/api/leaves/pending", get(handlers::pending_leaves))
        .route("/api/leaves/:id/approve", post(handlers::approve_leave))
        .route("/api/leaves/:id/reject", post(handlers::reject_leave))
        .route("/api/reports", get(handlers::get_report))
        .route("/api/analytics/weekly", get(handlers::weekly_analytics))
        .route("/api/analytics/departments", get(handlers::department_analytics))
        .route("/api/analytics/summary", get(handlers::summary_analytics))
        .route("/api/analytics/day", get(handlers::day_analytics))
        .route("/api/birthdays", get(handlers::birthdays))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .route(
            "/api/notifications",
            get(handlers::list_notifications).delete(handlers::clear_notifications),
        )
        .route("/api/notifications/:id/read", post(handlers::read_notification))
        .route("/api/events", get(handlers::events))
        .with_state(state)
}
