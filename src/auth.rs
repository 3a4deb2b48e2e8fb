use crate::errors::AppError;
use crate::models::{Employee, LoginResponse, Role};
use crate::state::AppState;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use tracing::{info, warn};

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl AppState {
    pub async fn login(&self, email: &str) -> Result<LoginResponse, AppError> {
        let email = email.trim();
        let employee = {
            let data = self.data.lock().await;
            data.employees
                .iter()
                .find(|employee| employee.email.eq_ignore_ascii_case(email))
                .cloned()
        };

        let employee = match employee {
            Some(employee) if employee.is_active() => employee,
            Some(_) => {
                warn!("login refused for inactive account {email}");
                return Err(AppError::unauthorized("account is inactive"));
            }
            None => {
                warn!("login refused for unknown account {email}");
                return Err(AppError::unauthorized("unknown account"));
            }
        };

        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .await
            .insert(token.clone(), employee.id.clone());
        info!(employee = %employee.id, role = ?employee.role, "login");

        Ok(LoginResponse { token, employee })
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }

    /// Resolves a session token to the employee's current record.
    pub async fn user_for_token(&self, token: &str) -> Result<Employee, AppError> {
        let employee_id = self
            .sessions
            .lock()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::unauthorized("invalid or expired session"))?;

        let employee = {
            let data = self.data.lock().await;
            data.employee(&employee_id)
                .filter(|employee| employee.is_active())
                .cloned()
        };
        match employee {
            Some(employee) => Ok(employee),
            None => {
                self.sessions.lock().await.remove(token);
                Err(AppError::unauthorized("account is no longer active"))
            }
        }
    }

    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Employee, AppError> {
        let token = bearer_token(headers).ok_or_else(|| AppError::unauthorized("missing bearer token"))?;
        self.user_for_token(token).await
    }
}

pub fn require_staff(user: &Employee) -> Result<(), AppError> {
    if user.role.is_staff_viewer() {
        Ok(())
    } else {
        Err(AppError::forbidden("managers and admins only"))
    }
}

pub fn require_admin(user: &Employee) -> Result<(), AppError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::forbidden("admins only"))
    }
}

/// Employees may only look at themselves; staff may look at anyone.
pub fn require_self_or_staff(user: &Employee, employee_id: &str) -> Result<(), AppError> {
    if user.id == employee_id || user.role.is_staff_viewer() {
        Ok(())
    } else {
        Err(AppError::forbidden("cannot view another employee's records"))
    }
}
