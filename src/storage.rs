use crate::errors::AppError;
use crate::models::{AppData, Employee, EmployeeStatus, Role, default_leave_balance};
use chrono::NaiveDate;
use std::{path::Path, time::Duration};
use tokio::fs;
use tracing::{error, info, warn};

const WRITE_ATTEMPTS: u32 = 3;
const WRITE_BACKOFF: Duration = Duration::from_millis(50);

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;

    let mut delay = WRITE_BACKOFF;
    let mut attempt = 1;
    loop {
        match write_atomic(path, &payload).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt < WRITE_ATTEMPTS => {
                warn!("write to {} failed (attempt {attempt}): {err}", path.display());
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(err) => {
                error!("giving up writing {}: {err}", path.display());
                return Err(AppError::internal(err));
            }
        }
    }
}

async fn write_atomic(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await
}

/// Seeds an admin account when the roster is empty. Returns true if it did.
pub fn seed_roster(data: &mut AppData, admin_email: &str, today: NaiveDate) -> bool {
    if !data.employees.is_empty() {
        return false;
    }

    info!("roster is empty, seeding admin {admin_email}");
    data.employees.push(Employee {
        id: "EMP-ADMIN".to_string(),
        name: "Administrator".to_string(),
        email: admin_email.to_string(),
        phone: String::new(),
        designation: "Administrator".to_string(),
        department: "Management".to_string(),
        salary: 0,
        role: Role::Admin,
        status: EmployeeStatus::Active,
        date_joined: today,
        date_of_birth: None,
        leave_balance: default_leave_balance(),
    });
    true
}
