use crate::errors::AppError;
use crate::models::{AppData, Employee, EmployeeStatus, EmployeeUpdate, NewEmployee, default_leave_balance};
use crate::notifications::short_id;
use chrono::NaiveDate;
use tracing::info;

pub fn list(data: &AppData) -> Vec<Employee> {
    let mut employees = data.employees.clone();
    employees.sort_by(|a, b| a.name.cmp(&b.name));
    employees
}

pub fn create(data: &mut AppData, new: NewEmployee, today: NaiveDate) -> Result<Employee, AppError> {
    let name = new.name.trim();
    let email = new.email.trim();
    validate_identity(data, None, name, email)?;

    let employee = Employee {
        id: format!("EMP-{}", short_id()),
        name: name.to_string(),
        email: email.to_string(),
        phone: new.phone,
        designation: new.designation,
        department: new.department,
        salary: new.salary,
        role: new.role,
        status: EmployeeStatus::Active,
        date_joined: new.date_joined.unwrap_or(today),
        date_of_birth: new.date_of_birth,
        leave_balance: default_leave_balance(),
    };
    data.employees.push(employee.clone());
    info!(employee = %employee.id, "employee created");
    Ok(employee)
}

pub fn update(data: &mut AppData, id: &str, update: EmployeeUpdate) -> Result<Employee, AppError> {
    let current = data
        .employee(id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("employee {id} not found")))?;

    let name = update.name.as_deref().map(str::trim).unwrap_or(&current.name).to_string();
    let email = update.email.as_deref().map(str::trim).unwrap_or(&current.email).to_string();
    validate_identity(data, Some(id), &name, &email)?;

    let renamed = name != current.name;
    let updated = {
        let employee = data
            .employee_mut(id)
            .ok_or_else(|| AppError::not_found(format!("employee {id} not found")))?;
        employee.name = name;
        employee.email = email;
        if let Some(phone) = update.phone {
            employee.phone = phone;
        }
        if let Some(designation) = update.designation {
            employee.designation = designation;
        }
        if let Some(department) = update.department {
            employee.department = department;
        }
        if let Some(salary) = update.salary {
            employee.salary = salary;
        }
        if let Some(role) = update.role {
            employee.role = role;
        }
        if let Some(status) = update.status {
            employee.status = status;
        }
        if update.date_of_birth.is_some() {
            employee.date_of_birth = update.date_of_birth;
        }
        if let Some(balance) = update.leave_balance {
            employee.leave_balance = balance;
        }
        employee.clone()
    };

    if renamed {
        for record in data.attendance.iter_mut().filter(|record| record.employee_id == id) {
            record.employee_name = updated.name.clone();
        }
        for request in data.leaves.iter_mut().filter(|request| request.employee_id == id) {
            request.employee_name = updated.name.clone();
        }
    }
    info!(employee = id, "employee updated");
    Ok(updated)
}

/// Removes an employee. Their attendance and leave history is kept.
pub fn delete(data: &mut AppData, id: &str, actor: &Employee) -> Result<Employee, AppError> {
    if actor.id == id {
        return Err(AppError::conflict("cannot delete your own account"));
    }
    let index = data
        .employees
        .iter()
        .position(|employee| employee.id == id)
        .ok_or_else(|| AppError::not_found(format!("employee {id} not found")))?;
    let removed = data.employees.remove(index);
    info!(employee = id, by = %actor.id, "employee deleted");
    Ok(removed)
}

fn validate_identity(data: &AppData, id: Option<&str>, name: &str, email: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    if !email.contains('@') {
        return Err(AppError::bad_request("a valid email is required"));
    }
    let taken = data
        .employees
        .iter()
        .any(|other| Some(other.id.as_str()) != id && other.email.eq_ignore_ascii_case(email));
    if taken {
        return Err(AppError::conflict(format!("{email} is already registered")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceRecord, AttendanceStatus, Role};
    use axum::http::StatusCode;
    use chrono::{NaiveTime, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    fn new_employee(name: &str, email: &str) -> NewEmployee {
        NewEmployee {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            designation: "Associate".into(),
            department: "Legal".into(),
            salary: 30000,
            role: Role::Employee,
            date_joined: None,
            date_of_birth: None,
        }
    }

    #[test]
    fn create_assigns_id_and_defaults() {
        let mut data = AppData::default();
        let employee = create(&mut data, new_employee(" Ira ", "ira@example.com"), today()).unwrap();
        assert!(employee.id.starts_with("EMP-"));
        assert_eq!(employee.name, "Ira");
        assert_eq!(employee.date_joined, today());
        assert!(employee.is_active());
        assert_eq!(list(&data).len(), 1);
    }

    #[test]
    fn duplicate_email_conflicts() {
        let mut data = AppData::default();
        create(&mut data, new_employee("Ira", "ira@example.com"), today()).unwrap();
        let err = create(&mut data, new_employee("Other", "IRA@example.com"), today()).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        let err = create(&mut data, new_employee("", "x@example.com"), today()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rename_propagates_to_history() {
        let mut data = AppData::default();
        let employee = create(&mut data, new_employee("Ira", "ira@example.com"), today()).unwrap();
        data.attendance.push(AttendanceRecord {
            id: "A1".into(),
            employee_id: employee.id.clone(),
            employee_name: "Ira".into(),
            date: today(),
            clock_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            clock_out: None,
            status: AttendanceStatus::Present,
            created_at: Utc::now(),
        });

        let update_request = EmployeeUpdate {
            name: Some("Ira Sen".into()),
            role: Some(Role::Manager),
            ..EmployeeUpdate::default()
        };
        let updated = update(&mut data, &employee.id, update_request).unwrap();
        assert_eq!(updated.role, Role::Manager);
        assert_eq!(updated.email, "ira@example.com");
        assert_eq!(data.attendance[0].employee_name, "Ira Sen");
    }

    #[test]
    fn nobody_deletes_themselves() {
        let mut data = AppData::default();
        let admin = create(&mut data, new_employee("Admin", "admin@example.com"), today()).unwrap();
        let other = create(&mut data, new_employee("Other", "other@example.com"), today()).unwrap();

        assert_eq!(delete(&mut data, &admin.id, &admin).unwrap_err().status, StatusCode::CONFLICT);
        delete(&mut data, &other.id, &admin).unwrap();
        assert_eq!(delete(&mut data, &other.id, &admin).unwrap_err().status, StatusCode::NOT_FOUND);
    }
}
