use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    /// Managers and admins see staff-wide data.
    pub fn is_staff_viewer(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    #[serde(rename = "HALFDAY")]
    HalfDay,
    Absent,
}

impl AttendanceStatus {
    pub fn counts_as_present(self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveType {
    Casual,
    Sick,
    Earned,
    Lop,
}

impl LeaveType {
    pub fn is_paid(self) -> bool {
        !matches!(self, LeaveType::Lop)
    }

    pub fn label(self) -> &'static str {
        match self {
            LeaveType::Casual => "CASUAL",
            LeaveType::Sick => "SICK",
            LeaveType::Earned => "EARNED",
            LeaveType::Lop => "LOP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

pub type LeaveBalance = BTreeMap<LeaveType, u32>;

pub fn default_leave_balance() -> LeaveBalance {
    BTreeMap::from([
        (LeaveType::Casual, 10),
        (LeaveType::Sick, 10),
        (LeaveType::Earned, 10),
        (LeaveType::Lop, 0),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub salary: u64,
    pub role: Role,
    #[serde(default)]
    pub status: EmployeeStatus,
    pub date_joined: NaiveDate,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default = "default_leave_balance")]
    pub leave_balance: LeaveBalance,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub clock_in: NaiveTime,
    #[serde(default, with = "clock_time_opt")]
    pub clock_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_date: NaiveDate,
    #[serde(default)]
    pub decided_by: Option<String>,
}

impl LeaveRequest {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkingHours {
    #[serde(with = "clock_time")]
    pub start: NaiveTime,
    #[serde(with = "clock_time")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub company_name: String,
    pub working_hours: WorkingHours,
    #[serde(with = "clock_time")]
    pub late_threshold: NaiveTime,
    #[serde(with = "clock_time")]
    pub half_day_threshold: NaiveTime,
    pub weekly_offs: Vec<Weekday>,
    pub holidays: Vec<Holiday>,
    pub standard_hours_per_day: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: "Legal Success India".to_string(),
            working_hours: WorkingHours {
                start: hm(10, 0),
                end: hm(18, 30),
            },
            late_threshold: hm(10, 40),
            half_day_threshold: hm(14, 0),
            weekly_offs: vec![Weekday::Sun],
            holidays: Vec::new(),
            standard_hours_per_day: 8.0,
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ClockIn,
    ClockOut,
    LeaveRequest,
    LeaveApproved,
    LeaveRejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub employee_name: Option<String>,
    /// `None` means the notification is for managers and admins.
    #[serde(default)]
    pub recipient_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppData {
    pub employees: Vec<Employee>,
    pub attendance: Vec<AttendanceRecord>,
    pub leaves: Vec<LeaveRequest>,
    pub settings: Settings,
    pub notifications: Vec<Notification>,
}

impl AppData {
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    pub fn employee_mut(&mut self, id: &str) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|employee| employee.id == id)
    }

    pub fn active_employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|employee| employee.is_active())
    }
}

// Requests

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub salary: u64,
    pub role: Role,
    #[serde(default)]
    pub date_joined: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub salary: Option<u64>,
    pub role: Option<Role>,
    pub status: Option<EmployeeStatus>,
    pub date_of_birth: Option<NaiveDate>,
    pub leave_balance: Option<LeaveBalance>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveApplication {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct AttendanceQuery {
    pub employee_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, Default)]
pub struct EventsQuery {
    pub token: Option<String>,
}

// Responses

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub employee: Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClockAction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub action: ClockAction,
    pub record: AttendanceRecord,
}

#[derive(Debug, Serialize)]
pub struct DayStats {
    pub date: String,
    pub weekday: String,
    pub present: usize,
    pub late: usize,
    pub half_day: usize,
    pub on_leave: usize,
    pub absent: usize,
}

#[derive(Debug, Serialize)]
pub struct CalendarDayStats {
    pub date: String,
    pub present: usize,
    pub late: usize,
    pub half_day: usize,
    pub absent: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DepartmentStats {
    pub name: String,
    pub headcount: usize,
    pub attendance_percentage: u32,
}

#[derive(Debug, Serialize)]
pub struct SummaryMetrics {
    pub date: String,
    pub total_employees: usize,
    pub present: usize,
    pub late: usize,
    pub on_leave: usize,
    pub absent: usize,
    pub attendance_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveStatus {
    ClockedIn,
    Late,
    #[serde(rename = "HALFDAY")]
    HalfDay,
    ClockedOut,
    NotStarted,
}

#[derive(Debug, Serialize)]
pub struct LiveRow {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub status: LiveStatus,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BirthdayEntry {
    pub employee_id: String,
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub total_days: u32,
    pub days_present: u32,
    pub days_absent: u32,
    pub days_on_leave: u32,
    pub late_arrivals: u32,
    pub half_days: u32,
    pub early_departures: u32,
    pub total_hours: f64,
    pub overtime_hours: f64,
    pub payable_days: f64,
    pub attendance_percentage: f64,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ReportSummary {
    pub employees: usize,
    pub total_days: u32,
    pub days_present: u32,
    pub days_absent: u32,
    pub days_on_leave: u32,
    pub late_arrivals: u32,
    pub half_days: u32,
    pub early_departures: u32,
    pub total_hours: f64,
    pub overtime_hours: f64,
    pub payable_days: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub working_days: u32,
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

/// Serde for a time of day written as `HH:MM`.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::status::parse_clock_time(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw:?}")))
    }
}

pub mod clock_time_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => super::clock_time::serialize(time, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => crate::status::parse_clock_time(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw:?}"))),
        }
    }
}
