use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
}

impl User {
    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|name| name.chars().next())
            .collect();
        if !initials.is_empty() {
            return initials;
        }
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn display_name(&self) -> String {
        if !self.first_name.is_empty() && !self.last_name.is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            self.username.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

const MIN_PASSWORD_LEN: usize = 8;

fn check_new_password(password: &str, confirm: &str, mismatch: &str) -> ClientResult<()> {
    if password != confirm {
        return Err(ClientError::Validation(mismatch.to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

/// Self-service sign-up. The backend files the new profile as `Pending`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirm: impl Into<String>,
    ) -> ClientResult<Self> {
        let password = password.into();
        let password_confirm = password_confirm.into();
        check_new_password(&password, &password_confirm, "Passwords do not match.")?;
        Ok(Self {
            username: username.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password,
            password_confirm,
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Employee,
            phone: None,
        })
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = first_name.trim().to_string();
        self.last_name = last_name.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl ChangePasswordRequest {
    pub fn new(
        old_password: impl Into<String>,
        new_password: impl Into<String>,
        new_password_confirm: impl Into<String>,
    ) -> ClientResult<Self> {
        let new_password = new_password.into();
        let new_password_confirm = new_password_confirm.into();
        check_new_password(&new_password, &new_password_confirm, "New passwords do not match.")?;
        Ok(Self {
            old_password: old_password.into(),
            new_password,
            new_password_confirm,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Pending,
    Active,
    Inactive,
    #[serde(rename = "On Leave")]
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Pending => "Pending",
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
            EmployeeStatus::OnLeave => "On Leave",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    pub department: String,
    pub position: String,
    pub salary: Decimal,
    pub join_date: NaiveDate,
    pub status: EmployeeStatus,
}

impl Employee {
    pub fn name(&self) -> String {
        self.full_name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.first_name, self.last_name))
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }

    /// `EMP-0042` style identifier shown on profiles and payslips.
    pub fn display_id(&self) -> String {
        display_employee_id(self.id)
    }
}

pub fn display_employee_id(id: u64) -> String {
    format!("EMP-{id:04}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub salary: Decimal,
    pub join_date: NaiveDate,
    pub status: EmployeeStatus,
}

impl From<&Employee> for EmployeeForm {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            department: employee.department.clone(),
            position: employee.position.clone(),
            salary: employee.salary,
            join_date: employee.join_date,
            status: employee.status,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeStats {
    pub total: u32,
    pub active: u32,
    pub pending: u32,
    #[serde(default)]
    pub by_department: Vec<DepartmentCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[serde(rename = "On Leave")]
    OnLeave,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::OnLeave => "On Leave",
        }
    }

    /// Present and Late both count as a day worked.
    pub fn counts_as_present(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub clock_in: Option<NaiveTime>,
    #[serde(default)]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceForm {
    pub employee: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_in: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttendanceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockType {
    In,
    Out,
}

impl ClockType {
    pub fn as_str(self) -> &'static str {
        match self {
            ClockType::In => "in",
            ClockType::Out => "out",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockRequest {
    pub employee_id: u64,
    pub clock_type: ClockType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub date: NaiveDate,
    pub total_employees: u32,
    pub present: u32,
    pub absent: i64,
    pub on_leave: u32,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    Vacation,
    #[serde(rename = "Sick Leave")]
    SickLeave,
    Personal,
    #[serde(rename = "Work From Home")]
    WorkFromHome,
    Unpaid,
}

impl LeaveType {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveType::Vacation => "Vacation",
            LeaveType::SickLeave => "Sick Leave",
            LeaveType::Personal => "Personal",
            LeaveType::WorkFromHome => "Work From Home",
            LeaveType::Unpaid => "Unpaid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub status: LeaveStatus,
    #[serde(default)]
    pub reason: String,
}

/// Payload for a new leave request. Built through [`LeaveForm::new`] so
/// `days` always equals the inclusive span of the dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveForm {
    pub employee: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub reason: String,
}

impl LeaveForm {
    pub fn new(
        employee: u64,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> ClientResult<Self> {
        let days = crate::stats::inclusive_day_span(start_date, end_date).ok_or_else(|| {
            ClientError::Validation("End date must be after start date.".to_string())
        })?;
        Ok(Self {
            employee,
            leave_type,
            start_date,
            end_date,
            days,
            reason: reason.into(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LeaveQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeaveStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveStats {
    pub total: u32,
    pub approved: u32,
    pub pending: u32,
    pub rejected: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayrollStatus {
    Pending,
    Processed,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: u64,
    pub employee: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    pub month: u32,
    pub year: i32,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub overtime: Decimal,
    pub deductions: Decimal,
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    #[serde(default)]
    pub processed_date: Option<DateTime<FixedOffset>>,
}

impl PayrollRecord {
    pub fn gross_salary(&self) -> Decimal {
        crate::stats::gross_salary(self.basic_salary, self.allowances, self.overtime)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollForm {
    pub employee: u64,
    pub month: u32,
    pub year: i32,
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub overtime: Decimal,
    pub deductions: Decimal,
    pub status: PayrollStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PayrollQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayrollRequest {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayrollResponse {
    pub message: String,
    #[serde(default)]
    pub payroll: Vec<PayrollRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollStats {
    // Echoed from the query string, so the backend may send these as text.
    #[serde(deserialize_with = "number_or_text")]
    pub month: u32,
    #[serde(deserialize_with = "number_or_text")]
    pub year: i32,
    pub total_payroll: Decimal,
    pub processed_count: u32,
    pub pending_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipEmployee {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub department: String,
    pub position: String,
    pub employee_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipPeriod {
    pub month: u32,
    pub year: i32,
    pub pay_date: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipEarnings {
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub overtime: Decimal,
    pub gross_salary: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipDeductions {
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payslip {
    pub employee: PayslipEmployee,
    pub period: PayslipPeriod,
    pub earnings: PayslipEarnings,
    pub deductions: PayslipDeductions,
    pub net_salary: Decimal,
}

/// List endpoints answer with either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Plain(items) => items,
            ListPayload::Paged { results } => results,
        }
    }
}

fn number_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + TryFrom<i64>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => T::try_from(value)
            .map_err(|_| serde::de::Error::custom(format!("number out of range: {value}"))),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {text}"))),
    }
}
