use crate::models::{
    AttendanceRecord, Employee, EmployeeStatus, LeaveRequest, LeaveStats, LeaveStatus,
};
use crate::state::{AdminState, EmployeeState};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fixed denominator for the monthly attendance rate.
pub const WORKING_DAYS_PER_MONTH: u32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present_days: u32,
    pub absent_days: u32,
    pub attendance_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingBadge {
    pub count: usize,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeDashboardStats {
    pub attendance: AttendanceSummary,
    pub leaves_taken: u32,
    pub leave_counts: LeaveStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminDashboardStats {
    pub total_employees: usize,
    pub active_employees: usize,
    pub pending_badge: PendingBadge,
    pub pending_leaves: usize,
    pub present_today: usize,
    pub monthly_payroll: Decimal,
}

/// Inclusive number of calendar days from `start` to `end`, `None` when the
/// range is reversed.
pub fn inclusive_day_span(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    let days = (end - start).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days + 1).ok()
}

pub fn gross_salary(basic: Decimal, allowances: Decimal, overtime: Decimal) -> Decimal {
    basic + allowances + overtime
}

pub fn net_salary(
    basic: Decimal,
    allowances: Decimal,
    overtime: Decimal,
    deductions: Decimal,
) -> Decimal {
    gross_salary(basic, allowances, overtime) - deductions
}

/// Percentage of `working_days` covered by `present_days`, rounded half up.
pub fn attendance_rate(present_days: u32, working_days: u32) -> u32 {
    if working_days == 0 {
        return 0;
    }
    (f64::from(present_days) / f64::from(working_days) * 100.0).round() as u32
}

pub fn attendance_summary(records: &[AttendanceRecord]) -> AttendanceSummary {
    attendance_summary_at(Local::now().date_naive(), records)
}

pub fn attendance_summary_at(today: NaiveDate, records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut present_days = 0u32;
    let mut absent_days = 0u32;
    for record in records
        .iter()
        .filter(|record| same_month(record.date, today))
    {
        if record.status.counts_as_present() {
            present_days += 1;
        } else if record.status == crate::models::AttendanceStatus::Absent {
            absent_days += 1;
        }
    }

    AttendanceSummary {
        present_days,
        absent_days,
        attendance_rate: attendance_rate(present_days, WORKING_DAYS_PER_MONTH),
    }
}

/// Approved leave days whose request starts in `year`.
pub fn leave_days_taken(leaves: &[LeaveRequest], year: i32) -> u32 {
    leaves
        .iter()
        .filter(|leave| leave.status == LeaveStatus::Approved && leave.start_date.year() == year)
        .map(|leave| leave.days)
        .sum()
}

pub fn leave_counts(leaves: &[LeaveRequest]) -> LeaveStats {
    let count = |status: LeaveStatus| leaves.iter().filter(|leave| leave.status == status).count() as u32;
    LeaveStats {
        total: leaves.len() as u32,
        approved: count(LeaveStatus::Approved),
        pending: count(LeaveStatus::Pending),
        rejected: count(LeaveStatus::Rejected),
    }
}

pub fn pending_badge(employees: &[Employee]) -> PendingBadge {
    let count = employees
        .iter()
        .filter(|employee| employee.status == EmployeeStatus::Pending)
        .count();
    PendingBadge {
        count,
        visible: count > 0,
    }
}

/// Hours and minutes between the two clock times. A clock-out earlier than the
/// clock-in is taken to be on the following day.
pub fn working_time(clock_in: NaiveTime, clock_out: NaiveTime) -> (i64, i64) {
    let mut minutes = (clock_out - clock_in).num_minutes();
    if minutes < 0 {
        minutes += 24 * 60;
    }
    (minutes / 60, minutes % 60)
}

pub fn build_employee_stats(state: &EmployeeState) -> EmployeeDashboardStats {
    build_employee_stats_at(Local::now().date_naive(), state)
}

pub fn build_employee_stats_at(today: NaiveDate, state: &EmployeeState) -> EmployeeDashboardStats {
    EmployeeDashboardStats {
        attendance: attendance_summary_at(today, &state.attendance),
        leaves_taken: leave_days_taken(&state.leaves, today.year()),
        leave_counts: leave_counts(&state.leaves),
    }
}

pub fn build_admin_stats(state: &AdminState) -> AdminDashboardStats {
    build_admin_stats_at(Local::now().date_naive(), state)
}

pub fn build_admin_stats_at(today: NaiveDate, state: &AdminState) -> AdminDashboardStats {
    let monthly_payroll = state
        .payroll
        .iter()
        .filter(|record| record.year == today.year() && record.month == today.month())
        .map(|record| record.net_salary)
        .sum();

    AdminDashboardStats {
        total_employees: state.employees.len(),
        active_employees: state
            .employees
            .iter()
            .filter(|employee| employee.status == EmployeeStatus::Active)
            .count(),
        pending_badge: pending_badge(&state.employees),
        pending_leaves: state
            .leaves
            .iter()
            .filter(|leave| leave.status == LeaveStatus::Pending)
            .count(),
        present_today: state
            .attendance_today
            .iter()
            .filter(|record| record.date == today && record.status.counts_as_present())
            .count(),
        monthly_payroll,
    }
}

fn same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}
