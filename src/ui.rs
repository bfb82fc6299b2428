use crate::models::{
    AttendanceRecord, Employee, LeaveRequest, LeaveStatus, Payslip, PayrollRecord, Role, User,
};
use crate::state::{AdminState, EmployeeState};
use crate::stats::{working_time, AdminDashboardStats, EmployeeDashboardStats};
use chrono::Month;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Changes to apply to the markup layer, keyed by element id. Keys are
/// ordered so identical inputs serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewUpdate {
    pub text: BTreeMap<&'static str, String>,
    pub html: BTreeMap<&'static str, String>,
    pub hidden: BTreeMap<&'static str, bool>,
}

impl ViewUpdate {
    pub fn set_text(&mut self, id: &'static str, value: impl ToString) {
        self.text.insert(id, value.to_string());
    }

    pub fn set_html(&mut self, id: &'static str, markup: String) {
        self.html.insert(id, markup);
    }

    pub fn set_hidden(&mut self, id: &'static str, hidden: bool) {
        self.hidden.insert(id, hidden);
    }

    pub fn merge(&mut self, other: ViewUpdate) {
        self.text.extend(other.text);
        self.html.extend(other.html);
        self.hidden.extend(other.hidden);
    }
}

pub fn render_user_header(user: &User) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    view.set_text("user-initials", user.initials());
    view.set_text("user-name", user.display_name());
    view.set_text(
        "user-role",
        match user.role {
            Role::Admin => "Admin",
            Role::Employee => "Employee",
        },
    );
    view
}

pub fn render_employee_views(
    user: &User,
    state: &EmployeeState,
    stats: &EmployeeDashboardStats,
) -> ViewUpdate {
    let mut view = render_user_header(user);
    view.merge(render_employee_dashboard(state, stats));
    view.merge(render_attendance(state));
    view.merge(render_leaves(state, stats));
    view.merge(render_payroll(state));
    view.merge(render_profile(state, stats));
    view
}

pub fn render_employee_dashboard(state: &EmployeeState, stats: &EmployeeDashboardStats) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    view.set_text("stat-days-present", stats.attendance.present_days);
    view.set_text("stat-days-absent", stats.attendance.absent_days);
    view.set_text("stat-leaves-taken", stats.leaves_taken);
    view.set_text("stat-attendance-rate", format!("{}%", stats.attendance.attendance_rate));

    let recent: String = state
        .attendance
        .iter()
        .rev()
        .take(7)
        .map(|record| {
            format!(
                r#"<tr><td>{date}</td><td><span class="{class}">{status}</span></td><td>{clock_in}</td><td>{clock_out}</td></tr>"#,
                date = record.date,
                class = status_class(record.status.as_str()),
                status = record.status.as_str(),
                clock_in = clock_cell(record.clock_in),
                clock_out = clock_cell(record.clock_out),
            )
        })
        .collect();
    view.set_html("recent-attendance-table", recent);

    let pending: Vec<&LeaveRequest> = state
        .leaves
        .iter()
        .filter(|leave| leave.status == LeaveStatus::Pending)
        .collect();
    view.set_text("pending-leaves-count", pending.len());
    let list = if pending.is_empty() {
        r#"<p class="empty">No pending requests</p>"#.to_string()
    } else {
        pending
            .iter()
            .take(3)
            .map(|leave| {
                format!(
                    r#"<div class="leave-card"><p class="leave-type">{kind}</p><p>{start} to {end}</p><p>{days} days • Pending</p></div>"#,
                    kind = leave.leave_type.as_str(),
                    start = leave.start_date,
                    end = leave.end_date,
                    days = leave.days,
                )
            })
            .collect()
    };
    view.set_html("my-leaves-list", list);
    view
}

pub fn render_attendance(state: &EmployeeState) -> ViewUpdate {
    let mut records: Vec<&AttendanceRecord> = state.attendance.iter().collect();
    records.sort_by_key(|record| Reverse(record.date));

    let rows: String = records
        .iter()
        .map(|record| {
            format!(
                r#"<tr><td>{date}</td><td><span class="{class}">{status}</span></td><td>{clock_in}</td><td>{clock_out}</td><td>{hours}</td><td>{notes}</td></tr>"#,
                date = record.date,
                class = status_class(record.status.as_str()),
                status = record.status.as_str(),
                clock_in = clock_cell(record.clock_in),
                clock_out = clock_cell(record.clock_out),
                hours = working_hours_cell(record),
                notes = or_dash(&record.notes),
            )
        })
        .collect();

    let mut view = ViewUpdate::default();
    view.set_html("attendance-table", rows);
    view
}

pub fn render_leaves(state: &EmployeeState, stats: &EmployeeDashboardStats) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    view.set_text("leave-total", stats.leave_counts.total);
    view.set_text("leave-approved", stats.leave_counts.approved);
    view.set_text("leave-pending", stats.leave_counts.pending);
    view.set_text("leave-rejected", stats.leave_counts.rejected);

    let mut leaves: Vec<&LeaveRequest> = state.leaves.iter().collect();
    leaves.sort_by_key(|leave| Reverse(leave.start_date));
    let rows: String = leaves
        .iter()
        .map(|leave| {
            format!(
                r#"<tr><td>{kind}</td><td>{start}</td><td>{end}</td><td>{days} days</td><td><span class="{class}">{status}</span></td><td>{reason}</td></tr>"#,
                kind = leave.leave_type.as_str(),
                start = leave.start_date,
                end = leave.end_date,
                days = leave.days,
                class = status_class(leave.status.as_str()),
                status = leave.status.as_str(),
                reason = or_dash(&leave.reason),
            )
        })
        .collect();
    view.set_html("leave-table", rows);
    view
}

pub fn render_payroll(state: &EmployeeState) -> ViewUpdate {
    let mut records: Vec<&PayrollRecord> = state.payroll.iter().collect();
    records.sort_by_key(|record| Reverse((record.year, record.month)));

    let rows = if records.is_empty() {
        r#"<tr><td colspan="7" class="empty">No payroll records found</td></tr>"#.to_string()
    } else {
        records
            .iter()
            .map(|record| {
                format!(
                    r#"<tr><td>{period}</td><td>₱{basic}</td><td class="earning">+₱{allowances}</td><td class="earning">+₱{overtime}</td><td class="deduction">-₱{deductions}</td><td class="net">₱{net}</td><td><button type="button" data-payslip="{id}">View</button></td></tr>"#,
                    period = period_label(record.month, record.year),
                    basic = format_amount(record.basic_salary),
                    allowances = format_amount(record.allowances),
                    overtime = format_amount(record.overtime),
                    deductions = format_amount(record.deductions),
                    net = format_amount(record.net_salary),
                    id = record.id,
                )
            })
            .collect()
    };

    let mut view = ViewUpdate::default();
    view.set_html("payroll-table", rows);
    view
}

pub fn render_profile(state: &EmployeeState, stats: &EmployeeDashboardStats) -> ViewUpdate {
    let profile = &state.profile;
    let mut view = ViewUpdate::default();
    view.set_text("profile-initials", profile.initials());
    view.set_text("profile-name", format!("{} {}", profile.first_name, profile.last_name));
    view.set_text("profile-position", &profile.position);
    view.set_text("profile-department", &profile.department);
    view.set_text("profile-join-date", profile.join_date);
    view.set_text("profile-status", profile.status.as_str());
    view.set_text("profile-first-name", &profile.first_name);
    view.set_text("profile-last-name", &profile.last_name);
    view.set_text("profile-email", &profile.email);
    view.set_text("profile-emp-id", profile.display_id());
    view.set_text("profile-stat-present", stats.attendance.present_days);
    view.set_text("profile-stat-absent", stats.attendance.absent_days);
    view.set_text("profile-stat-leaves", stats.leaves_taken);
    view.set_text("profile-stat-rate", format!("{}%", stats.attendance.attendance_rate));
    view
}

pub fn render_admin_dashboard(state: &AdminState, stats: &AdminDashboardStats) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    view.merge(render_pending_badge(stats));
    view.set_text("stat-total-employees", stats.total_employees);
    view.set_text("stat-active-employees", stats.active_employees);
    view.set_text("stat-pending-leaves", stats.pending_leaves);
    view.set_text("stat-present-today", stats.present_today);
    view.set_text("stat-monthly-payroll", format!("₱{}", format_amount(stats.monthly_payroll)));

    let rows: String = state.employees.iter().map(employee_row).collect();
    view.set_html("employees-table", rows);

    let pending_leaves: String = state
        .leaves
        .iter()
        .filter(|leave| leave.status == LeaveStatus::Pending)
        .map(|leave| {
            format!(
                r#"<tr><td>{name}</td><td>{kind}</td><td>{start} to {end}</td><td>{days} days</td><td>{reason}</td><td><button type="button" data-approve="{id}">Approve</button><button type="button" data-reject="{id}">Reject</button></td></tr>"#,
                name = escape_html(leave.employee_name.as_deref().unwrap_or("-")),
                kind = leave.leave_type.as_str(),
                start = leave.start_date,
                end = leave.end_date,
                days = leave.days,
                reason = or_dash(&leave.reason),
                id = leave.id,
            )
        })
        .collect();
    view.set_html("leave-requests-table", pending_leaves);
    view
}

pub fn render_pending_badge(stats: &AdminDashboardStats) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    view.set_text("pending-badge", stats.pending_badge.count);
    view.set_hidden("pending-badge", !stats.pending_badge.visible);
    view
}

pub fn render_pending_employees(pending: &[&Employee]) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    if pending.is_empty() {
        view.set_html("pending-banner", String::new());
        view.set_hidden("pending-banner", true);
        view.set_html(
            "employees-table",
            r#"<tr><td colspan="7" class="empty">No pending employees to process! All employees have been activated.</td></tr>"#
                .to_string(),
        );
        return view;
    }

    let count = pending.len();
    let noun = if count > 1 { "employees" } else { "employee" };
    view.set_html(
        "pending-banner",
        format!(
            r#"<p class="banner-title">You have {count} new {noun} waiting to be processed!</p><p>Click "Setup Profile" to configure their details and activate their accounts.</p>"#
        ),
    );
    view.set_hidden("pending-banner", false);

    let rows: String = pending
        .iter()
        .map(|employee| {
            format!(
                r#"<tr class="pending"><td><span class="avatar">{initials}</span><p>{name}</p><p>{email}</p><span class="awaiting">Awaiting Setup</span></td><td>{department}</td><td>{position}</td><td>₱{salary}</td><td>{joined}</td><td><span class="status-pending">{status}</span></td><td><button type="button" data-edit="{id}">Setup Profile</button></td></tr>"#,
                initials = escape_html(&employee.initials()),
                name = escape_html(&format!("{} {}", employee.first_name, employee.last_name)),
                email = escape_html(&employee.email),
                department = escape_html(&employee.department),
                position = escape_html(&employee.position),
                salary = format_amount(employee.salary),
                joined = employee.join_date,
                status = employee.status.as_str(),
                id = employee.id,
            )
        })
        .collect();
    view.set_html("employees-table", rows);
    view
}

pub fn render_payslip(payslip: &Payslip) -> ViewUpdate {
    let mut view = ViewUpdate::default();
    view.set_html("payslip-content", payslip_html(payslip));
    view
}

pub fn payslip_html(payslip: &Payslip) -> String {
    PAYSLIP_HTML
        .replace("{{PERIOD}}", &period_label(payslip.period.month, payslip.period.year))
        .replace("{{NAME}}", &escape_html(&payslip.employee.name))
        .replace("{{DEPARTMENT}}", &escape_html(&payslip.employee.department))
        .replace("{{POSITION}}", &escape_html(&payslip.employee.position))
        .replace("{{EMPLOYEE_ID}}", &escape_html(&payslip.employee.employee_id))
        .replace("{{PAY_DATE}}", &payslip.period.pay_date.format("%B %-d, %Y").to_string())
        .replace("{{BASIC}}", &format_amount(payslip.earnings.basic_salary))
        .replace("{{ALLOWANCES}}", &format_amount(payslip.earnings.allowances))
        .replace("{{OVERTIME}}", &format_amount(payslip.earnings.overtime))
        .replace("{{GROSS}}", &format_amount(payslip.earnings.gross_salary))
        .replace("{{DEDUCTIONS}}", &format_amount(payslip.deductions.total))
        .replace("{{NET}}", &format_amount(payslip.net_salary))
}

pub fn render_print_document(content: &str) -> String {
    PRINT_HTML
        .replace("{{DELAY_MS}}", &PRINT_SETTLE_DELAY_MS.to_string())
        .replace("{{CONTENT}}", content)
}

pub const PRINT_SETTLE_DELAY_MS: u64 = 250;

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `1234567.5` → `1,234,567.5`; at most two decimals, trailing zeros dropped.
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.round_dp(2).normalize().to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn period_label(month: u32, year: i32) -> String {
    let name = u8::try_from(month)
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .map(|month| month.name().to_string())
        .unwrap_or_else(|| format!("Month {month}"));
    format!("{name} {year}")
}

fn employee_row(employee: &Employee) -> String {
    format!(
        r#"<tr><td><span class="avatar">{initials}</span><p>{name}</p><p>{email}</p></td><td>{department}</td><td>{position}</td><td>₱{salary}</td><td>{joined}</td><td><span class="{class}">{status}</span></td><td><button type="button" data-edit="{id}">Edit</button></td></tr>"#,
        initials = escape_html(&employee.initials()),
        name = escape_html(&employee.name()),
        email = escape_html(&employee.email),
        department = escape_html(&employee.department),
        position = escape_html(&employee.position),
        salary = format_amount(employee.salary),
        joined = employee.join_date,
        class = status_class(employee.status.as_str()),
        status = employee.status.as_str(),
        id = employee.id,
    )
}

fn status_class(status: &str) -> String {
    format!("status-{}", status.to_lowercase().replace(' ', "-"))
}

fn clock_cell(time: Option<chrono::NaiveTime>) -> String {
    time.map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn working_hours_cell(record: &AttendanceRecord) -> String {
    match (record.clock_in, record.clock_out) {
        (Some(clock_in), Some(clock_out)) => {
            let (hours, minutes) = working_time(clock_in, clock_out);
            format!("{hours}h {minutes}m")
        }
        _ => "-".to_string(),
    }
}

fn or_dash(text: &str) -> String {
    if text.trim().is_empty() {
        "-".to_string()
    } else {
        escape_html(text)
    }
}

const PAYSLIP_HTML: &str = r#"<div class="payslip-header">
  <h2>HR NEXUS</h2>
  <p>Payslip for {{PERIOD}}</p>
</div>
<div class="payslip-details">
  <div>
    <h4>Employee Details</h4>
    <p><strong>Name:</strong> {{NAME}}</p>
    <p><strong>Department:</strong> {{DEPARTMENT}}</p>
    <p><strong>Position:</strong> {{POSITION}}</p>
    <p><strong>Employee ID:</strong> {{EMPLOYEE_ID}}</p>
  </div>
  <div class="payment">
    <h4>Payment Details</h4>
    <p><strong>Pay Date:</strong> {{PAY_DATE}}</p>
  </div>
</div>
<table class="payslip-items">
  <thead>
    <tr><th>Description</th><th>Amount (₱)</th></tr>
  </thead>
  <tbody>
    <tr><td>Basic Salary</td><td>₱{{BASIC}}</td></tr>
    <tr><td>Allowances</td><td class="earning">+₱{{ALLOWANCES}}</td></tr>
    <tr><td>Overtime</td><td class="earning">+₱{{OVERTIME}}</td></tr>
    <tr class="subtotal"><td>Gross Salary</td><td>₱{{GROSS}}</td></tr>
    <tr><td>Deductions</td><td class="deduction">-₱{{DEDUCTIONS}}</td></tr>
    <tr class="net"><td>NET SALARY</td><td>₱{{NET}}</td></tr>
  </tbody>
</table>
<div class="payslip-footer">
  <p>This is a computer-generated payslip and does not require signature.</p>
</div>
"#;

const PRINT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Payslip</title>
  <style>
    body { font-family: "Inter", sans-serif; padding: 20px; }
    table { width: 100%; border-collapse: collapse; }
    td, th { padding: 8px 16px; border-bottom: 1px solid #eee; }
    @media print { body { padding: 0; } }
  </style>
</head>
<body>
{{CONTENT}}
<script>
  window.addEventListener('load', () => {
    setTimeout(() => {
      window.print();
      window.close();
    }, {{DELAY_MS}});
  });
</script>
</body>
</html>
"#;
