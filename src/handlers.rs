use crate::config::ClientConfig;
use crate::errors::{AppError, ClientResult};
use crate::models::{
    ClockType, EmployeeForm, EmployeeStatus, LeaveType, LoginRequest, ProcessPayrollRequest, User,
};
use crate::session::{self, check_access, Access, Page, RedirectTarget, Session};
use crate::state::{AdminState, AppState, EmployeeState, HostData};
use crate::stats::{build_admin_stats, build_employee_stats, pending_badge};
use crate::sync::{AdminDashboard, EmployeeDashboard};
use crate::ui::{
    payslip_html, render_admin_dashboard, render_employee_views, render_payslip,
    render_pending_employees, render_print_document, render_user_header, ViewUpdate,
};
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub redirect: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub message: String,
    pub view: ViewUpdate,
}

#[derive(Debug, Deserialize)]
pub struct ClockSubmission {
    pub clock_type: ClockType,
}

#[derive(Debug, Deserialize)]
pub struct LeaveSubmission {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<NavigationResponse>, AppError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("Must include username and password."));
    }

    let login = state
        .anonymous_api()
        .auth()
        .login(username, &payload.password)
        .await?;

    let mut data = state.data.lock().await;
    data.discard_dashboards();
    let session = Session::persist(&mut data.storage, &login).await?;
    info!(username = %session.user.username, "signed in");

    Ok(Json(NavigationResponse {
        redirect: RedirectTarget::landing_for(session.user.role).path(),
        user: Some(session.user),
    }))
}

pub async fn logout(State(state): State<AppState>) -> Result<Json<NavigationResponse>, AppError> {
    let mut data = state.data.lock().await;
    let api = Session::load(&data.storage).map(|session| session.api(&state.config.api_base_url));
    session::logout(&mut data.storage, api.as_ref()).await?;
    data.discard_dashboards();
    info!("signed out");

    Ok(Json(NavigationResponse {
        redirect: RedirectTarget::Login.path(),
        user: None,
    }))
}

pub async fn session_status(
    State(state): State<AppState>,
    Path(page): Path<Page>,
) -> Json<AccessResponse> {
    let data = state.data.lock().await;
    let response = match check_access(&data.storage, page) {
        Access::Granted(session) => AccessResponse {
            granted: true,
            redirect: None,
            user: Some(session.user),
        },
        Access::Redirect(target) => AccessResponse {
            granted: false,
            redirect: Some(target.path()),
            user: None,
        },
    };
    Json(response)
}

pub async fn employee_view(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Employee) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = employee_dashboard(&mut data, &state.config, &session).await?;
    dashboard.reload().await?;
    Ok(Json(employee_views(&session.user, dashboard.state())).into_response())
}

pub async fn clock(
    State(state): State<AppState>,
    Json(payload): Json<ClockSubmission>,
) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Employee) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = employee_dashboard(&mut data, &state.config, &session).await?;
    dashboard.set_clock_type(payload.clock_type);
    dashboard.submit_clock().await?;

    Ok(Json(ActionResponse {
        message: format!("Successfully clocked {}!", payload.clock_type.as_str()),
        view: employee_views(&session.user, dashboard.state()),
    })
    .into_response())
}

pub async fn request_leave(
    State(state): State<AppState>,
    Json(payload): Json<LeaveSubmission>,
) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Employee) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = employee_dashboard(&mut data, &state.config, &session).await?;
    dashboard
        .request_leave(
            payload.leave_type,
            payload.start_date,
            payload.end_date,
            payload.reason,
        )
        .await?;

    Ok(Json(ActionResponse {
        message: "Leave request submitted successfully!".to_string(),
        view: employee_views(&session.user, dashboard.state()),
    })
    .into_response())
}

pub async fn payslip(
    State(state): State<AppState>,
    Path(payroll_id): Path<u64>,
) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Employee) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = employee_dashboard(&mut data, &state.config, &session).await?;
    let payslip = dashboard.payslip(payroll_id).await?;
    Ok(Json(render_payslip(&payslip)).into_response())
}

pub async fn print_payslip(
    State(state): State<AppState>,
    Path(payroll_id): Path<u64>,
) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Employee) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = employee_dashboard(&mut data, &state.config, &session).await?;
    let payslip = dashboard.payslip(payroll_id).await?;
    Ok(Html(render_print_document(&payslip_html(&payslip))).into_response())
}

pub async fn admin_view(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Admin) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = admin_dashboard(&mut data, &state.config, &session);
    dashboard.reload().await?;
    Ok(Json(admin_views(&session.user, dashboard.state())).into_response())
}

pub async fn pending_employees(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Admin) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = admin_dashboard(&mut data, &state.config, &session);
    dashboard.reload().await?;
    let mut view = admin_views(&session.user, dashboard.state());
    view.merge(render_pending_employees(&dashboard.pending_employees()));
    Ok(Json(view).into_response())
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(form): Json<EmployeeForm>,
) -> Result<Response, AppError> {
    admin_action(&state, |dashboard| {
        Box::pin(async move {
            dashboard
                .create_employee(&form)
                .await
                .map(|_| "Employee added successfully!".to_string())
        })
    })
    .await
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<u64>,
    Json(form): Json<EmployeeForm>,
) -> Result<Response, AppError> {
    admin_action(&state, |dashboard| {
        Box::pin(async move {
            dashboard
                .update_employee(employee_id, &form)
                .await
                .map(|_| match form.status {
                    EmployeeStatus::Active => ACTIVATED_MESSAGE.to_string(),
                    _ => "Employee updated successfully!".to_string(),
                })
        })
    })
    .await
}

pub async fn activate_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<u64>,
) -> Result<Response, AppError> {
    admin_action(&state, |dashboard| {
        Box::pin(async move {
            dashboard
                .activate_employee(employee_id)
                .await
                .map(|_| ACTIVATED_MESSAGE.to_string())
        })
    })
    .await
}

pub async fn approve_leave(
    State(state): State<AppState>,
    Path(leave_id): Path<u64>,
) -> Result<Response, AppError> {
    admin_action(&state, |dashboard| {
        Box::pin(async move {
            dashboard
                .approve_leave(leave_id)
                .await
                .map(|_| "Leave request approved.".to_string())
        })
    })
    .await
}

pub async fn reject_leave(
    State(state): State<AppState>,
    Path(leave_id): Path<u64>,
) -> Result<Response, AppError> {
    admin_action(&state, |dashboard| {
        Box::pin(async move {
            dashboard
                .reject_leave(leave_id)
                .await
                .map(|_| "Leave request rejected.".to_string())
        })
    })
    .await
}

pub async fn process_payroll(
    State(state): State<AppState>,
    Json(payload): Json<ProcessPayrollRequest>,
) -> Result<Response, AppError> {
    if !(1..=12).contains(&payload.month) {
        return Err(AppError::bad_request("Month must be between 1 and 12."));
    }
    admin_action(&state, |dashboard| {
        Box::pin(async move {
            dashboard
                .process_payroll(payload.month, payload.year)
                .await
                .map(|processed| processed.message)
        })
    })
    .await
}

const ACTIVATED_MESSAGE: &str =
    "Employee profile activated successfully! The employee can now access their dashboard.";

type ActionFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = ClientResult<String>> + Send + 'a>>;

/// Guard, run one admin mutation (which reloads on success), then answer with
/// the notice and the freshly rendered admin view.
async fn admin_action<F>(state: &AppState, action: F) -> Result<Response, AppError>
where
    F: for<'a> FnOnce(&'a mut AdminDashboard) -> ActionFuture<'a>,
{
    let mut data = state.data.lock().await;
    let session = match check_access(&data.storage, Page::Admin) {
        Access::Granted(session) => session,
        Access::Redirect(target) => return Ok(Redirect::to(target.path()).into_response()),
    };

    let dashboard = admin_dashboard(&mut data, &state.config, &session);
    let message = action(&mut *dashboard).await?;
    Ok(Json(ActionResponse {
        message,
        view: admin_views(&session.user, dashboard.state()),
    })
    .into_response())
}

async fn employee_dashboard<'a>(
    data: &'a mut HostData,
    config: &ClientConfig,
    session: &Session,
) -> ClientResult<&'a mut EmployeeDashboard> {
    // Taken out of the cache so a failed profile check leaves nothing behind.
    let dashboard = match data.employee.take() {
        Some(mut dashboard) => {
            dashboard.refresh_profile().await?;
            dashboard
        }
        None => {
            let api = session.api(&config.api_base_url);
            let mut dashboard = EmployeeDashboard::connect(api, &session.user).await?;
            dashboard.on_reload(Box::new(|state: &EmployeeState| {
                let stats = build_employee_stats(state);
                info!(
                    attendance_rate = stats.attendance.attendance_rate,
                    leaves_taken = stats.leaves_taken,
                    "employee statistics recomputed"
                );
            }));
            dashboard
        }
    };
    Ok(data.employee.insert(dashboard))
}

fn admin_dashboard<'a>(
    data: &'a mut HostData,
    config: &ClientConfig,
    session: &Session,
) -> &'a mut AdminDashboard {
    data.admin.get_or_insert_with(|| {
        let mut dashboard = AdminDashboard::new(session.api(&config.api_base_url));
        dashboard.on_reload(Box::new(|state: &AdminState| {
            let badge = pending_badge(&state.employees);
            info!(pending = badge.count, "pending employee badge refreshed");
        }));
        dashboard
    })
}

fn employee_views(user: &User, state: &EmployeeState) -> ViewUpdate {
    render_employee_views(user, state, &build_employee_stats(state))
}

fn admin_views(user: &User, state: &AdminState) -> ViewUpdate {
    let mut view = render_user_header(user);
    view.merge(render_admin_dashboard(state, &build_admin_stats(state)));
    view
}
