use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/session/:page", get(handlers::session_status))
        .route("/views/employee", get(handlers::employee_view))
        .route("/views/employee/clock", post(handlers::clock))
        .route("/views/employee/leaves", post(handlers::request_leave))
        .route("/views/employee/payslips/:id", get(handlers::payslip))
        .route("/views/employee/payslips/:id/print", get(handlers::print_payslip))
        .route("/views/admin", get(handlers::admin_view))
        .route("/views/admin/pending", get(handlers::pending_employees))
        .route("/views/admin/employees", post(handlers::create_employee))
        .route("/views/admin/employees/:id", put(handlers::update_employee))
        .route("/views/admin/employees/:id/activate", patch(handlers::activate_employee))
        .route("/views/admin/leaves/:id/approve", patch(handlers::approve_leave))
        .route("/views/admin/leaves/:id/reject", patch(handlers::reject_leave))
        .route("/views/admin/payroll/process", post(handlers::process_payroll))
        .with_state(state)
}
