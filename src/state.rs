use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::models::{AttendanceRecord, Employee, LeaveRequest, PayrollRecord};
use crate::storage::LocalStorage;
use crate::sync::{AdminDashboard, EmployeeDashboard};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Admin-side cache. Replaced wholesale on every reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminState {
    pub employees: Vec<Employee>,
    pub leaves: Vec<LeaveRequest>,
    pub attendance_today: Vec<AttendanceRecord>,
    pub payroll: Vec<PayrollRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeState {
    pub profile: Employee,
    pub attendance: Vec<AttendanceRecord>,
    pub leaves: Vec<LeaveRequest>,
    pub payroll: Vec<PayrollRecord>,
}

impl EmployeeState {
    pub fn new(profile: Employee) -> Self {
        Self {
            profile,
            attendance: Vec::new(),
            leaves: Vec::new(),
            payroll: Vec::new(),
        }
    }
}

/// Everything the view host keeps between requests. Dashboards live from the
/// first guarded page load until logout or the next login.
pub struct HostData {
    pub storage: LocalStorage,
    pub admin: Option<AdminDashboard>,
    pub employee: Option<EmployeeDashboard>,
}

impl HostData {
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            admin: None,
            employee: None,
        }
    }

    pub fn discard_dashboards(&mut self) {
        self.admin = None;
        self.employee = None;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub data: Arc<Mutex<HostData>>,
}

impl AppState {
    pub fn new(config: ClientConfig, storage: LocalStorage) -> Self {
        Self {
            config: Arc::new(config),
            data: Arc::new(Mutex::new(HostData::new(storage))),
        }
    }

    pub fn anonymous_api(&self) -> ApiClient {
        ApiClient::new(self.config.api_base_url.as_str())
    }
}
