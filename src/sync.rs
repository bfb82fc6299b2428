use crate::api::ApiClient;
use crate::errors::{ClientError, ClientResult};
use crate::models::{
    AttendanceQuery, AttendanceRecord, ClockType, Employee, EmployeeForm, EmployeeQuery,
    EmployeeStatus, LeaveForm, LeaveQuery, LeaveRequest, LeaveType, PayrollQuery, Payslip,
    ProcessPayrollResponse, User,
};
use crate::state::{AdminState, EmployeeState};
use chrono::NaiveDate;
use tracing::info;

pub type ReloadHook<S> = Box<dyn Fn(&S) + Send + Sync>;

pub struct EmployeeDashboard {
    api: ApiClient,
    email: String,
    state: EmployeeState,
    clock_type: ClockType,
    hooks: Vec<ReloadHook<EmployeeState>>,
}

async fn resolve_profile(api: &ApiClient, email: &str) -> ClientResult<Employee> {
    let employees = api.employees().list(&EmployeeQuery::default()).await?;
    let profile = employees
        .into_iter()
        .find(|employee| employee.email == email)
        .ok_or(ClientError::ProfileNotFound)?;
    if profile.status != EmployeeStatus::Active {
        return Err(ClientError::ProfileInactive(
            profile.status.as_str().to_string(),
        ));
    }
    Ok(profile)
}

impl EmployeeDashboard {
    pub async fn connect(api: ApiClient, user: &User) -> ClientResult<Self> {
        let profile = resolve_profile(&api, &user.email).await?;
        info!(employee_id = profile.id, "employee profile loaded");

        Ok(Self {
            api,
            email: user.email.clone(),
            state: EmployeeState::new(profile),
            clock_type: ClockType::In,
            hooks: Vec::new(),
        })
    }

    pub async fn start(api: ApiClient, user: &User) -> ClientResult<Self> {
        let mut dashboard = Self::connect(api, user).await?;
        dashboard.reload().await?;
        Ok(dashboard)
    }

    pub fn on_reload(&mut self, hook: ReloadHook<EmployeeState>) {
        self.hooks.push(hook);
    }

    pub fn state(&self) -> &EmployeeState {
        &self.state
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // A deactivated account loses access at its next guarded request.
    pub async fn refresh_profile(&mut self) -> ClientResult<()> {
        self.state.profile = resolve_profile(&self.api, &self.email).await?;
        Ok(())
    }

    pub async fn reload(&mut self) -> ClientResult<()> {
        let profile = resolve_profile(&self.api, &self.email).await?;
        let employee = Some(profile.id);
        let attendance = self
            .api
            .attendance()
            .list(&AttendanceQuery {
                employee,
                ..AttendanceQuery::default()
            })
            .await?;
        let leaves = self
            .api
            .leaves()
            .list(&LeaveQuery {
                employee,
                ..LeaveQuery::default()
            })
            .await?;
        let payroll = self
            .api
            .payroll()
            .list(&PayrollQuery {
                employee,
                ..PayrollQuery::default()
            })
            .await?;

        self.state.profile = profile;
        self.state.attendance = attendance;
        self.state.leaves = leaves;
        self.state.payroll = payroll;
        info!(
            attendance = self.state.attendance.len(),
            leaves = self.state.leaves.len(),
            payroll = self.state.payroll.len(),
            "employee cache reloaded"
        );

        for hook in &self.hooks {
            hook(&self.state);
        }
        Ok(())
    }

    pub fn clock_type(&self) -> ClockType {
        self.clock_type
    }

    pub fn set_clock_type(&mut self, clock_type: ClockType) {
        self.clock_type = clock_type;
    }

    pub async fn submit_clock(&mut self) -> ClientResult<AttendanceRecord> {
        let record = self
            .api
            .attendance()
            .clock(self.state.profile.id, self.clock_type)
            .await?;
        self.reload().await?;
        Ok(record)
    }

    pub async fn request_leave(
        &mut self,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> ClientResult<LeaveRequest> {
        let form = LeaveForm::new(self.state.profile.id, leave_type, start_date, end_date, reason)?;
        let created = self.api.leaves().create(&form).await?;
        self.reload().await?;
        Ok(created)
    }

    pub async fn payslip(&self, payroll_id: u64) -> ClientResult<Payslip> {
        self.api.payroll().payslip(payroll_id).await
    }
}

pub struct AdminDashboard {
    api: ApiClient,
    state: AdminState,
    hooks: Vec<ReloadHook<AdminState>>,
}

impl AdminDashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: AdminState::default(),
            hooks: Vec::new(),
        }
    }

    pub async fn start(api: ApiClient) -> ClientResult<Self> {
        let mut dashboard = Self::new(api);
        dashboard.reload().await?;
        Ok(dashboard)
    }

    pub fn on_reload(&mut self, hook: ReloadHook<AdminState>) {
        self.hooks.push(hook);
    }

    pub fn state(&self) -> &AdminState {
        &self.state
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn reload(&mut self) -> ClientResult<()> {
        let employees = self.api.employees().list(&EmployeeQuery::default()).await?;
        let leaves = self.api.leaves().list(&LeaveQuery::default()).await?;
        let attendance_today = self.api.attendance().today().await?;
        let payroll = self.api.payroll().list(&PayrollQuery::default()).await?;

        self.state = AdminState {
            employees,
            leaves,
            attendance_today,
            payroll,
        };
        info!(
            employees = self.state.employees.len(),
            leaves = self.state.leaves.len(),
            attendance_today = self.state.attendance_today.len(),
            payroll = self.state.payroll.len(),
            "admin cache reloaded"
        );

        for hook in &self.hooks {
            hook(&self.state);
        }
        Ok(())
    }

    pub fn pending_employees(&self) -> Vec<&Employee> {
        self.state
            .employees
            .iter()
            .filter(|employee| employee.status == EmployeeStatus::Pending)
            .collect()
    }

    /// Cached copy when there is one, otherwise fetched.
    pub async fn employee_for_edit(&self, id: u64) -> ClientResult<Employee> {
        if let Some(employee) = self.state.employees.iter().find(|employee| employee.id == id) {
            return Ok(employee.clone());
        }
        self.api.employees().get(id).await
    }

    pub async fn create_employee(&mut self, form: &EmployeeForm) -> ClientResult<Employee> {
        let created = self.api.employees().create(form).await?;
        self.reload().await?;
        Ok(created)
    }

    /// Full replacement of an employee record. Setting the status to
    /// `Active` is how a pending account gets activated.
    pub async fn update_employee(&mut self, id: u64, form: &EmployeeForm) -> ClientResult<Employee> {
        let updated = self.api.employees().update(id, form).await?;
        self.reload().await?;
        Ok(updated)
    }

    pub async fn activate_employee(&mut self, id: u64) -> ClientResult<Employee> {
        let activated = self.api.employees().activate(id).await?;
        self.reload().await?;
        Ok(activated)
    }

    pub async fn approve_leave(&mut self, id: u64) -> ClientResult<LeaveRequest> {
        let leave = self.api.leaves().approve(id).await?;
        self.reload().await?;
        Ok(leave)
    }

    pub async fn reject_leave(&mut self, id: u64) -> ClientResult<LeaveRequest> {
        let leave = self.api.leaves().reject(id).await?;
        self.reload().await?;
        Ok(leave)
    }

    pub async fn process_payroll(&mut self, month: u32, year: i32) -> ClientResult<ProcessPayrollResponse> {
        let processed = self.api.payroll().process(month, year).await?;
        self.reload().await?;
        Ok(processed)
    }

    pub async fn payslip(&self, payroll_id: u64) -> ClientResult<Payslip> {
        self.api.payroll().payslip(payroll_id).await
    }
}
