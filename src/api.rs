use crate::errors::{ClientError, ClientResult};
use crate::models::{
    AttendanceForm, AttendanceQuery, AttendanceRecord, AttendanceStats, ChangePasswordRequest,
    ClockRequest, ClockType, Employee, EmployeeForm, EmployeeQuery, EmployeeStats, LeaveForm,
    LeaveQuery, LeaveRequest, LeaveStats, ListPayload, LoginRequest, LoginResponse, MessageResponse,
    Payslip, PayrollForm, PayrollQuery, PayrollRecord, PayrollStats, ProcessPayrollRequest,
    ProcessPayrollResponse, RegisterRequest, RegisterResponse, User,
};
use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        debug!(%method, endpoint, "api request");
        let request = self.http.request(method, self.url(endpoint));
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, endpoint).send().await?;
        Self::handle_response(response).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::GET, endpoint)
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::POST, endpoint)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::PUT, endpoint)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self
            .request(Method::PATCH, endpoint)
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn delete(&self, endpoint: &str) -> ClientResult<()> {
        let response = self.request(Method::DELETE, endpoint).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn check_status(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<serde_json::Value>(&bytes).ok();
        warn!(%status, url = %url, "api request failed");
        Err(ClientError::Status { status, body })
    }

    async fn list<T: DeserializeOwned, Q: Serialize>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> ClientResult<Vec<T>> {
        self.get_with_query::<ListPayload<T>, _>(endpoint, query)
            .await
            .map(ListPayload::into_vec)
    }

    async fn list_all<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<Vec<T>> {
        self.get::<ListPayload<T>>(endpoint)
            .await
            .map(ListPayload::into_vec)
    }

    pub fn employees(&self) -> EmployeeApi<'_> {
        EmployeeApi { client: self }
    }

    pub fn attendance(&self) -> AttendanceApi<'_> {
        AttendanceApi { client: self }
    }

    pub fn leaves(&self) -> LeaveApi<'_> {
        LeaveApi { client: self }
    }

    pub fn payroll(&self) -> PayrollApi<'_> {
        PayrollApi { client: self }
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EmployeeApi<'a> {
    client: &'a ApiClient,
}

impl EmployeeApi<'_> {
    pub async fn list(&self, query: &EmployeeQuery) -> ClientResult<Vec<Employee>> {
        self.client.list("/employees/", query).await
    }

    pub async fn get(&self, id: u64) -> ClientResult<Employee> {
        self.client.get(&format!("/employees/{id}/")).await
    }

    pub async fn create(&self, form: &EmployeeForm) -> ClientResult<Employee> {
        self.client.post("/employees/", form).await
    }

    pub async fn update(&self, id: u64, form: &EmployeeForm) -> ClientResult<Employee> {
        self.client.put(&format!("/employees/{id}/"), form).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.client.delete(&format!("/employees/{id}/")).await
    }

    pub async fn stats(&self) -> ClientResult<EmployeeStats> {
        self.client.get("/employees/stats/").await
    }

    pub async fn pending(&self) -> ClientResult<Vec<Employee>> {
        self.client.list_all("/employees/pending/").await
    }

    pub async fn activate(&self, id: u64) -> ClientResult<Employee> {
        self.client
            .patch(&format!("/employees/{id}/activate/"), &serde_json::json!({}))
            .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttendanceApi<'a> {
    client: &'a ApiClient,
}

impl AttendanceApi<'_> {
    pub async fn list(&self, query: &AttendanceQuery) -> ClientResult<Vec<AttendanceRecord>> {
        self.client.list("/attendance/", query).await
    }

    pub async fn get(&self, id: u64) -> ClientResult<AttendanceRecord> {
        self.client.get(&format!("/attendance/{id}/")).await
    }

    pub async fn create(&self, form: &AttendanceForm) -> ClientResult<AttendanceRecord> {
        self.client.post("/attendance/", form).await
    }

    pub async fn update(&self, id: u64, form: &AttendanceForm) -> ClientResult<AttendanceRecord> {
        self.client.put(&format!("/attendance/{id}/"), form).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.client.delete(&format!("/attendance/{id}/")).await
    }

    pub async fn clock(&self, employee_id: u64, clock_type: ClockType) -> ClientResult<AttendanceRecord> {
        let request = ClockRequest {
            employee_id,
            clock_type,
        };
        self.client.post("/attendance/clock/", &request).await
    }

    pub async fn today(&self) -> ClientResult<Vec<AttendanceRecord>> {
        self.client.list_all("/attendance/today/").await
    }

    pub async fn stats(&self) -> ClientResult<AttendanceStats> {
        self.client.get("/attendance/stats/").await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeaveApi<'a> {
    client: &'a ApiClient,
}

impl LeaveApi<'_> {
    pub async fn list(&self, query: &LeaveQuery) -> ClientResult<Vec<LeaveRequest>> {
        self.client.list("/leaves/", query).await
    }

    pub async fn get(&self, id: u64) -> ClientResult<LeaveRequest> {
        self.client.get(&format!("/leaves/{id}/")).await
    }

    pub async fn create(&self, form: &LeaveForm) -> ClientResult<LeaveRequest> {
        self.client.post("/leaves/", form).await
    }

    pub async fn update(&self, id: u64, form: &LeaveForm) -> ClientResult<LeaveRequest> {
        self.client.put(&format!("/leaves/{id}/"), form).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.client.delete(&format!("/leaves/{id}/")).await
    }

    pub async fn approve(&self, id: u64) -> ClientResult<LeaveRequest> {
        self.client
            .patch(&format!("/leaves/{id}/approve/"), &serde_json::json!({}))
            .await
    }

    pub async fn reject(&self, id: u64) -> ClientResult<LeaveRequest> {
        self.client
            .patch(&format!("/leaves/{id}/reject/"), &serde_json::json!({}))
            .await
    }

    pub async fn pending(&self) -> ClientResult<Vec<LeaveRequest>> {
        self.client.list_all("/leaves/pending/").await
    }

    pub async fn stats(&self) -> ClientResult<LeaveStats> {
        self.client.get("/leaves/stats/").await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PayrollApi<'a> {
    client: &'a ApiClient,
}

impl PayrollApi<'_> {
    pub async fn list(&self, query: &PayrollQuery) -> ClientResult<Vec<PayrollRecord>> {
        self.client.list("/payroll/", query).await
    }

    pub async fn get(&self, id: u64) -> ClientResult<PayrollRecord> {
        self.client.get(&format!("/payroll/{id}/")).await
    }

    pub async fn create(&self, form: &PayrollForm) -> ClientResult<PayrollRecord> {
        self.client.post("/payroll/", form).await
    }

    pub async fn update(&self, id: u64, form: &PayrollForm) -> ClientResult<PayrollRecord> {
        self.client.put(&format!("/payroll/{id}/"), form).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.client.delete(&format!("/payroll/{id}/")).await
    }

    pub async fn process(&self, month: u32, year: i32) -> ClientResult<ProcessPayrollResponse> {
        self.client
            .post("/payroll/process/", &ProcessPayrollRequest { month, year })
            .await
    }

    pub async fn payslip(&self, id: u64) -> ClientResult<Payslip> {
        self.client.get(&format!("/payroll/{id}/payslip/")).await
    }

    pub async fn stats(&self, month: u32, year: i32) -> ClientResult<PayrollStats> {
        let query = PayrollQuery {
            employee: None,
            month: Some(month),
            year: Some(year),
        };
        self.client.get_with_query("/payroll/stats/", &query).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.client.post("/auth/login/", &request).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let response = self
            .client
            .request(Method::POST, "/auth/logout/")
            .json(&serde_json::json!({}))
            .send()
            .await?;
        ApiClient::check_status(response).await.map(|_| ())
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        self.client.get("/auth/user/").await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<RegisterResponse> {
        self.client.post("/auth/register/", request).await
    }

    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ClientResult<MessageResponse> {
        self.client.post("/auth/change-password/", request).await
    }
}
