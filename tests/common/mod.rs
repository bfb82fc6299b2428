#![allow(dead_code)]

//! In-memory stand-in for the HR REST backend.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const EMPLOYEE_TOKEN: &str = "employee-token";
pub const PENDING_TOKEN: &str = "pending-token";
pub const REGISTERED_TOKEN: &str = "registered-token";
pub const PASSWORD: &str = "secret";

pub const ANA_ID: u64 = 1;
pub const PAYROLL_ID: u64 = 1;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Debug, Default)]
pub struct MockData {
    pub employees: Vec<Value>,
    pub attendance: Vec<Value>,
    pub leaves: Vec<Value>,
    pub payroll: Vec<Value>,
    /// `{username, password, token, user}` per login.
    pub accounts: Vec<Value>,
    pub hits: HashMap<String, usize>,
    next_id: u64,
}

impl MockData {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn hit(&mut self, key: &str) {
        *self.hits.entry(key.to_string()).or_default() += 1;
    }

    pub fn hits(&self, key: &str) -> usize {
        self.hits.get(key).copied().unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct MockBackend {
    pub base_url: String,
    pub data: Arc<Mutex<MockData>>,
}

impl MockBackend {
    pub fn hits(&self, key: &str) -> usize {
        self.data.lock().unwrap().hits(key)
    }

    pub fn set_employee_field(&self, id: u64, key: &str, value: Value) {
        let mut data = self.data.lock().unwrap();
        if let Some(employee) = data.employees.iter_mut().find(|employee| employee["id"] == id) {
            employee[key] = value;
        }
    }

    pub fn employee_status(&self, id: u64) -> String {
        let data = self.data.lock().unwrap();
        data.employees
            .iter()
            .find(|employee| employee["id"] == id)
            .and_then(|employee| employee["status"].as_str())
            .unwrap_or_default()
            .to_string()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn first_of_previous_month(today: NaiveDate) -> NaiveDate {
    let first = today.with_day(1).unwrap();
    (first - Duration::days(1)).with_day(1).unwrap()
}

fn employee(id: u64, first: &str, last: &str, email: &str, status: &str) -> Value {
    json!({
        "id": id,
        "first_name": first,
        "last_name": last,
        "full_name": format!("{first} {last}"),
        "email": email,
        "department": "Engineering",
        "position": "Developer",
        "salary": "20000.00",
        "join_date": "2025-01-06",
        "status": status,
        "created_at": "2025-01-06T08:00:00Z",
        "updated_at": "2025-01-06T08:00:00Z"
    })
}

fn account(token: &str, id: u64, username: &str, first: &str, last: &str, role: &str) -> Value {
    json!({
        "username": username,
        "password": PASSWORD,
        "token": token,
        "user": {
            "id": id, "username": username, "email": format!("{username}@example.com"),
            "first_name": first, "last_name": last, "role": role
        }
    })
}

pub fn seed() -> MockData {
    let today = today();
    let previous = first_of_previous_month(today);
    let mut data = MockData {
        next_id: 100,
        ..MockData::default()
    };

    data.accounts = vec![
        account(ADMIN_TOKEN, 10, "admin", "Hera", "Admin", "admin"),
        account(EMPLOYEE_TOKEN, 11, "ana", "Ana", "Reyes", "employee"),
        account(PENDING_TOKEN, 12, "pending", "Ben", "Cruz", "employee"),
    ];

    data.employees = vec![
        employee(ANA_ID, "Ana", "Reyes", "ana@example.com", "Active"),
        employee(2, "Ben", "Cruz", "pending@example.com", "Pending"),
        employee(3, "Carla", "Diaz", "carla@example.com", "Pending"),
        employee(4, "Dan", "Lim", "dan@example.com", "Active"),
    ];

    data.attendance = vec![
        json!({
            "id": 1, "employee": ANA_ID, "employee_name": "Ana Reyes",
            "date": previous.to_string(), "status": "Present",
            "clock_in": "08:55:00", "clock_out": "17:30:00", "notes": ""
        }),
        json!({
            "id": 2, "employee": ANA_ID, "employee_name": "Ana Reyes",
            "date": (previous + Duration::days(1)).to_string(), "status": "Absent",
            "clock_in": null, "clock_out": null, "notes": "sick"
        }),
    ];

    let year = today.year();
    let pending_start = today + Duration::days(10);
    data.leaves = vec![
        json!({
            "id": 1, "employee": ANA_ID, "employee_name": "Ana Reyes",
            "leave_type": "Vacation", "start_date": format!("{year}-01-05"),
            "end_date": format!("{year}-01-07"), "days": 3, "status": "Approved", "reason": "trip"
        }),
        json!({
            "id": 2, "employee": ANA_ID, "employee_name": "Ana Reyes",
            "leave_type": "Personal", "start_date": pending_start.to_string(),
            "end_date": (pending_start + Duration::days(1)).to_string(), "days": 2,
            "status": "Pending", "reason": ""
        }),
        json!({
            "id": 3, "employee": 4, "employee_name": "Dan Lim",
            "leave_type": "Sick Leave", "start_date": pending_start.to_string(),
            "end_date": pending_start.to_string(), "days": 1,
            "status": "Pending", "reason": "flu"
        }),
    ];

    data.payroll = vec![json!({
        "id": PAYROLL_ID, "employee": ANA_ID, "employee_name": "Ana Reyes",
        "month": 1, "year": year,
        "basic_salary": "20000.00", "allowances": "2000.00", "overtime": "500.00",
        "deductions": "1500.00", "gross_salary": "22500.00", "net_salary": "21000.00",
        "status": "Processed", "processed_date": format!("{year}-01-31T09:00:00Z")
    })];

    data
}

fn error(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Token "))
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match bearer(headers) {
        Some(ADMIN_TOKEN | EMPLOYEE_TOKEN | PENDING_TOKEN | REGISTERED_TOKEN) => Ok(()),
        _ => Err(error(
            StatusCode::UNAUTHORIZED,
            json!({ "detail": "Authentication credentials were not provided." }),
        )),
    }
}

fn by_employee(items: &[Value], params: &HashMap<String, String>) -> Vec<Value> {
    let wanted = params.get("employee").and_then(|id| id.parse::<u64>().ok());
    items
        .iter()
        .filter(|item| wanted.is_none_or(|id| item["employee"] == id))
        .cloned()
        .collect()
}

type Shared = State<Arc<Mutex<MockData>>>;

fn invalid_credentials() -> (StatusCode, Json<Value>) {
    error(
        StatusCode::BAD_REQUEST,
        json!({ "non_field_errors": ["Invalid username or password."] }),
    )
}

async fn login(State(data): Shared, Json(body): Json<Value>) -> ApiResult {
    let mut data = data.lock().unwrap();
    data.hit("login");
    let account = data
        .accounts
        .iter()
        .find(|account| account["username"] == body["username"] && account["password"] == body["password"])
        .ok_or_else(invalid_credentials)?;
    Ok(Json(json!({ "token": account["token"], "user": account["user"] })))
}

async fn register(
    State(data): Shared,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut data = data.lock().unwrap();
    data.hit("register");
    if data.accounts.iter().any(|account| account["username"] == body["username"]) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "username": ["Username already exists."] }),
        ));
    }
    if data.employees.iter().any(|employee| employee["email"] == body["email"]) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "email": ["Email already exists."] }),
        ));
    }
    if body["password"] != body["password_confirm"] {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "password": "Passwords do not match." }),
        ));
    }

    let user_id = data.next_id();
    let user = json!({
        "id": user_id, "username": body["username"], "email": body["email"],
        "first_name": body["first_name"], "last_name": body["last_name"], "role": body["role"]
    });
    data.accounts.push(json!({
        "username": body["username"],
        "password": body["password"],
        "token": REGISTERED_TOKEN,
        "user": user
    }));

    let first = body["first_name"].as_str().unwrap_or_default().to_string();
    let last = body["last_name"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let employee_id = data.next_id();
    let mut profile = employee(employee_id, &first, &last, &email, "Pending");
    profile["department"] = json!("General");
    profile["position"] = json!("Employee");
    profile["salary"] = json!("0.00");
    profile["join_date"] = json!(today().to_string());
    data.employees.push(profile);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": user,
            "token": REGISTERED_TOKEN,
            "message": "Registration successful. Your account is pending activation."
        })),
    ))
}

async fn change_password(State(data): Shared, headers: HeaderMap, Json(body): Json<Value>) -> ApiResult {
    authorize(&headers)?;
    let token = bearer(&headers).unwrap_or_default().to_string();
    let mut data = data.lock().unwrap();
    data.hit("change_password");
    let account = data
        .accounts
        .iter_mut()
        .find(|account| account["token"] == token.as_str())
        .ok_or_else(invalid_credentials)?;
    if account["password"] != body["old_password"] {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "old_password": ["Old password is incorrect."] }),
        ));
    }
    account["password"] = body["new_password"].clone();
    Ok(Json(json!({ "message": "Password changed successfully." })))
}

async fn logout(State(data): Shared, headers: HeaderMap) -> ApiResult {
    authorize(&headers)?;
    data.lock().unwrap().hit("logout");
    Ok(Json(json!({ "message": "Successfully logged out." })))
}

async fn list_employees(State(data): Shared, headers: HeaderMap) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    data.hit("employees");
    let results = data.employees.clone();
    Ok(Json(json!({ "count": results.len(), "results": results })))
}

async fn create_employee(State(data): Shared, headers: HeaderMap, Json(body): Json<Value>) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    let email = body["email"].clone();
    if data.employees.iter().any(|employee| employee["email"] == email) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "email": ["Employee with this email already exists."] }),
        ));
    }
    let id = data.next_id();
    let mut employee = body;
    employee["id"] = json!(id);
    data.employees.push(employee.clone());
    Ok(Json(employee))
}

async fn get_employee(State(data): Shared, headers: HeaderMap, Path(id): Path<u64>) -> ApiResult {
    authorize(&headers)?;
    let data = data.lock().unwrap();
    data.employees
        .iter()
        .find(|employee| employee["id"] == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))
}

async fn update_employee(
    State(data): Shared,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    data.hit("employee_update");
    let employee = data
        .employees
        .iter_mut()
        .find(|employee| employee["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))?;
    let mut replaced = body;
    replaced["id"] = json!(id);
    // Salary comes back as the backend's decimal text.
    if let Some(salary) = replaced["salary"].as_f64() {
        replaced["salary"] = json!(format!("{salary:.2}"));
    }
    *employee = replaced.clone();
    Ok(Json(replaced))
}

async fn activate_employee(State(data): Shared, headers: HeaderMap, Path(id): Path<u64>) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    let employee = data
        .employees
        .iter_mut()
        .find(|employee| employee["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))?;
    employee["status"] = json!("Active");
    Ok(Json(employee.clone()))
}

async fn list_attendance(
    State(data): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    data.hit("attendance");
    Ok(Json(Value::Array(by_employee(&data.attendance, &params))))
}

async fn attendance_today(State(data): Shared, headers: HeaderMap) -> ApiResult {
    authorize(&headers)?;
    let data = data.lock().unwrap();
    let today = today().to_string();
    let records: Vec<Value> = data
        .attendance
        .iter()
        .filter(|record| record["date"] == today.as_str())
        .cloned()
        .collect();
    Ok(Json(Value::Array(records)))
}

async fn clock(State(data): Shared, headers: HeaderMap, Json(body): Json<Value>) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    data.hit("clock");
    let employee_id = body["employee_id"].as_u64().unwrap_or_default();
    let today = today().to_string();
    let now = Local::now().format("%H:%M:%S").to_string();

    let existing = data
        .attendance
        .iter()
        .position(|record| record["employee"] == employee_id && record["date"] == today.as_str());

    match (body["clock_type"].as_str(), existing) {
        (Some("in"), Some(index)) if !data.attendance[index]["clock_in"].is_null() => Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Already clocked in today" }),
        )),
        (Some("in"), Some(index)) => {
            data.attendance[index]["clock_in"] = json!(now);
            Ok(Json(data.attendance[index].clone()))
        }
        (Some("in"), None) => {
            let id = data.next_id();
            let record = json!({
                "id": id, "employee": employee_id, "date": today, "status": "Present",
                "clock_in": now, "clock_out": null, "notes": ""
            });
            data.attendance.push(record.clone());
            Ok(Json(record))
        }
        (Some("out"), Some(index)) if !data.attendance[index]["clock_in"].is_null() => {
            data.attendance[index]["clock_out"] = json!(now);
            Ok(Json(data.attendance[index].clone()))
        }
        (Some("out"), _) => Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Must clock in first" }),
        )),
        _ => Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "clock_type": ["\"sideways\" is not a valid choice."] }),
        )),
    }
}

async fn list_leaves(
    State(data): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    data.hit("leaves");
    Ok(Json(Value::Array(by_employee(&data.leaves, &params))))
}

async fn create_leave(State(data): Shared, headers: HeaderMap, Json(body): Json<Value>) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    let id = data.next_id();
    let mut leave = body;
    leave["id"] = json!(id);
    leave["status"] = json!("Pending");
    data.leaves.push(leave.clone());
    Ok(Json(leave))
}

fn set_leave_status(data: &Mutex<MockData>, id: u64, status: &str) -> ApiResult {
    let mut data = data.lock().unwrap();
    let leave = data
        .leaves
        .iter_mut()
        .find(|leave| leave["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))?;
    leave["status"] = json!(status);
    Ok(Json(leave.clone()))
}

async fn approve_leave(State(data): Shared, headers: HeaderMap, Path(id): Path<u64>) -> ApiResult {
    authorize(&headers)?;
    set_leave_status(&data, id, "Approved")
}

async fn reject_leave(State(data): Shared, headers: HeaderMap, Path(id): Path<u64>) -> ApiResult {
    authorize(&headers)?;
    set_leave_status(&data, id, "Rejected")
}

async fn list_payroll(
    State(data): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    authorize(&headers)?;
    let mut data = data.lock().unwrap();
    data.hit("payroll");
    Ok(Json(Value::Array(by_employee(&data.payroll, &params))))
}

async fn payslip(State(data): Shared, headers: HeaderMap, Path(id): Path<u64>) -> ApiResult {
    authorize(&headers)?;
    let data = data.lock().unwrap();
    let record = data
        .payroll
        .iter()
        .find(|record| record["id"] == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))?;
    let employee = data
        .employees
        .iter()
        .find(|employee| employee["id"] == record["employee"])
        .ok_or_else(|| error(StatusCode::NOT_FOUND, json!({ "detail": "Not found." })))?;
    let amount = |key: &str| record[key].as_str().and_then(|v| v.parse::<f64>().ok()).unwrap_or_default();
    let employee_id = employee["id"].as_u64().unwrap_or_default();

    Ok(Json(json!({
        "employee": {
            "name": employee["full_name"],
            "email": employee["email"],
            "department": employee["department"],
            "position": employee["position"],
            "employee_id": format!("EMP-{employee_id:04}")
        },
        "period": {
            "month": record["month"],
            "year": record["year"],
            "pay_date": record["processed_date"]
        },
        "earnings": {
            "basic_salary": amount("basic_salary"),
            "allowances": amount("allowances"),
            "overtime": amount("overtime"),
            "gross_salary": amount("basic_salary") + amount("allowances") + amount("overtime")
        },
        "deductions": { "total": amount("deductions") },
        "net_salary": amount("net_salary")
    })))
}

async fn process_payroll(
    State(data): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    authorize(&headers)?;
    let (Some(month), Some(year)) = (body["month"].as_u64(), body["year"].as_i64()) else {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Month and year are required" }),
        ));
    };
    let mut data = data.lock().unwrap();
    let active: Vec<Value> = data
        .employees
        .iter()
        .filter(|employee| employee["status"] == "Active")
        .cloned()
        .collect();

    let mut created = Vec::new();
    for employee in active {
        let exists = data.payroll.iter().any(|record| {
            record["employee"] == employee["id"] && record["month"] == month && record["year"] == year
        });
        if exists {
            continue;
        }
        let salary = employee["salary"]
            .as_str()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or_default();
        let allowances = salary * 0.1;
        let id = data.next_id();
        let record = json!({
            "id": id, "employee": employee["id"], "employee_name": employee["full_name"],
            "month": month, "year": year,
            "basic_salary": format!("{salary:.2}"), "allowances": format!("{allowances:.2}"),
            "overtime": "0.00", "deductions": "0.00",
            "net_salary": format!("{:.2}", salary + allowances),
            "status": "Processed", "processed_date": format!("{year}-{month:02}-28T09:00:00Z")
        });
        data.payroll.push(record.clone());
        created.push(record);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Processed payroll for {} employees", created.len()),
            "payroll": created
        })),
    ))
}

pub fn mock_router(data: Arc<Mutex<MockData>>) -> Router {
    Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/logout/", post(logout))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/change-password/", post(change_password))
        .route("/api/employees/", get(list_employees).post(create_employee))
        .route("/api/employees/:id/", get(get_employee).put(update_employee))
        .route("/api/employees/:id/activate/", patch(activate_employee))
        .route("/api/attendance/", get(list_attendance))
        .route("/api/attendance/today/", get(attendance_today))
        .route("/api/attendance/clock/", post(clock))
        .route("/api/leaves/", get(list_leaves).post(create_leave))
        .route("/api/leaves/:id/approve/", patch(approve_leave))
        .route("/api/leaves/:id/reject/", patch(reject_leave))
        .route("/api/payroll/", get(list_payroll))
        .route("/api/payroll/process/", post(process_payroll))
        .route("/api/payroll/:id/payslip/", get(payslip))
        .with_state(data)
}

/// Serves a freshly seeded backend on the current runtime.
pub async fn spawn_backend() -> MockBackend {
    let data = Arc::new(Mutex::new(seed()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().unwrap();
    let app = mock_router(Arc::clone(&data));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });
    MockBackend {
        base_url: format!("http://{addr}/api"),
        data,
    }
}

/// Serves a freshly seeded backend on a dedicated thread, so it outlives the
/// runtime of any single test.
pub fn spawn_backend_thread() -> MockBackend {
    let data = Arc::new(Mutex::new(seed()));
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock backend");
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let app = mock_router(Arc::clone(&data));

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("mock backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("adopt listener");
            axum::serve(listener, app).await.expect("mock backend");
        });
    });

    MockBackend {
        base_url: format!("http://{addr}/api"),
        data,
    }
}
