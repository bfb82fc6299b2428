pub mod api;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod ui;

pub use api::ApiClient;
pub use app::router;
pub use config::ClientConfig;
pub use errors::{AppError, ClientError, ClientResult};
pub use state::AppState;
pub use storage::LocalStorage;
pub use sync::{AdminDashboard, EmployeeDashboard};
