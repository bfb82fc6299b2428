use axum::http::StatusCode;
use thiserror::Error;

/// Every failure a backend call or a dashboard action can produce.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response. `body` holds the parsed JSON body when there was one.
    #[error("HTTP error! status: {status}")]
    Status {
        status: StatusCode,
        body: Option<serde_json::Value>,
    },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("local storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Validation(String),

    #[error("Employee profile not found. Please contact administrator.")]
    ProfileNotFound,

    #[error("Employee profile is {0}; an administrator must activate it first.")]
    ProfileInactive(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Text suitable for a blocking user-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status {
                body: Some(body), ..
            } => match body.get("error").and_then(|value| value.as_str()) {
                Some(message) => message.to_string(),
                None => body.to_string(),
            },
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Network(err) => err.status(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        let status = match &err {
            ClientError::Status { status, .. } => *status,
            ClientError::Network(_) | ClientError::Decode(_) => StatusCode::BAD_GATEWAY,
            ClientError::Validation(_) => StatusCode::BAD_REQUEST,
            ClientError::ProfileNotFound => StatusCode::NOT_FOUND,
            ClientError::ProfileInactive(_) => StatusCode::FORBIDDEN,
            ClientError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.user_message(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
