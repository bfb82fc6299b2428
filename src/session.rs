use crate::api::ApiClient;
use crate::errors::{ClientError, ClientResult};
use crate::models::{LoginResponse, Role, User};
use crate::storage::{LocalStorage, TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Admin,
    Employee,
}

impl Page {
    fn required_role(self) -> Role {
        match self {
            Page::Admin => Role::Admin,
            Page::Employee => Role::Employee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    Login,
    AdminRoot,
    EmployeeDashboard,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::Login => "/login",
            RedirectTarget::AdminRoot => "/",
            RedirectTarget::EmployeeDashboard => "/employee",
        }
    }

    pub fn landing_for(role: Role) -> Self {
        match role {
            Role::Admin => RedirectTarget::AdminRoot,
            Role::Employee => RedirectTarget::EmployeeDashboard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(Session),
    Redirect(RedirectTarget),
}

impl Session {
    /// Reads the token and user record. An unparsable user record counts as
    /// absent.
    pub fn load(storage: &LocalStorage) -> Option<Self> {
        let token = storage.get(TOKEN_KEY).filter(|token| !token.is_empty())?;
        let raw_user = storage.get(USER_KEY)?;
        match serde_json::from_str::<User>(raw_user) {
            Ok(user) => Some(Self {
                token: token.to_string(),
                user,
            }),
            Err(err) => {
                warn!("stored user record is unreadable: {err}");
                None
            }
        }
    }

    pub async fn persist(storage: &mut LocalStorage, login: &LoginResponse) -> ClientResult<Self> {
        let user = serde_json::to_string(&login.user)
            .map_err(|err| ClientError::Storage(err.to_string()))?;
        storage.set(TOKEN_KEY, login.token.as_str()).await?;
        storage.set(USER_KEY, user).await?;
        info!(username = %login.user.username, "session stored");
        Ok(Self {
            token: login.token.clone(),
            user: login.user.clone(),
        })
    }

    pub fn api(&self, base_url: &str) -> ApiClient {
        ApiClient::new(base_url).with_token(self.token.as_str())
    }
}

/// Precondition for every protected page load.
pub fn check_access(storage: &LocalStorage, page: Page) -> Access {
    let Some(session) = Session::load(storage) else {
        return Access::Redirect(RedirectTarget::Login);
    };
    if session.user.role != page.required_role() {
        return Access::Redirect(RedirectTarget::landing_for(session.user.role));
    }
    Access::Granted(session)
}

/// Tells the backend the token is done with, then forgets the session locally
/// whatever the backend answered.
pub async fn logout(storage: &mut LocalStorage, api: Option<&ApiClient>) -> ClientResult<()> {
    if let Some(api) = api {
        if let Err(err) = api.auth().logout().await {
            warn!("backend logout failed: {err}");
        }
    }
    storage.remove(TOKEN_KEY).await?;
    storage.remove(USER_KEY).await?;
    Ok(())
}
