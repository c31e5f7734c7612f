//! Login/logout lifecycle.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use apkstore_backend::{IdentityError, IdentityProvider};
use apkstore_protocol::Principal;
use apkstore_query::{ProfileState, StoreClient};
use tracing::{info, warn};

use crate::error::SessionError;

/// Pause between dropping a stale provider session and logging in again.
pub const RELOGIN_DELAY: Duration = Duration::from_millis(300);

/// Where the login flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginStatus {
    #[default]
    Idle,
    LoggingIn,
    Authenticated,
    LoginError(String),
}

impl LoginStatus {
    pub fn is_logging_in(&self) -> bool {
        matches!(self, LoginStatus::LoggingIn)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoginStatus::LoginError(message) => Some(message),
            _ => None,
        }
    }
}

/// Current login state plus the store client it gates.
pub struct Session {
    provider: Arc<dyn IdentityProvider>,
    client: Arc<StoreClient>,
    status: Mutex<LoginStatus>,
}

impl Session {
    pub fn new(provider: Arc<dyn IdentityProvider>, client: Arc<StoreClient>) -> Self {
        Self {
            provider,
            client,
            status: Mutex::new(LoginStatus::Idle),
        }
    }

    pub fn client(&self) -> &Arc<StoreClient> {
        &self.client
    }

    fn lock(&self) -> MutexGuard<'_, LoginStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, status: LoginStatus) {
        *self.lock() = status;
    }

    pub fn status(&self) -> LoginStatus {
        self.lock().clone()
    }

    /// Adopts a session the provider already holds, e.g. one restored at startup.
    pub fn resume(&self) -> bool {
        match self.provider.principal() {
            Some(principal) => {
                info!(principal = %principal, "resumed identity session");
                self.client.set_identity(Some(principal));
                self.set_status(LoginStatus::Authenticated);
                true
            }
            None => false,
        }
    }

    /// Logs in through the identity provider.
    ///
    /// A provider that reports a stale session is logged out and asked once
    /// more after [`RELOGIN_DELAY`].
    pub async fn login(&self) -> Result<Principal, SessionError> {
        self.set_status(LoginStatus::LoggingIn);

        let result = match self.provider.login().await {
            Err(err) if is_already_authenticated(&err) => {
                warn!("identity provider holds a stale session, retrying login");
                self.provider.logout().await;
                tokio::time::sleep(RELOGIN_DELAY).await;
                self.provider.login().await
            }
            other => other,
        };

        match result {
            Ok(principal) => {
                info!(principal = %principal, "logged in");
                self.client.set_identity(Some(principal.clone()));
                self.set_status(LoginStatus::Authenticated);
                Ok(principal)
            }
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "login failed");
                self.set_status(LoginStatus::LoginError(message.clone()));
                Err(SessionError::Login(message))
            }
        }
    }

    /// Ends the provider session, drops the identity and clears every cached query.
    pub async fn logout(&self) {
        self.provider.logout().await;
        self.client.set_identity(None);
        self.client.clear();
        self.set_status(LoginStatus::Idle);
        info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.client.identity()
    }

    /// Any authenticated caller sees the upload affordance; the backend
    /// still decides whether the upload is accepted.
    pub fn can_upload(&self) -> bool {
        self.is_authenticated()
    }

    /// True once the caller's profile was fetched and found missing.
    pub fn should_prompt_profile_setup(&self) -> bool {
        self.is_authenticated() && self.client.profile_state() == ProfileState::Absent
    }
}

fn is_already_authenticated(err: &IdentityError) -> bool {
    match err {
        IdentityError::AlreadyAuthenticated => true,
        IdentityError::Failed(message) => message == "User is already authenticated",
        IdentityError::Cancelled => false,
    }
}
