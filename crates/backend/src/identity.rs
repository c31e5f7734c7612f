//! Identity provider trait.
//!
//! The storefront never authenticates anyone itself. It asks an
//! `IdentityProvider` for a principal and hands that to the backend layer.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard};

use apkstore_protocol::Principal;
use tracing::debug;

/// Errors reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("User is already authenticated")]
    AlreadyAuthenticated,

    #[error("login cancelled")]
    Cancelled,

    #[error("login failed: {0}")]
    Failed(String),
}

/// Abstract login/logout lifecycle of an external identity service.
pub trait IdentityProvider: Send + Sync {
    /// Starts an interactive login and resolves with the authenticated principal.
    fn login(&self) -> Pin<Box<dyn Future<Output = Result<Principal, IdentityError>> + Send + '_>>;

    /// Drops the provider-side session.
    fn logout(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Principal of the current session, if any.
    fn principal(&self) -> Option<Principal>;
}

/// Identity provider that always authenticates as one fixed principal.
///
/// Used by the host app when a `principal` is configured, and by tests.
pub struct StaticIdentity {
    principal: Principal,
    active: Mutex<bool>,
}

impl StaticIdentity {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            active: Mutex::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_active(&self, value: bool) {
        *self.lock() = value;
    }

    fn is_active(&self) -> bool {
        *self.lock()
    }
}

impl IdentityProvider for StaticIdentity {
    fn login(&self) -> Pin<Box<dyn Future<Output = Result<Principal, IdentityError>> + Send + '_>> {
        Box::pin(async move {
            if self.is_active() {
                return Err(IdentityError::AlreadyAuthenticated);
            }
            self.set_active(true);
            debug!(principal = %self.principal, "static identity logged in");
            Ok(self.principal.clone())
        })
    }

    fn logout(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.set_active(false);
        })
    }

    fn principal(&self) -> Option<Principal> {
        self.is_active().then(|| self.principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_then_logout() {
        let identity = StaticIdentity::new(Principal::new("caller-1"));
        assert!(identity.principal().is_none());

        let principal = identity.login().await.unwrap();
        assert_eq!(principal.as_str(), "caller-1");
        assert_eq!(identity.principal(), Some(principal));

        identity.logout().await;
        assert!(identity.principal().is_none());
    }

    #[tokio::test]
    async fn second_login_reports_already_authenticated() {
        let identity = StaticIdentity::new(Principal::new("caller-1"));
        identity.login().await.unwrap();
        let err = identity.login().await.unwrap_err();
        assert_eq!(err, IdentityError::AlreadyAuthenticated);
        assert!(err.to_string().contains("already authenticated"));
    }

    #[tokio::test]
    async fn poisoned_state_still_tracks_login() {
        let identity = StaticIdentity::new(Principal::new("caller-1"));
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = identity.active.lock().unwrap();
            panic!("holder panicked");
        }));
        assert!(identity.active.is_poisoned());

        identity.login().await.unwrap();
        assert_eq!(identity.principal(), Some(Principal::new("caller-1")));
        identity.logout().await;
        assert!(identity.principal().is_none());
    }
}
