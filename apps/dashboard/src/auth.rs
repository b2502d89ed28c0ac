use std::fmt;
use std::sync::Arc;

use mokart_api_core::{ApiError, AuthApi, DEMO_EMAIL, DEMO_PASSWORD};
use model::{AuthResponse, AuthUser, Credentials, Registration};
use tracing::{error, info, warn};

use crate::store::{SessionStore, StoreError, StoredSession};

pub const UNREACHABLE_MESSAGE: &str = "could not reach server";
pub const DEMO_UNAVAILABLE_MESSAGE: &str = "demo mode unavailable, create an account";

/// What the user gets to see when signing in fails. There is no retry; the
/// user resubmits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Invalid credentials or any other error reported by the service.
    Rejected(String),
    Unreachable,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::Rejected(msg) => f.write_str(msg),
            AuthFailure::Unreachable => f.write_str(UNREACHABLE_MESSAGE),
        }
    }
}

impl std::error::Error for AuthFailure {}

impl From<ApiError> for AuthFailure {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Rejected(msg) => AuthFailure::Rejected(msg),
            // an unreadable answer is treated like no answer at all
            other => {
                warn!(error = %other, "auth request failed");
                AuthFailure::Unreachable
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub message: String,
    pub user: AuthUser,
    /// False when the service signed the user up without opening a session
    /// (e.g. email confirmation pending) or the store could not be written.
    pub signed_in: bool,
}

pub struct AuthFlow<A: AuthApi + ?Sized> {
    api: Arc<A>,
    store: Arc<dyn SessionStore>,
}

impl<A: AuthApi + ?Sized> AuthFlow<A> {
    pub fn new(api: Arc<A>, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthFailure> {
        let resp = self.api.login(credentials).await?;
        Ok(self.accept(resp))
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthOutcome, AuthFailure> {
        let resp = self.api.register(registration).await?;
        Ok(self.accept(resp))
    }

    pub async fn demo_login(&self) -> Result<AuthOutcome, AuthFailure> {
        let creds = Credentials { email: DEMO_EMAIL.to_string(), password: DEMO_PASSWORD.to_string() };
        match self.api.login(&creds).await {
            Ok(resp) => Ok(self.accept(resp)),
            Err(ApiError::Rejected(_)) => Err(AuthFailure::Rejected(DEMO_UNAVAILABLE_MESSAGE.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear()?;
        info!("signed out");
        Ok(())
    }

    fn accept(&self, resp: AuthResponse) -> AuthOutcome {
        let AuthResponse { user, session, message } = resp;
        let signed_in = match session {
            Some(tokens) => {
                let stored = StoredSession { tokens, user: user.clone() };
                match self.store.save(&stored) {
                    Ok(()) => {
                        info!(email = %user.email, "signed in");
                        true
                    }
                    Err(e) => {
                        error!(error = %e, "could not persist session");
                        false
                    }
                }
            }
            None => false,
        };
        AuthOutcome { message, user, signed_in }
    }
}
