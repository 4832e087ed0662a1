//! Login and registration flows.
//!
//! Both flows validate the form locally before any request is sent, so the
//! server only sees well-formed credentials. A token in the response turns
//! into a [`Session`]; the password never leaves this module.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::error::LauncherError;
use crate::session::{Session, SessionStore};
use crate::validation::{Credentials, FieldError, FormKind};

/// Route of the login endpoint.
pub const LOGIN_ROUTE: &str = "login";

/// Route of the registration endpoint.
pub const REGISTER_ROUTE: &str = "register";

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    /// Whether the session was written to storage.
    pub remembered: bool,
}

impl LoginOutcome {
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Logs in with `credentials`.
///
/// With `remember` the session is persisted; otherwise it is only published
/// for this run.
///
/// # Errors
///
/// - [`LauncherError::Config`] when the form does not validate
/// - [`LauncherError::Decode`] when the server accepts but sends no token
/// - any request error from [`ApiClient::invoke_api_request`]
/// - [`LauncherError::Storage`] when the session cannot be persisted
#[instrument(skip(client, sessions, credentials), fields(email = %credentials.email))]
pub async fn login(
    client: &ApiClient,
    sessions: &SessionStore,
    credentials: &Credentials,
    remember: bool,
) -> Result<LoginOutcome, LauncherError> {
    reject_invalid(&credentials.validate(FormKind::Login))?;

    let body = LoginBody {
        email: credentials.email.trim(),
        password: &credentials.password,
    };
    let response = client.post::<Value, _>(LOGIN_ROUTE, &body).await?;
    let Some(token) = response.token.filter(|t| !t.is_empty()) else {
        warn!("login response carried no token");
        return Err(LauncherError::decode("The server did not return a session token."));
    };

    let session = Session {
        email: credentials.email.trim().to_string(),
        token,
        username: response
            .data
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string),
        language: None,
    };
    establish(sessions, session, remember)
}

/// Registers a new account.
///
/// When the server answers with a token the new account is logged in exactly
/// as [`login`] would. Otherwise the returned session carries no token and
/// nothing is published.
///
/// # Errors
///
/// Same as [`login`], except that a missing token is not an error.
#[instrument(skip(client, sessions, credentials), fields(username = %credentials.username))]
pub async fn register(
    client: &ApiClient,
    sessions: &SessionStore,
    credentials: &Credentials,
    remember: bool,
) -> Result<LoginOutcome, LauncherError> {
    reject_invalid(&credentials.validate(FormKind::Register))?;

    let body = RegisterBody {
        username: credentials.username.trim(),
        email: credentials.email.trim(),
        password: &credentials.password,
    };
    let response = client.post::<Value, _>(REGISTER_ROUTE, &body).await?;

    let session = Session {
        email: credentials.email.trim().to_string(),
        token: response.token.unwrap_or_default(),
        username: Some(credentials.username.trim().to_string()),
        language: None,
    };
    if !session.is_logged_in() {
        info!("account registered; login required");
        return Ok(LoginOutcome {
            session,
            remembered: false,
        });
    }
    establish(sessions, session, remember)
}

fn establish(
    sessions: &SessionStore,
    session: Session,
    remember: bool,
) -> Result<LoginOutcome, LauncherError> {
    if remember {
        sessions.save(session.clone())?;
    } else {
        sessions.publish(session.clone());
    }
    info!(email = %session.email, remembered = remember, "logged in");
    Ok(LoginOutcome {
        session,
        remembered: remember,
    })
}

fn reject_invalid(errors: &[FieldError]) -> Result<(), LauncherError> {
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Err(LauncherError::config(message))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiConfig;
    use crate::error::ErrorKind;
    use crate::http::HttpFetcher;
    use crate::session::{MemoryStorage, Storage, USER_KEY};
    use crate::version::VersionStore;

    fn unreachable_client() -> ApiClient {
        ApiClient::new(
            HttpFetcher::with_defaults().unwrap(),
            ApiConfig {
                base_url: "http://127.0.0.1".to_string(),
                port: Some(9),
                ..ApiConfig::default()
            },
            Arc::new(VersionStore::new("0.2.8")),
        )
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_form_before_sending() {
        let sessions = SessionStore::new(Arc::new(MemoryStorage::new()));
        let credentials = Credentials {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            ..Credentials::default()
        };

        let err = login(&unreachable_client(), &sessions, &credentials, true)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("valid email address"), "{err}");
        assert!(!sessions.session().is_logged_in());
    }

    #[tokio::test]
    async fn test_register_checks_confirm_password() {
        let sessions = SessionStore::new(Arc::new(MemoryStorage::new()));
        let credentials = Credentials {
            username: "player_1".to_string(),
            email: "player@example.com".to_string(),
            password: "Abcdef1!".to_string(),
            confirm_password: "Abcdef1?".to_string(),
        };

        let err = register(&unreachable_client(), &sessions, &credentials, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Passwords do not match"));
    }

    #[test]
    fn test_establish_without_remember_only_publishes() {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = SessionStore::new(storage.clone());
        let session = Session {
            email: "a@b.cd".to_string(),
            token: "t".to_string(),
            ..Session::default()
        };

        let outcome = establish(&sessions, session.clone(), false).unwrap();
        assert!(outcome.is_logged_in());
        assert!(!outcome.remembered);
        assert_eq!(sessions.session(), session);
        assert!(storage.get_item(USER_KEY).unwrap().is_none());
    }
}
