//! Session credentials and the authenticated HTTP client.

use std::sync::RwLock;
use std::time::Duration;

use lodestar_service::ServiceError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;

/// An authenticated (or anonymous) session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    /// Logged-in user, if any
    pub identity: Option<String>,

    /// Bearer token sent with every request
    pub access_token: Option<String>,
}

impl Session {
    /// A session without credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in session.
    pub fn authenticated(identity: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            access_token: Some(access_token.into()),
        }
    }

    /// Whether credentials are present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build an HTTP client carrying this session's credentials.
    pub fn http_client(&self, timeout: Duration) -> Result<Client, ServiceError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ServiceError::InvalidConfig(format!("invalid access token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InvalidConfig(e.to_string()))
    }
}

/// Supplies the current session. Changes on login and logout.
pub trait SessionSource: Send + Sync {
    /// Current session snapshot.
    fn current_session(&self) -> Session;
}

/// Session held in memory.
#[derive(Debug, Default)]
pub struct StaticSession {
    session: RwLock<Session>,
}

impl StaticSession {
    /// Wrap a session.
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    /// Replace the session with a logged-in one.
    pub fn login(&self, identity: impl Into<String>, access_token: impl Into<String>) {
        self.replace(Session::authenticated(identity, access_token));
    }

    /// Drop credentials.
    pub fn logout(&self) {
        self.replace(Session::anonymous());
    }

    fn replace(&self, session: Session) {
        match self.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

impl SessionSource for StaticSession {
    fn current_session(&self) -> Session {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_service::ErrorKind;

    #[test]
    fn test_login_logout() {
        let source = StaticSession::default();
        assert!(!source.current_session().is_authenticated());

        source.login("ada", "t0ken");
        assert_eq!(source.current_session().identity.as_deref(), Some("ada"));

        source.logout();
        assert_eq!(source.current_session(), Session::anonymous());
    }

    #[test]
    fn test_client_rejects_bad_token() {
        let session = Session::authenticated("ada", "bad\ntoken");
        let err = session.http_client(Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
