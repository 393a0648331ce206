//! Engagement service trait abstraction.

use async_trait::async_trait;
use lodestar_core::{Engagement, EngagementFormConfig};

/// Error type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No response: connection, timeout or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("Server error ({status}): {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The service cannot be built or addressed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure
    Network,
    /// Non-2xx response
    Server,
    /// Undecodable body
    Decode,
    /// Bad configuration
    Config,
}

impl ServiceError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Network(_) => ErrorKind::Network,
            ServiceError::Server { .. } => ErrorKind::Server,
            ServiceError::Decode(_) => ErrorKind::Decode,
            ServiceError::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Whether retrying the same request can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network(_) => true,
            ServiceError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::Decode(e.to_string())
        } else if e.is_builder() {
            ServiceError::InvalidConfig(e.to_string())
        } else if let Some(status) = e.status() {
            ServiceError::Server {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            ServiceError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Decode(e.to_string())
    }
}

/// Backend access for engagements.
///
/// Implementations are bound to one API version; callers only see this
/// trait so the wire format can change without touching them.
#[async_trait]
pub trait EngagementService: Send + Sync {
    /// Fetch all engagements visible to the session.
    async fn fetch_engagements(&self) -> Result<Vec<Engagement>>;

    /// Create an engagement and return the backend's copy.
    async fn create_engagement(&self, data: &Engagement) -> Result<Engagement>;

    /// Save changes to an existing engagement.
    async fn save_engagement(&self, data: &Engagement) -> Result<Engagement>;

    /// Launch an engagement's environment.
    async fn launch_engagement(&self, data: &Engagement) -> Result<Engagement>;

    /// Fetch form options (roles etc.).
    async fn fetch_form_config(&self) -> Result<EngagementFormConfig>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ServiceError::Network("refused".into()).kind(), ErrorKind::Network);
        assert_eq!(
            ServiceError::Server { status: 404, body: String::new() }.kind(),
            ErrorKind::Server
        );
        assert_eq!(ServiceError::Decode("eof".into()).kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_retryable() {
        assert!(ServiceError::Network("timeout".into()).is_retryable());
        assert!(ServiceError::Server { status: 503, body: String::new() }.is_retryable());
        assert!(!ServiceError::Server { status: 400, body: String::new() }.is_retryable());
        assert!(!ServiceError::InvalidConfig("no url".into()).is_retryable());
    }
}
