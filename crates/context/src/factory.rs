//! Engagement service construction.

use std::sync::Arc;

use lodestar_service::{Apiv1EngagementService, EngagementService, ServiceError};

use crate::config::AppConfig;
use crate::session::Session;

/// Builds the engagement service for a configuration and session.
///
/// Closures with the same signature implement this trait.
pub trait ServiceFactory: Send + Sync {
    /// Build a service.
    fn build(&self, config: &AppConfig, session: &Session) -> Result<Arc<dyn EngagementService>, ServiceError>;
}

impl<F> ServiceFactory for F
where
    F: Fn(&AppConfig, &Session) -> Result<Arc<dyn EngagementService>, ServiceError> + Send + Sync,
{
    fn build(&self, config: &AppConfig, session: &Session) -> Result<Arc<dyn EngagementService>, ServiceError> {
        self(config, session)
    }
}

/// Builds [`Apiv1EngagementService`] with a session-authenticated client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Apiv1ServiceFactory;

impl ServiceFactory for Apiv1ServiceFactory {
    fn build(&self, config: &AppConfig, session: &Session) -> Result<Arc<dyn EngagementService>, ServiceError> {
        let client = session.http_client(config.request_timeout())?;
        let service = Apiv1EngagementService::new(&config.backend_url, client)?;
        Ok(Arc::new(service))
    }
}
