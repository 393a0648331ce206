//! In-memory engagement service.
//!
//! Used by the CLI's demo mode and by tests that need a backend without
//! a network. Supports injected failures and artificial latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lodestar_core::{Engagement, EngagementFormConfig, EngagementUser, FormOption, Launch};
use tokio::sync::Mutex;
use tracing::debug;

use super::{EngagementService, Result, ServiceError};

/// In-memory backend.
#[derive(Clone, Default)]
pub struct FakedEngagementService {
    engagements: Arc<Mutex<Vec<Engagement>>>,
    form_config: EngagementFormConfig,
    fail_next: Arc<Mutex<Option<ServiceError>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FakedEngagementService {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding `engagements`.
    pub fn with_engagements(engagements: Vec<Engagement>) -> Self {
        Self {
            engagements: Arc::new(Mutex::new(engagements)),
            ..Self::default()
        }
    }

    /// Serve `config` from `fetch_form_config`.
    pub fn with_form_config(mut self, config: EngagementFormConfig) -> Self {
        self.form_config = config;
        self
    }

    /// Delay every call by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Backend seeded with sample data and the standard role options.
    pub fn demo() -> Self {
        let mut rocket = Engagement::draft("Acme", "Rocket");
        rocket.description = Some("Container platform adoption".to_string());
        rocket.engagement_users.push(EngagementUser::new(
            "ada@acme.example",
            "Ada",
            "Lovelace",
            "developer",
        ));
        let dome = Engagement::draft("Globex", "Dome");

        let mut config = EngagementFormConfig::default();
        config.user_options.user_roles.options = vec![
            FormOption::new("Developer", "developer"),
            FormOption::new("Admin", "admin"),
            FormOption::new("Observer", "observer"),
        ];

        Self::with_engagements(vec![rocket, dome]).with_form_config(config)
    }

    /// Make the next call fail with `error`.
    pub async fn fail_next(&self, error: ServiceError) {
        *self.fail_next.lock().await = Some(error);
    }

    /// Replace the stored engagements.
    pub async fn set_engagements(&self, engagements: Vec<Engagement>) {
        *self.engagements.lock().await = engagements;
    }

    /// Number of calls served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, op: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("faked service: {}", op);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_next.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn upsert(&self, engagement: Engagement) -> Engagement {
        let mut all = self.engagements.lock().await;
        match all.iter_mut().find(|e| e.id == engagement.id) {
            Some(existing) => *existing = engagement.clone(),
            None => all.push(engagement.clone()),
        }
        engagement
    }
}

#[async_trait]
impl EngagementService for FakedEngagementService {
    async fn fetch_engagements(&self) -> Result<Vec<Engagement>> {
        self.enter("fetch_engagements").await?;
        Ok(self.engagements.lock().await.clone())
    }

    async fn create_engagement(&self, data: &Engagement) -> Result<Engagement> {
        self.enter("create_engagement").await?;
        let exists = self.engagements.lock().await.iter().any(|e| {
            e.customer_name == data.customer_name && e.project_name == data.project_name
        });
        if exists {
            return Err(ServiceError::Server {
                status: 409,
                body: format!("{}/{} already exists", data.customer_name, data.project_name),
            });
        }
        Ok(self.upsert(data.clone()).await)
    }

    async fn save_engagement(&self, data: &Engagement) -> Result<Engagement> {
        self.enter("save_engagement").await?;
        let known = self.engagements.lock().await.iter().any(|e| e.id == data.id);
        if !known {
            return Err(ServiceError::Server {
                status: 404,
                body: format!("engagement {} not found", data.id),
            });
        }
        Ok(self.upsert(data.clone()).await)
    }

    async fn launch_engagement(&self, data: &Engagement) -> Result<Engagement> {
        self.enter("launch_engagement").await?;
        let mut launched = data.clone();
        launched.launch = Some(Launch {
            launched_by: "faked".to_string(),
            launched_date_time: Some(chrono::Utc::now()),
        });
        Ok(self.upsert(launched).await)
    }

    async fn fetch_form_config(&self) -> Result<EngagementFormConfig> {
        self.enter("fetch_form_config").await?;
        Ok(self.form_config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_create_then_fetch() {
        let service = FakedEngagementService::new();
        let created = service
            .create_engagement(&Engagement::draft("Acme", "Rocket"))
            .await
            .unwrap();

        let all = service.fetch_engagements().await.unwrap();
        assert_eq!(all, vec![created]);
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let service = FakedEngagementService::new();
        service.create_engagement(&Engagement::draft("Acme", "Rocket")).await.unwrap();

        let err = service
            .create_engagement(&Engagement::draft("Acme", "Rocket"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Server { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let service = FakedEngagementService::demo();
        service.fail_next(ServiceError::Network("offline".into())).await;

        assert_eq!(service.fetch_engagements().await.unwrap_err().kind(), ErrorKind::Network);
        assert_eq!(service.fetch_engagements().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_launch_sets_launch_record() {
        let service = FakedEngagementService::demo();
        let first = service.fetch_engagements().await.unwrap().remove(0);

        let launched = service.launch_engagement(&first).await.unwrap();
        assert!(launched.is_launched());
        assert_eq!(launched.id, first.id);
    }
}
