//! Engagement provider: session-scoped engagement state.
//!
//! The provider owns the engagement list, the active selection and the
//! request status. Views read snapshots and call operations; every
//! operation goes through the memoized [`EngagementService`].
//!
//! Fetches are last-fetch-wins: each one takes a generation number and a
//! response that lands after a newer fetch started is dropped. After
//! [`EngagementProvider::unmount`] in-flight requests are abandoned and
//! their results never reach the state.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use lodestar_core::{Engagement, EngagementFormConfig, EngagementId};
use lodestar_service::{EngagementService, ErrorKind, ServiceError};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ConfigSource};
use crate::factory::ServiceFactory;
use crate::session::{Session, SessionSource};

/// Error type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors returned by provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The backend call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The provider was torn down
    #[error("Engagement provider has been unmounted")]
    Unmounted,
}

/// Provider operations, as recorded in failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing engagements
    Fetch,
    /// Creating an engagement
    Create,
    /// Saving an engagement
    Save,
    /// Launching an engagement
    Launch,
    /// Loading form options
    FormConfig,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch engagements",
            Operation::Create => "create engagement",
            Operation::Save => "save engagement",
            Operation::Launch => "launch engagement",
            Operation::FormConfig => "load form config",
        };
        f.write_str(name)
    }
}

/// A failed operation, kept in state so views can offer a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// What was attempted
    pub operation: Operation,

    /// Error class
    pub kind: ErrorKind,

    /// Human readable message
    pub message: String,

    /// Whether retrying can help
    pub retryable: bool,
}

impl ProviderFailure {
    fn new(operation: Operation, error: &ServiceError) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Request status of the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderStatus {
    /// Nothing fetched yet
    #[default]
    Uninitialized,
    /// A fetch is in flight
    Loading,
    /// The list reflects the last successful fetch
    Ready,
    /// The last operation failed
    Error(ProviderFailure),
}

impl ProviderStatus {
    /// The failure, if in the error state.
    pub fn failure(&self) -> Option<&ProviderFailure> {
        match self {
            ProviderStatus::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Snapshot of provider state.
#[derive(Debug, Clone, Default)]
pub struct EngagementState {
    /// Engagements, exactly as last fetched plus local creations
    pub engagements: Vec<Engagement>,

    /// Selected engagement; not checked against `engagements`
    pub active_engagement: Option<Engagement>,

    /// Request status
    pub status: ProviderStatus,

    /// Form options, once loaded
    pub form_config: Option<EngagementFormConfig>,

    /// The active engagement has edits not yet saved
    pub has_unsaved_edits: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceKey {
    backend_url: String,
    request_timeout_secs: u64,
    identity: Option<String>,
    access_token: Option<String>,
}

impl ServiceKey {
    fn new(config: &AppConfig, session: &Session) -> Self {
        Self {
            backend_url: config.backend_url.clone(),
            request_timeout_secs: config.request_timeout_secs,
            identity: session.identity.clone(),
            access_token: session.access_token.clone(),
        }
    }
}

struct ServiceSlot {
    key: ServiceKey,
    service: Arc<dyn EngagementService>,
}

/// Session-scoped engagement state holder.
pub struct EngagementProvider {
    config: Arc<dyn ConfigSource>,
    session: Arc<dyn SessionSource>,
    factory: Arc<dyn ServiceFactory>,
    service: Mutex<Option<ServiceSlot>>,
    state: RwLock<EngagementState>,
    fetch_generation: AtomicU64,
    fetched: AtomicBool,
    cancel: CancellationToken,
}

impl EngagementProvider {
    /// Create a provider. Nothing is fetched until [`Self::get_engagements`].
    pub fn new(
        config: Arc<dyn ConfigSource>,
        session: Arc<dyn SessionSource>,
        factory: Arc<dyn ServiceFactory>,
    ) -> Self {
        Self {
            config,
            session,
            factory,
            service: Mutex::new(None),
            state: RwLock::new(EngagementState::default()),
            fetch_generation: AtomicU64::new(0),
            fetched: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    // === Reads ===

    /// Full state snapshot.
    pub async fn state(&self) -> EngagementState {
        self.state.read().await.clone()
    }

    /// Current engagements.
    pub async fn engagements(&self) -> Vec<Engagement> {
        self.state.read().await.engagements.clone()
    }

    /// Current selection.
    pub async fn active_engagement(&self) -> Option<Engagement> {
        self.state.read().await.active_engagement.clone()
    }

    /// Request status.
    pub async fn status(&self) -> ProviderStatus {
        self.state.read().await.status.clone()
    }

    /// Cached form options.
    pub async fn form_config(&self) -> Option<EngagementFormConfig> {
        self.state.read().await.form_config.clone()
    }

    /// Whether the provider is still mounted.
    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    // === Selection ===

    /// Select an engagement. No membership check is made.
    pub async fn set_active_engagement(&self, engagement: Engagement) {
        let mut state = self.state.write().await;
        debug!("Active engagement set to {}", engagement.id);
        state.active_engagement = Some(engagement);
        state.has_unsaved_edits = false;
    }

    /// Clear the selection.
    pub async fn clear_active_engagement(&self) {
        let mut state = self.state.write().await;
        state.active_engagement = None;
        state.has_unsaved_edits = false;
    }

    /// Replace the selection with an edited copy and mark it unsaved.
    pub async fn edit_active_engagement(&self, edited: Engagement) {
        let mut state = self.state.write().await;
        state.active_engagement = Some(edited);
        state.has_unsaved_edits = true;
    }

    // === Backend operations ===

    /// Fetch engagements and replace the list with exactly the result.
    ///
    /// The active engagement is left untouched. A response superseded by a
    /// newer fetch is dropped and this call returns `Ok(())`.
    pub async fn get_engagements(&self) -> Result<()> {
        let service = self.service_for(Operation::Fetch).await?;
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.status = ProviderStatus::Loading;

        let result = self.guarded(service.fetch_engagements()).await;

        let mut state = self.state.write().await;
        if generation != self.fetch_generation.load(Ordering::SeqCst) {
            debug!("Discarding engagements from superseded fetch #{}", generation);
            return Ok(());
        }

        match result {
            Ok(engagements) => {
                if state.has_unsaved_edits {
                    if let Some(active) = &state.active_engagement {
                        warn!(
                            "Refetch replaced engagement list while {} has unsaved edits; \
                             list entries now reflect the backend",
                            active.id
                        );
                    }
                }
                info!("Loaded {} engagements", engagements.len());
                state.engagements = engagements;
                state.status = ProviderStatus::Ready;
                self.fetched.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(ProviderError::Service(e)) => {
                warn!("Failed to {}: {}", Operation::Fetch, e);
                state.status = ProviderStatus::Error(ProviderFailure::new(Operation::Fetch, &e));
                Err(e.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Create an engagement and append the backend's copy to the list.
    pub async fn create_engagement(&self, data: Engagement) -> Result<Engagement> {
        let service = self.service_for(Operation::Create).await?;
        let result = self.guarded(service.create_engagement(&data)).await;
        let created = self.record_outcome(Operation::Create, result).await?;

        let mut state = self.state.write().await;
        upsert(&mut state.engagements, created.clone());
        info!("Created engagement {} ({}/{})", created.id, created.customer_name, created.project_name);
        Ok(created)
    }

    /// Save an engagement, updating the list and the selection.
    pub async fn save_engagement(&self, data: Engagement) -> Result<Engagement> {
        let service = self.service_for(Operation::Save).await?;
        let result = self.guarded(service.save_engagement(&data)).await;
        let saved = self.record_outcome(Operation::Save, result).await?;

        self.apply_saved(&data.id, saved.clone()).await;
        info!("Saved engagement {}", saved.id);
        Ok(saved)
    }

    /// Launch an engagement, updating the list and the selection.
    pub async fn launch_engagement(&self, data: Engagement) -> Result<Engagement> {
        let service = self.service_for(Operation::Launch).await?;
        let result = self.guarded(service.launch_engagement(&data)).await;
        let launched = self.record_outcome(Operation::Launch, result).await?;

        self.apply_saved(&data.id, launched.clone()).await;
        info!("Launched engagement {}", launched.id);
        Ok(launched)
    }

    /// Fetch and cache form options.
    pub async fn load_form_config(&self) -> Result<EngagementFormConfig> {
        let service = self.service_for(Operation::FormConfig).await?;
        let result = self.guarded(service.fetch_form_config()).await;
        let config = self.record_outcome(Operation::FormConfig, result).await?;

        self.state.write().await.form_config = Some(config.clone());
        Ok(config)
    }

    /// Tear the provider down. In-flight requests are abandoned.
    pub fn unmount(&self) {
        if !self.cancel.is_cancelled() {
            info!("Engagement provider unmounted");
            self.cancel.cancel();
        }
    }

    // === Internals ===

    /// Memoized service for the current config and session.
    async fn service_for(&self, operation: Operation) -> Result<Arc<dyn EngagementService>> {
        if self.cancel.is_cancelled() {
            return Err(ProviderError::Unmounted);
        }

        let config = self.config.app_config();
        let session = self.session.current_session();
        let key = ServiceKey::new(&config, &session);

        let mut slot = self.service.lock().await;
        if let Some(existing) = slot.as_ref() {
            if existing.key == key {
                return Ok(existing.service.clone());
            }
            debug!("Configuration or session changed, rebuilding engagement service");
        }

        match self.factory.build(&config, &session) {
            Ok(service) => {
                debug!("Built engagement service for {}", config.backend_url);
                *slot = Some(ServiceSlot {
                    key,
                    service: service.clone(),
                });
                Ok(service)
            }
            Err(e) => {
                drop(slot);
                warn!("Cannot build engagement service: {}", e);
                self.state.write().await.status = ProviderStatus::Error(ProviderFailure::new(operation, &e));
                Err(e.into())
            }
        }
    }

    /// Run a request unless the provider is unmounted first.
    async fn guarded<T>(
        &self,
        request: impl Future<Output = lodestar_service::Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ProviderError::Unmounted),
            result = request => {
                if self.cancel.is_cancelled() {
                    return Err(ProviderError::Unmounted);
                }
                result.map_err(ProviderError::from)
            }
        }
    }

    /// Record the outcome of a non-fetch operation in the status.
    ///
    /// Failures set `Error`; success clears an error left by an earlier
    /// non-fetch operation. Fetch errors persist until a fetch succeeds.
    async fn record_outcome<T>(&self, operation: Operation, result: Result<T>) -> Result<T> {
        let mut state = self.state.write().await;
        match result {
            Ok(value) => {
                if let ProviderStatus::Error(failure) = &state.status {
                    if failure.operation != Operation::Fetch {
                        state.status = if self.fetched.load(Ordering::SeqCst) {
                            ProviderStatus::Ready
                        } else {
                            ProviderStatus::Uninitialized
                        };
                    }
                }
                Ok(value)
            }
            Err(ProviderError::Service(e)) => {
                warn!("Failed to {}: {}", operation, e);
                state.status = ProviderStatus::Error(ProviderFailure::new(operation, &e));
                Err(e.into())
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_saved(&self, original_id: &EngagementId, saved: Engagement) {
        let mut state = self.state.write().await;
        if &saved.id != original_id {
            state.engagements.retain(|e| e.id != saved.id);
        }
        if let Some(pos) = state.engagements.iter().position(|e| &e.id == original_id) {
            state.engagements[pos] = saved.clone();
        } else {
            upsert(&mut state.engagements, saved.clone());
        }

        let is_active = state
            .active_engagement
            .as_ref()
            .is_some_and(|a| &a.id == original_id || a.id == saved.id);
        if is_active {
            state.active_engagement = Some(saved);
            state.has_unsaved_edits = false;
        }
    }
}

/// Replace the entry with the same id, or append.
fn upsert(engagements: &mut Vec<Engagement>, engagement: Engagement) {
    match engagements.iter_mut().find(|e| e.id == engagement.id) {
        Some(existing) => *existing = engagement,
        None => engagements.push(engagement),
    }
}
