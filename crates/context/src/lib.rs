//! Engagement state management (provider layer).
//!
//! Configuration, session and feature sources, service construction, and
//! the engagement provider that mediates between views and the backend.

#![warn(missing_docs)]

pub mod config;
pub mod session;
pub mod feature;
pub mod factory;
pub mod provider;

pub use config::{AppConfig, ConfigError, ConfigSource, StaticConfig};
pub use session::{Session, SessionSource, StaticSession};
pub use feature::{AppFeatures, FeatureSet, FeatureSource};
pub use factory::{Apiv1ServiceFactory, ServiceFactory};
pub use provider::{
    EngagementProvider, EngagementState, Operation, ProviderError, ProviderFailure, ProviderStatus,
};
