//! LodeStar core data models.
//!
//! This crate defines the engagement schema shared by the service,
//! provider and form layers.

#![warn(missing_docs)]

// Core identities
mod id;

// Engagement schema
mod engagement;
mod form_config;

// Filtering and sorting
mod filter;

// Re-exports
pub use id::*;

pub use engagement::{Engagement, EngagementUser, Launch};
pub use form_config::{EngagementFormConfig, FormOption, UserOptions, UserRoles};
pub use filter::{EngagementFilter, EngagementSortField, EngagementStatus, SortOption};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
