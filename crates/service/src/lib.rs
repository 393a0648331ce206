//! Engagement service abstraction and implementations for LodeStar.
//!
//! This crate provides a trait-based service interface with a versioned
//! REST implementation and an in-memory one for demos and tests.

#![warn(missing_docs)]

pub mod trait_;
pub mod apiv1;
pub mod faked;

pub use trait_::{EngagementService, ErrorKind, Result, ServiceError};
pub use apiv1::Apiv1EngagementService;
pub use faked::FakedEngagementService;
