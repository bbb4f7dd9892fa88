//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs (activity logging,
//!   templated e-mail, proposals).
//! - Provide read-side projections for views (search, boards, analytics).

pub mod activity_service;
pub mod analytics;
pub mod datetime;
pub mod email_templates;
pub mod query;
