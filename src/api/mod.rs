//! REST API client module for the escolar backend.
//!
//! This module provides the `ApiClient` shared by every domain service.
//! Requests carry the session's bearer token; a 401 response triggers the
//! token-refresh protocol in [`crate::auth::SessionManager`] and exactly one
//! transparent retry.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
