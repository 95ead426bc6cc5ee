//! Client library for the escolar school-management REST API.
//!
//! The backend issues short-lived JWT access tokens alongside longer-lived
//! refresh tokens. This crate owns that token lifecycle: the
//! [`auth::SessionManager`] validates and refreshes credentials, decodes
//! identity claims, and wraps every API call so that a request failing with
//! HTTP 401 is transparently retried once after a successful refresh.
//!
//! Domain services (institutions, headquarters, staff assignments, student
//! attendance, absence justifications) are thin consumers of the shared
//! [`api::ApiClient`]; they supply only endpoint paths and typed models.

pub mod api;
pub mod auth;
pub mod config;
pub mod export;
pub mod models;
pub mod services;

pub use api::{ApiClient, ApiError};
pub use auth::{Identity, Session, SessionManager, SessionStore, TokenSet};
pub use config::Config;
