//! Core library for vision-admin.
//!
//! A session-aware client for the Vision real-estate backend: listing search
//! and detail, lead capture, and the admin panel's property, lead and user
//! management. The hosting application owns one `ApiClient`, which owns the
//! `SessionStore`; session changes are reported through `SessionEvent`s.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult};
pub use auth::{Session, SessionEvent, SessionStore};
pub use config::Config;
