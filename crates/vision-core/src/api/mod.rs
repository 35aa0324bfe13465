//! REST API client module for the listing backend.
//!
//! This module provides the `ApiClient` for communicating with the backend
//! to browse listings, capture leads, and run the admin panel.
//!
//! Authenticated routes use JWT bearer tokens obtained from `/auth/login`
//! and kept in the client's `SessionStore`. A 401 on an authenticated call
//! clears the session and notifies subscribers with `SessionEvent::Expired`.

pub mod appointments;
pub mod auth;
pub mod client;
pub mod error;
pub mod properties;
pub mod request;
pub mod transport;
pub mod users;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, TransportError, GENERIC_ERROR_MESSAGE};
pub use request::{ApiRequest, FilePart, MultipartForm, PreparedRequest, Query, RequestBody};
pub use transport::{HttpTransport, RawResponse, Transport};
