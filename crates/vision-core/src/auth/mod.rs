//! Authentication state: the session store and remembered credentials.
//!
//! This module provides:
//! - `SessionStore`: bearer token and cached user profile over a `SessionStorage`
//! - `FileStorage` / `MemoryStorage`: durable and process-local storage backends
//! - `SessionEvent`: lifecycle notifications (login, logout, expiry)
//! - `CredentialStore`: Secure OS-level credential storage via keyring
//!
//! Sessions persist until logout or until the backend answers 401.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{
    FileStorage, MemoryStorage, Session, SessionEvent, SessionListener, SessionStorage,
    SessionStore,
};
