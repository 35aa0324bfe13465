use serde::Serialize;
use tracing::{debug, info, warn};

use super::client::ApiClient;
use super::error::{ApiError, ApiResult};
use super::request::ApiRequest;
use super::transport::Transport;
use crate::auth::{Session, SessionEvent};
use crate::models::{LoginResponse, MeResponse, User};

/// Message used when a 2xx login response carries no token
const LOGIN_FAILED_MESSAGE: &str = "Login failed";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl<T: Transport> ApiClient<T> {
    /// Log in and persist the returned token and profile.
    ///
    /// Failures leave any previously stored session untouched.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let request = ApiRequest::post("/auth/login")
            .public()
            .json(&Credentials { username, password })?;

        let response: LoginResponse = self.request(request).await?;

        let token = match response.token.filter(|t| !t.trim().is_empty()) {
            Some(token) if response.success => token,
            _ => {
                return Err(ApiError::Api {
                    status: 200,
                    message: response
                        .message
                        .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_string()),
                })
            }
        };

        let session = Session {
            token,
            user: response.user,
        };
        self.session()
            .store(&session)
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;

        info!(username = username, "Logged in");
        self.emit(SessionEvent::LoggedIn {
            username: username.to_string(),
        });
        Ok(session)
    }

    /// Fetch the current user, confirming the stored token is still accepted.
    /// Refreshes the cached profile on success.
    pub async fn me(&self) -> ApiResult<User> {
        let response: MeResponse = self.request(ApiRequest::get("/auth/me")).await?;
        let user = response
            .into_user()
            .ok_or_else(|| ApiError::MalformedResponse("response has no user".to_string()))?;

        // A logout may have landed while the request was in flight
        if self.session().token().is_none() {
            debug!("Session cleared during profile fetch, not caching user");
        } else if let Err(e) = self.session().set_user(&user) {
            warn!(error = %e, "Failed to refresh cached user profile");
        }
        Ok(user)
    }

    /// Forget the session. Never fails and needs no backend call.
    pub fn logout(&self) {
        if let Err(e) = self.session().clear() {
            warn!(error = %e, "Failed to clear session on logout");
        }
        info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().current_user()
    }
}
