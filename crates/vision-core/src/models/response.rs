use serde::{Deserialize, Serialize};

use super::User;
use crate::api::error::{ApiError, ApiResult};

fn success_default() -> bool {
    true
}

/// Standard response envelope: `{ success, data, message, count }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct ApiResponse<T> {
    /// Absent on some 2xx bodies; the status already said it worked
    #[serde(default = "success_default")]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// The `data` payload, or `MalformedResponse` when the backend left it out.
    pub fn into_data(self) -> ApiResult<T> {
        self.data
            .ok_or_else(|| ApiError::MalformedResponse("response has no data field".to_string()))
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default = "success_default")]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /auth/me`. Older backends put the profile under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub data: Option<User>,
}

impl MeResponse {
    pub fn into_user(self) -> Option<User> {
        self.user.or(self.data)
    }
}
