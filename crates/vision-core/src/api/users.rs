use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiResult;
use super::request::{resource_path, ApiRequest};
use super::transport::Transport;
use crate::models::{ApiResponse, User, UserForm};

const USERS: &str = "/users";

// Admin-only routes; the backend enforces who may call them.
impl<T: Transport> ApiClient<T> {
    pub async fn list_users(&self) -> ApiResult<ApiResponse<Vec<User>>> {
        self.request(ApiRequest::get(USERS)).await
    }

    pub async fn list_brokers(&self) -> ApiResult<ApiResponse<Vec<User>>> {
        self.request(ApiRequest::get(format!("{}/brokers", USERS))).await
    }

    pub async fn get_user(&self, id: &str) -> ApiResult<ApiResponse<User>> {
        self.request(ApiRequest::get(resource_path(USERS, id)?)).await
    }

    pub async fn create_user(&self, form: &UserForm) -> ApiResult<ApiResponse<User>> {
        let request = ApiRequest::post(USERS).json(form)?;
        self.request(request).await
    }

    pub async fn update_user(&self, id: &str, form: &UserForm) -> ApiResult<ApiResponse<User>> {
        let request = ApiRequest::put(resource_path(USERS, id)?).json(form)?;
        self.request(request).await
    }

    pub async fn delete_user(&self, id: &str) -> ApiResult<ApiResponse<Value>> {
        self.request(ApiRequest::delete(resource_path(USERS, id)?)).await
    }
}
