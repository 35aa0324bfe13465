use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiResult;
use super::request::{resource_path, ApiRequest};
use super::transport::Transport;
use crate::models::{ApiResponse, Property, PropertyFilters, PropertyForm};

const PROPERTIES: &str = "/properties";

impl<T: Transport> ApiClient<T> {
    /// Public listing search
    pub async fn list_properties(&self, filters: &PropertyFilters) -> ApiResult<ApiResponse<Vec<Property>>> {
        let request = ApiRequest::get(PROPERTIES).public().query(filters.query());
        self.request(request).await
    }

    pub async fn featured_properties(&self) -> ApiResult<ApiResponse<Vec<Property>>> {
        let request = ApiRequest::get(format!("{}/featured", PROPERTIES)).public();
        self.request(request).await
    }

    pub async fn get_property(&self, id: &str) -> ApiResult<ApiResponse<Property>> {
        let request = ApiRequest::get(resource_path(PROPERTIES, id)?).public();
        self.request(request).await
    }

    /// Create a listing. Sent as multipart so the images are uploaded with it.
    pub async fn create_property(&self, form: &PropertyForm) -> ApiResult<ApiResponse<Property>> {
        let request = ApiRequest::post(PROPERTIES).multipart(form.to_multipart());
        self.request(request).await
    }

    /// Update a listing; only the fields set on the form are sent.
    pub async fn update_property(&self, id: &str, form: &PropertyForm) -> ApiResult<ApiResponse<Property>> {
        let request = ApiRequest::put(resource_path(PROPERTIES, id)?).multipart(form.to_multipart());
        self.request(request).await
    }

    /// Show or hide a listing on the public site
    pub async fn set_property_active(&self, id: &str, active: bool) -> ApiResult<ApiResponse<Property>> {
        self.update_property(id, &PropertyForm::active_only(active)).await
    }

    pub async fn delete_property(&self, id: &str) -> ApiResult<ApiResponse<Value>> {
        let request = ApiRequest::delete(resource_path(PROPERTIES, id)?);
        self.request(request).await
    }
}
