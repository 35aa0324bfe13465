use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiResult;
use super::request::{resource_path, ApiRequest};
use super::transport::Transport;
use crate::models::appointment::StatusUpdate;
use crate::models::{ApiResponse, Appointment, AppointmentFilters, NewAppointment};

const APPOINTMENTS: &str = "/appointments";

impl<T: Transport> ApiClient<T> {
    /// Public lead capture from a property page
    pub async fn create_appointment(&self, lead: &NewAppointment) -> ApiResult<ApiResponse<Appointment>> {
        let request = ApiRequest::post(APPOINTMENTS).public().json(lead)?;
        self.request(request).await
    }

    pub async fn list_appointments(&self, filters: &AppointmentFilters) -> ApiResult<ApiResponse<Vec<Appointment>>> {
        let request = ApiRequest::get(APPOINTMENTS).query(filters.query());
        self.request(request).await
    }

    pub async fn get_appointment(&self, id: &str) -> ApiResult<ApiResponse<Appointment>> {
        self.request(ApiRequest::get(resource_path(APPOINTMENTS, id)?)).await
    }

    pub async fn update_appointment_status(&self, id: &str, status: &str) -> ApiResult<ApiResponse<Appointment>> {
        let request = ApiRequest::put(resource_path(APPOINTMENTS, id)?).json(&StatusUpdate { status })?;
        self.request(request).await
    }

    pub async fn delete_appointment(&self, id: &str) -> ApiResult<ApiResponse<Value>> {
        self.request(ApiRequest::delete(resource_path(APPOINTMENTS, id)?)).await
    }
}
