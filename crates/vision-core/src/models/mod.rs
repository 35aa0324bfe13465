//! Data models for the listing backend.
//!
//! - `Property`, `PropertyFilters`, `PropertyForm`: listings and their write payload
//! - `User`, `Role`, `UserForm`: admin-panel accounts (administrators and brokers)
//! - `Appointment`, `NewAppointment`, `AppointmentFilters`: leads
//! - `ApiResponse`, `LoginResponse`, `MeResponse`: response envelopes
//! - `DashboardStats`: numbers derived client-side from fetched lists

pub mod appointment;
pub mod dashboard;
pub mod id;
pub mod property;
pub mod response;
pub mod user;

pub use appointment::{Appointment, AppointmentFilters, NewAppointment};
pub use dashboard::DashboardStats;
pub use id::RecordId;
pub use property::{
    count_active, AdminPropertyFilter, ListingStatus, Property, PropertyFilters, PropertyForm,
    IMAGES_FIELD,
};
pub use response::{ApiResponse, LoginResponse, MeResponse};
pub use user::{Role, User, UserForm};
