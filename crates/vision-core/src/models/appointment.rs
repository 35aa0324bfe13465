use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecordId;
use crate::api::request::Query;
use crate::utils::format::whatsapp_link;

/// A lead: a visitor's expressed interest in a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Appointment {
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    #[serde(rename = "propertyId", default)]
    pub property_id: Option<RecordId>,
    #[serde(rename = "propertyTitle", default)]
    pub property_title: String,
    #[serde(rename = "clientName", default)]
    pub client_name: String,
    #[serde(rename = "clientPhone", default)]
    pub client_phone: String,
    #[serde(rename = "clientEmail", default)]
    pub client_email: Option<String>,
    #[serde(rename = "clientMessage", default)]
    pub client_message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn email(&self) -> Option<&str> {
        self.client_email.as_deref().filter(|e| !e.is_empty())
    }

    pub fn message(&self) -> Option<&str> {
        self.client_message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// WhatsApp link greeting the client about the property they asked for.
    pub fn contact_link(&self) -> Option<String> {
        let greeting = format!(
            "Olá {}! Vi que você demonstrou interesse no imóvel: {}.",
            self.client_name, self.property_title
        );
        whatsapp_link(&self.client_phone, &greeting)
    }
}

/// Public lead-capture form (`POST /appointments`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewAppointment {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "clientName")]
    pub client_name: String,
    #[serde(rename = "clientPhone")]
    pub client_phone: String,
    #[serde(rename = "clientEmail")]
    pub client_email: String,
    #[serde(rename = "clientMessage")]
    pub client_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StatusUpdate<'a> {
    pub status: &'a str,
}

/// Filters accepted by `GET /appointments`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilters {
    pub status: Option<String>,
    pub property_id: Option<String>,
}

impl AppointmentFilters {
    pub fn query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("status", self.status.as_deref());
        query.push_opt("propertyId", self.property_id.as_deref());
        query
    }
}
