use serde::Serialize;

use super::{count_active, Appointment, Property};

/// Headline numbers for the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct DashboardStats {
    pub total_properties: usize,
    pub active_properties: usize,
    /// Only administrators can see leads
    pub total_leads: Option<usize>,
}

impl DashboardStats {
    pub fn compute(properties: &[Property], leads: Option<&[Appointment]>) -> Self {
        Self {
            total_properties: properties.len(),
            active_properties: count_active(properties),
            total_leads: leads.map(<[Appointment]>::len),
        }
    }
}
