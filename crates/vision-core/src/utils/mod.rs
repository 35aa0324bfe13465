//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    format_datetime, format_local, format_optional, format_phone, format_price, image_url,
    truncate_string, whatsapp_link,
};
