//! Terminal output and input.
//!
//! - `render`: plain text rendering of listings, leads, users and the dashboard
//! - `prompt`: interactive questions (username, password, confirmations)

pub mod prompt;
pub mod render;
