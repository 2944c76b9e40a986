//! Command handlers

pub mod upgrade;
pub mod version;
