//! Command handlers

pub mod import;
pub mod upload;
