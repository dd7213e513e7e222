//! Data models and configuration.

pub mod config;
pub mod deduction;
pub mod document;
pub mod profile;
