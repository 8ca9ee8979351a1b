//! Cutout Core Library
//!
//! This crate provides configuration, error types, and filename sanitization
//! shared across all Cutout components.

pub mod config;
pub mod error;
pub mod sanitize;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use sanitize::sanitize_filename;
