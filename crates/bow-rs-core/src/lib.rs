//! # bow-rs-core
//!
//! Core types for the bow-rs router: error types, settings, settings loading,
//! and `tracing` integration. This crate has no dependency on the routing layer
//! and is the foundation every other crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Router settings
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{BowError, BowResult, PatternCompileError};
pub use settings::Settings;
