//! Settings for the bow-rs router.
//!
//! [`Settings`] holds the configuration the dispatcher and logging read at
//! startup. There is no global instance: build one (directly or through
//! [`settings_loader`](crate::settings_loader)) and pass it where it is needed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The complete set of router settings.
///
/// # Examples
///
/// ```
/// use bow_rs_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// assert!(settings.global_middleware.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,

    // ── Routing ──────────────────────────────────────────────────────

    /// Namespace applied to controller actions declared without one
    /// (e.g. `"app::controllers"`).
    pub controller_namespace: Option<String>,
    /// Middleware references run before every route's own middleware,
    /// in order.
    pub global_middleware: Vec<String>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "debug", "bow_rs_http=trace").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            controller_namespace: None,
            global_middleware: Vec::new(),
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert!(s.controller_namespace.is_none());
        assert!(s.global_middleware.is_empty());
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_settings_serde_roundtrip_keeps_namespace() {
        let mut s = Settings::default();
        s.controller_namespace = Some("app::controllers".to_string());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["controller_namespace"], "app::controllers");

        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back.controller_namespace.as_deref(), Some("app::controllers"));
    }
}
