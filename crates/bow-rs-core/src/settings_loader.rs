//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `BOW_DEBUG` | `debug` |
//! | `BOW_LOG_LEVEL` | `log_level` |
//! | `BOW_CONTROLLER_NAMESPACE` | `controller_namespace` |
//! | `BOW_GLOBAL_MIDDLEWARE` | `global_middleware` (comma-separated) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use bow_rs_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/routing.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/routing.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::BowError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, BowError> {
    // Go through serde_json so partial documents merge over the defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| BowError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, BowError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, BowError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, BowError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| BowError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, BowError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, BowError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// - `BOW_DEBUG` -> `debug` ("true"/"1"/"yes" => true, anything else => false)
/// - `BOW_LOG_LEVEL` -> `log_level`
/// - `BOW_CONTROLLER_NAMESPACE` -> `controller_namespace` (empty clears it)
/// - `BOW_GLOBAL_MIDDLEWARE` -> `global_middleware` (comma-separated)
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_with(settings, |key| std::env::var(key).ok());
}

/// Applies overrides using `lookup` in place of the process environment.
pub fn apply_overrides_with<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("BOW_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = lookup("BOW_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("BOW_CONTROLLER_NAMESPACE") {
        let val = val.trim();
        settings.controller_namespace = (!val.is_empty()).then(|| val.to_string());
    }

    if let Some(val) = lookup("BOW_GLOBAL_MIDDLEWARE") {
        settings.global_middleware = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, BowError> {
    std::fs::read_to_string(path).map_err(|e| {
        BowError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, BowError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        BowError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        BowError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "debug"
            controller_namespace = "app::controllers"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.controller_namespace.as_deref(), Some("app::controllers"));
        assert!(settings.global_middleware.is_empty());
    }

    #[test]
    fn test_from_toml_str_global_middleware() {
        let toml = r#"
            global_middleware = ["csrf", "auth:web"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.global_middleware, vec!["csrf", "auth:web"]);
    }

    #[test]
    fn test_from_toml_str_extra_table() {
        let toml = r#"
            [extra]
            app_name = "blog"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.extra["app_name"], "blog");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(BowError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("debug = \"sometimes\"");
        assert!(result.is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "log_level": "warn",
            "global_middleware": ["trim"]
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.global_middleware, vec!["trim"]);
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert!(settings.debug);
        assert!(settings.controller_namespace.is_none());
    }

    #[test]
    fn test_from_json_str_invalid() {
        let result = from_json_str("{invalid json");
        assert!(result.is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routing.toml");
        std::fs::write(&path, "debug = false\nlog_level = \"trace\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "trace");
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routing.json");
        std::fs::write(&path, r#"{"controller_namespace": "web"}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert_eq!(settings.controller_namespace.as_deref(), Some("web"));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/path/routing.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = from_json_file("/nonexistent/path/routing.json");
        assert!(result.is_err());
    }

    // ── Overrides ───────────────────────────────────────────────────

    #[test]
    fn test_overrides_debug_values() {
        for (raw, expected) in [("true", true), ("1", true), ("YES", true), ("false", false)] {
            let mut settings = Settings::default();
            settings.debug = !expected;
            apply_overrides_with(&mut settings, env_of(&[("BOW_DEBUG", raw)]));
            assert_eq!(settings.debug, expected, "BOW_DEBUG={raw}");
        }
    }

    #[test]
    fn test_overrides_log_level_and_namespace() {
        let mut settings = Settings::default();
        apply_overrides_with(
            &mut settings,
            env_of(&[
                ("BOW_LOG_LEVEL", "debug"),
                ("BOW_CONTROLLER_NAMESPACE", "app::http"),
            ]),
        );
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.controller_namespace.as_deref(), Some("app::http"));
    }

    #[test]
    fn test_overrides_empty_namespace_clears() {
        let mut settings = Settings::default();
        settings.controller_namespace = Some("old".to_string());
        apply_overrides_with(&mut settings, env_of(&[("BOW_CONTROLLER_NAMESPACE", " ")]));
        assert!(settings.controller_namespace.is_none());
    }

    #[test]
    fn test_overrides_global_middleware() {
        let mut settings = Settings::default();
        apply_overrides_with(
            &mut settings,
            env_of(&[("BOW_GLOBAL_MIDDLEWARE", "csrf, auth:admin,,")]),
        );
        assert_eq!(settings.global_middleware, vec!["csrf", "auth:admin"]);
    }

    #[test]
    fn test_overrides_absent_keys_keep_values() {
        let mut settings = Settings::default();
        settings.log_level = "warn".to_string();
        apply_overrides_with(&mut settings, env_of(&[]));
        assert_eq!(settings.log_level, "warn");
        assert!(settings.debug);
    }

    #[test]
    fn test_toml_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routing.toml");
        std::fs::write(&path, "debug = true\nlog_level = \"info\"\n").unwrap();

        let mut settings = from_toml_file(&path).unwrap();
        apply_overrides_with(&mut settings, env_of(&[("BOW_DEBUG", "false")]));
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"outer": {"a": 1, "b": 2}});
        let over = serde_json::json!({"outer": {"b": 3}});
        let merged = merge_json(base, over);
        assert_eq!(merged["outer"]["a"], 1);
        assert_eq!(merged["outer"]["b"], 3);
    }

    #[test]
    fn test_merge_json_array_override() {
        let base = serde_json::json!({"list": [1, 2, 3]});
        let over = serde_json::json!({"list": [4, 5]});
        let merged = merge_json(base, over);
        assert_eq!(merged["list"], serde_json::json!([4, 5]));
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            items = [1, 2, 3]
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["items"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["nested"]["key"], "value");
    }
}
