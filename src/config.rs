//! Hook configuration
//!
//! The only knob is the span category. It defaults to `db.<store>` with the
//! store being `redis`, and can be overridden outright.

use serde::{Deserialize, Serialize};

use crate::error::{HookError, Result};

pub const DEFAULT_STORE: &str = "redis";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Store name used to build the default span category
    pub store: String,
    /// Explicit span category; `db.<store>` when unset
    pub span_type: Option<String>,
}

impl Default for HookConfig {
    fn default() -> Self {
        HookConfig {
            store: DEFAULT_STORE.to_string(),
            span_type: None,
        }
    }
}

impl HookConfig {
    /// Config for another store sharing the same client protocol
    pub fn for_store(store: impl Into<String>) -> Self {
        HookConfig {
            store: store.into(),
            span_type: None,
        }
    }

    /// Span category attached to every span the hook starts
    pub fn span_type(&self) -> String {
        match &self.span_type {
            Some(span_type) => span_type.clone(),
            None => format!("db.{}", self.store),
        }
    }

    /// Parse from TOML; absent fields keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| HookError::Config(e.to_string()))
    }

    /// Read `REDIS_APM_STORE` and `REDIS_APM_SPAN_TYPE`
    pub fn from_env() -> Self {
        let mut config = HookConfig::default();
        if let Ok(store) = std::env::var("REDIS_APM_STORE") {
            if !store.is_empty() {
                config.store = store;
            }
        }
        if let Ok(span_type) = std::env::var("REDIS_APM_SPAN_TYPE") {
            if !span_type.is_empty() {
                config.span_type = Some(span_type);
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_span_type() {
        assert_eq!(HookConfig::default().span_type(), "db.redis");
    }

    #[test]
    fn test_for_store() {
        assert_eq!(HookConfig::for_store("valkey").span_type(), "db.valkey");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = HookConfig::from_toml_str(r#"store = "keydb""#).unwrap();
        assert_eq!(config.span_type(), "db.keydb");

        let config = HookConfig::from_toml_str(r#"span_type = "cache.redis""#).unwrap();
        assert_eq!(config.store, "redis");
        assert_eq!(config.span_type(), "cache.redis");

        let config = HookConfig::from_toml_str("").unwrap();
        assert_eq!(config, HookConfig::default());
    }

    #[test]
    fn test_from_env() {
        // only this test touches the REDIS_APM_* variables
        let saved_store = std::env::var("REDIS_APM_STORE").ok();
        let saved_type = std::env::var("REDIS_APM_SPAN_TYPE").ok();

        std::env::set_var("REDIS_APM_STORE", "dragonfly");
        std::env::remove_var("REDIS_APM_SPAN_TYPE");
        let config = HookConfig::from_env();
        assert_eq!(config.store, "dragonfly");
        assert_eq!(config.span_type(), "db.dragonfly");

        std::env::set_var("REDIS_APM_SPAN_TYPE", "cache");
        assert_eq!(HookConfig::from_env().span_type(), "cache");

        // empty values fall back to defaults
        std::env::set_var("REDIS_APM_STORE", "");
        std::env::set_var("REDIS_APM_SPAN_TYPE", "");
        assert_eq!(HookConfig::from_env(), HookConfig::default());

        match saved_store {
            Some(v) => std::env::set_var("REDIS_APM_STORE", v),
            None => std::env::remove_var("REDIS_APM_STORE"),
        }
        match saved_type {
            Some(v) => std::env::set_var("REDIS_APM_SPAN_TYPE", v),
            None => std::env::remove_var("REDIS_APM_SPAN_TYPE"),
        }
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = HookConfig::from_toml_str("store = 5").unwrap_err();
        assert!(matches!(err, HookError::Config(_)));
    }
}
