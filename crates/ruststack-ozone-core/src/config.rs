//! Shell configuration.
//!
//! Provides [`ShellConfig`] for the Ozone shell. Values are loaded from
//! environment variables and fall back to defaults when unset or empty.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Shell configuration.
///
/// # Examples
///
/// ```
/// use ruststack_ozone_core::config::ShellConfig;
///
/// let config = ShellConfig::default();
/// assert_eq!(config.service_id, "localhost");
/// assert_eq!(config.log_level, "warn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ShellConfig {
    /// Service used when a locator does not name one.
    #[builder(default = String::from("localhost"))]
    pub service_id: String,

    /// Root directory of the local store backend.
    #[builder(default = PathBuf::from("/var/lib/ruststack-ozone"))]
    pub data_dir: PathBuf,

    /// Log level filter string (e.g. `"warn"`, `"debug"`).
    #[builder(default = String::from("warn"))]
    pub log_level: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            service_id: String::from("localhost"),
            data_dir: PathBuf::from("/var/lib/ruststack-ozone"),
            log_level: String::from("warn"),
        }
    }
}

impl ShellConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OZONE_SERVICE_ID` | `localhost` |
    /// | `OZONE_DATA_DIR` | `/var/lib/ruststack-ozone` |
    /// | `LOG_LEVEL` | `warn` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use ruststack_ozone_core::config::ShellConfig;
    ///
    /// let config = ShellConfig::from_vars(|name| {
    ///     (name == "OZONE_SERVICE_ID").then(|| "om1:9862".to_owned())
    /// });
    /// assert_eq!(config.service_id, "om1:9862");
    /// ```
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("OZONE_SERVICE_ID") {
            config.service_id = v;
        }
        if let Some(v) = var("OZONE_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}
