// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Hosts that only serve manifests over TLS. Any host ending in one of these
/// is forced to `https` by the URL normalizer.
pub const DEFAULT_HTTPS_HOSTS: &[&str] = &["exp.host", "u.expo.dev", "exp.direct", "expo.dev"];

/// Persistent host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host suffixes that are always upgraded to https.
    pub trusted_https_hosts: Vec<String>,
    /// Key prefix for the per-project "camera prompt seen" flag.
    pub camera_prompt_key_prefix: String,
    /// Timeout for the manifest HEAD probe, in seconds.
    pub preflight_timeout_secs: u64,
    /// Module name registered by sub-app bundles when the caller gives none.
    pub default_module_name: String,
    /// File name (inside the data dir) of the persisted key-value store.
    pub store_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            trusted_https_hosts: DEFAULT_HTTPS_HOSTS.iter().map(|h| h.to_string()).collect(),
            camera_prompt_key_prefix: "@camera_permission_prompt_seen_".into(),
            preflight_timeout_secs: 10,
            default_module_name: "main".into(),
            store_file: "storage.json".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"preflight_timeout_secs": 3}"#).expect("parse failed");
        assert_eq!(config.preflight_timeout_secs, 3);
        assert_eq!(config.default_module_name, "main");
        assert_eq!(config.trusted_https_hosts.len(), DEFAULT_HTTPS_HOSTS.len());
    }
}
