// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application services: owns the data directory, persisted config, the
// key-value store, and the platform bridge, and hands out handlers and
// launchers configured from them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use shortapp_bridge::handler::MessageHandler;
use shortapp_bridge::store::{JsonFileStore, KeyValueStore, MemoryStore};
use shortapp_bridge::stub::StubBridge;
use shortapp_core::config::AppConfig;
use shortapp_core::error::Result;
use shortapp_launcher::native::NativeLauncher;
use shortapp_launcher::preflight::HttpManifestProbe;
use shortapp_launcher::SubAppLauncher;

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// Everything the commands need, built once at startup.
pub struct AppServices {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub bridge: Arc<StubBridge>,
}

impl AppServices {
    /// Open services rooted at `dir` (or the default data directory).
    pub async fn init(dir: Option<PathBuf>) -> Result<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => data_dir::data_dir()?,
        };
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();
        let store = JsonFileStore::open(dir.join(&config.store_file)).await?;

        Ok(Self {
            data_dir: dir,
            config,
            store: Arc::new(store),
            bridge: Arc::new(StubBridge),
        })
    }

    /// In-memory services for when the data directory is unusable.
    pub fn fallback() -> Self {
        warn!("using in-memory storage; flags will not persist");
        Self {
            data_dir: std::env::temp_dir(),
            config: AppConfig::default(),
            store: Arc::new(MemoryStore::new()),
            bridge: Arc::new(StubBridge),
        }
    }

    pub fn message_handler(&self) -> MessageHandler {
        MessageHandler::new(Arc::clone(&self.store), self.bridge.clone())
            .with_key_prefix(self.config.camera_prompt_key_prefix.clone())
    }

    pub fn manifest_probe(&self) -> Result<HttpManifestProbe> {
        HttpManifestProbe::new(Duration::from_secs(self.config.preflight_timeout_secs))
    }

    /// Launcher over `native`; desktop builds pass `None`.
    pub fn launcher(&self, native: Option<Arc<dyn NativeLauncher>>) -> Result<SubAppLauncher> {
        let probe = Arc::new(self.manifest_probe()?);
        Ok(SubAppLauncher::new(native, probe)
            .with_trusted_hosts(self.config.trusted_https_hosts.clone()))
    }

    pub fn save_config(&self) -> Result<PathBuf> {
        persist_config(&self.data_dir, &self.config)
    }
}

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<PathBuf> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
