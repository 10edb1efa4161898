// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SubApp Launcher facade.
//
// Wraps the optional native launcher module: validates and normalizes the
// manifest URL, runs the pre-flight probe, refuses platforms the native side
// does not support yet, and exposes the event channels as disposable
// subscriptions. When the native module is missing every listener method
// returns a no-op subscription, so host UI code can always call them.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use shortapp_core::config::DEFAULT_HTTPS_HOSTS;
use shortapp_core::error::{Result, ShortAppError};
use shortapp_core::events::Subscription;
use shortapp_core::types::{LoadingProgress, Platform, SubAppErrorEvent, UpdateDetected};
use shortapp_core::url::normalize_exp_url_with;

use crate::native::{LauncherEvents, NativeLauncher};
use crate::preflight::{ManifestProbe, preflight};

/// Host-side handle on the native sub-app launcher.
pub struct SubAppLauncher {
    native: Option<Arc<dyn NativeLauncher>>,
    probe: Arc<dyn ManifestProbe>,
    trusted_hosts: Vec<String>,
    latest_progress: Arc<Mutex<Option<LoadingProgress>>>,
    _progress_tap: Subscription,
}

impl SubAppLauncher {
    pub fn new(native: Option<Arc<dyn NativeLauncher>>, probe: Arc<dyn ManifestProbe>) -> Self {
        let latest_progress = Arc::new(Mutex::new(None));
        let progress_tap = match &native {
            Some(native) => {
                let latest = Arc::clone(&latest_progress);
                native.events().progress.subscribe(move |p: &LoadingProgress| {
                    *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(p.clone());
                })
            }
            None => {
                warn!("SubAppLauncher native module is not available");
                Subscription::noop()
            }
        };

        Self {
            native,
            probe,
            trusted_hosts: DEFAULT_HTTPS_HOSTS.iter().map(|h| h.to_string()).collect(),
            latest_progress,
            _progress_tap: progress_tap,
        }
    }

    /// Replace the hosts that are always upgraded to https.
    pub fn with_trusted_hosts(mut self, hosts: Vec<String>) -> Self {
        self.trusted_hosts = hosts;
        self
    }

    pub fn is_available(&self) -> bool {
        self.native.is_some()
    }

    /// Most recent overall progress reported by the native side.
    pub fn latest_progress(&self) -> Option<LoadingProgress> {
        self.latest_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn native(&self) -> Result<&Arc<dyn NativeLauncher>> {
        self.native
            .as_ref()
            .ok_or(ShortAppError::NativeModuleUnavailable)
    }

    fn supported(native: &Arc<dyn NativeLauncher>) -> Result<()> {
        match native.platform() {
            Platform::Ios => Ok(()),
            other => Err(ShortAppError::UnsupportedPlatform(other)),
        }
    }

    /// Open the sub-app behind `manifest_url` full screen.
    #[instrument(skip(self, initial_props))]
    pub async fn open(
        &self,
        manifest_url: &str,
        module_name: &str,
        initial_props: Option<Map<String, Value>>,
    ) -> Result<()> {
        let native = self.native()?;
        let url = normalize_exp_url_with(manifest_url, self.trusted_hosts.as_slice())?;

        preflight(self.probe.as_ref(), &url).await?;
        Self::supported(native)?;

        info!(url = %url, "opening sub-app");
        native
            .open_sub_app(&url, module_name, &initial_props.unwrap_or_default())
            .await
    }

    /// Re-download and remount the current sub-app.
    ///
    /// Callers that want a fallback should `open` the last URL again when
    /// this fails.
    pub async fn reload(&self) -> Result<()> {
        let native = self.native()?;
        Self::supported(native)?;
        native.reload_sub_app().await
    }

    /// Ask the native side to compare manifests; listen with
    /// [`add_update_detected_listener`](Self::add_update_detected_listener).
    pub async fn check_for_update(&self) -> Result<()> {
        let native = self.native()?;
        Self::supported(native)?;
        native.check_for_update().await
    }

    /// Close the sub-app. Never fails.
    pub fn close(&self) {
        let Some(native) = &self.native else {
            warn!("SubAppLauncher native module is not available");
            return;
        };
        if native.platform() == Platform::Ios {
            native.close_sub_app();
        }
    }

    fn subscribe_with<F>(&self, register: F) -> Subscription
    where
        F: FnOnce(&LauncherEvents) -> Subscription,
    {
        match &self.native {
            Some(native) => register(native.events()),
            None => Subscription::noop(),
        }
    }

    /// Overall loading progress (`onLoadingProgress`).
    pub fn add_progress_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LoadingProgress) + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.progress.subscribe(callback))
    }

    /// Manifest download progress (`onManifestProgress`).
    pub fn add_manifest_progress_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LoadingProgress) + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.manifest_progress.subscribe(callback))
    }

    /// Bundle download progress (`onBundleProgress`).
    pub fn add_bundle_progress_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LoadingProgress) + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.bundle_progress.subscribe(callback))
    }

    /// Asset download progress (`onAssetsProgress`).
    pub fn add_assets_progress_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LoadingProgress) + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.assets_progress.subscribe(callback))
    }

    /// Sub-app root view mounted (`onSubAppReady`).
    pub fn add_ready_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.ready.subscribe(move |_: &()| callback()))
    }

    /// Result of `check_for_update` (`onUpdateDetected`).
    pub fn add_update_detected_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&UpdateDetected) + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.update_detected.subscribe(callback))
    }

    /// JS errors raised inside the sub-app (`onSubAppError`).
    pub fn add_error_listener<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SubAppErrorEvent) + Send + Sync + 'static,
    {
        self.subscribe_with(|events| events.error.subscribe(callback))
    }
}
