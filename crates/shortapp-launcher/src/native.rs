// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contract of the native SubAppLauncher module.
//
// The native side downloads the manifest, bundle, and assets of a sub-app
// and mounts it full screen. This crate only consumes its methods and the
// events it emits; the adapter that talks to the real module implements
// `NativeLauncher` and pushes events into its `LauncherEvents`.

use async_trait::async_trait;
use serde_json::{Map, Value};

use shortapp_core::error::Result;
use shortapp_core::events::Listeners;
use shortapp_core::types::{LoadingProgress, Platform, SubAppErrorEvent, UpdateDetected};

/// Methods exported by the native launcher module.
#[async_trait]
pub trait NativeLauncher: Send + Sync {
    /// Platform the module runs on.
    fn platform(&self) -> Platform;

    /// Event emitter fed by the native module.
    fn events(&self) -> &LauncherEvents;

    /// Download and mount the sub-app described by `manifest_url`.
    async fn open_sub_app(
        &self,
        manifest_url: &str,
        module_name: &str,
        initial_props: &Map<String, Value>,
    ) -> Result<()>;

    /// Re-download manifest, bundle, and assets of the mounted sub-app.
    async fn reload_sub_app(&self) -> Result<()>;

    /// Compare the mounted manifest with the remote one; the answer arrives
    /// as an `onUpdateDetected` event.
    async fn check_for_update(&self) -> Result<()>;

    /// Unmount the sub-app and return to the host.
    fn close_sub_app(&self);
}

/// One event emitted by the native module.
#[derive(Debug, Clone, PartialEq)]
pub enum LauncherEvent {
    LoadingProgress(LoadingProgress),
    ManifestProgress(LoadingProgress),
    BundleProgress(LoadingProgress),
    AssetsProgress(LoadingProgress),
    SubAppReady,
    UpdateDetected(UpdateDetected),
    SubAppError(SubAppErrorEvent),
}

impl LauncherEvent {
    /// Native event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadingProgress(_) => "onLoadingProgress",
            Self::ManifestProgress(_) => "onManifestProgress",
            Self::BundleProgress(_) => "onBundleProgress",
            Self::AssetsProgress(_) => "onAssetsProgress",
            Self::SubAppReady => "onSubAppReady",
            Self::UpdateDetected(_) => "onUpdateDetected",
            Self::SubAppError(_) => "onSubAppError",
        }
    }

    /// Decode a raw `(name, body)` pair from the native emitter.
    ///
    /// Returns `Ok(None)` for event names this crate does not know.
    pub fn from_native(name: &str, body: Value) -> Result<Option<Self>> {
        let event = match name {
            "onLoadingProgress" => Self::LoadingProgress(serde_json::from_value(body)?),
            "onManifestProgress" => Self::ManifestProgress(serde_json::from_value(body)?),
            "onBundleProgress" => Self::BundleProgress(serde_json::from_value(body)?),
            "onAssetsProgress" => Self::AssetsProgress(serde_json::from_value(body)?),
            "onSubAppReady" => Self::SubAppReady,
            "onUpdateDetected" => Self::UpdateDetected(serde_json::from_value(body)?),
            "onSubAppError" => Self::SubAppError(serde_json::from_value(body)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// Per-channel listener registries for launcher events.
///
/// No ordering is guaranteed between channels, only within one.
#[derive(Clone, Default)]
pub struct LauncherEvents {
    pub(crate) progress: Listeners<LoadingProgress>,
    pub(crate) manifest_progress: Listeners<LoadingProgress>,
    pub(crate) bundle_progress: Listeners<LoadingProgress>,
    pub(crate) assets_progress: Listeners<LoadingProgress>,
    pub(crate) ready: Listeners<()>,
    pub(crate) update_detected: Listeners<UpdateDetected>,
    pub(crate) error: Listeners<SubAppErrorEvent>,
}

impl LauncherEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan `event` out to its channel. Returns the number of listeners hit.
    pub fn emit(&self, event: &LauncherEvent) -> usize {
        tracing::trace!(event = event.name(), "launcher event");
        match event {
            LauncherEvent::LoadingProgress(p) => self.progress.emit(p),
            LauncherEvent::ManifestProgress(p) => self.manifest_progress.emit(p),
            LauncherEvent::BundleProgress(p) => self.bundle_progress.emit(p),
            LauncherEvent::AssetsProgress(p) => self.assets_progress.emit(p),
            LauncherEvent::SubAppReady => self.ready.emit(&()),
            LauncherEvent::UpdateDetected(u) => self.update_detected.emit(u),
            LauncherEvent::SubAppError(e) => self.error.emit(e),
        }
    }

    /// Decode and emit a raw native event. Unknown names are ignored.
    pub fn emit_native(&self, name: &str, body: Value) -> Result<usize> {
        match LauncherEvent::from_native(name, body)? {
            Some(event) => Ok(self.emit(&event)),
            None => {
                tracing::debug!(name, "ignoring unknown launcher event");
                Ok(0)
            }
        }
    }
}

/// Scriptable native launcher used by the tests in this crate.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use shortapp_core::error::ShortAppError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Open {
            url: String,
            module: String,
            props: Map<String, Value>,
        },
        Reload,
        CheckForUpdate,
        Close,
    }

    pub struct FakeNative {
        pub platform: Platform,
        pub events: LauncherEvents,
        pub calls: Mutex<Vec<Call>>,
        pub fail_reload: AtomicBool,
        pub fail_open: AtomicBool,
    }

    impl FakeNative {
        pub fn new(platform: Platform) -> Self {
            Self {
                platform,
                events: LauncherEvents::new(),
                calls: Mutex::new(Vec::new()),
                fail_reload: AtomicBool::new(false),
                fail_open: AtomicBool::new(false),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NativeLauncher for FakeNative {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn events(&self) -> &LauncherEvents {
            &self.events
        }

        async fn open_sub_app(
            &self,
            manifest_url: &str,
            module_name: &str,
            initial_props: &Map<String, Value>,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Open {
                url: manifest_url.to_string(),
                module: module_name.to_string(),
                props: initial_props.clone(),
            });
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(ShortAppError::Native("bundle failed to evaluate".into()));
            }
            Ok(())
        }

        async fn reload_sub_app(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Reload);
            if self.fail_reload.load(Ordering::SeqCst) {
                return Err(ShortAppError::Native("no sub-app mounted".into()));
            }
            Ok(())
        }

        async fn check_for_update(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::CheckForUpdate);
            Ok(())
        }

        fn close_sub_app(&self) {
            self.calls.lock().unwrap().push(Call::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn native_progress_event_decodes() {
        let event = LauncherEvent::from_native(
            "onBundleProgress",
            json!({"status": "Downloading bundle", "done": 3, "total": 10, "progress": 0.3}),
        )
        .unwrap()
        .unwrap();
        assert_eq!(event.name(), "onBundleProgress");
        let LauncherEvent::BundleProgress(p) = event else {
            panic!("wrong variant");
        };
        assert_eq!(p.done, 3.0);
    }

    #[test]
    fn fractional_and_negative_counts_still_decode() {
        let events = LauncherEvents::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            events.progress.subscribe(move |p: &LoadingProgress| {
                seen.lock().unwrap().push((p.done, p.total));
            })
        };

        let hits = events
            .emit_native(
                "onLoadingProgress",
                json!({"status": "Downloading assets", "done": 1.5, "total": -1, "progress": 0.1}),
            )
            .unwrap();
        assert_eq!(hits, 1);
        assert_eq!(*seen.lock().unwrap(), vec![(1.5, -1.0)]);
    }

    #[test]
    fn unknown_event_names_are_ignored() {
        let events = LauncherEvents::new();
        assert_eq!(events.emit_native("onSomethingElse", json!({})).unwrap(), 0);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let events = LauncherEvents::new();
        assert!(events.emit_native("onSubAppError", json!({"isFatal": true})).is_err());
    }

    #[test]
    fn channels_are_independent() {
        let events = LauncherEvents::new();
        let _sub = events.ready.subscribe(|_| {});
        assert_eq!(events.emit(&LauncherEvent::SubAppReady), 1);
        assert_eq!(
            events.emit(&LauncherEvent::AssetsProgress(LoadingProgress::starting("x"))),
            0
        );
    }
}
