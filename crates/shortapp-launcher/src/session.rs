// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview session: host-side state for one running sub-app.
//
// The session keeps its own open request so a failed native reload can fall
// back to opening the same manifest again.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use shortapp_core::error::Result;
use shortapp_core::events::Subscription;
use shortapp_core::types::{LoadingProgress, UpdateDetected};

use crate::launcher::SubAppLauncher;

fn default_module_name() -> String {
    "main".into()
}

/// What to open: manifest, entry module, and props for the root component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub manifest_url: String,
    #[serde(default = "default_module_name")]
    pub module_name: String,
    #[serde(default)]
    pub initial_props: Map<String, Value>,
}

impl OpenRequest {
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            module_name: default_module_name(),
            initial_props: Map::new(),
        }
    }

    pub fn module(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.initial_props.insert(key.into(), value);
        self
    }
}

/// Observable state of a preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewState {
    pub is_loading: bool,
    pub progress: LoadingProgress,
    pub ready: bool,
    pub last_error: Option<String>,
    pub update: Option<UpdateDetected>,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            is_loading: false,
            progress: LoadingProgress::starting("Idle"),
            ready: false,
            last_error: None,
            update: None,
        }
    }
}

type SharedState = Arc<Mutex<PreviewState>>;

fn with_state(state: &SharedState, f: impl FnOnce(&mut PreviewState)) {
    f(&mut state.lock().unwrap_or_else(PoisonError::into_inner));
}

/// One preview of one sub-app. Listeners are released on drop.
pub struct PreviewSession {
    launcher: Arc<SubAppLauncher>,
    request: OpenRequest,
    state: SharedState,
    _subscriptions: Vec<Subscription>,
}

impl PreviewSession {
    pub fn new(launcher: Arc<SubAppLauncher>, request: OpenRequest) -> Self {
        let state: SharedState = Arc::default();

        let subscriptions = vec![
            launcher.add_progress_listener({
                let state = Arc::clone(&state);
                move |p| with_state(&state, |s| s.progress = p.clone())
            }),
            launcher.add_ready_listener({
                let state = Arc::clone(&state);
                move || {
                    with_state(&state, |s| {
                        s.is_loading = false;
                        s.ready = true;
                    })
                }
            }),
            launcher.add_error_listener({
                let state = Arc::clone(&state);
                move |e| {
                    with_state(&state, |s| {
                        if e.is_fatal {
                            s.is_loading = false;
                        }
                        s.last_error = Some(e.message.clone());
                    })
                }
            }),
            launcher.add_update_detected_listener({
                let state = Arc::clone(&state);
                move |u| with_state(&state, |s| s.update = Some(u.clone()))
            }),
        ];

        Self {
            launcher,
            request,
            state,
            _subscriptions: subscriptions,
        }
    }

    pub fn request(&self) -> &OpenRequest {
        &self.request
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PreviewState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset the state and open the sub-app.
    pub async fn load(&self) -> Result<()> {
        with_state(&self.state, |s| {
            *s = PreviewState {
                is_loading: true,
                progress: LoadingProgress::starting("Starting..."),
                ..PreviewState::default()
            }
        });
        self.open().await
    }

    /// Native reload; if that fails, open the same request again.
    pub async fn reload(&self) -> Result<()> {
        with_state(&self.state, |s| {
            s.is_loading = true;
            s.ready = false;
            s.last_error = None;
        });
        match self.launcher.reload().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "native reload failed, reopening");
                self.open().await
            }
        }
    }

    pub async fn check_for_update(&self) -> Result<()> {
        self.launcher.check_for_update().await
    }

    pub fn close(&self) {
        self.launcher.close();
        with_state(&self.state, |s| {
            s.is_loading = false;
            s.ready = false;
        });
    }

    async fn open(&self) -> Result<()> {
        let request = &self.request;
        info!(url = %request.manifest_url, module = %request.module_name, "loading preview");
        let result = self
            .launcher
            .open(
                &request.manifest_url,
                &request.module_name,
                Some(request.initial_props.clone()),
            )
            .await;
        if let Err(e) = &result {
            with_state(&self.state, |s| {
                s.is_loading = false;
                s.last_error = Some(e.to_string());
            });
        }
        result
    }
}
