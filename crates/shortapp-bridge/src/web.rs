// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web-side end of the bridge.
//
// Runs inside the embedded page (or its test double). Outbound messages go
// through the native `postMessage` channel when the page is hosted in a
// WebView; inbound `message` events are filtered for devtools/HMR noise,
// parsed, gated by the action whitelist, and fanned out to listeners.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, trace};

use shortapp_core::events::{Listeners, Subscription};

use crate::protocol::passes_whitelist;
use crate::sender::MessagePort;

/// Web page side of the bridge.
#[derive(Clone, Default)]
pub struct WebBridge {
    native: Option<Arc<dyn MessagePort>>,
    listeners: Listeners<Value>,
}

impl WebBridge {
    /// Bridge for a page hosted in a native WebView.
    pub fn hosted(native: Arc<dyn MessagePort>) -> Self {
        Self {
            native: Some(native),
            listeners: Listeners::new(),
        }
    }

    /// Bridge for a page opened in a plain browser (no native host).
    pub fn standalone() -> Self {
        Self::default()
    }

    /// Post `data` to the native host. Returns whether it was delivered.
    pub fn send(&self, data: &Value) -> bool {
        if !passes_whitelist(data) {
            debug!("web bridge: dropping non-whitelisted message");
            return false;
        }
        let Some(native) = &self.native else {
            debug!(payload = %data, "web debug environment, not sending");
            return false;
        };
        match native.post_message(&data.to_string()) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "web bridge postMessage failed");
                false
            }
        }
    }

    /// Register a handler for inbound messages.
    pub fn listen<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.listeners.subscribe(handler)
    }

    /// Feed one `message` event's `data` into the bridge.
    ///
    /// Returns `true` if the payload was delivered to listeners.
    pub fn dispatch(&self, event_data: &Value) -> bool {
        if is_dev_noise(event_data) {
            trace!("ignoring devtools/HMR message");
            return false;
        }

        let payload = match event_data {
            Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| event_data.clone()),
            other => other.clone(),
        };

        if !passes_whitelist(&payload) {
            debug!("web bridge: dropping inbound message with unknown action");
            return false;
        }

        self.listeners.emit(&payload);
        true
    }
}

/// React devtools and Expo HMR share the window `message` channel.
fn is_dev_noise(data: &Value) -> bool {
    data.get("source").and_then(Value::as_str) == Some("react-devtools")
        || data.pointer("/expo/type").and_then(Value::as_str) == Some("HMR")
}
