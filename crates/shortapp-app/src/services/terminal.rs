// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal stand-ins for the web view and the host UI.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use shortapp_bridge::handler::{HostDelegate, open_system_settings};
use shortapp_bridge::sender::MessagePort;
use shortapp_bridge::traits::SystemSettings;
use shortapp_core::error::{Result, ShortAppError};
use shortapp_core::types::PaymentIntent;

/// Writes every message posted to the "web view" as one line on stdout.
pub struct StdoutPort;

impl MessagePort for StdoutPort {
    fn post_message(&self, message: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "-> web {message}")
            .map_err(|e| ShortAppError::Bridge(format!("stdout: {e}")))
    }
}

/// Host UI rendered as text. Remembers the last payment it was asked to show.
pub struct TerminalDelegate {
    settings: Arc<dyn SystemSettings>,
    last_payment: Mutex<Option<PaymentIntent>>,
}

impl TerminalDelegate {
    pub fn new(settings: Arc<dyn SystemSettings>) -> Self {
        Self {
            settings,
            last_payment: Mutex::new(None),
        }
    }

    pub fn take_payment(&self) -> Option<PaymentIntent> {
        self.last_payment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl HostDelegate for TerminalDelegate {
    fn show_camera_permission_modal(&self) {
        println!("[modal] Camera access is off. Enable it in Settings to scan codes.");
        open_system_settings(self.settings.as_ref());
    }

    fn push_payment(&self, intent: PaymentIntent) {
        println!("[payment sheet] {} ({})", intent.url, intent.request_id);
        *self
            .last_payment
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(intent);
    }
}
