// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native-to-web sender.
//
// Pushes JSON envelopes into the embedded web page. Delivery is best-effort:
// a missing web view, a non-whitelisted action, or a failing `postMessage`
// drops the message and logs, it never errors back to the caller.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, error, warn};

use shortapp_core::error::Result;
use shortapp_core::types::PaymentStatus;

use crate::protocol::{OutboundMessage, passes_whitelist};

/// One end of a string message channel (`postMessage`).
pub trait MessagePort: Send + Sync {
    fn post_message(&self, message: &str) -> Result<()>;
}

/// Sends whitelisted messages to the web view currently attached, if any.
///
/// Cheap to clone; clones share the attached view.
#[derive(Clone, Default)]
pub struct NativeSender {
    target: Arc<Mutex<Option<Arc<dyn MessagePort>>>>,
}

impl NativeSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender already attached to `port`.
    pub fn attached(port: Arc<dyn MessagePort>) -> Self {
        let sender = Self::new();
        sender.attach(port);
        sender
    }

    /// Attach the mounted web view. Replaces any previous one.
    pub fn attach(&self, port: Arc<dyn MessagePort>) {
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(port);
    }

    /// Detach on unmount; later sends are dropped.
    pub fn detach(&self) {
        self.target.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    pub fn is_attached(&self) -> bool {
        self.target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Send a typed envelope. Returns whether it reached `postMessage`.
    pub fn send(&self, message: &OutboundMessage) -> bool {
        match serde_json::to_value(message) {
            Ok(value) => self.send_value(&value),
            Err(e) => {
                error!(action = %message.action, error = %e, "failed to serialise outbound message");
                false
            }
        }
    }

    /// Send an arbitrary JSON payload through the whitelist gate.
    pub fn send_value(&self, data: &Value) -> bool {
        let Some(port) = self
            .target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        else {
            debug!("no web view attached, dropping message");
            return false;
        };

        if !passes_whitelist(data) {
            warn!("dropping outbound message with non-whitelisted action");
            return false;
        }

        let text = match serde_json::to_string(data) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to serialise outbound message");
                return false;
            }
        };

        match port.post_message(&text) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "postMessage failed");
                false
            }
        }
    }

    /// Report how a payment ended to the page that started it.
    pub fn send_payment_result(
        &self,
        request_id: &str,
        status: PaymentStatus,
        message: Option<String>,
    ) -> bool {
        debug!(request_id, ?status, "sending payment result");
        self.send(&OutboundMessage::payment_result(request_id, status, message))
    }
}

impl std::fmt::Debug for NativeSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSender")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// In-memory port that records every posted message. Used by tests across
/// the bridge crate.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use shortapp_core::error::ShortAppError;

    #[derive(Default)]
    pub struct RecordingPort {
        pub sent: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl RecordingPort {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn messages(&self) -> Vec<Value> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|s| serde_json::from_str(s).unwrap())
                .collect()
        }
    }

    impl MessagePort for RecordingPort {
        fn post_message(&self, message: &str) -> Result<()> {
            if self.fail {
                return Err(ShortAppError::Bridge("web view gone".into()));
            }
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingPort;
    use super::*;
    use serde_json::json;

    #[test]
    fn sends_to_attached_view() {
        let port = Arc::new(RecordingPort::default());
        let sender = NativeSender::attached(port.clone());

        assert!(sender.send(&OutboundMessage::camera_permission(false)));
        assert_eq!(
            port.messages(),
            vec![json!({"type": "response", "action": "getCameraPermission", "granted": false})]
        );
    }

    #[test]
    fn drops_without_view() {
        let sender = NativeSender::new();
        assert!(!sender.send(&OutboundMessage::camera_permission(true)));

        let port = Arc::new(RecordingPort::default());
        sender.attach(port.clone());
        sender.detach();
        assert!(!sender.send(&OutboundMessage::camera_permission(true)));
        assert!(port.messages().is_empty());
    }

    #[test]
    fn drops_non_whitelisted_values() {
        let port = Arc::new(RecordingPort::default());
        let sender = NativeSender::attached(port.clone());

        assert!(!sender.send_value(&json!({"type": "event", "action": "runScript"})));
        assert!(!sender.send_value(&json!({"event": "navigate"})));
        assert!(sender.send_value(&json!({"type": "notification", "data": 1})));
        assert_eq!(port.messages().len(), 1);
    }

    #[test]
    fn post_failure_is_swallowed() {
        let sender = NativeSender::attached(Arc::new(RecordingPort::failing()));
        assert!(!sender.send(&OutboundMessage::camera_permission(true)));
    }

    #[test]
    fn payment_result_event() {
        let port = Arc::new(RecordingPort::default());
        let sender = NativeSender::attached(port.clone());
        sender.send_payment_result("r-1", PaymentStatus::Cancel, Some("Payment cancelled".into()));
        assert_eq!(
            port.messages(),
            vec![json!({
                "type": "event",
                "action": "stripe.paymentResult",
                "requestId": "r-1",
                "status": "cancel",
                "message": "Payment cancelled"
            })]
        );
    }
}
