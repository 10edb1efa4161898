// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payment sheet session.
//
// The host presents the checkout page in its own WebView and feeds every
// navigation into the session. Reaching the success or cancel URL, the user
// dismissing the sheet, or a load error each end the session exactly once;
// the outcome is then relayed to the page that asked for the payment.

use tracing::{debug, info};

use shortapp_core::types::{PaymentIntent, PaymentStatus};

use crate::sender::NativeSender;

/// Terminal result of a payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub request_id: String,
    pub status: PaymentStatus,
    pub message: Option<String>,
}

impl PaymentOutcome {
    /// Send this outcome to the web page as a `stripe.paymentResult` event.
    pub fn relay(&self, sender: &NativeSender) -> bool {
        sender.send_payment_result(&self.request_id, self.status, self.message.clone())
    }
}

/// What the checkout WebView should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the checkout page load it.
    Allow,
    /// Block it; the session just ended with this outcome.
    Intercept(PaymentOutcome),
}

/// One presented payment sheet.
#[derive(Debug)]
pub struct PaymentSession {
    intent: PaymentIntent,
    finished: bool,
}

impl PaymentSession {
    pub fn new(intent: PaymentIntent) -> Self {
        info!(request_id = %intent.request_id, "payment session started");
        Self {
            intent,
            finished: false,
        }
    }

    pub fn intent(&self) -> &PaymentIntent {
        &self.intent
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Inspect a navigation of the checkout WebView.
    pub fn on_navigation(&mut self, url: &str) -> NavigationDecision {
        if self.finished {
            return NavigationDecision::Allow;
        }
        let reached = |target: &Option<String>| target.as_deref().is_some_and(|t| url.contains(t));

        if reached(&self.intent.success_url) {
            debug!(url, "success url reached");
            return self.finish(PaymentStatus::Success, None).map_or(
                NavigationDecision::Allow,
                NavigationDecision::Intercept,
            );
        }
        if reached(&self.intent.cancel_url) {
            debug!(url, "cancel url reached");
            return self
                .finish(PaymentStatus::Cancel, Some("Payment cancelled".into()))
                .map_or(NavigationDecision::Allow, NavigationDecision::Intercept);
        }
        NavigationDecision::Allow
    }

    /// The user closed the sheet (button or swipe-down).
    pub fn dismiss(&mut self) -> Option<PaymentOutcome> {
        self.finish(PaymentStatus::Cancel, Some("Payment cancelled by user".into()))
    }

    /// The checkout page failed to load.
    pub fn fail(&mut self, description: Option<&str>) -> Option<PaymentOutcome> {
        let message = description
            .filter(|d| !d.is_empty())
            .unwrap_or("Payment error occurred");
        self.finish(PaymentStatus::Error, Some(message.to_string()))
    }

    fn finish(&mut self, status: PaymentStatus, message: Option<String>) -> Option<PaymentOutcome> {
        if self.finished {
            return None;
        }
        self.finished = true;
        info!(request_id = %self.intent.request_id, ?status, "payment session finished");
        Some(PaymentOutcome {
            request_id: self.intent.request_id.clone(),
            status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::testing::RecordingPort;
    use serde_json::json;
    use std::sync::Arc;

    fn intent() -> PaymentIntent {
        PaymentIntent {
            url: "https://checkout.example/cs_1".into(),
            success_url: Some("https://app.example/paid".into()),
            cancel_url: Some("https://app.example/cancelled".into()),
            request_id: "req-1".into(),
        }
    }

    #[test]
    fn checkout_pages_are_allowed() {
        let mut session = PaymentSession::new(intent());
        assert_eq!(
            session.on_navigation("https://checkout.example/cs_1/card"),
            NavigationDecision::Allow
        );
        assert!(!session.is_finished());
    }

    #[test]
    fn success_url_ends_session() {
        let mut session = PaymentSession::new(intent());
        let decision = session.on_navigation("https://app.example/paid?session=cs_1");
        let NavigationDecision::Intercept(outcome) = decision else {
            panic!("expected intercept");
        };
        assert_eq!(outcome.status, PaymentStatus::Success);
        assert_eq!(outcome.request_id, "req-1");
        assert!(session.is_finished());
    }

    #[test]
    fn cancel_url_ends_session() {
        let mut session = PaymentSession::new(intent());
        let NavigationDecision::Intercept(outcome) =
            session.on_navigation("https://app.example/cancelled")
        else {
            panic!("expected intercept");
        };
        assert_eq!(outcome.status, PaymentStatus::Cancel);
    }

    #[test]
    fn only_one_terminal_outcome() {
        let mut session = PaymentSession::new(intent());
        assert!(session.fail(Some("net::ERR_FAILED")).is_some());
        assert!(session.dismiss().is_none());
        assert_eq!(
            session.on_navigation("https://app.example/paid"),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn missing_redirect_urls_never_intercept() {
        let mut session = PaymentSession::new(PaymentIntent {
            success_url: None,
            cancel_url: None,
            ..intent()
        });
        assert_eq!(
            session.on_navigation("https://app.example/paid"),
            NavigationDecision::Allow
        );
        let outcome = session.dismiss().unwrap();
        assert_eq!(outcome.message.as_deref(), Some("Payment cancelled by user"));
    }

    #[test]
    fn error_without_description_gets_default_message() {
        let mut session = PaymentSession::new(intent());
        let outcome = session.fail(None).unwrap();
        assert_eq!(outcome.status, PaymentStatus::Error);
        assert_eq!(outcome.message.as_deref(), Some("Payment error occurred"));
    }

    #[test]
    fn outcome_is_relayed_to_web() {
        let port = Arc::new(RecordingPort::default());
        let sender = NativeSender::attached(port.clone());
        let mut session = PaymentSession::new(intent());

        let outcome = session.dismiss().unwrap();
        assert!(outcome.relay(&sender));
        assert_eq!(
            port.messages(),
            vec![json!({
                "type": "event",
                "action": "stripe.paymentResult",
                "requestId": "req-1",
                "status": "cancel",
                "message": "Payment cancelled by user"
            })]
        );
    }
}
