// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native-side handler for messages posted by the embedded web page.
//
// Two request kinds are understood:
//
// - `getCameraPermission`: the very first request for a project is only
//   recorded (no prompt, no reply). Later requests check the OS permission,
//   prompt if still askable, and reply with `granted`. Anything but a grant
//   also asks the host to show its "enable camera in Settings" modal.
//   Permission errors count as a denial.
// - `pushScripe`: hands the checkout URL to the host's payment sheet and
//   acknowledges with `status: "opened"`.
//
// Everything else is reported back as not handled so the caller can route
// the raw message to its generic consumer.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use shortapp_core::error::Result;
use shortapp_core::types::{PaymentIntent, PermissionStatus};

use crate::protocol::{Action, InboundMessage, OutboundMessage, PushPaymentRequest};
use crate::sender::NativeSender;
use crate::store::KeyValueStore;
use crate::traits::{CameraPermissions, SystemSettings};

/// Default key prefix for the per-project "camera prompt seen" flag.
pub const CAMERA_PROMPT_KEY_PREFIX: &str = "@camera_permission_prompt_seen_";

/// Value written under the prompt key.
const SEEN: &str = "seen";

/// Host UI hooks the handler may trigger.
pub trait HostDelegate: Send + Sync {
    /// Show the modal that explains how to enable the camera in Settings.
    fn show_camera_permission_modal(&self);

    /// Present the payment sheet for `intent`. Hosts without payments ignore it.
    fn push_payment(&self, intent: PaymentIntent) {
        debug!(request_id = %intent.request_id, "payment requested but host has no payment sheet");
    }
}

/// Per-web-view context for one call to [`MessageHandler::handle`].
pub struct HandlerContext<'a> {
    pub project_id: &'a str,
    pub sender: &'a NativeSender,
    pub delegate: &'a dyn HostDelegate,
}

/// What the handler did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The message was acted on and a reply was sent.
    Responded,
    /// First camera request for this project: flag stored, nothing sent.
    FirstContactRecorded,
    /// Unknown, malformed, or not addressed to the native side.
    NotHandled,
}

impl HandleOutcome {
    /// `false` means the caller should forward the raw message elsewhere.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Responded)
    }
}

/// Interprets inbound bridge messages.
pub struct MessageHandler {
    store: Arc<dyn KeyValueStore>,
    permissions: Arc<dyn CameraPermissions>,
    key_prefix: String,
}

impl MessageHandler {
    pub fn new(store: Arc<dyn KeyValueStore>, permissions: Arc<dyn CameraPermissions>) -> Self {
        Self {
            store,
            permissions,
            key_prefix: CAMERA_PROMPT_KEY_PREFIX.to_string(),
        }
    }

    /// Override the prompt-flag key prefix (from `AppConfig`).
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Storage key of the "camera prompt seen" flag for `project_id`.
    pub fn prompt_key(&self, project_id: &str) -> String {
        format!("{}{project_id}", self.key_prefix)
    }

    /// Handle one raw `postMessage` string from the web page.
    #[instrument(skip_all, fields(project = ctx.project_id))]
    pub async fn handle(&self, raw: &str, ctx: &HandlerContext<'_>) -> HandleOutcome {
        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, len = raw.len(), "web message is not JSON");
                return HandleOutcome::NotHandled;
            }
        };
        self.handle_message(message, ctx).await
    }

    /// Handle an already-decoded message.
    pub async fn handle_message(
        &self,
        message: InboundMessage,
        ctx: &HandlerContext<'_>,
    ) -> HandleOutcome {
        match message {
            InboundMessage::CameraPermissionRequest => {
                self.handle_camera_permission_request(ctx).await
            }
            InboundMessage::PushPayment(request) => handle_push_payment(request, ctx),
            InboundMessage::Other { kind, action } => {
                debug!(?kind, ?action, "no native handler for message");
                HandleOutcome::NotHandled
            }
        }
    }

    /// Answer a camera permission request.
    pub async fn handle_camera_permission_request(
        &self,
        ctx: &HandlerContext<'_>,
    ) -> HandleOutcome {
        let key = self.prompt_key(ctx.project_id);

        match self.store.get_item(&key).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                // First contact is only recorded: no prompt and no reply.
                if let Err(e) = self.store.set_item(&key, SEEN).await {
                    error!(key = %key, error = %e, "failed to persist camera prompt flag");
                }
                info!("first camera permission request recorded, skipping");
                return HandleOutcome::FirstContactRecorded;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "could not read camera prompt flag, answering request");
            }
        }

        let granted = match self.query_camera().await {
            Ok(status) => {
                debug!(?status, "camera permission resolved");
                status.is_usable()
            }
            Err(e) => {
                error!(error = %e, "camera permission check failed");
                false
            }
        };

        ctx.sender.send(&OutboundMessage::camera_permission(granted));
        if !granted {
            ctx.delegate.show_camera_permission_modal();
        }
        HandleOutcome::Responded
    }

    /// Check, then prompt if the OS still allows asking.
    async fn query_camera(&self) -> Result<PermissionStatus> {
        let status = self.permissions.check_camera().await?;
        if status == PermissionStatus::Denied {
            return self.permissions.request_camera().await;
        }
        Ok(status)
    }
}

fn handle_push_payment(request: PushPaymentRequest, ctx: &HandlerContext<'_>) -> HandleOutcome {
    let Some(url) = request.url else {
        warn!("payment request without url");
        ctx.sender
            .send(&OutboundMessage::error(Action::PushPayment, "Missing url"));
        return HandleOutcome::Responded;
    };

    let intent = PaymentIntent {
        url,
        success_url: request.success_url,
        cancel_url: request.cancel_url,
        request_id: request
            .request_id
            .unwrap_or_else(PaymentIntent::generate_request_id),
    };
    let request_id = intent.request_id.clone();

    info!(request_id = %request_id, "opening payment sheet");
    ctx.delegate.push_payment(intent);
    ctx.sender.send(&OutboundMessage::payment_opened(request_id));
    HandleOutcome::Responded
}

/// Send the user to this app's OS settings page. Failures are logged only.
pub fn open_system_settings(settings: &dyn SystemSettings) {
    if let Err(e) = settings.open_settings() {
        error!(error = %e, "failed to open system settings");
    }
}
