// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire protocol shared by both ends of the WebView bridge.
//
// Every message is a JSON object `{type, action, ...}`. Only the three
// actions below may cross the bridge; anything else is dropped on send and on
// receive.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shortapp_core::error::Result;
use shortapp_core::types::PaymentStatus;

/// The closed set of bridge actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Web page asks whether it may use the camera.
    #[serde(rename = "getCameraPermission")]
    GetCameraPermission,
    /// Web page hands a checkout URL to the native payment sheet.
    #[serde(rename = "pushScripe")]
    PushPayment,
    /// Native side reports how a payment ended.
    #[serde(rename = "stripe.paymentResult")]
    PaymentResult,
}

impl Action {
    pub const ALL: [Action; 3] = [
        Action::GetCameraPermission,
        Action::PushPayment,
        Action::PaymentResult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetCameraPermission => "getCameraPermission",
            Self::PushPayment => "pushScripe",
            Self::PaymentResult => "stripe.paymentResult",
        }
    }

    pub fn from_wire(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == action)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `action` belongs to the bridge whitelist.
pub fn is_allowed_action(action: &str) -> bool {
    Action::from_wire(action).is_some()
}

/// Whitelist gate applied to raw JSON values on every send/receive path.
///
/// The routing key is `action`, falling back to `event`. Values without a
/// routing key pass; values whose key is not a whitelisted string do not.
pub fn passes_whitelist(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return true;
    };
    let key = ["action", "event"]
        .iter()
        .filter_map(|field| obj.get(*field))
        .find(|v| is_truthy(v));
    match key {
        None => true,
        Some(Value::String(action)) => is_allowed_action(action),
        Some(_) => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

/// The `type` field of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
    Event,
    Notification,
}

/// Fields of a `pushScripe` request. Falsy values (blank, `0`, `false`,
/// `null`) are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPaymentRequest {
    pub url: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
    pub request_id: Option<String>,
}

impl PushPaymentRequest {
    fn from_fields(obj: &Map<String, Value>) -> Self {
        Self {
            url: text_field(obj, "url"),
            success_url: text_field(obj, "successUrl"),
            cancel_url: text_field(obj, "cancelUrl"),
            request_id: text_field(obj, "requestId"),
        }
    }
}

/// Any truthy value counts as present; non-strings keep their JSON text.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) => None,
        other if is_truthy(other) => Some(other.to_string()),
        _ => None,
    }
}

/// A message received from the web page, keyed on `(type, action)`.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    CameraPermissionRequest,
    PushPayment(PushPaymentRequest),
    /// Parsed fine, but no native handler exists for this combination.
    Other {
        kind: Option<String>,
        action: Option<String>,
    },
}

impl InboundMessage {
    /// Parse a raw `postMessage` string. Fails only on malformed JSON.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value))
    }

    /// Classify an already-parsed payload.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Other {
                kind: None,
                action: None,
            };
        };
        let kind = obj.get("type").and_then(Value::as_str);
        let action = obj.get("action").and_then(Value::as_str);

        let is_request = kind == Some("request");
        match action.and_then(Action::from_wire) {
            Some(Action::GetCameraPermission) if is_request => Self::CameraPermissionRequest,
            Some(Action::PushPayment) if is_request => {
                Self::PushPayment(PushPaymentRequest::from_fields(obj))
            }
            _ => Self::Other {
                kind: kind.map(str::to_string),
                action: action.map(str::to_string),
            },
        }
    }
}

/// Acknowledgement status for a payment sheet that was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Opened,
}

/// Action-specific fields of an outbound envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundPayload {
    CameraPermission {
        granted: bool,
    },
    PaymentOpened {
        #[serde(rename = "requestId")]
        request_id: String,
        status: AckStatus,
    },
    Error {
        error: String,
    },
    PaymentResult {
        #[serde(rename = "requestId")]
        request_id: String,
        status: PaymentStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// A message sent from the native host to the web page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub action: Action,
    #[serde(flatten)]
    pub payload: OutboundPayload,
}

impl OutboundMessage {
    pub fn camera_permission(granted: bool) -> Self {
        Self {
            kind: MessageKind::Response,
            action: Action::GetCameraPermission,
            payload: OutboundPayload::CameraPermission { granted },
        }
    }

    pub fn payment_opened(request_id: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Response,
            action: Action::PushPayment,
            payload: OutboundPayload::PaymentOpened {
                request_id: request_id.into(),
                status: AckStatus::Opened,
            },
        }
    }

    pub fn error(action: Action, error: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Response,
            action,
            payload: OutboundPayload::Error {
                error: error.into(),
            },
        }
    }

    pub fn payment_result(
        request_id: impl Into<String>,
        status: PaymentStatus,
        message: Option<String>,
    ) -> Self {
        Self {
            kind: MessageKind::Event,
            action: Action::PaymentResult,
            payload: OutboundPayload::PaymentResult {
                request_id: request_id.into(),
                status,
                message,
            },
        }
    }
}
