// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ShortApp host shell.

use serde::{Deserialize, Serialize};

/// Mobile platform the host is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    /// Desktop, CI, or anything else without a native launcher.
    Other,
}

impl Platform {
    /// Platform of the current compilation target.
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ios => "iOS",
            Self::Android => "Android",
            Self::Other => "this platform",
        };
        f.write_str(name)
    }
}

/// Snapshot of a sub-app download phase, as broadcast by the native launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingProgress {
    /// Free-form status line (e.g. "Downloading bundle...").
    pub status: String,
    /// Units finished. The native side reports plain JS numbers, so these
    /// may be fractional.
    pub done: f64,
    pub total: f64,
    /// Fraction complete, 0.0 - 1.0.
    pub progress: f64,
}

impl LoadingProgress {
    /// Progress record used when a load starts, before the native side reports.
    pub fn starting(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            done: 0.0,
            total: 1.0,
            progress: 0.0,
        }
    }

    /// Progress fraction clamped into `[0, 1]`. NaN counts as zero.
    pub fn fraction(&self) -> f64 {
        if self.progress.is_nan() {
            0.0
        } else {
            self.progress.clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fraction() >= 1.0
    }
}

/// Payload of the native `onUpdateDetected` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetected {
    pub has_update: bool,
    #[serde(default)]
    pub manifest: serde_json::Value,
    #[serde(default)]
    pub manifest_id: String,
}

/// Payload of the native `onSubAppError` event (JS error handler inside the sub-app).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAppErrorEvent {
    pub message: String,
    #[serde(default)]
    pub is_fatal: bool,
}

/// A payment handed from the web page to the native payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Checkout page to load.
    pub url: String,
    /// Navigating to a URL containing this string completes the payment.
    pub success_url: Option<String>,
    /// Navigating to a URL containing this string cancels the payment.
    pub cancel_url: Option<String>,
    pub request_id: String,
}

impl PaymentIntent {
    /// Request id for senders that did not supply one.
    pub fn generate_request_id() -> String {
        format!("stripe_{}", chrono::Utc::now().timestamp_millis())
    }
}

/// Terminal state of a payment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Cancel,
    Error,
}

/// OS permission state, mirroring the values the permission libraries report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Hardware or feature missing on this device.
    Unavailable,
    /// Not yet asked, or asked and refused but still requestable.
    Denied,
    /// Granted with restrictions (iOS limited access).
    Limited,
    Granted,
    /// Refused permanently; only the settings app can change it.
    Blocked,
}

impl PermissionStatus {
    /// Whether the web page may use the capability.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Granted | Self::Limited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fraction_is_clamped() {
        let mut p = LoadingProgress::starting("x");
        p.progress = 1.7;
        assert_eq!(p.fraction(), 1.0);
        assert!(p.is_complete());
        p.progress = -0.2;
        assert_eq!(p.fraction(), 0.0);
        p.progress = f64::NAN;
        assert_eq!(p.fraction(), 0.0);
    }

    #[test]
    fn update_event_uses_native_field_names() {
        let json = r#"{"hasUpdate":true,"manifest":{"id":"m1"},"manifestId":"m1"}"#;
        let event: UpdateDetected = serde_json::from_str(json).expect("parse failed");
        assert!(event.has_update);
        assert_eq!(event.manifest_id, "m1");
    }

    #[test]
    fn generated_request_id_has_prefix() {
        let id = PaymentIntent::generate_request_id();
        assert!(id.starts_with("stripe_"));
        assert!(id["stripe_".len()..].parse::<i64>().is_ok());
    }

    #[test]
    fn limited_and_granted_are_usable() {
        assert!(PermissionStatus::Granted.is_usable());
        assert!(PermissionStatus::Limited.is_usable());
        assert!(!PermissionStatus::Denied.is_usable());
        assert!(!PermissionStatus::Blocked.is_usable());
        assert!(!PermissionStatus::Unavailable.is_usable());
    }
}
