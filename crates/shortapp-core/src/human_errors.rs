// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the preview shell.
//
// Every technical error is mapped to a short heading plus a suggestion the
// host UI can show in an alert or toast.

use crate::error::ShortAppError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or dev server restarting. Trying again may work.
    Transient,
    /// User must do something (grant a permission, start the dev server).
    ActionRequired,
    /// Retrying will not help on this device or with this input.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether offering a "Retry" button makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ShortAppError` into a `HumanError`.
pub fn humanize_error(err: &ShortAppError) -> HumanError {
    match err {
        ShortAppError::MissingParameter(name) => HumanError {
            message: "Something needed to open this app is missing.".into(),
            suggestion: format!("Check the link you opened and try again. (Missing: {name})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ShortAppError::NativeModuleUnavailable => HumanError {
            message: "This build can't open app previews.".into(),
            suggestion: "Install the latest version of the app and try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ShortAppError::UnsupportedPlatform(platform) => HumanError {
            message: format!("App previews aren't available on {platform} yet."),
            suggestion: "Try opening the preview on an iPhone or iPad, or use the web preview.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ShortAppError::PreflightFailed(detail) => humanize_preflight(detail),

        ShortAppError::Native(detail) => HumanError {
            message: "The app preview stopped unexpectedly.".into(),
            suggestion: format!("Tap Reload to try again. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        ShortAppError::Permission(_) => HumanError {
            message: "We couldn't check camera access.".into(),
            suggestion: "Open Settings and make sure camera access is turned on for this app.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ShortAppError::Bridge(_) => HumanError {
            message: "The preview couldn't talk to the app.".into(),
            suggestion: "Reload the preview. If this keeps happening, restart the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ShortAppError::Storage(_) | ShortAppError::Io(_) => HumanError {
            message: "The app's local storage had a problem.".into(),
            suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ShortAppError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ShortAppError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Some features need a phone or tablet.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Manifest pre-flight details carry either an HTTP status or a transport error.
fn humanize_preflight(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("404") || lower.contains("410") {
        HumanError {
            message: "This app version couldn't be found.".into(),
            suggestion: "It may have been removed. Publish the project again, then reopen the preview.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else if lower.contains("connection refused") || lower.contains("timed out") {
        HumanError {
            message: "The development server isn't responding.".into(),
            suggestion: "Make sure the dev server is running and this device is on the same network.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "We couldn't reach this app.".into(),
            suggestion: format!("Check your internet connection and try again. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}
