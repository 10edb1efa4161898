// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The bridge needs two things from the OS: the camera permission state and a
// way to send the user to the app's settings page. Mobile hosts implement
// these over their permission library; desktop/CI builds use the stub.

use async_trait::async_trait;

use shortapp_core::error::Result;
use shortapp_core::types::{PermissionStatus, Platform};

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: CameraPermissions + SystemSettings {
    fn platform(&self) -> Platform;

    /// Human-readable platform name (e.g. "iOS 17", "Android 14").
    fn platform_name(&self) -> &str;
}

/// Camera permission query/request.
#[async_trait]
pub trait CameraPermissions: Send + Sync {
    /// Current permission state, without prompting.
    async fn check_camera(&self) -> Result<PermissionStatus>;

    /// Show the OS prompt (if the OS still allows it) and return the outcome.
    async fn request_camera(&self) -> Result<PermissionStatus>;
}

/// Deep link into the OS settings page for this app.
pub trait SystemSettings: Send + Sync {
    fn open_settings(&self) -> Result<()>;
}
