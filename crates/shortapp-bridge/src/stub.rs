// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.
//
// Every capability returns `PlatformUnavailable`. The message handler treats
// that like a denial, so web pages still get a `granted: false` answer.

use async_trait::async_trait;

use shortapp_core::error::{Result, ShortAppError};
use shortapp_core::types::{PermissionStatus, Platform};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform(&self) -> Platform {
        Platform::Other
    }

    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

#[async_trait]
impl CameraPermissions for StubBridge {
    async fn check_camera(&self) -> Result<PermissionStatus> {
        tracing::warn!("CameraPermissions::check_camera called on stub bridge");
        Err(ShortAppError::PlatformUnavailable)
    }

    async fn request_camera(&self) -> Result<PermissionStatus> {
        tracing::warn!("CameraPermissions::request_camera called on stub bridge");
        Err(ShortAppError::PlatformUnavailable)
    }
}

impl SystemSettings for StubBridge {
    fn open_settings(&self) -> Result<()> {
        tracing::warn!("SystemSettings::open_settings called on stub bridge");
        Err(ShortAppError::PlatformUnavailable)
    }
}
