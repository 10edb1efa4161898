// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ShortApp.

use thiserror::Error;

use crate::types::Platform;

/// Top-level error type for all ShortApp operations.
#[derive(Debug, Error)]
pub enum ShortAppError {
    // -- Configuration errors --
    #[error("{0} is required")]
    MissingParameter(&'static str),

    #[error("SubAppLauncher native module is not available")]
    NativeModuleUnavailable,

    #[error("sub-app launching is not supported on {0} yet")]
    UnsupportedPlatform(Platform),

    // -- Network --
    #[error("manifest preflight failed: {0}")]
    PreflightFailed(String),

    // -- Native launcher --
    #[error("native launcher error: {0}")]
    Native(String),

    // -- Bridge / permissions --
    #[error("permission query failed: {0}")]
    Permission(String),

    #[error("web bridge error: {0}")]
    Bridge(String),

    // -- Storage / persistence --
    #[error("key-value storage error: {0}")]
    Storage(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShortAppError>;
