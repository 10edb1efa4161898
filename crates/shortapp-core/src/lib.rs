// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ShortApp — Core types, errors, and URL handling shared across all crates.

pub mod config;
pub mod error;
pub mod events;
pub mod human_errors;
pub mod types;
pub mod url;

pub use config::AppConfig;
pub use error::ShortAppError;
pub use events::{Listeners, Subscription};
pub use types::*;
