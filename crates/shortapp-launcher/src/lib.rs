// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ShortApp — SubApp Launcher facade.
//
// Opens published sub-apps (manifest + JS bundle) full screen through the
// native launcher module, with a HEAD pre-flight so an unreachable manifest
// becomes an error instead of a crash.

pub mod launcher;
pub mod native;
pub mod preflight;
pub mod session;

pub use launcher::SubAppLauncher;
pub use native::{LauncherEvent, LauncherEvents, NativeLauncher};
pub use preflight::{HttpManifestProbe, ManifestProbe, ProbeResponse};
pub use session::{OpenRequest, PreviewSession, PreviewState};
