// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer for the `shortapp` binary: data directory, persisted config,
// and the wired-up bridge/launcher objects the commands run against.

pub mod app_services;
pub mod data_dir;
pub mod terminal;
