// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ShortApp — WebView message bridge.
//
// A small whitelisted protocol between a page rendered in the host's WebView
// and the native host: camera permission negotiation and a payment handoff.
// Native capabilities are reached through the traits in `traits`; mobile
// hosts provide real implementations, desktop/CI builds get the stub.

pub mod handler;
pub mod payment;
pub mod protocol;
pub mod sender;
pub mod store;
pub mod stub;
pub mod traits;
pub mod web;

pub use handler::{HandleOutcome, HandlerContext, HostDelegate, MessageHandler};
pub use protocol::{Action, InboundMessage, OutboundMessage, is_allowed_action};
pub use sender::{MessagePort, NativeSender};
pub use web::WebBridge;

/// Bridge used when the embedding host does not inject its own.
///
/// iOS and Android hosts wire their permission library in through
/// `PlatformBridge`; everywhere else this is the stub.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    Box::new(stub::StubBridge)
}
