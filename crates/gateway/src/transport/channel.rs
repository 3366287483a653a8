//! Inbound message channel
//!
//! The session's reader posts every decoded callback here. The channel is
//! unbounded so the reader never waits on the scheduling loop.

use crate::messages::GatewayMessage;
use tokio::sync::mpsc;

/// Sending half held by the session
pub type InboundSender = mpsc::UnboundedSender<GatewayMessage>;

/// Receiving half consumed by the scheduling loop
pub type InboundReceiver = mpsc::UnboundedReceiver<GatewayMessage>;

/// Create the channel connecting a session to its consumer
pub fn inbound_channel() -> (InboundSender, InboundReceiver) {
    mpsc::unbounded_channel()
}
