//! Channel session protocol.
//!
//! One [`ChannelSession`] governs one bidirectional channel:
//!
//! ```text
//! Connecting ──open()──▶ Open ──close()──▶ Closed
//! ```
//!
//! - `open` queues the one-shot replay (self-echo for professionals, tracked
//!   locations for customers) and then registers the identity.
//! - While open, `location` frames from professionals are written through
//!   and broadcast; frames from customers are ignored; malformed frames are
//!   dropped with a debug trace.
//! - `close` removes the registry entry only if it still points at this
//!   channel.
//!
//! There is no server-side reconnect state: a reconnecting client performs a
//! brand-new handshake.
//!
//! Handshakes that do not resolve to an identity are handled according to
//! [`HandshakePolicy`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::broadcast::{BroadcastEngine, BroadcastReport};
use crate::domain::Identity;
use crate::protocol::{decode_inbound, parse_handshake, InboundMessage};
use crate::registry::{ChannelHandle, OutboundReceiver};

/// Close code sent when an unidentified handshake is refused.
pub const CLOSE_UNIDENTIFIED: u16 = 4400;

/// What to do with a connection whose handshake names no usable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakePolicy {
    /// Upgrade, then close immediately with [`CLOSE_UNIDENTIFIED`].
    #[default]
    Refuse,
    /// Keep the channel open but never register it or send anything.
    Inert,
}

impl FromStr for HandshakePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "refuse" => Ok(Self::Refuse),
            "inert" => Ok(Self::Inert),
            other => Err(format!("unknown handshake policy '{other}'")),
        }
    }
}

impl fmt::Display for HandshakePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Refuse => "refuse",
            Self::Inert => "inert",
        })
    }
}

/// Admission decision for a connection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The handshake names an identity.
    Accept(Identity),
    /// Close right after upgrade.
    Refuse {
        /// Why the handshake was rejected
        reason: String,
    },
    /// Keep open, never register.
    Inert {
        /// Why the handshake was rejected
        reason: String,
    },
}

/// Decide how to treat a connection request's query parameters.
#[must_use]
pub fn admit(params: &HashMap<String, String>, policy: HandshakePolicy) -> Admission {
    match parse_handshake(params) {
        Ok(identity) => Admission::Accept(identity),
        Err(err) => {
            let reason = err.to_string();
            match policy {
                HandshakePolicy::Refuse => Admission::Refuse { reason },
                HandshakePolicy::Inert => Admission::Inert { reason },
            }
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake accepted, not yet registered.
    Connecting,
    /// Registered and exchanging frames.
    Open,
    /// Unregistered; no further frames are processed.
    Closed,
}

/// Result of processing one inbound text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was a location report and was broadcast.
    Broadcast(BroadcastReport),
    /// The frame did not decode.
    Dropped,
    /// The frame decoded but this session may not send it, or the session
    /// is not open.
    Ignored,
    /// The broadcast failed; the update is lost.
    Failed,
}

/// Server side of one identified channel.
pub struct ChannelSession {
    identity: Identity,
    handle: ChannelHandle,
    engine: BroadcastEngine,
    state: SessionState,
}

impl ChannelSession {
    /// Create a session in the `Connecting` state.
    ///
    /// The returned receiver yields every frame queued for this channel.
    #[must_use]
    pub fn new(identity: Identity, engine: BroadcastEngine) -> (Self, OutboundReceiver) {
        let (handle, receiver) = ChannelHandle::open();
        (
            Self {
                identity,
                handle,
                engine,
                state: SessionState::Connecting,
            },
            receiver,
        )
    }

    /// Identity this session is bound to.
    #[must_use]
    pub const fn identity(&self) -> Identity {
        self.identity
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Handle other components use to push to this channel.
    #[must_use]
    pub const fn handle(&self) -> &ChannelHandle {
        &self.handle
    }

    /// Queue the initial-state replay, then register the channel.
    ///
    /// The replay is queued before registration so a live push can never sit
    /// ahead of an older replayed coordinate. Returns the number of replay
    /// frames queued. Replay failures are traced and leave the session open.
    pub async fn open(&mut self) -> usize {
        if self.state != SessionState::Connecting {
            return 0;
        }

        let replay = match self.identity {
            Identity::Professional(id) => {
                self.engine.replay_for_professional(id, &self.handle).await
            }
            Identity::Customer(id) => self.engine.replay_for_customer(id, &self.handle).await,
        };
        let sent = match replay {
            Ok(sent) => {
                debug!(identity = %self.identity, sent, "Initial replay queued");
                sent
            }
            Err(e) => {
                warn!(identity = %self.identity, error = %e, "Initial replay failed");
                0
            }
        };

        self.engine
            .registry()
            .register(self.identity, self.handle.clone())
            .await;
        self.state = SessionState::Open;
        info!(identity = %self.identity, channel = self.handle.id(), "Channel open");

        sent
    }

    /// Process one inbound text frame.
    pub async fn handle_text(&self, text: &str) -> FrameOutcome {
        if self.state != SessionState::Open {
            return FrameOutcome::Ignored;
        }

        let message = match decode_inbound(text) {
            Ok(message) => message,
            Err(e) => {
                debug!(identity = %self.identity, error = %e, "Dropping malformed frame");
                return FrameOutcome::Dropped;
            }
        };

        let Identity::Professional(professional_id) = self.identity else {
            debug!(identity = %self.identity, "Ignoring frame from customer channel");
            return FrameOutcome::Ignored;
        };

        match message {
            InboundMessage::Location { data } => {
                match self
                    .engine
                    .on_professional_location_update(professional_id, data)
                    .await
                {
                    Ok(report) => FrameOutcome::Broadcast(report),
                    Err(e) => {
                        warn!(professional_id, error = %e, "Location update lost");
                        FrameOutcome::Failed
                    }
                }
            }
        }
    }

    /// Tear the session down and release its registry entry.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        let removed = self
            .engine
            .registry()
            .unregister(self.identity, &self.handle)
            .await;
        self.state = SessionState::Closed;
        info!(
            identity = %self.identity,
            channel = self.handle.id(),
            removed,
            "Channel closed"
        );
    }
}
