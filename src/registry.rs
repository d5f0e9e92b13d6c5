//! Connection registry: identity → live channel handle.
//!
//! Professional and customer identities live in two separate maps because
//! their numeric ids are not guaranteed distinct. Each map holds at most one
//! handle per id; a newer handshake replaces the entry (last-handshake-wins)
//! without closing the older socket.
//!
//! Removal is keyed by the handle as well as the identity, so a late close
//! from a replaced connection cannot evict its successor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::domain::Identity;
use crate::protocol::OutboundMessage;

/// Sender half feeding a channel's outbound frame queue.
pub type OutboundSender = mpsc::UnboundedSender<OutboundMessage>;

/// Receiver half drained by a channel's socket writer.
pub type OutboundReceiver = mpsc::UnboundedReceiver<OutboundMessage>;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Send-capable handle to one live channel.
///
/// Cloning yields a handle to the same channel; equality is by channel id.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: u64,
    sender: OutboundSender,
}

impl ChannelHandle {
    /// Create a handle and the receiver its socket writer drains.
    #[must_use]
    pub fn open() -> (Self, OutboundReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed);
        (Self { id, sender }, receiver)
    }

    /// Process-unique channel id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether the channel's writer is still draining frames.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a frame. Returns `false` if the channel is gone.
    pub fn send(&self, message: OutboundMessage) -> bool {
        self.sender.send(message).is_ok()
    }
}

impl PartialEq for ChannelHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChannelHandle {}

/// Registry of live channels, one per identity.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    professionals: Arc<RwLock<HashMap<i64, ChannelHandle>>>,
    customers: Arc<RwLock<HashMap<i64, ChannelHandle>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn map_for(&self, identity: Identity) -> &RwLock<HashMap<i64, ChannelHandle>> {
        match identity {
            Identity::Professional(_) => &self.professionals,
            Identity::Customer(_) => &self.customers,
        }
    }

    /// Bind `identity` to `handle`, returning the handle it replaced.
    pub async fn register(
        &self,
        identity: Identity,
        handle: ChannelHandle,
    ) -> Option<ChannelHandle> {
        let channel_id = handle.id();
        let replaced = self
            .map_for(identity)
            .write()
            .await
            .insert(identity.id(), handle);

        if let Some(old) = &replaced {
            debug!(
                identity = %identity,
                old_channel = old.id(),
                new_channel = channel_id,
                "Registry entry replaced by newer handshake"
            );
        }

        replaced
    }

    /// Current handle for `identity`, if any.
    pub async fn resolve(&self, identity: Identity) -> Option<ChannelHandle> {
        self.map_for(identity)
            .read()
            .await
            .get(&identity.id())
            .cloned()
    }

    /// Remove `identity`'s entry if it still points at `handle`.
    ///
    /// Returns `true` if an entry was removed.
    pub async fn unregister(&self, identity: Identity, handle: &ChannelHandle) -> bool {
        let mut map = self.map_for(identity).write().await;
        match map.get(&identity.id()) {
            Some(current) if current == handle => {
                map.remove(&identity.id());
                true
            }
            Some(current) => {
                debug!(
                    identity = %identity,
                    closing_channel = handle.id(),
                    current_channel = current.id(),
                    "Stale close ignored, identity re-registered"
                );
                false
            }
            None => false,
        }
    }

    /// Number of registered professional channels.
    pub async fn professional_count(&self) -> usize {
        self.professionals.read().await.len()
    }

    /// Number of registered customer channels.
    pub async fn customer_count(&self) -> usize {
        self.customers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;

    fn ping() -> OutboundMessage {
        OutboundMessage::Location {
            data: Coordinate::new(0.0, 0.0),
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ChannelHandle::open();

        assert!(registry.register(Identity::Customer(3), handle.clone()).await.is_none());
        assert_eq!(registry.resolve(Identity::Customer(3)).await, Some(handle));
        assert_eq!(registry.resolve(Identity::Professional(3)).await, None);
    }

    #[tokio::test]
    async fn test_second_registration_replaces_first() {
        let registry = ConnectionRegistry::new();
        let (first, mut first_rx) = ChannelHandle::open();
        let (second, mut second_rx) = ChannelHandle::open();

        registry.register(Identity::Customer(3), first.clone()).await;
        let replaced = registry.register(Identity::Customer(3), second.clone()).await;
        assert_eq!(replaced, Some(first));

        let resolved = registry.resolve(Identity::Customer(3)).await.unwrap();
        assert!(resolved.send(ping()));

        assert!(second_rx.try_recv().is_ok());
        assert!(first_rx.try_recv().is_err());
        assert_eq!(registry.customer_count().await, 1);
    }

    #[tokio::test]
    async fn test_stale_unregister_keeps_newer_entry() {
        let registry = ConnectionRegistry::new();
        let (old, _old_rx) = ChannelHandle::open();
        let (new, _new_rx) = ChannelHandle::open();

        registry.register(Identity::Professional(7), old.clone()).await;
        registry.register(Identity::Professional(7), new.clone()).await;

        assert!(!registry.unregister(Identity::Professional(7), &old).await);
        assert_eq!(registry.resolve(Identity::Professional(7)).await, Some(new.clone()));

        assert!(registry.unregister(Identity::Professional(7), &new).await);
        assert_eq!(registry.resolve(Identity::Professional(7)).await, None);
    }

    #[tokio::test]
    async fn test_handle_reports_closed_after_receiver_drop() {
        let (handle, rx) = ChannelHandle::open();
        assert!(handle.is_open());
        drop(rx);
        assert!(!handle.is_open());
        assert!(!handle.send(ping()));
    }
}
