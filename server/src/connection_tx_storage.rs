use std::collections::BTreeMap;

use tokio::sync::mpsc::error::TrySendError;
use whiteboard_system::{Audience, ConnectionId};

use crate::connection::ConnectionEvent;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

/// Outboxes of every open connection, keyed by id.
pub struct ConnectionTxStorage {
    connection_txs: BTreeMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connection_txs.contains_key(connection_id)
    }

    /// Never waits: a full or closed outbox drops the event.
    pub fn send(&self, to: &ConnectionId, event: ConnectionEvent) -> bool {
        let tx = match self.connection_txs.get(to) {
            Some(tx) => tx,
            None => {
                log::warn!("No outbox for connection {}", to);
                return false;
            }
        };
        if tx.is_closed() {
            log::debug!("Skipped closed connection {}", to);
            return false;
        }
        match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("Outbox of connection {} is full, frame skipped", to);
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Skipped closed connection {}", to);
                false
            }
        }
    }

    /// Sends one encoded frame to every open connection in `audience`.
    /// Returns how many accepted it.
    pub fn deliver(&self, audience: Audience, text: &str) -> usize {
        audience
            .select(self.connection_txs.keys().copied())
            .iter()
            .filter(|id| self.send(id, ConnectionEvent::Text(text.to_owned())))
            .count()
    }
}
