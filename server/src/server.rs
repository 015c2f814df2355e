use std::num::Wrapping;

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::oneshot;

use whiteboard_system::{ConnectionId, Dispatch, Relay};

use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::ConnectionTxStorage;

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Status { tx: oneshot::Sender<RelayStatus> },
}

impl From<ConnectionCommand> for ServerCommand {
    fn from(command: ConnectionCommand) -> Self {
        ServerCommand::Connection(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatus {
    pub users_count: usize,
    pub active_strokes: usize,
    pub history_length: usize,
}

/// Sole owner of the relay state. Commands from every connection are
/// handled one at a time, which is what keeps the store consistent.
struct Server {
    relay: Relay,
    connections: ConnectionTxStorage,
    connection_id_source: Wrapping<ConnectionId>,
}

impl Server {
    fn new() -> Self {
        Self {
            relay: Relay::new(),
            connections: ConnectionTxStorage::new(),
            connection_id_source: Wrapping(0),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Status { tx } => {
                let _ = tx.send(self.status());
            }
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let connection_id = self.new_connection_id();
                self.connections.insert(connection_id, tx);
                self.connections
                    .send(&connection_id, ConnectionEvent::Connected { connection_id });
                let dispatches = self.relay.connect(connection_id);
                self.deliver_all(dispatches);
            }
            ConnectionCommand::Disconnect { from } => {
                if self.connections.remove(&from).is_some() {
                    let dispatches = self.relay.disconnect(from);
                    self.deliver_all(dispatches);
                }
            }
            ConnectionCommand::Message { from, message } => {
                if !self.connections.contains(&from) {
                    log::warn!("Message from unknown connection {}", from);
                    return;
                }
                if let Some(dispatch) = self.relay.handle(from, message) {
                    self.deliver(dispatch);
                }
            }
        }
    }

    fn deliver_all(&self, dispatches: Vec<Dispatch>) {
        for dispatch in dispatches {
            self.deliver(dispatch);
        }
    }

    fn deliver(&self, dispatch: Dispatch) {
        let kind = dispatch.message.kind();
        match dispatch.message.encode() {
            Ok(text) => {
                let delivered = self.connections.deliver(dispatch.audience, &text);
                log::debug!("Egress {} to {} connections", kind, delivered);
            }
            Err(e) => log::error!("Failed to encode {}: {}", kind, e),
        }
    }

    fn status(&self) -> RelayStatus {
        RelayStatus {
            users_count: self.relay.users_count(),
            active_strokes: self.relay.store().active_len(),
            history_length: self.relay.store().history_len(),
        }
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        loop {
            self.connection_id_source += Wrapping(1);
            let id = self.connection_id_source.0;
            if !self.connections.contains(&id) {
                break id;
            }
        }
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Server::new();

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!("Relay task terminated");
    });

    srv_tx
}
