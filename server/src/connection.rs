use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Recipient, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio::sync::{mpsc, oneshot};

use whiteboard_system::{ClientMessage, ConnectionId, DecodeError};

use crate::config::Config;
use crate::connection_tx_storage::ConnectionTx;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug)]
pub enum ConnectionCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ConnectionId,
    },
    Message {
        from: ConnectionId,
        message: ClientMessage,
    },
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected { connection_id: ConnectionId },
    /// An encoded relay frame, ready to write.
    Text(String),
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

enum ConnectionState {
    Idle,
    Connected(ConnectionId),
    Closed,
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    outbox_capacity: usize,
    // Frames decoded before the relay assigned us an id.
    pending: Vec<ClientMessage>,
    // Dropped when the actor stops, which wakes the forwarding task.
    stopped_tx: Option<oneshot::Sender<()>>,
}

impl ConnectionActor {
    fn new(srv_tx: ServerTx, outbox_capacity: usize) -> Self {
        Self {
            state: ConnectionState::Idle,
            srv_tx,
            outbox_capacity,
            pending: Vec::new(),
            stopped_tx: None,
        }
    }

    fn submit(&self, command: ConnectionCommand) -> bool {
        if self.srv_tx.send(ServerCommand::Connection(command)).is_err() {
            log::error!("Relay task is gone");
            return false;
        }
        true
    }

    fn ingress(&mut self, text: &str) {
        let message = match ClientMessage::decode(text) {
            Ok(message) => message,
            Err(DecodeError::UnknownKind(kind)) => {
                log::warn!("Unknown message type: {}", kind);
                return;
            }
            Err(e) => {
                log::warn!("Dropped invalid message: {}", e);
                return;
            }
        };
        log::debug!("Ingress {}", message.kind());
        match self.state {
            ConnectionState::Connected(from) => {
                self.submit(ConnectionCommand::Message { from, message });
            }
            ConnectionState::Idle => self.pending.push(message),
            ConnectionState::Closed => {}
        }
    }
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (tx, rx) = mpsc::channel::<ConnectionEvent>(self.outbox_capacity);

        if !self.submit(ConnectionCommand::Connect { tx }) {
            ctx.stop();
            return;
        }

        let recipient: Recipient<ConnectionActorMessage> = ctx.address().recipient();
        let srv_tx = self.srv_tx.clone();
        let (stopped_tx, stopped_rx) = oneshot::channel::<()>();
        self.stopped_tx = Some(stopped_tx);

        actix::spawn(forward_events(rx, stopped_rx, srv_tx, move |event| {
            if !recipient.connected() {
                return false;
            }
            recipient.do_send(ConnectionActorMessage(event));
            true
        }));
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Connected(id) = self.state {
            self.submit(ConnectionCommand::Disconnect { from: id });
        }
        self.state = ConnectionState::Closed;
        drop(self.stopped_tx.take());
        Running::Stop
    }
}

/// Moves events from the relay's outbox into the actor until either side
/// goes away, then reports the disconnect if the relay ever assigned an id.
///
/// `deliver` returns `false` once the actor can no longer take events.
/// An actor that stops before its `Connected` event arrives is still
/// reported, as soon as that event shows up.
async fn forward_events<F>(
    mut rx: mpsc::Receiver<ConnectionEvent>,
    mut stopped_rx: oneshot::Receiver<()>,
    srv_tx: ServerTx,
    mut deliver: F,
) where
    F: FnMut(ConnectionEvent) -> bool,
{
    let mut connection_id = None;
    let mut stopped = false;
    loop {
        tokio::select! {
            event = rx.recv() => {
                let event = match event {
                    Some(event) => event,
                    None => break,
                };
                if let ConnectionEvent::Connected { connection_id: id } = &event {
                    connection_id = Some(*id);
                }
                if !stopped && !deliver(event) {
                    stopped = true;
                }
                if stopped && connection_id.is_some() {
                    break;
                }
            }
            _ = &mut stopped_rx, if !stopped => {
                stopped = true;
                if connection_id.is_some() {
                    break;
                }
            }
        }
    }
    if let Some(from) = connection_id {
        let _ = srv_tx.send(ServerCommand::Connection(ConnectionCommand::Disconnect { from }));
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(text)) => self.ingress(&text),
            Ok(ws::Message::Binary(bin)) => {
                log::debug!("Ignored binary frame of {} bytes", bin.len());
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                log::warn!("WebSocket protocol error: {}", e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        match msg.0 {
            ConnectionEvent::Connected { connection_id } => {
                if let ConnectionState::Closed = self.state {
                    return;
                }
                self.state = ConnectionState::Connected(connection_id);
                for message in std::mem::take(&mut self.pending) {
                    self.submit(ConnectionCommand::Message {
                        from: connection_id,
                        message,
                    });
                }
            }
            ConnectionEvent::Text(text) => {
                log::debug!("Egress size: {}", text.len());
                ctx.text(text);
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<Config>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor::new(srv_tx.get_ref().clone(), config.outbox_capacity),
        &req,
        stream,
    )
}
