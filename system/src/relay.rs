use crate::audience::Audience;
use crate::message::{ClientMessage, RelayMessage};
use crate::session_registry::SessionRegistry;
use crate::stroke_store::StrokeStore;
use crate::types::ConnectionId;

/// A message the relay wants delivered, and to whom.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub audience: Audience,
    pub message: RelayMessage,
}

impl Dispatch {
    fn new(audience: Audience, message: RelayMessage) -> Self {
        Self { audience, message }
    }
}

/// Transport-agnostic relay state machine for the single shared canvas.
///
/// Every method runs to completion and returns what must be sent, so the
/// caller only has to deliver the dispatches in order.
#[derive(Debug, Default)]
pub struct Relay {
    store: StrokeStore,
    registry: SessionRegistry,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    pub fn users_count(&self) -> usize {
        self.registry.count()
    }

    pub fn connect(&mut self, connection_id: ConnectionId) -> Vec<Dispatch> {
        let count = self.registry.join();
        log::info!("Connection {} joined (total: {})", connection_id, count);

        let mut dispatches = vec![Dispatch::new(
            Audience::All,
            RelayMessage::UsersCount { count },
        )];
        let strokes = self.store.snapshot();
        if !strokes.is_empty() {
            dispatches.push(Dispatch::new(
                Audience::Only(connection_id),
                RelayMessage::Init { strokes },
            ));
        }
        dispatches
    }

    pub fn handle(&mut self, from: ConnectionId, message: ClientMessage) -> Option<Dispatch> {
        let others = Audience::AllExcept(from);
        match message {
            ClientMessage::Drawing { stroke } => {
                if self.store.append(stroke.clone()) {
                    Some(Dispatch::new(others, RelayMessage::Drawing { stroke }))
                } else {
                    log::warn!(
                        "Dropped drawing from {}: stroke {} is already active",
                        from,
                        stroke.stroke_id
                    );
                    None
                }
            }
            ClientMessage::Undo { stroke_id } => self
                .store
                .remove_active(&stroke_id)
                .map(|_| Dispatch::new(others, RelayMessage::Undo { stroke_id })),
            ClientMessage::Redo { stroke_id } => self.store.restore(&stroke_id).map(|stroke| {
                Dispatch::new(others, RelayMessage::Redo { stroke_id, stroke })
            }),
            ClientMessage::Clear { user_id } => {
                let removed = self.store.remove_active_where(&user_id);
                if removed == 0 {
                    return None;
                }
                log::debug!("Cleared {} strokes of {}", removed, user_id);
                Some(Dispatch::new(others, RelayMessage::Clear { user_id }))
            }
            ClientMessage::Chat(chat) => {
                Some(Dispatch::new(Audience::All, RelayMessage::Chat(chat)))
            }
        }
    }

    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Dispatch> {
        let count = self.registry.leave();
        log::info!("Connection {} left (total: {})", connection_id, count);

        if count == 0 {
            self.store.reset();
            log::info!("All clients disconnected, canvas cleared");
        }
        vec![Dispatch::new(
            Audience::AllExcept(connection_id),
            RelayMessage::UsersCount { count },
        )]
    }
}
