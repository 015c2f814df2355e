pub extern crate serde;
pub extern crate serde_json;
pub extern crate uuid;

mod audience;
mod canvas_replica;
mod message;
mod relay;
mod session_registry;
mod stroke_store;
mod types;

pub use audience::Audience;
pub use canvas_replica::CanvasReplica;
pub use message::{ClientMessage, DecodeError, RelayMessage};
pub use relay::{Dispatch, Relay};
pub use session_registry::SessionRegistry;
pub use stroke_store::StrokeStore;
pub use types::*;
