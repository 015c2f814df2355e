use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::{ChatMessage, Stroke, StrokeId, UserId};

const CLIENT_KINDS: [&str; 5] = ["drawing", "undo", "redo", "clear", "chat"];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("payload has no `type` tag")]
    MissingKind,
    #[error("unknown message type `{0}`")]
    UnknownKind(String),
    #[error("`{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Drawing {
        stroke: Stroke,
    },
    #[serde(rename_all = "camelCase")]
    Undo {
        stroke_id: StrokeId,
    },
    #[serde(rename_all = "camelCase")]
    Redo {
        stroke_id: StrokeId,
    },
    #[serde(rename_all = "camelCase")]
    Clear {
        user_id: UserId,
    },
    Chat(ChatMessage),
}

impl ClientMessage {
    /// Decodes one text frame. Unknown tags are reported separately from
    /// payloads that fail to parse so the caller can log them differently.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        match value.get("type").and_then(Value::as_str) {
            None => return Err(DecodeError::MissingKind),
            Some(kind) if !CLIENT_KINDS.contains(&kind) => {
                return Err(DecodeError::UnknownKind(kind.to_owned()))
            }
            Some(_) => {}
        }
        let message: ClientMessage = serde_json::from_value(value)?;
        message.validate()
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Drawing { .. } => "drawing",
            Self::Undo { .. } => "undo",
            Self::Redo { .. } => "redo",
            Self::Clear { .. } => "clear",
            Self::Chat(_) => "chat",
        }
    }

    fn validate(self) -> Result<Self, DecodeError> {
        let empty = match &self {
            Self::Drawing { stroke } => stroke.stroke_id.is_empty().then(|| "strokeId"),
            Self::Undo { stroke_id } | Self::Redo { stroke_id } => {
                stroke_id.is_empty().then(|| "strokeId")
            }
            Self::Clear { user_id } => user_id.is_empty().then(|| "userId"),
            Self::Chat(_) => None,
        };
        match empty {
            Some(field) => Err(DecodeError::EmptyField(field)),
            None => Ok(self),
        }
    }
}

/// Frames the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RelayMessage {
    Init {
        strokes: Vec<Stroke>,
    },
    UsersCount {
        count: usize,
    },
    Drawing {
        stroke: Stroke,
    },
    #[serde(rename_all = "camelCase")]
    Undo {
        stroke_id: StrokeId,
    },
    #[serde(rename_all = "camelCase")]
    Redo {
        stroke_id: StrokeId,
        stroke: Stroke,
    },
    #[serde(rename_all = "camelCase")]
    Clear {
        user_id: UserId,
    },
    Chat(ChatMessage),
}

impl RelayMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::UsersCount { .. } => "usersCount",
            Self::Drawing { .. } => "drawing",
            Self::Undo { .. } => "undo",
            Self::Redo { .. } => "redo",
            Self::Clear { .. } => "clear",
            Self::Chat(_) => "chat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use serde_json::json;

    #[test]
    fn it_decodes_drawing_from_browser_payload() {
        let text = json!({
            "type": "drawing",
            "stroke": {
                "id": "u1",
                "strokeId": "s1",
                "userId": "u1",
                "color": "#ff0000",
                "size": 5,
                "points": [{ "x": 0.1, "y": 0.1 }]
            }
        })
        .to_string();

        match ClientMessage::decode(&text).expect("") {
            ClientMessage::Drawing { stroke } => {
                assert_eq!(stroke.stroke_id, "s1");
                assert_eq!(stroke.size(), Some(5.0));
                assert_eq!(stroke.points(), vec![Point::new(0.1, 0.1)]);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn it_decodes_stroke_with_only_an_id() {
        let text = r#"{"type":"drawing","stroke":{"id":"u1","strokeId":"s1","userId":"u1","size":5,"points":[]}}"#;
        match ClientMessage::decode(text).expect("") {
            ClientMessage::Drawing { stroke } => {
                assert_eq!(stroke.color(), None);
                assert!(stroke.is_authored_by("u1"));
            }
            other => panic!("unexpected message: {:?}", other),
        }

        let bare = r#"{"type":"drawing","stroke":{"strokeId":"s1"}}"#;
        assert!(ClientMessage::decode(bare).is_ok());
    }

    #[test]
    fn it_decodes_chat_fields() {
        let text = r#"{"type":"chat","text":"hi","username":"bob","timestamp":"10:42"}"#;
        assert_eq!(
            ClientMessage::decode(text).expect(""),
            ClientMessage::Chat(ChatMessage::new("hi", "bob", "10:42"))
        );
    }

    #[test]
    fn it_relays_chat_payload_unchanged() {
        let text = r#"{"type":"chat","text":"hi","username":"bob","timestamp":"10:42","color":"red"}"#;
        let chat = match ClientMessage::decode(text).expect("") {
            ClientMessage::Chat(chat) => chat,
            other => panic!("unexpected message: {:?}", other),
        };
        let out = RelayMessage::Chat(chat).encode().expect("");
        assert_eq!(
            serde_json::from_str::<Value>(&out).expect(""),
            serde_json::from_str::<Value>(text).expect("")
        );

        let untimed = r#"{"type":"chat","text":"hi","timestamp":1700000000}"#;
        assert!(ClientMessage::decode(untimed).is_ok());
    }

    #[test]
    fn it_reports_unknown_kind() {
        let result = ClientMessage::decode(r#"{"type":"cursor","x":1}"#);
        assert!(matches!(result, Err(DecodeError::UnknownKind(kind)) if kind == "cursor"));
    }

    #[test]
    fn it_treats_relay_only_kinds_as_unknown() {
        let result = ClientMessage::decode(r#"{"type":"init","strokes":[]}"#);
        assert!(matches!(result, Err(DecodeError::UnknownKind(_))));
    }

    #[test]
    fn it_rejects_malformed_payloads() {
        assert!(matches!(
            ClientMessage::decode("not json"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"type":"drawing","stroke":null}"#),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"type":"undo"}"#),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode(r##"{"type":"drawing","stroke":{"color":"#000"}}"##),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"strokeId":"s1"}"#),
            Err(DecodeError::MissingKind)
        ));
    }

    #[test]
    fn it_rejects_empty_ids() {
        assert!(matches!(
            ClientMessage::decode(r#"{"type":"undo","strokeId":""}"#),
            Err(DecodeError::EmptyField("strokeId"))
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"type":"clear","userId":""}"#),
            Err(DecodeError::EmptyField("userId"))
        ));
    }

    #[test]
    fn it_accepts_what_clients_encode() {
        let redo = ClientMessage::Redo {
            stroke_id: "s1".into(),
        };
        let text = redo.encode().expect("");
        assert_eq!(
            serde_json::from_str::<Value>(&text).expect(""),
            json!({ "type": "redo", "strokeId": "s1" })
        );
        assert_eq!(ClientMessage::decode(&text).expect(""), redo);
    }

    #[test]
    fn it_encodes_relay_messages_with_type_tag() {
        let users = RelayMessage::UsersCount { count: 3 }.encode().expect("");
        assert_eq!(
            serde_json::from_str::<Value>(&users).expect(""),
            json!({ "type": "usersCount", "count": 3 })
        );

        let undo = RelayMessage::Undo {
            stroke_id: "s1".into(),
        }
        .encode()
        .expect("");
        assert_eq!(
            serde_json::from_str::<Value>(&undo).expect(""),
            json!({ "type": "undo", "strokeId": "s1" })
        );

        let chat = RelayMessage::Chat(ChatMessage::new("hi", "bob", "10:42"))
            .encode()
            .expect("");
        assert_eq!(
            serde_json::from_str::<Value>(&chat).expect(""),
            json!({ "type": "chat", "text": "hi", "username": "bob", "timestamp": "10:42" })
        );
    }
}
