//! Wire format of the broadcast channel.
//!
//! ```text
//! {"topic":"kiosk-greeter","origin":"<uuid>","message":{"type":"result","data":{…}}}
//! {"topic":"kiosk-greeter","origin":"<uuid>","message":{"type":"reset"}}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::remote::GuestResult;

/// The only two things viewports tell each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum OrchestrationMessage {
    Result(GuestResult),
    Reset,
}

/// A message plus routing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub topic: String,
    /// Id of the viewport process that published the message.
    pub origin: Uuid,
    pub message: OrchestrationMessage,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, origin: Uuid, message: OrchestrationMessage) -> Self {
        Self {
            topic: topic.into(),
            origin,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{Attire, Gender};
    use serde_json::json;

    #[test]
    fn reset_wire_shape() {
        let value = serde_json::to_value(OrchestrationMessage::Reset).expect("serialise");
        assert_eq!(value, json!({"type": "reset"}));
    }

    #[test]
    fn result_wire_shape() {
        let msg = OrchestrationMessage::Result(GuestResult {
            name: "Asha".into(),
            gender: Gender::Female,
            attire: Attire::Suit,
            message: None,
        });
        let value = serde_json::to_value(&msg).expect("serialise");
        assert_eq!(
            value,
            json!({"type": "result", "data": {"name": "Asha", "gender": "female", "attire": "suit"}})
        );
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let parsed = serde_json::from_value::<OrchestrationMessage>(json!({"type": "ping"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn envelope_parses_from_peer_json() {
        let origin = Uuid::new_v4();
        let raw = json!({"topic": "kiosk", "origin": origin, "message": {"type": "reset"}});
        let env: Envelope = serde_json::from_value(raw).expect("parse");
        assert_eq!(env, Envelope::new("kiosk", origin, OrchestrationMessage::Reset));
    }
}
