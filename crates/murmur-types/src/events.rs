use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Topic keys events are published under.
pub mod topics {
    pub const MESSAGE_CREATED: &str = "MESSAGE.CREATED";
}

/// Payload of the `MESSAGE.CREATED` topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreated {
    pub message: Message,
}

/// Events carried by the chat event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    /// A message was posted
    MessageCreated(MessageCreated),
}

impl ChatEvent {
    pub fn message_created(message: Message) -> Self {
        Self::MessageCreated(MessageCreated { message })
    }

    /// The topic this event is published under.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => topics::MESSAGE_CREATED,
        }
    }
}
