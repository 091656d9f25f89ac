use std::fmt;

use serde::{Deserialize, Serialize};

/// Conversation lane of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Maps a backend role label onto a lane. Anything that is not the user
    /// is rendered as the assistant.
    pub fn from_wire(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "user" | "human" => Role::User,
            _ => Role::Assistant,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the session's sequence. Only used as a render key.
    pub id: usize,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(id: usize, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
        }
    }
}

/// Ordered message list for the current session.
///
/// Ids always equal the message's position. Every mutation bumps
/// [`MessageStore::revision`] so observers can detect change without
/// diffing the list.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
    revision: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the tail, assigning the next ordinal id.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let id = self.messages.len();
        self.messages.push(Message::new(id, role, content));
        self.revision += 1;
        &self.messages[id]
    }

    /// Substitutes the whole sequence, renumbering ids by position.
    pub fn replace_all(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages = messages
            .into_iter()
            .enumerate()
            .map(|(id, message)| Message { id, ..message })
            .collect();
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.revision += 1;
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
