use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for one turn in the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(Uuid);

impl TurnId {
    /// Mints a new random turn identifier.
    pub fn create() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The human at the keyboard.
    User,

    /// The remote conversational agent.
    Agent,
}

/// One message exchanged in the conversation.
///
/// Turns are immutable once appended to a
/// [`ConversationLog`](crate::ConversationLog).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// Unique identifier of this turn.
    pub id: TurnId,

    /// The author of the turn.
    pub sender: Sender,

    /// The text of the turn.
    pub text: String,
}

impl Turn {
    /// Create a new turn with a fresh identifier.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: TurnId::create(),
            sender,
            text: text.into(),
        }
    }

    /// Create a new user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create a new agent turn.
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Sender::Agent, text)
    }

    /// Returns true if the user authored this turn.
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Returns true if the agent authored this turn.
    pub fn is_agent(&self) -> bool {
        self.sender == Sender::Agent
    }
}
