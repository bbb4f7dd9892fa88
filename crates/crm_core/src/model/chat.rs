//! Team chat model.
//!
//! # Invariants
//! - Team members are a fixed roster; they are never persisted or mutated.
//! - Chat messages use `timestamp` as their creation instant.

use super::{merge, Entity, EntityId, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender name used for messages written by the local user.
pub const LOCAL_USER: &str = "You";
/// Recipient name used for group-thread messages.
pub const GROUP_RECIPIENT: &str = "Team";

const DEFAULT_AVATAR: &str = "/placeholder.svg?height=32&width=32";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: EntityId,
    pub name: String,
    pub avatar: String,
    pub online: bool,
}

/// Returns the static team roster.
pub fn default_team() -> Vec<TeamMember> {
    [
        ("1", "John Doe", true),
        ("2", "Jane Smith", false),
        ("3", "Mike Johnson", true),
        ("4", "Sarah Wilson", true),
    ]
    .into_iter()
    .map(|(id, name, online)| TeamMember {
        id: id.to_string(),
        name: name.to_string(),
        avatar: DEFAULT_AVATAR.to_string(),
        online,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: EntityId,
    pub sender: String,
    pub recipient: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_group: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub sender: String,
    pub recipient: String,
    pub message: String,
    pub is_group: bool,
}

impl NewChatMessage {
    /// Message from the local user to the whole team.
    pub fn to_group(message: impl Into<String>) -> Self {
        Self {
            sender: LOCAL_USER.to_string(),
            recipient: GROUP_RECIPIENT.to_string(),
            message: message.into(),
            is_group: true,
        }
    }

    /// Direct message between two participants.
    pub fn direct(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            message: message.into(),
            is_group: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessagePatch {
    pub message: Option<String>,
}

impl Patch<ChatMessage> for ChatMessagePatch {
    fn apply_to(self, target: &mut ChatMessage) {
        merge(&mut target.message, self.message);
    }
}

impl Entity for ChatMessage {
    type Draft = NewChatMessage;

    const STORAGE_KEY: &'static str = "crm-messages";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewChatMessage) -> Self {
        Self {
            id,
            sender: draft.sender,
            recipient: draft.recipient,
            message: draft.message,
            timestamp: created_at,
            is_group: draft.is_group,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
