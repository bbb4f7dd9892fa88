//! Simulated team-chat replies and e-mail delivery.
//!
//! Both perform ordinary store mutations through the worker after a delay,
//! exactly as a user action would.

use crate::config::SimulationConfig;
use crate::model::activity::{Email, EmailPatch, EmailStatus};
use crate::model::chat::{ChatMessage, NewChatMessage, LOCAL_USER};
use crate::service::activity_service::{ActivityService, SendEmailRequest, ServiceError};
use crate::store::EntityStore;
use crate::worker::{StoreHandle, WorkerError};
use log::{info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::task::JoinHandle;

/// Canned replies used by simulated team members.
pub const AUTO_REPLIES: [&str; 5] = [
    "Thanks for the update!",
    "Got it, will handle this.",
    "Let me check on that.",
    "Sounds good to me.",
    "I'll get back to you shortly.",
];

#[derive(Debug)]
pub enum SimulationError {
    Worker(WorkerError),
    Service(ServiceError),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Worker(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Worker(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<WorkerError> for SimulationError {
    fn from(value: WorkerError) -> Self {
        Self::Worker(value)
    }
}

impl From<ServiceError> for SimulationError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

/// Where a chat message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    Group,
    /// Direct message to a team member by name.
    Member(String),
}

/// Result of sending one chat message.
#[derive(Debug)]
pub struct SentChat {
    pub message: ChatMessage,
    /// Pending auto-reply, for direct messages only.
    pub reply: Option<JoinHandle<()>>,
}

/// Team chat whose members answer direct messages on their own.
#[derive(Clone)]
pub struct ChatSimulator {
    handle: StoreHandle,
    config: SimulationConfig,
}

impl ChatSimulator {
    pub fn new(handle: StoreHandle, config: SimulationConfig) -> Self {
        Self { handle, config }
    }

    /// Records a message from the local user; direct messages get a delayed
    /// canned reply from the recipient.
    ///
    /// Blank text is ignored and returns `Ok(None)`.
    pub async fn send(
        &self,
        target: ChatTarget,
        text: impl Into<String>,
    ) -> Result<Option<SentChat>, SimulationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Ok(None);
        }

        let draft = match &target {
            ChatTarget::Group => NewChatMessage::to_group(text),
            ChatTarget::Member(member) => NewChatMessage::direct(LOCAL_USER, member.clone(), text),
        };
        let message = self
            .handle
            .call(move |store| store.add_message(draft))
            .await?
            .map_err(ServiceError::from)?;

        let reply = match target {
            ChatTarget::Group => None,
            ChatTarget::Member(member) => Some(self.schedule_reply(member)),
        };
        Ok(Some(SentChat { message, reply }))
    }

    fn schedule_reply(&self, member: String) -> JoinHandle<()> {
        let (min, max) = self.config.auto_reply_range();
        let mut rng = rand::rng();
        let delay = if max > min {
            rng.random_range(min..=max)
        } else {
            min
        };
        let reply = AUTO_REPLIES[rng.random_range(0..AUTO_REPLIES.len())];

        self.handle.defer(delay, move |store: &mut EntityStore| {
            match store.add_message(NewChatMessage::direct(member, LOCAL_USER, reply)) {
                Ok(message) => info!(
                    "event=chat_auto_reply module=simulation status=ok message_id={}",
                    message.id
                ),
                Err(err) => warn!(
                    "event=chat_auto_reply module=simulation status=error error={err}"
                ),
            }
        })
    }
}

/// Result of sending one e-mail.
#[derive(Debug)]
pub struct SentEmail {
    pub email: Email,
    /// Pending delivery status update.
    pub delivery: JoinHandle<()>,
}

/// E-mail sender whose messages become `delivered` after a delay.
#[derive(Clone)]
pub struct EmailSimulator {
    handle: StoreHandle,
    config: SimulationConfig,
}

impl EmailSimulator {
    pub fn new(handle: StoreHandle, config: SimulationConfig) -> Self {
        Self { handle, config }
    }

    /// Sends an e-mail and schedules its `sent -> delivered` transition.
    ///
    /// The transition is skipped when the status changed in the meantime.
    pub async fn send(&self, request: SendEmailRequest) -> Result<SentEmail, SimulationError> {
        let email = self
            .handle
            .call(move |store| ActivityService::new(store).send_email(request))
            .await??;

        let email_id = email.id.clone();
        let delivery = self
            .handle
            .defer(self.config.email_delivery_delay(), move |store: &mut EntityStore| {
                mark_delivered(store, &email_id);
            });
        Ok(SentEmail { email, delivery })
    }
}

fn mark_delivered(store: &mut EntityStore, email_id: &str) {
    let still_sent = store
        .email(email_id)
        .is_some_and(|email| email.status == EmailStatus::Sent);
    if !still_sent {
        return;
    }

    match store.update_email(email_id, EmailPatch::status(EmailStatus::Delivered)) {
        Ok(_) => info!("event=email_delivered module=simulation status=ok email_id={email_id}"),
        Err(err) => warn!(
            "event=email_delivered module=simulation status=error email_id={email_id} error={err}"
        ),
    }
}
