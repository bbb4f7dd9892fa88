//! Contact activity records: call logs, e-mails and meetings.
//!
//! # Responsibility
//! - Hold the logged interactions with a contact.
//! - Keep a snapshot of the contact's name (and e-mail) taken at creation.
//!
//! # Invariants
//! - `contact_id` is an informational link; the contact may since have been
//!   renamed or deleted without affecting these records.

use super::{merge, Entity, EntityId, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallOutcome {
    Connected,
    Voicemail,
    NoAnswer,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    pub id: EntityId,
    pub contact_id: EntityId,
    pub contact_name: String,
    /// Call length in minutes.
    pub duration: u32,
    pub outcome: CallOutcome,
    pub notes: String,
    pub follow_up_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCallLog {
    pub contact_id: EntityId,
    pub contact_name: String,
    pub duration: u32,
    pub outcome: CallOutcome,
    pub notes: String,
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLogPatch {
    pub duration: Option<u32>,
    pub outcome: Option<CallOutcome>,
    pub notes: Option<String>,
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<Option<String>>,
}

impl Patch<CallLog> for CallLogPatch {
    fn apply_to(self, target: &mut CallLog) {
        merge(&mut target.duration, self.duration);
        merge(&mut target.outcome, self.outcome);
        merge(&mut target.notes, self.notes);
        merge(&mut target.follow_up_required, self.follow_up_required);
        merge(&mut target.follow_up_date, self.follow_up_date);
    }
}

impl Entity for CallLog {
    type Draft = NewCallLog;

    const STORAGE_KEY: &'static str = "crm-call-logs";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewCallLog) -> Self {
        Self {
            id,
            contact_id: draft.contact_id,
            contact_name: draft.contact_name,
            duration: draft.duration,
            outcome: draft.outcome,
            notes: draft.notes,
            follow_up_required: draft.follow_up_required,
            follow_up_date: draft.follow_up_date,
            created_at,
            created_by: draft.created_by,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Delivery state of an e-mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailStatus {
    Draft,
    Sent,
    Delivered,
    Opened,
    Replied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: EntityId,
    pub contact_id: EntityId,
    pub contact_name: String,
    pub contact_email: String,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmail {
    pub contact_id: EntityId,
    pub contact_name: String,
    pub contact_email: String,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    pub sent_at: Option<String>,
    pub created_by: String,
    pub template_used: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailPatch {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub status: Option<EmailStatus>,
    pub sent_at: Option<Option<String>>,
}

impl EmailPatch {
    pub fn status(status: EmailStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Patch<Email> for EmailPatch {
    fn apply_to(self, target: &mut Email) {
        merge(&mut target.subject, self.subject);
        merge(&mut target.body, self.body);
        merge(&mut target.status, self.status);
        merge(&mut target.sent_at, self.sent_at);
    }
}

impl Entity for Email {
    type Draft = NewEmail;

    const STORAGE_KEY: &'static str = "crm-emails";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewEmail) -> Self {
        Self {
            id,
            contact_id: draft.contact_id,
            contact_name: draft.contact_name,
            contact_email: draft.contact_email,
            subject: draft.subject,
            body: draft.body,
            status: draft.status,
            sent_at: draft.sent_at,
            created_at,
            created_by: draft.created_by,
            template_used: draft.template_used,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingType {
    InPerson,
    Video,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: EntityId,
    pub contact_id: EntityId,
    pub contact_name: String,
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub meeting_type: MeetingType,
    pub status: MeetingStatus,
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeeting {
    pub contact_id: EntityId,
    pub contact_name: String,
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub meeting_type: MeetingType,
    pub status: MeetingStatus,
    pub attendees: Vec<String>,
    pub notes: Option<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub meeting_type: Option<MeetingType>,
    pub status: Option<MeetingStatus>,
    pub attendees: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
}

impl Patch<Meeting> for MeetingPatch {
    fn apply_to(self, target: &mut Meeting) {
        merge(&mut target.title, self.title);
        merge(&mut target.description, self.description);
        merge(&mut target.start_time, self.start_time);
        merge(&mut target.end_time, self.end_time);
        merge(&mut target.location, self.location);
        merge(&mut target.meeting_type, self.meeting_type);
        merge(&mut target.status, self.status);
        merge(&mut target.attendees, self.attendees);
        merge(&mut target.notes, self.notes);
    }
}

impl Entity for Meeting {
    type Draft = NewMeeting;

    const STORAGE_KEY: &'static str = "crm-meetings";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewMeeting) -> Self {
        Self {
            id,
            contact_id: draft.contact_id,
            contact_name: draft.contact_name,
            title: draft.title,
            description: draft.description,
            start_time: draft.start_time,
            end_time: draft.end_time,
            location: draft.location,
            meeting_type: draft.meeting_type,
            status: draft.status,
            attendees: draft.attendees,
            notes: draft.notes,
            created_at,
            created_by: draft.created_by,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
