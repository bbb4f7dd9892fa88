//! Contact activity use-cases.
//!
//! # Responsibility
//! - Log calls, schedule meetings, send e-mails and create proposals for an
//!   existing contact, snapshotting the contact's name (and e-mail).
//! - Create the dependent follow-up and reminder tasks.
//!
//! # Invariants
//! - An unknown contact id yields `ServiceError::ContactNotFound` and writes
//!   nothing.
//! - Dependent task creation runs after the primary record was stored and is
//!   never rolled back.

use crate::model::activity::{
    CallLog, CallOutcome, Email, EmailStatus, Meeting, MeetingStatus, MeetingType, NewCallLog,
    NewEmail, NewMeeting,
};
use crate::model::contact::Contact;
use crate::model::proposal::{
    line_items_total, NewProposal, Proposal, ProposalItem, ProposalPatch, ProposalStatus,
};
use crate::model::task::{NewTask, Task, TaskPriority, TaskStatus};
use crate::model::EntityId;
use crate::repo::collection::RepoError;
use crate::service::datetime::{shift_datetime, truncate_chars};
use crate::service::email_templates::{EmailTemplate, RenderedEmail, TemplateContext};
use crate::store::seed::iso_millis;
use crate::store::EntityStore;
use chrono::{Duration, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Author recorded on records created through this service.
pub const CURRENT_USER: &str = "Current User";

const FOLLOW_UP_NOTES_CHARS: usize = 100;

/// Service error for activity use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Referenced contact does not exist.
    ContactNotFound(EntityId),
    /// A schedule field could not be parsed as a date/time.
    InvalidDateTime(String),
    /// A proposal line has a non-finite quantity or unit price.
    InvalidAmount { line: usize },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidDateTime(value) => write!(f, "invalid date/time: `{value}`"),
            Self::InvalidAmount { line } => {
                write!(f, "proposal line {line}: quantity and unit price must be finite")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Request model for logging a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCallRequest {
    pub contact_id: EntityId,
    /// Minutes.
    pub duration: u32,
    pub outcome: CallOutcome,
    pub notes: String,
    pub follow_up_required: bool,
    /// Due date of the follow-up task; ignored unless follow-up is required.
    pub follow_up_date: Option<String>,
}

/// Records created by `log_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedCall {
    pub call_log: CallLog,
    pub follow_up_task: Option<Task>,
}

/// Request model for scheduling a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleMeetingRequest {
    pub contact_id: EntityId,
    pub title: String,
    pub description: String,
    pub start_time: String,
    /// Defaults to one hour after `start_time`.
    pub end_time: Option<String>,
    pub location: String,
    pub meeting_type: MeetingType,
    /// Attendees besides the contact.
    pub extra_attendees: Vec<String>,
}

/// Records created by `schedule_meeting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMeeting {
    pub meeting: Meeting,
    pub reminder_task: Task,
}

/// Request model for sending an e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEmailRequest {
    pub contact_id: EntityId,
    pub subject: String,
    pub body: String,
    pub template: Option<EmailTemplate>,
}

/// One proposal line as entered by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalLine {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl ProposalLine {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }
}

/// Request model for creating a proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProposalRequest {
    pub contact_id: EntityId,
    pub title: String,
    pub description: String,
    pub currency: String,
    pub valid_until: String,
    pub terms: String,
    pub lines: Vec<ProposalLine>,
}

/// Activity use-case service over a borrowed store.
pub struct ActivityService<'s> {
    store: &'s mut EntityStore,
}

impl<'s> ActivityService<'s> {
    pub fn new(store: &'s mut EntityStore) -> Self {
        Self { store }
    }

    /// Logs a call and, when a follow-up is required and dated, a follow-up
    /// task due at that date.
    pub fn log_call(&mut self, request: LogCallRequest) -> ServiceResult<LoggedCall> {
        let contact = self.require_contact(&request.contact_id)?;
        let follow_up_date = request
            .follow_up_date
            .filter(|date| request.follow_up_required && !date.trim().is_empty());

        let call_log = self.store.add_call_log(NewCallLog {
            contact_id: contact.id.clone(),
            contact_name: contact.name.clone(),
            duration: request.duration,
            outcome: request.outcome,
            notes: request.notes.clone(),
            follow_up_required: request.follow_up_required,
            follow_up_date: follow_up_date.clone(),
            created_by: CURRENT_USER.to_string(),
        })?;

        let follow_up_task = match follow_up_date {
            Some(due_date) => Some(self.store.add_task(NewTask {
                title: format!("Follow up call with {}", contact.name),
                description: format!(
                    "Follow up on previous call: {}...",
                    truncate_chars(&request.notes, FOLLOW_UP_NOTES_CHARS)
                ),
                priority: TaskPriority::Medium,
                status: TaskStatus::Upcoming,
                due_date,
            })?),
            None => None,
        };

        info!(
            "event=call_logged module=service status=ok call_id={} follow_up_task={}",
            call_log.id,
            follow_up_task.is_some()
        );
        Ok(LoggedCall {
            call_log,
            follow_up_task,
        })
    }

    /// Schedules a meeting and a high-priority reminder task due one hour
    /// before it starts.
    ///
    /// # Errors
    /// - `InvalidDateTime` when `start_time` does not parse; nothing is written.
    pub fn schedule_meeting(
        &mut self,
        request: ScheduleMeetingRequest,
    ) -> ServiceResult<ScheduledMeeting> {
        let contact = self.require_contact(&request.contact_id)?;
        let reminder_due = shift_datetime(&request.start_time, -Duration::hours(1))
            .ok_or_else(|| ServiceError::InvalidDateTime(request.start_time.clone()))?;
        let end_time = match request.end_time.filter(|value| !value.trim().is_empty()) {
            Some(end_time) => end_time,
            None => shift_datetime(&request.start_time, Duration::hours(1))
                .ok_or_else(|| ServiceError::InvalidDateTime(request.start_time.clone()))?,
        };

        let mut attendees = Vec::with_capacity(request.extra_attendees.len() + 1);
        attendees.push(contact.email.clone());
        attendees.extend(request.extra_attendees);

        let meeting = self.store.add_meeting(NewMeeting {
            contact_id: contact.id.clone(),
            contact_name: contact.name.clone(),
            title: request.title.clone(),
            description: request.description,
            start_time: request.start_time,
            end_time,
            location: request.location,
            meeting_type: request.meeting_type,
            status: MeetingStatus::Scheduled,
            attendees,
            notes: None,
            created_by: CURRENT_USER.to_string(),
        })?;

        let reminder_task = self.store.add_task(NewTask {
            title: format!("Meeting reminder: {}", request.title),
            description: format!("Meeting with {} in 1 hour", contact.name),
            priority: TaskPriority::High,
            status: TaskStatus::Upcoming,
            due_date: reminder_due,
        })?;

        info!(
            "event=meeting_scheduled module=service status=ok meeting_id={} reminder_task_id={}",
            meeting.id, reminder_task.id
        );
        Ok(ScheduledMeeting {
            meeting,
            reminder_task,
        })
    }

    /// Renders `template` for the contact.
    pub fn compose_email(
        &self,
        contact_id: &str,
        template: EmailTemplate,
    ) -> ServiceResult<RenderedEmail> {
        let contact = self.require_contact(contact_id)?;
        Ok(template.render(&TemplateContext::for_contact(&contact)))
    }

    /// Records an e-mail as sent now.
    pub fn send_email(&mut self, request: SendEmailRequest) -> ServiceResult<Email> {
        let contact = self.require_contact(&request.contact_id)?;
        let email = self.store.add_email(NewEmail {
            contact_id: contact.id,
            contact_name: contact.name,
            contact_email: contact.email,
            subject: request.subject,
            body: request.body,
            status: EmailStatus::Sent,
            sent_at: Some(iso_millis(Utc::now())),
            created_by: CURRENT_USER.to_string(),
            template_used: request.template.map(|template| template.key().to_string()),
        })?;

        info!(
            "event=email_sent module=service status=ok email_id={} templated={}",
            email.id,
            email.template_used.is_some()
        );
        Ok(email)
    }

    /// Creates a draft proposal with priced lines and a summed amount.
    ///
    /// # Errors
    /// - `InvalidAmount` for a non-finite line; nothing is written.
    pub fn create_proposal(&mut self, request: CreateProposalRequest) -> ServiceResult<Proposal> {
        let contact = self.require_contact(&request.contact_id)?;
        let items = price_lines(request.lines)?;
        let amount = line_items_total(&items);

        let proposal = self.store.add_proposal(NewProposal {
            contact_id: contact.id,
            contact_name: contact.name,
            title: request.title,
            description: request.description,
            amount,
            currency: request.currency,
            status: ProposalStatus::Draft,
            valid_until: request.valid_until,
            items,
            terms: request.terms,
            created_by: CURRENT_USER.to_string(),
            sent_at: None,
        })?;
        Ok(proposal)
    }

    /// Replaces a proposal's lines and recomputes its amount.
    ///
    /// Returns whether the proposal exists.
    pub fn revise_proposal_items(
        &mut self,
        proposal_id: &str,
        lines: Vec<ProposalLine>,
    ) -> ServiceResult<bool> {
        let items = price_lines(lines)?;
        let amount = line_items_total(&items);
        let matched = self.store.update_proposal(
            proposal_id,
            ProposalPatch {
                amount: Some(amount),
                items: Some(items),
                ..ProposalPatch::default()
            },
        )?;
        Ok(matched)
    }

    fn require_contact(&self, contact_id: &str) -> ServiceResult<Contact> {
        self.store
            .contact(contact_id)
            .cloned()
            .ok_or_else(|| ServiceError::ContactNotFound(contact_id.to_string()))
    }
}

fn price_lines(lines: Vec<ProposalLine>) -> ServiceResult<Vec<ProposalItem>> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let item =
                ProposalItem::priced(index, line.description, line.quantity, line.unit_price);
            // Overflowing products (1e200 * 1e200) are caught on `total`.
            if item.quantity.is_finite() && item.unit_price.is_finite() && item.total.is_finite() {
                Ok(item)
            } else {
                Err(ServiceError::InvalidAmount { line: index })
            }
        })
        .collect()
}
