//! Read-side helpers used by list, board and chat views.

use crate::model::chat::{ChatMessage, LOCAL_USER};
use crate::model::contact::{Contact, ContactStatus};
use crate::model::task::{Task, TaskStatus};

/// Contacts matching a case-insensitive search over name, company and
/// e-mail, optionally restricted to one funnel stage.
///
/// A blank search term matches everything.
pub fn search_contacts<'a>(
    contacts: &'a [Contact],
    term: &str,
    status: Option<ContactStatus>,
) -> Vec<&'a Contact> {
    let needle = term.trim().to_lowercase();
    contacts
        .iter()
        .filter(|contact| status.map_or(true, |status| contact.status == status))
        .filter(|contact| {
            needle.is_empty()
                || contact.name.to_lowercase().contains(&needle)
                || contact.company.to_lowercase().contains(&needle)
                || contact.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Contacts grouped per funnel stage, in board order.
pub fn funnel_stages(contacts: &[Contact]) -> Vec<(ContactStatus, Vec<&Contact>)> {
    ContactStatus::ALL
        .into_iter()
        .map(|stage| {
            let members = contacts
                .iter()
                .filter(|contact| contact.status == stage)
                .collect();
            (stage, members)
        })
        .collect()
}

/// Tasks grouped per board column: today, upcoming, completed.
pub fn tasks_by_status(tasks: &[Task]) -> Vec<(TaskStatus, Vec<&Task>)> {
    TaskStatus::ALL
        .into_iter()
        .map(|column| {
            let members = tasks.iter().filter(|task| task.status == column).collect();
            (column, members)
        })
        .collect()
}

/// Thread selector for the team chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatThread<'a> {
    Group,
    /// Direct thread between the local user and this member.
    Direct(&'a str),
}

/// Messages of one chat thread, in send order.
pub fn conversation<'a>(messages: &'a [ChatMessage], thread: ChatThread<'_>) -> Vec<&'a ChatMessage> {
    messages
        .iter()
        .filter(|message| match thread {
            ChatThread::Group => message.is_group,
            ChatThread::Direct(member) => {
                !message.is_group
                    && ((message.sender == LOCAL_USER && message.recipient == member)
                        || (message.sender == member && message.recipient == LOCAL_USER))
            }
        })
        .collect()
}
