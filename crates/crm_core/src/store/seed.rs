//! First-run sample data.
//!
//! Installed only when a collection has never been persisted (or its
//! document was unreadable).

use crate::model::contact::{Contact, ContactStatus};
use crate::model::task::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Sample leads, one per early funnel stage.
pub fn sample_contacts(now: DateTime<Utc>) -> Vec<Contact> {
    vec![
        Contact {
            id: "1".to_string(),
            name: "Alice Johnson".to_string(),
            company: "Tech Corp".to_string(),
            email: "alice@techcorp.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            status: ContactStatus::New,
            created_at: now,
            source: Some("Website".to_string()),
            rep: Some("John Doe".to_string()),
        },
        Contact {
            id: "2".to_string(),
            name: "Bob Smith".to_string(),
            company: "Design Studio".to_string(),
            email: "bob@designstudio.com".to_string(),
            phone: "+1 (555) 987-6543".to_string(),
            status: ContactStatus::Contacted,
            created_at: now - Duration::days(1),
            source: Some("Referral".to_string()),
            rep: Some("Jane Smith".to_string()),
        },
        Contact {
            id: "3".to_string(),
            name: "Carol Davis".to_string(),
            company: "Marketing Inc".to_string(),
            email: "carol@marketing.com".to_string(),
            phone: "+1 (555) 456-7890".to_string(),
            status: ContactStatus::Qualified,
            created_at: now - Duration::days(2),
            source: Some("LinkedIn".to_string()),
            rep: Some("Mike Johnson".to_string()),
        },
    ]
}

/// Sample tasks tied to the sample leads.
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<Task> {
    vec![
        Task {
            id: "1".to_string(),
            title: "Follow up with Alice Johnson".to_string(),
            description: "Send proposal for website redesign".to_string(),
            priority: TaskPriority::High,
            status: TaskStatus::Today,
            due_date: iso_millis(now),
            created_at: now,
        },
        Task {
            id: "2".to_string(),
            title: "Prepare demo for Bob Smith".to_string(),
            description: "Create custom demo for Design Studio".to_string(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Upcoming,
            due_date: iso_millis(now + Duration::days(1)),
            created_at: now,
        },
    ]
}

pub(crate) fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::{iso_millis, sample_contacts, sample_tasks};
    use chrono::{TimeZone, Utc};

    #[test]
    fn sample_ids_are_unique() {
        let now = Utc::now();
        let contacts = sample_contacts(now);
        let tasks = sample_tasks(now);
        assert_eq!(contacts.len(), 3);
        assert_eq!(tasks.len(), 2);
        assert_ne!(contacts[0].id, contacts[1].id);
        assert_ne!(tasks[0].id, tasks[1].id);
    }

    #[test]
    fn iso_millis_matches_browser_format() {
        let at = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(iso_millis(at), "2025-01-10T09:00:00.000Z");
    }
}
