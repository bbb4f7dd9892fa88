//! Contact (lead) model.
//!
//! # Invariants
//! - `status` is the funnel stage; moving a lead only patches this field.
//! - `source` and `rep` are omitted from the document when unset.

use super::{merge, Entity, EntityId, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sales funnel stage of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
}

impl ContactStatus {
    /// Funnel stages in board order.
    pub const ALL: [ContactStatus; 6] = [
        ContactStatus::New,
        ContactStatus::Contacted,
        ContactStatus::Qualified,
        ContactStatus::Proposal,
        ContactStatus::Won,
        ContactStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Open pipeline stages counted towards pipeline value.
    pub fn is_open_deal(self) -> bool {
        matches!(self, Self::Qualified | Self::Proposal)
    }
}

/// A tracked lead or customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: EntityId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rep: Option<String>,
}

/// Input for creating a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub status: ContactStatus,
    pub source: Option<String>,
    pub rep: Option<String>,
}

impl NewContact {
    /// Creates a lead in the `new` stage with no source or rep.
    pub fn lead(
        name: impl Into<String>,
        company: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            email: email.into(),
            phone: phone.into(),
            status: ContactStatus::New,
            source: None,
            rep: None,
        }
    }
}

/// Shallow-merge update for a contact.
///
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<ContactStatus>,
    pub source: Option<Option<String>>,
    pub rep: Option<Option<String>>,
}

impl ContactPatch {
    /// Patch touching only the funnel stage.
    pub fn status(status: ContactStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Patch<Contact> for ContactPatch {
    fn apply_to(self, target: &mut Contact) {
        merge(&mut target.name, self.name);
        merge(&mut target.company, self.company);
        merge(&mut target.email, self.email);
        merge(&mut target.phone, self.phone);
        merge(&mut target.status, self.status);
        merge(&mut target.source, self.source);
        merge(&mut target.rep, self.rep);
    }
}

impl Entity for Contact {
    type Draft = NewContact;

    const STORAGE_KEY: &'static str = "crm-contacts";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewContact) -> Self {
        Self {
            id,
            name: draft.name,
            company: draft.company,
            email: draft.email,
            phone: draft.phone,
            status: draft.status,
            created_at,
            source: draft.source,
            rep: draft.rep,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_lowercase_name() {
        for status in ContactStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn document_uses_camel_case_and_omits_unset_optionals() {
        let contact = Contact::from_draft(
            "7".to_string(),
            Utc::now(),
            NewContact::lead("Dana", "Acme", "dana@acme.test", "555"),
        );
        let value = serde_json::to_value(&contact).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("source").is_none());
        assert!(value.get("rep").is_none());
    }

    #[test]
    fn patch_can_clear_optional_field() {
        let mut draft = NewContact::lead("Dana", "Acme", "dana@acme.test", "555");
        draft.rep = Some("Jane Smith".to_string());
        let mut contact = Contact::from_draft("7".to_string(), Utc::now(), draft);

        ContactPatch {
            rep: Some(None),
            ..ContactPatch::default()
        }
        .apply_to(&mut contact);

        assert_eq!(contact.rep, None);
        assert_eq!(contact.name, "Dana");
    }
}
