//! Proposal (quote) model.
//!
//! # Invariants
//! - `item.total == item.quantity * item.unit_price` for every line item.
//! - `amount` equals the sum of item totals.
//!
//! Records built through `ProposalItem::priced` and `line_items_total`
//! satisfy both; raw drafts and patches are stored as given.

use super::{merge, Entity, EntityId, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalItem {
    pub id: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl ProposalItem {
    /// Builds the line at `index` with its total computed.
    pub fn priced(index: usize, description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            id: format!("item-{index}"),
            description: description.into(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

/// Sums line totals into a proposal amount.
pub fn line_items_total(items: &[ProposalItem]) -> f64 {
    items.iter().map(|item| item.total).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: EntityId,
    pub contact_id: EntityId,
    pub contact_name: String,
    pub title: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub status: ProposalStatus,
    pub valid_until: String,
    pub items: Vec<ProposalItem>,
    pub terms: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProposal {
    pub contact_id: EntityId,
    pub contact_name: String,
    pub title: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub status: ProposalStatus,
    pub valid_until: String,
    pub items: Vec<ProposalItem>,
    pub terms: String,
    pub created_by: String,
    pub sent_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<ProposalStatus>,
    pub valid_until: Option<String>,
    pub items: Option<Vec<ProposalItem>>,
    pub terms: Option<String>,
    pub sent_at: Option<Option<String>>,
}

impl Patch<Proposal> for ProposalPatch {
    fn apply_to(self, target: &mut Proposal) {
        merge(&mut target.title, self.title);
        merge(&mut target.description, self.description);
        merge(&mut target.amount, self.amount);
        merge(&mut target.currency, self.currency);
        merge(&mut target.status, self.status);
        merge(&mut target.valid_until, self.valid_until);
        merge(&mut target.items, self.items);
        merge(&mut target.terms, self.terms);
        merge(&mut target.sent_at, self.sent_at);
    }
}

impl Entity for Proposal {
    type Draft = NewProposal;

    const STORAGE_KEY: &'static str = "crm-proposals";

    fn from_draft(id: EntityId, created_at: DateTime<Utc>, draft: NewProposal) -> Self {
        Self {
            id,
            contact_id: draft.contact_id,
            contact_name: draft.contact_name,
            title: draft.title,
            description: draft.description,
            amount: draft.amount,
            currency: draft.currency,
            status: draft.status,
            valid_until: draft.valid_until,
            items: draft.items,
            terms: draft.terms,
            created_at,
            created_by: draft.created_by,
            sent_at: draft.sent_at,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}
