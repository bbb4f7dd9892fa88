//! Pipeline analytics over the contact collection.

use crate::model::contact::{Contact, ContactStatus};
use std::collections::BTreeMap;

/// Flat average deal size used to value the open pipeline.
pub const AVERAGE_DEAL_SIZE: u64 = 5_000;

/// Headline numbers for the analytics dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub total_leads: usize,
    pub won_deals: usize,
    /// Won contacts over all contacts, rounded to a whole percent.
    pub conversion_rate_percent: u32,
    /// Qualified and proposal-stage contacts times the average deal size.
    pub pipeline_value: u64,
    /// Contacts per lead source; contacts without a source are skipped.
    pub lead_sources: BTreeMap<String, usize>,
    /// Won contacts per sales rep; contacts without a rep are skipped.
    pub won_by_rep: BTreeMap<String, usize>,
}

impl PipelineSummary {
    pub fn from_contacts(contacts: &[Contact]) -> Self {
        let total_leads = contacts.len();
        let won_deals = contacts
            .iter()
            .filter(|contact| contact.status == ContactStatus::Won)
            .count();
        let open_deals = contacts
            .iter()
            .filter(|contact| contact.status.is_open_deal())
            .count() as u64;

        let mut lead_sources = BTreeMap::new();
        let mut won_by_rep = BTreeMap::new();
        for contact in contacts {
            if let Some(source) = &contact.source {
                *lead_sources.entry(source.clone()).or_insert(0) += 1;
            }
            if let (ContactStatus::Won, Some(rep)) = (contact.status, &contact.rep) {
                *won_by_rep.entry(rep.clone()).or_insert(0) += 1;
            }
        }

        Self {
            total_leads,
            won_deals,
            conversion_rate_percent: percent(won_deals, total_leads),
            pipeline_value: open_deals * AVERAGE_DEAL_SIZE,
            lead_sources,
            won_by_rep,
        }
    }
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
