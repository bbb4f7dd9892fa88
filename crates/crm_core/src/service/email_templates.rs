//! Canned e-mail templates and placeholder rendering.
//!
//! # Invariants
//! - Placeholders use `{{name}}` syntax; unknown names are left in place.

use crate::model::contact::Contact;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z]+)\s*\}\}").expect("valid placeholder regex"));

const INTRODUCTION_SUBJECT: &str = "Introduction - Let's Connect";
const INTRODUCTION_BODY: &str = "Hi {{name}},

I hope this email finds you well. I wanted to reach out and introduce myself and our services at {{company}}.

We specialize in helping businesses like {{contactCompany}} achieve their goals through innovative solutions.

I'd love to schedule a brief call to discuss how we might be able to help you. Are you available for a 15-minute conversation this week?

Best regards,
{{sender}}";

const FOLLOW_UP_SUBJECT: &str = "Following up on our conversation";
const FOLLOW_UP_BODY: &str = "Hi {{name}},

Thank you for taking the time to speak with me earlier. I wanted to follow up on our conversation about {{topic}}.

As discussed, I'm attaching some additional information that might be helpful for your decision-making process.

Please let me know if you have any questions or if you'd like to schedule another call to discuss next steps.

Best regards,
{{sender}}";

const PROPOSAL_SUBJECT: &str = "Proposal for {{contactCompany}}";
const PROPOSAL_BODY: &str = "Hi {{name}},

I'm excited to share our proposal for {{contactCompany}}. Based on our discussions, I believe we have a solution that will meet your needs perfectly.

The proposal includes:
- Detailed project scope
- Timeline and milestones
- Investment details
- Next steps

I'm available to discuss any questions you might have. When would be a good time for a call?

Best regards,
{{sender}}";

/// Built-in template, persisted by key in `Email::template_used`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailTemplate {
    Introduction,
    FollowUp,
    Proposal,
}

impl EmailTemplate {
    pub const ALL: [EmailTemplate; 3] = [
        EmailTemplate::Introduction,
        EmailTemplate::FollowUp,
        EmailTemplate::Proposal,
    ];

    /// Stable key stored with sent e-mails.
    pub fn key(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::FollowUp => "followUp",
            Self::Proposal => "proposal",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|template| template.key() == key)
    }

    fn raw(self) -> (&'static str, &'static str) {
        match self {
            Self::Introduction => (INTRODUCTION_SUBJECT, INTRODUCTION_BODY),
            Self::FollowUp => (FOLLOW_UP_SUBJECT, FOLLOW_UP_BODY),
            Self::Proposal => (PROPOSAL_SUBJECT, PROPOSAL_BODY),
        }
    }

    /// Renders subject and body with `context`.
    pub fn render(self, context: &TemplateContext) -> RenderedEmail {
        let (subject, body) = self.raw();
        RenderedEmail {
            subject: fill_placeholders(subject, context),
            body: fill_placeholders(body, context),
        }
    }
}

/// Values substituted into template placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    /// `{{name}}`
    pub contact_name: String,
    /// `{{contactCompany}}`
    pub contact_company: String,
    /// `{{company}}`
    pub sender_company: String,
    /// `{{sender}}`
    pub sender_name: String,
    /// `{{topic}}`
    pub topic: String,
}

impl TemplateContext {
    /// Context for `contact` with default sender values.
    pub fn for_contact(contact: &Contact) -> Self {
        Self {
            contact_name: contact.name.clone(),
            contact_company: contact.company.clone(),
            sender_company: "Your Company".to_string(),
            sender_name: "Your Name".to_string(),
            topic: "your project".to_string(),
        }
    }

    fn lookup(&self, placeholder: &str) -> Option<&str> {
        match placeholder {
            "name" => Some(&self.contact_name),
            "contactCompany" => Some(&self.contact_company),
            "company" => Some(&self.sender_company),
            "sender" => Some(&self.sender_name),
            "topic" => Some(&self.topic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Replaces every known `{{placeholder}}` in `text`.
pub fn fill_placeholders(text: &str, context: &TemplateContext) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            context
                .lookup(&caps[1])
                .map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}
