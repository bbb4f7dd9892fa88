//! Entity store implementation.
//!
//! # Responsibility
//! - Own the seven persisted collections plus the fixed team roster.
//! - Bridge in-memory state and the key/value backend.
//!
//! # Invariants
//! - Ids handed out by `add_*` are unique across the whole store.
//! - `update_*`/`delete_*` of an unknown id change nothing but still write.
//! - A failed write leaves the in-memory collection unchanged.
//! - Corrupt-document backups never overwrite an earlier backup.

use super::seed::{sample_contacts, sample_tasks};
use crate::model::activity::{
    CallLog, CallLogPatch, Email, EmailPatch, Meeting, MeetingPatch, NewCallLog, NewEmail,
    NewMeeting,
};
use crate::model::chat::{default_team, ChatMessage, ChatMessagePatch, NewChatMessage, TeamMember};
use crate::model::contact::{Contact, ContactPatch, ContactStatus, NewContact};
use crate::model::id::IdSource;
use crate::model::proposal::{NewProposal, Proposal, ProposalPatch};
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::model::{Entity, EntityId, Patch};
use crate::repo::collection::{load_collection, Collection, Loaded, RepoResult};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::time::Instant;

type SeedFn<E> = fn(DateTime<Utc>) -> Vec<E>;

/// Options applied while opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Install sample contacts/tasks when those collections were never saved.
    pub seed_sample_data: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            seed_sample_data: true,
        }
    }
}

/// A collection whose persisted document could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptCollection {
    pub key: &'static str,
    /// Key under which the unreadable document was preserved.
    pub backup_key: String,
    pub error: String,
}

/// A loaded record whose numeric id lies outside the timestamp range.
///
/// The record is kept unchanged; its id is just not used to order new ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfRangeId {
    pub key: &'static str,
    pub id: EntityId,
}

/// What happened to each collection while opening the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Keys that received sample data.
    pub seeded: Vec<&'static str>,
    /// Keys whose documents were unreadable and were re-initialized.
    pub corrupt: Vec<CorruptCollection>,
    pub out_of_range_ids: Vec<OutOfRangeId>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// Owned copy of every collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub contacts: Vec<Contact>,
    pub tasks: Vec<Task>,
    pub messages: Vec<ChatMessage>,
    pub team_members: Vec<TeamMember>,
    pub call_logs: Vec<CallLog>,
    pub emails: Vec<Email>,
    pub meetings: Vec<Meeting>,
    pub proposals: Vec<Proposal>,
}

/// Single source of truth for all CRM collections.
pub struct EntityStore {
    backend: Box<dyn KeyValueStore + Send>,
    ids: IdSource,
    contacts: Collection<Contact>,
    tasks: Collection<Task>,
    messages: Collection<ChatMessage>,
    call_logs: Collection<CallLog>,
    emails: Collection<Email>,
    meetings: Collection<Meeting>,
    proposals: Collection<Proposal>,
    team_members: Vec<TeamMember>,
    load_report: LoadReport,
}

impl EntityStore {
    /// Opens a store with default options (sample data on first run).
    pub fn open(backend: impl KeyValueStore + Send + 'static) -> RepoResult<Self> {
        Self::open_with(backend, StoreOptions::default())
    }

    /// Loads every collection, seeding or re-initializing where needed.
    ///
    /// # Errors
    /// - Returns an error only when the backend itself fails. Unreadable
    ///   documents are backed up, re-initialized and listed in
    ///   `load_report()`.
    pub fn open_with(
        backend: impl KeyValueStore + Send + 'static,
        options: StoreOptions,
    ) -> RepoResult<Self> {
        let started_at = Instant::now();
        let mut backend: Box<dyn KeyValueStore + Send> = Box::new(backend);
        let mut report = LoadReport::default();
        let now = Utc::now();

        let contact_seed = options
            .seed_sample_data
            .then_some(sample_contacts as SeedFn<Contact>);
        let task_seed = options
            .seed_sample_data
            .then_some(sample_tasks as SeedFn<Task>);

        let contacts = load_or_init(backend.as_mut(), contact_seed, now, &mut report)?;
        let tasks = load_or_init(backend.as_mut(), task_seed, now, &mut report)?;
        let messages = load_or_init(backend.as_mut(), None, now, &mut report)?;
        let call_logs = load_or_init(backend.as_mut(), None, now, &mut report)?;
        let emails = load_or_init(backend.as_mut(), None, now, &mut report)?;
        let meetings = load_or_init(backend.as_mut(), None, now, &mut report)?;
        let proposals = load_or_init(backend.as_mut(), None, now, &mut report)?;

        let mut store = Self {
            backend,
            ids: IdSource::new(),
            contacts,
            tasks,
            messages,
            call_logs,
            emails,
            meetings,
            proposals,
            team_members: default_team(),
            load_report: report,
        };
        store.prime_ids();

        info!(
            "event=store_open module=store status=ok duration_ms={} seeded={} corrupt={}",
            started_at.elapsed().as_millis(),
            store.load_report.seeded.len(),
            store.load_report.corrupt.len()
        );
        Ok(store)
    }

    /// Outcome of the initial load.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub fn contacts(&self) -> &[Contact] {
        self.contacts.items()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.messages.items()
    }

    pub fn team_members(&self) -> &[TeamMember] {
        &self.team_members
    }

    pub fn call_logs(&self) -> &[CallLog] {
        self.call_logs.items()
    }

    pub fn emails(&self) -> &[Email] {
        self.emails.items()
    }

    pub fn meetings(&self) -> &[Meeting] {
        self.meetings.items()
    }

    pub fn proposals(&self) -> &[Proposal] {
        self.proposals.items()
    }

    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn email(&self, id: &str) -> Option<&Email> {
        self.emails.get(id)
    }

    pub fn meeting(&self, id: &str) -> Option<&Meeting> {
        self.meetings.get(id)
    }

    pub fn proposal(&self, id: &str) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn team_member(&self, name: &str) -> Option<&TeamMember> {
        self.team_members.iter().find(|member| member.name == name)
    }

    /// Copies every collection out of the store.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            contacts: self.contacts.items().to_vec(),
            tasks: self.tasks.items().to_vec(),
            messages: self.messages.items().to_vec(),
            team_members: self.team_members.clone(),
            call_logs: self.call_logs.items().to_vec(),
            emails: self.emails.items().to_vec(),
            meetings: self.meetings.items().to_vec(),
            proposals: self.proposals.items().to_vec(),
        }
    }

    pub fn add_contact(&mut self, draft: NewContact) -> RepoResult<Contact> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.contacts, draft)
    }

    pub fn update_contact(&mut self, id: &str, patch: ContactPatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.contacts, id, patch)
    }

    pub fn delete_contact(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.contacts, id)
    }

    /// Moves a contact to another funnel stage, touching only `status`.
    pub fn update_contact_status(&mut self, id: &str, status: ContactStatus) -> RepoResult<bool> {
        self.update_contact(id, ContactPatch::status(status))
    }

    pub fn add_task(&mut self, draft: NewTask) -> RepoResult<Task> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.tasks, draft)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.tasks, id, patch)
    }

    pub fn delete_task(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.tasks, id)
    }

    pub fn add_message(&mut self, draft: NewChatMessage) -> RepoResult<ChatMessage> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.messages, draft)
    }

    pub fn update_message(&mut self, id: &str, patch: ChatMessagePatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.messages, id, patch)
    }

    pub fn delete_message(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.messages, id)
    }

    pub fn add_call_log(&mut self, draft: NewCallLog) -> RepoResult<CallLog> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.call_logs, draft)
    }

    pub fn update_call_log(&mut self, id: &str, patch: CallLogPatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.call_logs, id, patch)
    }

    pub fn delete_call_log(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.call_logs, id)
    }

    pub fn add_email(&mut self, draft: NewEmail) -> RepoResult<Email> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.emails, draft)
    }

    pub fn update_email(&mut self, id: &str, patch: EmailPatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.emails, id, patch)
    }

    pub fn delete_email(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.emails, id)
    }

    pub fn add_meeting(&mut self, draft: NewMeeting) -> RepoResult<Meeting> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.meetings, draft)
    }

    pub fn update_meeting(&mut self, id: &str, patch: MeetingPatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.meetings, id, patch)
    }

    pub fn delete_meeting(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.meetings, id)
    }

    pub fn add_proposal(&mut self, draft: NewProposal) -> RepoResult<Proposal> {
        add_entity(self.backend.as_mut(), &mut self.ids, &mut self.proposals, draft)
    }

    pub fn update_proposal(&mut self, id: &str, patch: ProposalPatch) -> RepoResult<bool> {
        update_entity(self.backend.as_mut(), &mut self.proposals, id, patch)
    }

    pub fn delete_proposal(&mut self, id: &str) -> RepoResult<bool> {
        delete_entity(self.backend.as_mut(), &mut self.proposals, id)
    }

    fn prime_ids(&mut self) {
        let ids = &mut self.ids;
        let skipped = &mut self.load_report.out_of_range_ids;
        observe_ids(ids, &self.contacts, skipped);
        observe_ids(ids, &self.tasks, skipped);
        observe_ids(ids, &self.messages, skipped);
        observe_ids(ids, &self.call_logs, skipped);
        observe_ids(ids, &self.emails, skipped);
        observe_ids(ids, &self.meetings, skipped);
        observe_ids(ids, &self.proposals, skipped);
    }
}

fn observe_ids<E: Entity>(
    ids: &mut IdSource,
    collection: &Collection<E>,
    skipped: &mut Vec<OutOfRangeId>,
) {
    for entity in collection.items() {
        if !ids.observe_id(entity.id()) {
            warn!(
                "event=id_out_of_range module=store status=skipped key={} id={}",
                E::STORAGE_KEY,
                entity.id()
            );
            skipped.push(OutOfRangeId {
                key: E::STORAGE_KEY,
                id: entity.id().to_string(),
            });
        }
    }
}

fn load_or_init<E: Entity>(
    backend: &mut dyn KeyValueStore,
    seed: Option<SeedFn<E>>,
    now: DateTime<Utc>,
    report: &mut LoadReport,
) -> RepoResult<Collection<E>> {
    let corrupt = match load_collection::<E>(backend)? {
        Loaded::Present(items) => {
            debug!(
                "event=collection_load module=store status=ok key={} records={}",
                E::STORAGE_KEY,
                items.len()
            );
            return Ok(Collection::from_items(items));
        }
        Loaded::Absent => false,
        Loaded::Corrupt { raw, error } => {
            let backup_key = free_backup_key(backend, E::STORAGE_KEY)?;
            backend.set(&backup_key, &raw)?;
            warn!(
                "event=collection_corrupt module=store status=recovered key={} backup_key={}",
                E::STORAGE_KEY,
                backup_key
            );
            report.corrupt.push(CorruptCollection {
                key: E::STORAGE_KEY,
                backup_key,
                error,
            });
            true
        }
    };

    let collection = match seed {
        Some(seed) => {
            let collection = Collection::from_items(seed(now));
            collection.persist(backend)?;
            report.seeded.push(E::STORAGE_KEY);
            info!(
                "event=collection_seed module=store status=ok key={} records={}",
                E::STORAGE_KEY,
                collection.len()
            );
            collection
        }
        None => {
            let collection = Collection::default();
            if corrupt {
                // Replace the unreadable document so the next open is clean.
                collection.persist(backend)?;
            }
            collection
        }
    };
    Ok(collection)
}

/// First unused key of `<key>.corrupt`, `<key>.corrupt.1`, `<key>.corrupt.2`, ...
fn free_backup_key(backend: &dyn KeyValueStore, key: &str) -> RepoResult<String> {
    let base = format!("{key}.corrupt");
    if backend.get(&base)?.is_none() {
        return Ok(base);
    }
    let mut n: u32 = 1;
    loop {
        let candidate = format!("{base}.{n}");
        if backend.get(&candidate)?.is_none() {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn add_entity<E: Entity>(
    backend: &mut dyn KeyValueStore,
    ids: &mut IdSource,
    collection: &mut Collection<E>,
    draft: E::Draft,
) -> RepoResult<E> {
    let (id, created_at) = ids.next();
    let entity = E::from_draft(id, created_at, draft);
    collection.insert(backend, entity.clone())?;
    debug!(
        "event=entity_add module=store status=ok key={} id={}",
        E::STORAGE_KEY,
        entity.id()
    );
    Ok(entity)
}

fn update_entity<E: Entity, P: Patch<E>>(
    backend: &mut dyn KeyValueStore,
    collection: &mut Collection<E>,
    id: &str,
    patch: P,
) -> RepoResult<bool> {
    let matched = collection.update(backend, id, patch)?;
    debug!(
        "event=entity_update module=store status={} key={} id={}",
        if matched { "ok" } else { "not_found" },
        E::STORAGE_KEY,
        id
    );
    Ok(matched)
}

fn delete_entity<E: Entity>(
    backend: &mut dyn KeyValueStore,
    collection: &mut Collection<E>,
    id: &str,
) -> RepoResult<bool> {
    let matched = collection.remove(backend, id)?;
    debug!(
        "event=entity_delete module=store status={} key={} id={}",
        if matched { "ok" } else { "not_found" },
        E::STORAGE_KEY,
        id
    );
    Ok(matched)
}
