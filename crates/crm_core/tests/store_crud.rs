use crm_core::model::activity::{
    CallLog, CallLogPatch, CallOutcome, EmailStatus, MeetingStatus, MeetingType, NewCallLog,
    NewEmail, NewMeeting,
};
use crm_core::model::chat::NewChatMessage;
use crm_core::model::contact::{Contact, ContactPatch, ContactStatus, NewContact};
use crm_core::model::proposal::{NewProposal, ProposalItem, ProposalStatus};
use crm_core::model::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use crm_core::model::Entity;
use crm_core::store::seed::sample_tasks;
use crm_core::{EntityStore, MemoryKeyValueStore, SqliteKeyValueStore, StoreOptions};
use std::collections::HashSet;

fn empty_store() -> (EntityStore, MemoryKeyValueStore) {
    let backend = MemoryKeyValueStore::new();
    let store = EntityStore::open_with(
        backend.clone(),
        StoreOptions {
            seed_sample_data: false,
        },
    )
    .unwrap();
    (store, backend)
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        priority: TaskPriority::Low,
        status: TaskStatus::Today,
        due_date: "2025-03-01".to_string(),
    }
}

fn persisted<E: Entity>(backend: &MemoryKeyValueStore) -> Vec<E> {
    let raw = backend.raw(E::STORAGE_KEY).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn rapid_adds_get_unique_ids_and_ordered_creation_times() {
    let (mut store, _) = empty_store();

    let tasks: Vec<Task> = (0..50)
        .map(|n| store.add_task(new_task(&format!("task {n}"))).unwrap())
        .collect();

    let ids: HashSet<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids.len(), 50);
    for pair in tasks.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }
    assert_eq!(store.tasks().len(), 50);
}

#[test]
fn ids_are_unique_across_collections() {
    let (mut store, _) = empty_store();

    let contact = store
        .add_contact(NewContact::lead("Dana", "Acme", "dana@acme.test", "555"))
        .unwrap();
    let task = store.add_task(new_task("call Dana")).unwrap();
    let message = store
        .add_message(NewChatMessage::to_group("hello team"))
        .unwrap();

    assert_ne!(contact.id, task.id);
    assert_ne!(task.id, message.id);
    assert_ne!(contact.id, message.id);
}

#[test]
fn generated_ids_stay_above_loaded_ids() {
    let far_future = chrono::Utc::now().timestamp_millis() + 3_600_000;
    let mut tasks = sample_tasks(chrono::Utc::now());
    tasks[0].id = far_future.to_string();
    let backend = MemoryKeyValueStore::with_entries([(
        "crm-tasks",
        serde_json::to_string(&tasks).unwrap(),
    )]);

    let mut store = EntityStore::open(backend).unwrap();
    let task = store.add_task(new_task("after reload")).unwrap();
    assert!(task.id.parse::<i64>().unwrap() > far_future);
}

#[test]
fn add_contact_appends_and_persists_once() {
    let (mut store, backend) = empty_store();

    let contact = store
        .add_contact(NewContact::lead("Dana", "Acme", "dana@acme.test", "555"))
        .unwrap();

    assert_eq!(contact.status, ContactStatus::New);
    assert_eq!(store.contacts(), &[contact.clone()]);
    assert_eq!(backend.writes(), 1);
    assert_eq!(persisted::<Contact>(&backend), vec![contact]);
}

#[test]
fn update_changes_only_named_fields() {
    let mut store = EntityStore::open(MemoryKeyValueStore::new()).unwrap();
    let before = store.task("2").unwrap().clone();

    let matched = store
        .update_task(
            "2",
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert!(matched);
    let after = store.task("2").unwrap();
    assert_eq!(after.status, TaskStatus::Completed);
    assert_eq!(after.title, before.title);
    assert_eq!(after.description, before.description);
    assert_eq!(after.priority, before.priority);
    assert_eq!(after.due_date, before.due_date);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn matching_update_leaves_other_records_identical() {
    let backend = MemoryKeyValueStore::new();
    let mut store = EntityStore::open(backend.clone()).unwrap();
    let before = store.snapshot();
    let contacts_json_before: serde_json::Value =
        serde_json::from_str(&backend.raw("crm-contacts").unwrap()).unwrap();
    let tasks_json_before: serde_json::Value =
        serde_json::from_str(&backend.raw("crm-tasks").unwrap()).unwrap();

    store
        .update_contact(
            "2",
            ContactPatch {
                phone: Some("+1 (555) 000-0000".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    let after = store.snapshot();
    assert_eq!(after.contacts[0], before.contacts[0]);
    assert_eq!(after.contacts[2], before.contacts[2]);
    assert_ne!(after.contacts[1], before.contacts[1]);
    assert_eq!(after.tasks, before.tasks);

    let contacts_json_after: serde_json::Value =
        serde_json::from_str(&backend.raw("crm-contacts").unwrap()).unwrap();
    assert_eq!(contacts_json_after[0], contacts_json_before[0]);
    assert_eq!(contacts_json_after[2], contacts_json_before[2]);
    assert_eq!(contacts_json_after[1]["phone"], "+1 (555) 000-0000");
    assert_eq!(contacts_json_after[1]["name"], contacts_json_before[1]["name"]);
    let tasks_json_after: serde_json::Value =
        serde_json::from_str(&backend.raw("crm-tasks").unwrap()).unwrap();
    assert_eq!(tasks_json_after, tasks_json_before);
}

#[test]
fn out_of_range_numeric_id_does_not_break_new_ids() {
    let mut tasks = sample_tasks(chrono::Utc::now());
    tasks[1].id = i64::MAX.to_string();
    let backend = MemoryKeyValueStore::with_entries([(
        "crm-tasks",
        serde_json::to_string(&tasks).unwrap(),
    )]);

    let mut store = EntityStore::open(backend).unwrap();
    let skipped = &store.load_report().out_of_range_ids;
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].key, "crm-tasks");
    assert_eq!(skipped[0].id, i64::MAX.to_string());

    let first = store.add_task(new_task("one")).unwrap();
    let second = store.add_task(new_task("two")).unwrap();
    assert_ne!(first.id, second.id);
    assert!(first.id.parse::<i64>().unwrap() < second.id.parse::<i64>().unwrap());
    assert!(store.task(&i64::MAX.to_string()).is_some());
}

#[test]
fn created_at_is_whole_milliseconds_of_the_id() {
    let (mut store, _) = empty_store();

    for n in 0..10 {
        let task = store.add_task(new_task(&format!("task {n}"))).unwrap();
        assert_eq!(task.created_at.timestamp_millis().to_string(), task.id);
        assert_eq!(task.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}

#[test]
fn contact_status_move_touches_only_status() {
    let mut store = EntityStore::open(MemoryKeyValueStore::new()).unwrap();
    let before = store.contact("3").unwrap().clone();
    assert_eq!(before.status, ContactStatus::Qualified);

    assert!(store
        .update_contact_status("3", ContactStatus::Proposal)
        .unwrap());

    let after = store.contact("3").unwrap();
    assert_eq!(
        after,
        &Contact {
            status: ContactStatus::Proposal,
            ..before
        }
    );
}

#[test]
fn optional_contact_fields_can_be_cleared() {
    let mut store = EntityStore::open(MemoryKeyValueStore::new()).unwrap();

    store
        .update_contact(
            "1",
            ContactPatch {
                rep: Some(None),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    let contact = store.contact("1").unwrap();
    assert_eq!(contact.rep, None);
    assert_eq!(contact.source.as_deref(), Some("Website"));
}

#[test]
fn unknown_id_changes_nothing_but_still_writes() {
    let backend = MemoryKeyValueStore::new();
    let mut store = EntityStore::open(backend.clone()).unwrap();
    let before = store.snapshot();
    let writes_before = backend.writes();

    let updated = store
        .update_contact_status("does-not-exist", ContactStatus::Won)
        .unwrap();
    let deleted = store.delete_task("does-not-exist").unwrap();

    assert!(!updated);
    assert!(!deleted);
    assert_eq!(store.snapshot(), before);
    assert_eq!(backend.writes(), writes_before + 2);
}

#[test]
fn delete_removes_exactly_one_record() {
    let (mut store, backend) = empty_store();
    let keep = store.add_task(new_task("keep")).unwrap();
    let removed = store.add_task(new_task("drop")).unwrap();

    assert!(store.delete_task(&removed.id).unwrap());

    assert_eq!(store.tasks(), &[keep.clone()]);
    assert_eq!(persisted::<Task>(&backend), vec![keep]);
}

#[test]
fn deleting_contact_keeps_records_that_reference_it() {
    let mut store = EntityStore::open(MemoryKeyValueStore::new()).unwrap();
    let call = store
        .add_call_log(NewCallLog {
            contact_id: "1".to_string(),
            contact_name: "Alice Johnson".to_string(),
            duration: 5,
            outcome: CallOutcome::Voicemail,
            notes: "left a message".to_string(),
            follow_up_required: false,
            follow_up_date: None,
            created_by: "Current User".to_string(),
        })
        .unwrap();

    assert!(store.delete_contact("1").unwrap());

    assert!(store.contact("1").is_none());
    assert_eq!(store.call_logs(), &[call.clone()]);
    assert_eq!(store.call_logs()[0].contact_name, "Alice Johnson");
}

#[test]
fn every_mutation_writes_its_own_collection_once() {
    let (mut store, backend) = empty_store();

    let message = store.add_message(NewChatMessage::to_group("hi")).unwrap();
    assert_eq!(backend.writes(), 1);
    assert!(backend.raw("crm-messages").is_some());
    assert!(backend.raw("crm-tasks").is_none());

    store
        .update_call_log("missing", CallLogPatch::default())
        .unwrap();
    assert_eq!(backend.writes(), 2);
    assert_eq!(backend.raw("crm-call-logs").unwrap(), "[]");

    store.delete_message(&message.id).unwrap();
    assert_eq!(backend.writes(), 3);
    assert_eq!(backend.raw("crm-messages").unwrap(), "[]");
}

#[test]
fn every_collection_survives_a_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.sqlite3");

    let written = {
        let mut store = EntityStore::open(SqliteKeyValueStore::open(&path).unwrap()).unwrap();
        store
            .add_message(NewChatMessage::direct("You", "Jane Smith", "ping"))
            .unwrap();
        store
            .add_call_log(NewCallLog {
                contact_id: "2".to_string(),
                contact_name: "Bob Smith".to_string(),
                duration: 12,
                outcome: CallOutcome::Connected,
                notes: "went well".to_string(),
                follow_up_required: true,
                follow_up_date: Some("2025-01-10T09:00".to_string()),
                created_by: "Current User".to_string(),
            })
            .unwrap();
        store
            .add_email(NewEmail {
                contact_id: "2".to_string(),
                contact_name: "Bob Smith".to_string(),
                contact_email: "bob@designstudio.com".to_string(),
                subject: "Hello".to_string(),
                body: "Body".to_string(),
                status: EmailStatus::Draft,
                sent_at: None,
                created_by: "Current User".to_string(),
                template_used: None,
            })
            .unwrap();
        store
            .add_meeting(NewMeeting {
                contact_id: "3".to_string(),
                contact_name: "Carol Davis".to_string(),
                title: "Kickoff".to_string(),
                description: String::new(),
                start_time: "2025-02-01T15:00".to_string(),
                end_time: "2025-02-01T16:00".to_string(),
                location: "Zoom".to_string(),
                meeting_type: MeetingType::Video,
                status: MeetingStatus::Scheduled,
                attendees: vec!["carol@marketing.com".to_string()],
                notes: None,
                created_by: "Current User".to_string(),
            })
            .unwrap();
        store
            .add_proposal(NewProposal {
                contact_id: "3".to_string(),
                contact_name: "Carol Davis".to_string(),
                title: "Website".to_string(),
                description: String::new(),
                amount: 150.0,
                currency: "USD".to_string(),
                status: ProposalStatus::Draft,
                valid_until: "2025-03-01".to_string(),
                items: vec![ProposalItem::priced(0, "Design", 1.5, 100.0)],
                terms: "Net 30".to_string(),
                created_by: "Current User".to_string(),
                sent_at: None,
            })
            .unwrap();
        store.snapshot()
    };

    let reopened = EntityStore::open(SqliteKeyValueStore::open(&path).unwrap()).unwrap();
    assert_eq!(reopened.snapshot(), written);
    assert!(reopened.load_report().seeded.is_empty());
}

#[test]
fn persisted_documents_use_camel_case_fields() {
    let (mut store, backend) = empty_store();
    store
        .add_call_log(NewCallLog {
            contact_id: "1".to_string(),
            contact_name: "Alice Johnson".to_string(),
            duration: 3,
            outcome: CallOutcome::NoAnswer,
            notes: String::new(),
            follow_up_required: false,
            follow_up_date: None,
            created_by: "Current User".to_string(),
        })
        .unwrap();

    let raw = backend.raw("crm-call-logs").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value[0];
    assert_eq!(record["contactId"], "1");
    assert_eq!(record["outcome"], "no-answer");
    assert_eq!(record["followUpRequired"], false);
    assert!(record.get("followUpDate").is_none());
    assert!(record["createdAt"].is_string());

    let parsed: Vec<CallLog> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, store.call_logs());
}
