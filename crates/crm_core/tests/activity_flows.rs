use crm_core::model::activity::{CallOutcome, EmailStatus, MeetingStatus, MeetingType};
use crm_core::model::proposal::{ProposalPatch, ProposalStatus};
use crm_core::model::task::{TaskPriority, TaskStatus};
use crm_core::service::activity_service::{
    CreateProposalRequest, LogCallRequest, ProposalLine, ScheduleMeetingRequest,
    SendEmailRequest, CURRENT_USER,
};
use crm_core::service::email_templates::EmailTemplate;
use crm_core::{ActivityService, EntityStore, MemoryKeyValueStore, RepoError, ServiceError};

fn seeded_store() -> (EntityStore, MemoryKeyValueStore) {
    let backend = MemoryKeyValueStore::new();
    let store = EntityStore::open(backend.clone()).unwrap();
    (store, backend)
}

fn call_request(contact_id: &str) -> LogCallRequest {
    LogCallRequest {
        contact_id: contact_id.to_string(),
        duration: 15,
        outcome: CallOutcome::Connected,
        notes: "Discussed pricing tiers".to_string(),
        follow_up_required: true,
        follow_up_date: Some("2025-01-10T09:00".to_string()),
    }
}

fn meeting_request(contact_id: &str, start_time: &str) -> ScheduleMeetingRequest {
    ScheduleMeetingRequest {
        contact_id: contact_id.to_string(),
        title: "Demo".to_string(),
        description: "Product walkthrough".to_string(),
        start_time: start_time.to_string(),
        end_time: None,
        location: "Zoom".to_string(),
        meeting_type: MeetingType::Video,
        extra_attendees: vec!["sales@ourco.test".to_string()],
    }
}

#[test]
fn logged_call_with_follow_up_creates_one_task() {
    let (mut store, _) = seeded_store();
    let tasks_before = store.tasks().len();

    let logged = ActivityService::new(&mut store)
        .log_call(call_request("2"))
        .unwrap();

    assert_eq!(logged.call_log.contact_id, "2");
    assert_eq!(logged.call_log.contact_name, "Bob Smith");
    assert_eq!(logged.call_log.created_by, CURRENT_USER);
    assert_eq!(
        logged.call_log.follow_up_date.as_deref(),
        Some("2025-01-10T09:00")
    );

    let task = logged.follow_up_task.unwrap();
    assert_eq!(task.title, "Follow up call with Bob Smith");
    assert_eq!(
        task.description,
        "Follow up on previous call: Discussed pricing tiers..."
    );
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.status, TaskStatus::Upcoming);
    assert_eq!(task.due_date, "2025-01-10T09:00");

    assert_eq!(store.call_logs().len(), 1);
    assert_eq!(store.tasks().len(), tasks_before + 1);
}

#[test]
fn follow_up_description_keeps_first_hundred_characters() {
    let (mut store, _) = seeded_store();
    let mut request = call_request("1");
    request.notes = "x".repeat(150);

    let task = ActivityService::new(&mut store)
        .log_call(request)
        .unwrap()
        .follow_up_task
        .unwrap();

    let expected = format!("Follow up on previous call: {}...", "x".repeat(100));
    assert_eq!(task.description, expected);
}

#[test]
fn call_without_follow_up_or_date_creates_no_task() {
    let (mut store, _) = seeded_store();
    let tasks_before = store.tasks().len();

    let mut no_follow_up = call_request("1");
    no_follow_up.follow_up_required = false;
    let mut no_date = call_request("1");
    no_date.follow_up_date = None;

    let mut service = ActivityService::new(&mut store);
    let first = service.log_call(no_follow_up).unwrap();
    let second = service.log_call(no_date).unwrap();

    assert!(first.follow_up_task.is_none());
    assert_eq!(first.call_log.follow_up_date, None);
    assert!(second.follow_up_task.is_none());
    assert_eq!(store.call_logs().len(), 2);
    assert_eq!(store.tasks().len(), tasks_before);
}

#[test]
fn unknown_contact_is_rejected_without_writes() {
    let (mut store, backend) = seeded_store();
    let writes_before = backend.writes();

    let mut service = ActivityService::new(&mut store);
    let call = service.log_call(call_request("404"));
    let meeting = service.schedule_meeting(meeting_request("404", "2025-02-01T15:00"));
    let email = service.send_email(SendEmailRequest {
        contact_id: "404".to_string(),
        subject: "Hi".to_string(),
        body: "Hello".to_string(),
        template: None,
    });

    assert!(matches!(call, Err(ServiceError::ContactNotFound(id)) if id == "404"));
    assert!(matches!(meeting, Err(ServiceError::ContactNotFound(_))));
    assert!(matches!(email, Err(ServiceError::ContactNotFound(_))));
    assert_eq!(backend.writes(), writes_before);
    assert!(store.call_logs().is_empty());
}

#[test]
fn scheduled_meeting_gets_reminder_one_hour_before() {
    let (mut store, _) = seeded_store();

    let scheduled = ActivityService::new(&mut store)
        .schedule_meeting(meeting_request("3", "2025-02-01T15:00"))
        .unwrap();

    let meeting = &scheduled.meeting;
    assert_eq!(meeting.contact_name, "Carol Davis");
    assert_eq!(meeting.start_time, "2025-02-01T15:00");
    assert_eq!(meeting.end_time, "2025-02-01T16:00");
    assert_eq!(meeting.status, MeetingStatus::Scheduled);
    assert_eq!(
        meeting.attendees,
        vec!["carol@marketing.com".to_string(), "sales@ourco.test".to_string()]
    );

    let reminder = &scheduled.reminder_task;
    assert_eq!(reminder.title, "Meeting reminder: Demo");
    assert_eq!(reminder.description, "Meeting with Carol Davis in 1 hour");
    assert_eq!(reminder.priority, TaskPriority::High);
    assert_eq!(reminder.status, TaskStatus::Upcoming);
    assert_eq!(reminder.due_date, "2025-02-01T14:00");

    assert_eq!(store.meetings().len(), 1);
    assert!(store.task(&reminder.id).is_some());
}

#[test]
fn explicit_end_time_and_rfc3339_start_are_kept() {
    let (mut store, _) = seeded_store();
    let mut request = meeting_request("1", "2025-02-01T00:30:00Z");
    request.end_time = Some("2025-02-01T02:00:00Z".to_string());

    let scheduled = ActivityService::new(&mut store)
        .schedule_meeting(request)
        .unwrap();

    assert_eq!(scheduled.meeting.end_time, "2025-02-01T02:00:00Z");
    assert_eq!(scheduled.reminder_task.due_date, "2025-01-31T23:30:00Z");
}

#[test]
fn unparseable_start_time_writes_nothing() {
    let (mut store, backend) = seeded_store();
    let writes_before = backend.writes();

    let result = ActivityService::new(&mut store)
        .schedule_meeting(meeting_request("3", "next tuesday"));

    assert!(matches!(result, Err(ServiceError::InvalidDateTime(value)) if value == "next tuesday"));
    assert!(store.meetings().is_empty());
    assert_eq!(backend.writes(), writes_before);
}

#[test]
fn proposal_amount_is_sum_of_line_totals() {
    let (mut store, _) = seeded_store();

    let proposal = ActivityService::new(&mut store)
        .create_proposal(CreateProposalRequest {
            contact_id: "3".to_string(),
            title: "Website redesign".to_string(),
            description: "Full redesign".to_string(),
            currency: "USD".to_string(),
            valid_until: "2025-03-01".to_string(),
            terms: "Net 30".to_string(),
            lines: vec![
                ProposalLine::new("Pages", 2.0, 50.0),
                ProposalLine::new("Hosting", 1.0, 100.0),
            ],
        })
        .unwrap();

    assert_eq!(proposal.status, ProposalStatus::Draft);
    assert_eq!(proposal.contact_name, "Carol Davis");
    assert_eq!(proposal.items.len(), 2);
    assert_eq!(proposal.items[0].id, "item-0");
    assert_eq!(proposal.items[0].total, 100.0);
    assert_eq!(proposal.items[1].id, "item-1");
    assert_eq!(proposal.items[1].total, 100.0);
    assert_eq!(proposal.amount, 200.0);
    assert_eq!(store.proposals().len(), 1);
}

fn proposal_request(contact_id: &str, lines: Vec<ProposalLine>) -> CreateProposalRequest {
    CreateProposalRequest {
        contact_id: contact_id.to_string(),
        title: "Retainer".to_string(),
        description: String::new(),
        currency: "USD".to_string(),
        valid_until: "2025-05-01".to_string(),
        terms: String::new(),
        lines,
    }
}

#[test]
fn non_finite_line_is_rejected_and_earlier_proposals_survive_reload() {
    let (mut store, backend) = seeded_store();
    let mut service = ActivityService::new(&mut store);
    let valid = service
        .create_proposal(proposal_request("1", vec![ProposalLine::new("Setup", 1.0, 100.0)]))
        .unwrap();

    let nan = service.create_proposal(proposal_request(
        "1",
        vec![
            ProposalLine::new("Setup", 1.0, 100.0),
            ProposalLine::new("Support", 2.0, f64::NAN),
        ],
    ));
    let infinite = service.revise_proposal_items(
        &valid.id,
        vec![ProposalLine::new("Hours", f64::INFINITY, 10.0)],
    );

    assert!(matches!(nan, Err(ServiceError::InvalidAmount { line: 1 })));
    assert!(matches!(infinite, Err(ServiceError::InvalidAmount { line: 0 })));
    assert_eq!(store.proposals(), &[valid.clone()]);

    let reopened = EntityStore::open(backend).unwrap();
    assert!(reopened.load_report().is_clean());
    assert_eq!(reopened.proposals(), &[valid]);
}

#[test]
fn raw_proposal_with_non_finite_amount_is_refused_by_the_store() {
    let (mut store, backend) = seeded_store();
    let valid = ActivityService::new(&mut store)
        .create_proposal(proposal_request("2", vec![ProposalLine::new("Logo", 1.0, 300.0)]))
        .unwrap();

    let result = store.update_proposal(
        &valid.id,
        ProposalPatch {
            amount: Some(f64::NAN),
            ..ProposalPatch::default()
        },
    );

    assert!(matches!(result, Err(RepoError::NotReloadable(_))));
    assert_eq!(store.proposal(&valid.id).unwrap().amount, 300.0);
    let reopened = EntityStore::open(backend).unwrap();
    assert_eq!(reopened.proposals(), &[valid]);
}

#[test]
fn revising_items_recomputes_amount() {
    let (mut store, _) = seeded_store();
    let mut service = ActivityService::new(&mut store);
    let proposal = service
        .create_proposal(CreateProposalRequest {
            contact_id: "1".to_string(),
            title: "Audit".to_string(),
            description: String::new(),
            currency: "EUR".to_string(),
            valid_until: "2025-04-01".to_string(),
            terms: String::new(),
            lines: vec![ProposalLine::new("Audit", 1.0, 500.0)],
        })
        .unwrap();

    let matched = service
        .revise_proposal_items(&proposal.id, vec![ProposalLine::new("Audit", 3.0, 250.0)])
        .unwrap();
    let missing = service
        .revise_proposal_items("missing", vec![ProposalLine::new("x", 1.0, 1.0)])
        .unwrap();

    assert!(matched);
    assert!(!missing);
    let revised = store.proposal(&proposal.id).unwrap();
    assert_eq!(revised.amount, 750.0);
    assert_eq!(revised.items[0].total, 750.0);
    assert_eq!(revised.title, "Audit");
}

#[test]
fn templated_email_is_rendered_and_recorded_as_sent() {
    let (mut store, _) = seeded_store();
    let mut service = ActivityService::new(&mut store);

    let rendered = service
        .compose_email("2", EmailTemplate::Introduction)
        .unwrap();
    assert_eq!(rendered.subject, "Introduction - Let's Connect");
    assert!(rendered.body.starts_with("Hi Bob Smith,"));
    assert!(rendered.body.contains("our services at Your Company"));
    assert!(rendered.body.contains("businesses like Design Studio"));

    let email = service
        .send_email(SendEmailRequest {
            contact_id: "2".to_string(),
            subject: rendered.subject,
            body: rendered.body,
            template: Some(EmailTemplate::Introduction),
        })
        .unwrap();

    assert_eq!(email.status, EmailStatus::Sent);
    assert_eq!(email.contact_email, "bob@designstudio.com");
    assert_eq!(email.template_used.as_deref(), Some("introduction"));
    assert!(email.sent_at.is_some());
    assert_eq!(store.emails().len(), 1);
}
