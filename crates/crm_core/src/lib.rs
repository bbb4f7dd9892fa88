//! Core domain logic for the CRM entity store.
//! This crate is the single source of truth for records and their invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod simulation;
pub mod storage;
pub mod store;
pub mod worker;

pub use config::{ConfigError, CrmConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::activity::{CallLog, CallOutcome, Email, EmailStatus, Meeting, MeetingStatus, MeetingType};
pub use model::chat::{ChatMessage, TeamMember};
pub use model::contact::{Contact, ContactPatch, ContactStatus, NewContact};
pub use model::proposal::{Proposal, ProposalItem, ProposalStatus};
pub use model::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
pub use model::EntityId;
pub use repo::collection::{RepoError, RepoResult};
pub use service::activity_service::{ActivityService, ServiceError, ServiceResult};
pub use service::analytics::PipelineSummary;
pub use simulation::{ChatSimulator, ChatTarget, EmailSimulator};
pub use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError};
pub use store::{EntityStore, LoadReport, StoreOptions, StoreSnapshot};
pub use worker::{spawn_store_worker, StoreHandle, WorkerError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
