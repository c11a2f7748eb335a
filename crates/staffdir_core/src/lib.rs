//! Core domain logic for the staff directory.
//! Every record invariant is enforced here; bindings only translate.

pub mod auth;
pub mod config;
pub mod db;
pub mod editor;
pub mod export;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod view;

pub use auth::action::GuardedAction;
pub use auth::gate::{AccessCheck, AccessError, AccessGate, PendingAction, SharedSecretCheck};
pub use config::{Config, ConfigError, ConfigResult};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use editor::draft::{DraftError, Section, StaffDraft, TextField};
pub use editor::form::{EditorForm, PhotoUpload, SubmitReport, UploadError};
pub use export::{ExportError, ExportResult};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use media::compress::{CompressionOptions, JpegCompressor, MediaError, PhotoCompressor};
pub use model::staff::{
    Education, Experience, Research, StaffMember, StaffPatch, StaffProfile, StaffRecordId,
    StaffStatus,
};
pub use repo::blob_store::{BlobError, BlobStore, FsBlobStore};
pub use repo::staff_repo::{RepoError, RepoResult, SqliteStaffRepository, StaffRepository};
pub use search::filter::filter_staff;
pub use service::notice::{Notice, NoticeLevel};
pub use service::staff_service::{mutation_notice, DeleteOutcome, StaffService};
pub use view::card::StaffCard;
pub use view::detail::StaffDetailView;
pub use view::directory::DirectoryViewModel;

/// Minimal health-check API for bindings.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
