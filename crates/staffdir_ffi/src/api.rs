//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose directory, editor, delete and export use cases to Dart via FRB.
//! - Translate core results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Guarded calls (edit, PDF export, delete) run only after the access gate
//!   accepts the supplied secret.
//! - Records cross the boundary as camelCase JSON documents.

use log::warn;
use staffdir_core::db::open_db;
use staffdir_core::editor::form::upload_photo_now;
use staffdir_core::export::json::write_profile_json;
use staffdir_core::export::pdf::{fetch_photo, write_profile_pdf};
use staffdir_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AccessGate, Config, DeleteOutcome, DirectoryViewModel, EditorForm, FsBlobStore,
    GuardedAction, JpegCompressor, Notice, PhotoUpload, SharedSecretCheck, SqliteStaffRepository,
    StaffDetailView, StaffDraft, StaffProfile, StaffRecordId, StaffService,
};
use std::path::Path;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; conflicting calls fail.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), Path::new(log_dir.trim())) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Loads configuration from `config_path` (TOML, may be empty) plus the
/// `STAFFDIR_` environment.
///
/// # FFI contract
/// - Must run before any other data call to take effect; later calls with a
///   different result are rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(config_path: String) -> String {
    let trimmed = config_path.trim();
    let file = (!trimmed.is_empty()).then(|| Path::new(trimmed));
    let config = match Config::load(file) {
        Ok(config) => config,
        Err(err) => return err.to_string(),
    };
    if CONFIG.get_or_init(|| config.clone()) == &config {
        String::new()
    } else {
        "configuration already initialized; refusing to switch".to_string()
    }
}

/// One card of the directory grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffCardItem {
    pub record_id: String,
    pub display_name: String,
    pub staff_id_line: String,
    pub status_label: String,
    pub is_active: bool,
    pub position: String,
    pub department: String,
    pub email: String,
    pub phone_number: String,
    pub started_line: String,
    pub photo_url: String,
}

/// Directory listing envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResponse {
    pub items: Vec<StaffCardItem>,
    /// Empty-state or diagnostic message.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffActionResponse {
    pub ok: bool,
    /// Store id of the affected record.
    pub record_id: Option<String>,
    /// Notice text for the toast, or a diagnostic message.
    pub message: String,
}

impl StaffActionResponse {
    fn success(message: impl Into<String>, record_id: StaffRecordId) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
        }
    }
}

/// Single-record response carrying the camelCase JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecordResponse {
    pub ok: bool,
    pub record_json: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntryItem {
    pub heading: String,
    pub lines: Vec<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSectionItem {
    pub title: String,
    pub entries: Vec<DetailEntryItem>,
}

/// Read-only detail screen envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffDetailResponse {
    pub ok: bool,
    pub display_name: String,
    pub photo_url: String,
    pub header_lines: Vec<String>,
    pub biography: Option<String>,
    pub sections: Vec<DetailSectionItem>,
    pub message: String,
}

impl StaffDetailResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            display_name: String::new(),
            photo_url: String::new(),
            header_lines: Vec::new(),
            biography: None,
            sections: Vec::new(),
            message: message.into(),
        }
    }
}

/// File-producing response envelope (photo upload, exports).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactResponse {
    pub ok: bool,
    /// Photo URL or written file path.
    pub location: Option<String>,
    pub message: String,
}

impl ArtifactResponse {
    fn success(message: impl Into<String>, location: String) -> Self {
        Self {
            ok: true,
            location: Some(location),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            location: None,
            message: message.into(),
        }
    }
}

/// Lists directory cards matching `query` in store order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Empty query lists every record.
#[flutter_rust_bridge::frb(sync)]
pub fn directory_list(query: String) -> DirectoryResponse {
    let result = with_staff_service(|service| {
        let directory = DirectoryViewModel::attach(service).map_err(|err| err.to_string())?;
        Ok(directory.cards(&query))
    });
    match result {
        Ok(cards) => {
            let message = if cards.is_empty() && !query.trim().is_empty() {
                staffdir_core::view::directory::NO_MATCHES_MESSAGE.to_string()
            } else {
                format!("{} staff member(s).", cards.len())
            };
            DirectoryResponse {
                items: cards.into_iter().map(to_card_item).collect(),
                message,
            }
        }
        Err(err) => DirectoryResponse {
            items: Vec::new(),
            message: format!("directory_list failed: {err}"),
        },
    }
}

/// Returns one record as JSON, e.g. to seed the editor.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_get(record_id: String) -> StaffRecordResponse {
    let result = parse_record_id(&record_id).and_then(|id| {
        with_staff_service(|service| service.get_staff(id).map_err(|err| err.to_string()))
    });
    match result {
        Ok(Some(member)) => match serde_json::to_string(&member) {
            Ok(json) => StaffRecordResponse {
                ok: true,
                record_json: Some(json),
                message: String::new(),
            },
            Err(err) => StaffRecordResponse {
                ok: false,
                record_json: None,
                message: format!("staff_get failed: {err}"),
            },
        },
        Ok(None) => StaffRecordResponse {
            ok: false,
            record_json: None,
            message: format!("staff record not found: {record_id}"),
        },
        Err(err) => StaffRecordResponse {
            ok: false,
            record_json: None,
            message: format!("staff_get failed: {err}"),
        },
    }
}

/// Read-only detail projection of one record.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_detail(record_id: String) -> StaffDetailResponse {
    let result = parse_record_id(&record_id).and_then(|id| {
        with_staff_service(|service| service.get_staff(id).map_err(|err| err.to_string()))
    });
    let member = match result {
        Ok(Some(member)) => member,
        Ok(None) => return StaffDetailResponse::failure(format!("staff record not found: {record_id}")),
        Err(err) => return StaffDetailResponse::failure(format!("staff_detail failed: {err}")),
    };
    let view = StaffDetailView::from_member(&member);
    StaffDetailResponse {
        ok: true,
        display_name: view.display_name,
        photo_url: view.photo_url,
        header_lines: view.header_lines,
        biography: view.biography,
        sections: view
            .sections
            .into_iter()
            .map(|section| DetailSectionItem {
                title: section.title.to_string(),
                entries: section
                    .entries
                    .into_iter()
                    .map(|entry| DetailEntryItem {
                        heading: entry.heading,
                        lines: entry.lines,
                        bullets: entry.bullets,
                    })
                    .collect(),
            })
            .collect(),
        message: String::new(),
    }
}

/// Submits an editor draft.
///
/// Input semantics:
/// - `profile_json`: camelCase profile document (no `id`).
/// - `editing_record_id`: `None` creates; `Some(id)` patches every field of
///   that record and requires the access `secret`.
///
/// # FFI contract
/// - Returns the notice text (`Staff member added successfully`, ...) as
///   `message`; the form is closed on the Dart side either way.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_submit(
    profile_json: String,
    editing_record_id: Option<String>,
    secret: Option<String>,
) -> StaffActionResponse {
    let profile: StaffProfile = match serde_json::from_str(&profile_json) {
        Ok(profile) => profile,
        Err(err) => return StaffActionResponse::failure(format!("invalid profile: {err}")),
    };
    let editing = match editing_record_id.as_deref().map(parse_record_id).transpose() {
        Ok(editing) => editing,
        Err(err) => return StaffActionResponse::failure(err),
    };

    let form = EditorForm::restore(StaffDraft::from_profile(profile), editing);
    let result = with_staff_service(|service| match editing {
        Some(_) => access_gate()
            .request(GuardedAction::Edit, || form.submit(service))
            .confirm(secret.as_deref().unwrap_or_default())
            .map_err(|err| err.to_string()),
        None => Ok(form.submit(service)),
    });

    match result {
        Ok(report) => match report.result {
            Ok(id) => StaffActionResponse::success(report.notice.message, id),
            Err(_) => StaffActionResponse::failure(report.notice.message),
        },
        Err(err) => StaffActionResponse::failure(err),
    }
}

/// Deletes a record after the access gate and the caller's confirmation.
///
/// `confirmed = false` models a declined "Are you sure" prompt and leaves
/// the store untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_delete(record_id: String, secret: String, confirmed: bool) -> StaffActionResponse {
    let id = match parse_record_id(&record_id) {
        Ok(id) => id,
        Err(err) => return StaffActionResponse::failure(err),
    };
    let result = with_staff_service(|service| {
        access_gate()
            .request(GuardedAction::Delete, || {
                service.delete_with_confirmation(id, |_| confirmed)
            })
            .confirm(&secret)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Ok(DeleteOutcome::Deleted)) => StaffActionResponse::success(Notice::DELETED.message, id),
        Ok(Ok(DeleteOutcome::Declined)) => StaffActionResponse::failure("Delete cancelled."),
        Ok(Err(err)) => {
            warn!("event=staff_delete module=ffi status=error error={err}");
            StaffActionResponse::failure(Notice::FAILED.message)
        }
        Err(err) => StaffActionResponse::failure(err),
    }
}

/// Compresses and stores a picked photo, returning its durable URL.
///
/// # FFI contract
/// - Failures are reported but the caller keeps the previous `imageUrl`.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_upload_photo(file_name: String, bytes: Vec<u8>) -> ArtifactResponse {
    let config = resolve_config();
    let blobs = match FsBlobStore::open(config.blob_dir()) {
        Ok(blobs) => blobs,
        Err(err) => return ArtifactResponse::failure(format!("photo store open failed: {err}")),
    };
    let compressor = JpegCompressor::new(config.media.compression_options());
    let upload = PhotoUpload { file_name, bytes };
    match upload_photo_now(&compressor, &blobs, &upload) {
        Ok(url) => ArtifactResponse::success("Photo uploaded.", url),
        Err(err) => {
            warn!("event=photo_upload module=ffi status=error error={err}");
            ArtifactResponse::failure(format!("photo upload failed: {err}"))
        }
    }
}

/// Writes the pretty JSON export into the configured export directory.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_export_json(record_id: String) -> ArtifactResponse {
    let result = load_member(&record_id).and_then(|member| {
        write_profile_json(&member, &resolve_config().export_dir()).map_err(|err| err.to_string())
    });
    match result {
        Ok(path) => ArtifactResponse::success("Profile exported.", path.display().to_string()),
        Err(err) => ArtifactResponse::failure(format!("staff_export_json failed: {err}")),
    }
}

/// Writes the PDF export after the access gate accepts `secret`.
#[flutter_rust_bridge::frb(sync)]
pub fn staff_export_pdf(record_id: String, secret: String) -> ArtifactResponse {
    let member = match load_member(&record_id) {
        Ok(member) => member,
        Err(err) => return ArtifactResponse::failure(format!("staff_export_pdf failed: {err}")),
    };
    let config = resolve_config();
    let result = access_gate()
        .request(GuardedAction::Export, || {
            let photo = FsBlobStore::open(config.blob_dir())
                .ok()
                .and_then(|blobs| fetch_photo(&blobs, &member.profile.image_url));
            write_profile_pdf(&member, photo.as_ref(), &config.export_dir())
        })
        .confirm(&secret);
    match result {
        Ok(Ok(path)) => ArtifactResponse::success("Profile exported.", path.display().to_string()),
        Ok(Err(err)) => ArtifactResponse::failure(format!("staff_export_pdf failed: {err}")),
        Err(err) => ArtifactResponse::failure(err.to_string()),
    }
}

fn resolve_config() -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::load(None).unwrap_or_else(|err| {
            warn!("event=config_load module=ffi status=fallback error={err}");
            Config::default()
        })
    })
}

fn access_gate() -> AccessGate<SharedSecretCheck> {
    AccessGate::new(SharedSecretCheck::new(
        resolve_config().access.secret.clone(),
    ))
}

fn parse_record_id(raw: &str) -> Result<StaffRecordId, String> {
    StaffRecordId::parse_str(raw.trim()).map_err(|err| format!("invalid record id `{raw}`: {err}"))
}

fn load_member(record_id: &str) -> Result<staffdir_core::StaffMember, String> {
    let id = parse_record_id(record_id)?;
    with_staff_service(|service| service.get_staff(id).map_err(|err| err.to_string()))?
        .ok_or_else(|| format!("staff record not found: {record_id}"))
}

fn with_staff_service<T>(
    f: impl FnOnce(&StaffService<SqliteStaffRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_config().database_path();
    let conn = open_db(&db_path).map_err(|err| format!("staff DB open failed: {err}"))?;
    let repo = SqliteStaffRepository::try_new(&conn)
        .map_err(|err| format!("staff repo init failed: {err}"))?;
    let service = StaffService::new(repo);
    f(&service)
}

fn to_card_item(card: staffdir_core::StaffCard) -> StaffCardItem {
    StaffCardItem {
        record_id: card.id.to_string(),
        display_name: card.display_name,
        staff_id_line: card.staff_id_line,
        status_label: card.status_label.to_string(),
        is_active: card.is_active,
        position: card.position,
        department: card.department,
        email: card.email,
        phone_number: card.phone_number,
        started_line: card.started_line,
        photo_url: card.photo_url,
    }
}
