//! Editor form workflow.
//!
//! # Responsibility
//! - Hold the current draft for a new or an existing record.
//! - Run the photo step (compress, upload, patch `image_url`).
//! - Submit the whole draft as a create or a merge-patch and close.
//!
//! # Invariants
//! - A failed photo step leaves `image_url` unchanged and is only logged.
//! - A background upload only touches the draft when applied to an open
//!   form; submitting first drops the pending result.
//! - `submit` consumes the form, so it is closed whatever the store answers.

use crate::editor::draft::{DraftResult, StaffDraft, TextField};
use crate::media::compress::{MediaError, PhotoCompressor};
use crate::model::staff::{StaffMember, StaffPatch, StaffRecordId};
use crate::repo::blob_store::{photo_object_path, BlobError, BlobStore};
use crate::repo::staff_repo::{RepoResult, StaffRepository};
use crate::service::notice::Notice;
use crate::service::staff_service::{mutation_notice, StaffService};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::thread::JoinHandle;

/// One user-selected image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Original file name as picked by the user.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum UploadError {
    Compress(MediaError),
    Store(BlobError),
    /// Background worker ended without producing a result.
    WorkerLost,
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compress(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::WorkerLost => write!(f, "photo upload worker stopped unexpectedly"),
        }
    }
}

impl Error for UploadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Compress(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::WorkerLost => None,
        }
    }
}

impl From<MediaError> for UploadError {
    fn from(value: MediaError) -> Self {
        Self::Compress(value)
    }
}

impl From<BlobError> for UploadError {
    fn from(value: BlobError) -> Self {
        Self::Store(value)
    }
}

/// Compresses `upload` and stores it, returning the durable photo URL.
pub fn upload_photo(
    compressor: &impl PhotoCompressor,
    blobs: &impl BlobStore,
    upload: &PhotoUpload,
    uploaded_at_ms: i64,
) -> Result<String, UploadError> {
    let compressed = compressor.compress(&upload.bytes)?;
    let object_path = photo_object_path(uploaded_at_ms, &upload.file_name);
    let url = blobs.put(&object_path, &compressed.bytes)?;
    info!(
        "event=photo_upload module=editor status=ok bytes={} object_path={object_path}",
        compressed.bytes.len()
    );
    Ok(url)
}

/// [`upload_photo`] stamped with the current time.
pub fn upload_photo_now(
    compressor: &impl PhotoCompressor,
    blobs: &impl BlobStore,
    upload: &PhotoUpload,
) -> Result<String, UploadError> {
    upload_photo(compressor, blobs, upload, Utc::now().timestamp_millis())
}

/// Photo upload running off the editing thread.
pub struct PendingUpload {
    handle: JoinHandle<Result<String, UploadError>>,
}

impl PendingUpload {
    /// Blocks until the worker finishes.
    pub fn wait(self) -> Result<String, UploadError> {
        self.handle.join().unwrap_or(Err(UploadError::WorkerLost))
    }
}

/// Result of submitting the form.
#[derive(Debug)]
pub struct SubmitReport {
    /// Id of the created or patched record.
    pub result: RepoResult<StaffRecordId>,
    /// Transient notice for the caller to show.
    pub notice: Notice,
}

/// Add/edit form state for one staff record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorForm {
    draft: StaffDraft,
    editing: Option<StaffRecordId>,
}

impl EditorForm {
    /// Opens the form for a new record with a blank draft dated `today`.
    pub fn new_member(today: NaiveDate) -> Self {
        Self {
            draft: StaffDraft::blank(today),
            editing: None,
        }
    }

    /// Opens the form pre-filled from an existing record.
    pub fn edit(member: &StaffMember) -> Self {
        Self {
            draft: StaffDraft::from_member(member),
            editing: Some(member.id),
        }
    }

    /// Reopens a form from a draft held outside the process boundary.
    pub fn restore(draft: StaffDraft, editing: Option<StaffRecordId>) -> Self {
        Self { draft, editing }
    }

    pub fn draft(&self) -> &StaffDraft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<StaffRecordId> {
        self.editing
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Staff Member"
        } else {
            "Add New Staff Member"
        }
    }

    pub fn submit_label(&self, uploading: bool) -> &'static str {
        match (uploading, self.editing.is_some()) {
            (true, _) => "Uploading...",
            (false, true) => "Update Staff Member",
            (false, false) => "Add Staff Member",
        }
    }

    /// Replaces the draft with `f(current)`.
    pub fn update(&mut self, f: impl FnOnce(&StaffDraft) -> StaffDraft) {
        self.draft = f(&self.draft);
    }

    /// Like [`EditorForm::update`] for fallible transformations; on error the
    /// current draft is kept.
    pub fn try_update(
        &mut self,
        f: impl FnOnce(&StaffDraft) -> DraftResult<StaffDraft>,
    ) -> DraftResult<()> {
        self.draft = f(&self.draft)?;
        Ok(())
    }

    /// Runs the photo step inline. Returns whether `image_url` was updated.
    pub fn upload_image(
        &mut self,
        compressor: &impl PhotoCompressor,
        blobs: &impl BlobStore,
        upload: &PhotoUpload,
    ) -> bool {
        let result = upload_photo_now(compressor, blobs, upload);
        self.apply_upload_result(result)
    }

    /// Starts the photo step on a worker thread; editing can continue.
    pub fn start_upload<C, B>(&self, compressor: C, blobs: B, upload: PhotoUpload) -> PendingUpload
    where
        C: PhotoCompressor + Send + 'static,
        B: BlobStore + Send + 'static,
    {
        let uploaded_at_ms = Utc::now().timestamp_millis();
        let handle = std::thread::spawn(move || {
            upload_photo(&compressor, &blobs, &upload, uploaded_at_ms)
        });
        PendingUpload { handle }
    }

    /// Waits for `pending` and patches `image_url` on success.
    pub fn apply_upload(&mut self, pending: PendingUpload) -> bool {
        self.apply_upload_result(pending.wait())
    }

    fn apply_upload_result(&mut self, result: Result<String, UploadError>) -> bool {
        match result {
            Ok(url) => {
                self.draft = self.draft.with_text(TextField::ImageUrl, url);
                true
            }
            Err(err) => {
                warn!("event=photo_upload module=editor status=error error={err}");
                false
            }
        }
    }

    /// Sends the whole draft to the store and closes the form.
    ///
    /// New records are created; existing ones receive a patch carrying every
    /// draft field.
    pub fn submit<R: StaffRepository>(self, service: &StaffService<R>) -> SubmitReport {
        match self.editing {
            Some(id) => {
                let patch = StaffPatch::from_profile(self.draft.profile());
                let result = service.patch_staff(id, &patch).map(|()| id);
                let notice = mutation_notice(&result, Notice::UPDATED);
                SubmitReport { result, notice }
            }
            None => {
                let result = service.create_staff(self.draft.profile());
                let notice = mutation_notice(&result, Notice::ADDED);
                SubmitReport { result, notice }
            }
        }
    }
}
