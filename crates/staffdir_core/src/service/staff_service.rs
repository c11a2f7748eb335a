//! Staff directory use-case service.
//!
//! # Responsibility
//! - Provide create / patch / delete entry points over a `StaffRepository`.
//! - Keep subscribers current by re-publishing the full record set after
//!   every successful mutation (no manual refetch by callers).
//!
//! # Invariants
//! - A new subscriber receives the current snapshot before `subscribe`
//!   returns.
//! - Mutations are attempted once; failures are returned, never retried.
//! - Declined deletes never reach the store.

use crate::model::staff::{StaffMember, StaffPatch, StaffProfile, StaffRecordId};
use crate::repo::staff_repo::{RepoError, RepoResult, StaffRepository};
use crate::service::feed::{SnapshotFeed, SnapshotListener, Subscription};
use crate::service::notice::Notice;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Result of a confirmed-or-declined delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// Use-case service over one staff record store.
pub struct StaffService<R: StaffRepository> {
    repo: R,
    feed: SnapshotFeed,
}

impl<R: StaffRepository> StaffService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            feed: SnapshotFeed::new(),
        }
    }

    /// Subscribes to full-snapshot updates.
    ///
    /// The listener is invoked with the current set immediately and then after
    /// each successful mutation issued through this service.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[StaffMember]) + Send + Sync + 'static,
    ) -> RepoResult<Subscription> {
        let listener: SnapshotListener = Arc::new(listener);
        let snapshot = self.repo.list_staff()?;
        listener(&snapshot);
        let subscription = self.feed.register(listener);
        debug!(
            "event=feed_subscribe module=service status=ok listeners={} records={}",
            self.feed.listener_count(),
            snapshot.len()
        );
        Ok(subscription)
    }

    /// Adds a new record; the store assigns its id.
    pub fn create_staff(&self, profile: &StaffProfile) -> RepoResult<StaffRecordId> {
        let id = self.repo.create_staff(profile)?;
        info!("event=staff_create module=service status=ok id={id}");
        self.publish();
        Ok(id)
    }

    /// Merge-patches an existing record.
    pub fn patch_staff(&self, id: StaffRecordId, patch: &StaffPatch) -> RepoResult<()> {
        self.repo.patch_staff(id, patch)?;
        info!("event=staff_patch module=service status=ok id={id}");
        self.publish();
        Ok(())
    }

    /// Deletes a record without asking for confirmation.
    pub fn delete_staff(&self, id: StaffRecordId) -> RepoResult<()> {
        self.repo.delete_staff(id)?;
        info!("event=staff_delete module=service status=ok id={id}");
        self.publish();
        Ok(())
    }

    /// Deletes a record only when `confirm` accepts it.
    ///
    /// `confirm` sees the current record; returning `false` leaves the store
    /// untouched. A missing record yields `RepoError::NotFound` without
    /// prompting.
    pub fn delete_with_confirmation(
        &self,
        id: StaffRecordId,
        confirm: impl FnOnce(&StaffMember) -> bool,
    ) -> RepoResult<DeleteOutcome> {
        let member = self.repo.get_staff(id)?.ok_or(RepoError::NotFound(id))?;
        if !confirm(&member) {
            debug!("event=staff_delete module=service status=declined id={id}");
            return Ok(DeleteOutcome::Declined);
        }
        self.delete_staff(id)?;
        Ok(DeleteOutcome::Deleted)
    }

    pub fn get_staff(&self, id: StaffRecordId) -> RepoResult<Option<StaffMember>> {
        self.repo.get_staff(id)
    }

    /// Reads the full current record set.
    pub fn list_staff(&self) -> RepoResult<Vec<StaffMember>> {
        self.repo.list_staff()
    }

    fn publish(&self) {
        if self.feed.listener_count() == 0 {
            return;
        }
        match self.repo.list_staff() {
            Ok(snapshot) => self.feed.publish(&snapshot),
            Err(err) => error!(
                "event=feed_publish module=service status=error error_code=snapshot_read_failed error={err}"
            ),
        }
    }
}

/// Maps a create/update result to its transient notice, logging failures.
pub fn mutation_notice<T>(result: &RepoResult<T>, success: Notice) -> Notice {
    match result {
        Ok(_) => success,
        Err(err) => {
            warn!("event=staff_mutation module=service status=error error={err}");
            Notice::FAILED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mutation_notice;
    use crate::repo::staff_repo::{RepoError, RepoResult};
    use crate::service::notice::Notice;
    use uuid::Uuid;

    #[test]
    fn failed_mutation_maps_to_error_notice() {
        let result: RepoResult<()> = Err(RepoError::NotFound(Uuid::nil()));
        let notice = mutation_notice(&result, Notice::UPDATED);
        assert!(notice.is_error());
        assert_eq!(notice.to_string(), "An error occurred");
    }

    #[test]
    fn successful_mutation_keeps_success_notice() {
        let result: RepoResult<()> = Ok(());
        assert_eq!(mutation_notice(&result, Notice::ADDED), Notice::ADDED);
    }
}
