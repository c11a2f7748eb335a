//! Directory view model.
//!
//! # Responsibility
//! - Mirror the store's full record set via one live subscription.
//! - Serve filtered lists and cards for rendering.
//!
//! # Invariants
//! - Each notification replaces the held sequence wholesale; the view model
//!   has no state of its own beyond the last snapshot.
//! - Dropping the view model ends its subscription.

use crate::model::staff::{StaffMember, StaffRecordId};
use crate::repo::staff_repo::{RepoResult, StaffRepository};
use crate::search::filter::filter_staff;
use crate::service::feed::Subscription;
use crate::service::staff_service::StaffService;
use crate::view::card::StaffCard;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Message shown when a search matches nothing.
pub const NO_MATCHES_MESSAGE: &str = "No staff members found matching your search.";

/// Live in-memory mirror of the staff collection.
pub struct DirectoryViewModel {
    records: Arc<Mutex<Vec<StaffMember>>>,
    _subscription: Subscription,
}

impl DirectoryViewModel {
    /// Subscribes to `service` and seeds the mirror with the current set.
    pub fn attach<R: StaffRepository>(service: &StaffService<R>) -> RepoResult<Self> {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&records);
        let subscription = service.subscribe(move |snapshot: &[StaffMember]| {
            *lock(&sink) = snapshot.to_vec();
        })?;
        Ok(Self {
            records,
            _subscription: subscription,
        })
    }

    /// Copy of the current snapshot in store order.
    pub fn records(&self) -> Vec<StaffMember> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    pub fn find(&self, id: StaffRecordId) -> Option<StaffMember> {
        lock(&self.records)
            .iter()
            .find(|member| member.id == id)
            .cloned()
    }

    /// Records matching `query`; see [`filter_staff`].
    pub fn filtered(&self, query: &str) -> Vec<StaffMember> {
        let records = lock(&self.records);
        filter_staff(&records, query).into_iter().cloned().collect()
    }

    pub fn cards(&self, query: &str) -> Vec<StaffCard> {
        let records = lock(&self.records);
        filter_staff(&records, query)
            .into_iter()
            .map(StaffCard::from_member)
            .collect()
    }
}

fn lock(records: &Mutex<Vec<StaffMember>>) -> MutexGuard<'_, Vec<StaffMember>> {
    records.lock().unwrap_or_else(PoisonError::into_inner)
}
