//! Store contracts and their local implementations.
//!
//! # Responsibility
//! - Define the staff record store contract (create, merge-patch, delete,
//!   point read, full listing).
//! - Define the blob store contract used for profile photos.
//! - Keep SQLite and filesystem details out of service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to transport errors.

pub mod blob_store;
pub mod staff_repo;
