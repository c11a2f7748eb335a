//! Staff directory domain model.
//!
//! # Responsibility
//! - Define the canonical staff record shared by list, detail, editor and
//!   export projections.
//! - Define the partial-field patch shape used by in-place updates.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `StaffRecordId`.
//! - Absent nested lists are equivalent to empty lists.

pub mod staff;
