//! Staff editor: draft transformations and the form workflow around them.
//!
//! # Responsibility
//! - Build drafts (blank or pre-filled) and transform them without mutating
//!   earlier versions.
//! - Run the photo upload step and the create-or-patch submit.

pub mod draft;
pub mod form;
