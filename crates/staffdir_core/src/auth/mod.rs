//! Access gate for edit, export and delete actions.
//!
//! The gate depends on an injected [`gate::AccessCheck`]; the bundled
//! shared-secret check is a placeholder, not real authorization.

pub mod action;
pub mod gate;
