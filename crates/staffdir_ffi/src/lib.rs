//! Flutter bindings for the staff directory core.

pub mod api;
