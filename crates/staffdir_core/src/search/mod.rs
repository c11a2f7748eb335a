//! Directory search.
//!
//! # Responsibility
//! - Narrow the in-memory record set by a free-text query.
//! - Keep matching pure so list rendering can re-run it on every keystroke.

pub mod filter;
