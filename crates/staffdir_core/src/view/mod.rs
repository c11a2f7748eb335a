//! Read-side projections of staff records.
//!
//! # Responsibility
//! - Keep an in-memory mirror of the store via the snapshot feed.
//! - Project records into card and detail shapes for rendering.
//!
//! # Invariants
//! - Projections are pure; they never mutate records or the store.

pub mod card;
pub mod detail;
pub mod directory;

/// Photo shown when a record has no `image_url`.
pub const PLACEHOLDER_PHOTO_URL: &str =
    "https://images.unsplash.com/photo-1633332755192-727a05c4013d?w=400&h=400&fit=crop";

/// Short calendar date as used on cards and exports (`M/D/YYYY`).
pub(crate) fn short_date(date: chrono::NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

pub(crate) fn photo_or_placeholder(image_url: &str) -> String {
    if image_url.trim().is_empty() {
        PLACEHOLDER_PHOTO_URL.to_string()
    } else {
        image_url.to_string()
    }
}
