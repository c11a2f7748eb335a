//! Media processing for profile photos.

pub mod compress;
