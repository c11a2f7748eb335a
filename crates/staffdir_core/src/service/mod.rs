//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Push the full current record set to subscribers after every mutation.
//! - Map mutation outcomes to transient user notices.

pub mod feed;
pub mod notice;
pub mod staff_service;
