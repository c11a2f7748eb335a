//! Transient user notifications for mutation outcomes.

use std::fmt::{Display, Formatter};

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short-lived message shown after a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: &'static str,
}

impl Notice {
    pub const ADDED: Self = Self::success("Staff member added successfully");
    pub const UPDATED: Self = Self::success("Staff member updated successfully");
    pub const DELETED: Self = Self::success("Staff member deleted successfully");
    /// Generic failure text; details only go to the log.
    pub const FAILED: Self = Self {
        level: NoticeLevel::Error,
        message: "An error occurred",
    };

    const fn success(message: &'static str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message)
    }
}
