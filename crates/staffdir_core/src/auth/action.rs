//! Card actions that require passing the access gate.

use std::fmt::{Display, Formatter};

/// Action behind the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuardedAction {
    Edit,
    Export,
    Delete,
}

impl GuardedAction {
    pub const ALL: [Self; 3] = [Self::Edit, Self::Export, Self::Delete];

    /// Name used in gate log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Export => "export",
            Self::Delete => "delete",
        }
    }
}

impl Display for GuardedAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
