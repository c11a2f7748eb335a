//! Staff record model.
//!
//! # Responsibility
//! - Define `StaffMember` and its nested education/experience/research lists.
//! - Keep the serialized document shape aligned with the `staff` collection
//!   (camelCase keys, arrays of objects for nested lists).
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - All other fields are freely mutable; nothing here enforces uniqueness of
//!   `staff_id` or non-empty values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned identifier of one staff record.
pub type StaffRecordId = Uuid;

/// Employment status shown on cards and exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
}

impl StaffStatus {
    /// Stable storage/document value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parses a stored status value. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Capitalized label for badges ("Active" / "Inactive").
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl Display for StaffStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One education entry. All values are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub field: String,
    pub year: String,
}

/// One experience entry.
///
/// Dates are free text as entered; an empty `end_date` means "present".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

impl Experience {
    /// Returns whether this position is still held.
    pub fn is_current(&self) -> bool {
        self.end_date.trim().is_empty()
    }
}

/// One research entry with its ordered citation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Research {
    pub title: String,
    pub area: String,
    pub description: String,
    pub publications: Vec<String>,
}

/// Every field of a staff record except its store identity.
///
/// This is the document body written on create and the shape edited by the
/// editor draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    /// Human staff code. Unique by convention only.
    pub staff_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub phone_number: String,
    /// Durable photo URL; empty when no photo was uploaded.
    #[serde(default)]
    pub image_url: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: StaffStatus,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub research: Vec<Research>,
}

impl StaffProfile {
    /// Creates an empty profile starting on `start_date`, status `active`.
    pub fn blank(start_date: NaiveDate) -> Self {
        Self {
            staff_id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position: String::new(),
            department: String::new(),
            phone_number: String::new(),
            image_url: String::new(),
            start_date,
            status: StaffStatus::Active,
            bio: String::new(),
            education: Vec::new(),
            experience: Vec::new(),
            research: Vec::new(),
        }
    }

    /// "First Last" as shown on cards and exports.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Applies a merge-patch in memory. `None` fields are left untouched.
    pub fn apply_patch(&mut self, patch: &StaffPatch) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &patch.$field {
                    self.$field = value.clone();
                })*
            };
        }
        merge!(
            staff_id,
            first_name,
            last_name,
            email,
            position,
            department,
            phone_number,
            image_url,
            start_date,
            status,
            bio,
            education,
            experience,
            research,
        );
    }
}

/// Canonical staff record as delivered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Store-assigned identity.
    pub id: StaffRecordId,
    #[serde(flatten)]
    pub profile: StaffProfile,
}

impl StaffMember {
    pub fn new(id: StaffRecordId, profile: StaffProfile) -> Self {
        Self { id, profile }
    }

    pub fn display_name(&self) -> String {
        self.profile.display_name()
    }
}

/// Partial-field update applied to an existing record.
///
/// `None` means "leave the stored value untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffPatch {
    pub staff_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub status: Option<StaffStatus>,
    pub bio: Option<String>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<Experience>>,
    pub research: Option<Vec<Research>>,
}

impl StaffPatch {
    /// Builds a patch that overwrites every field with `profile`'s values.
    pub fn from_profile(profile: &StaffProfile) -> Self {
        Self {
            staff_id: Some(profile.staff_id.clone()),
            first_name: Some(profile.first_name.clone()),
            last_name: Some(profile.last_name.clone()),
            email: Some(profile.email.clone()),
            position: Some(profile.position.clone()),
            department: Some(profile.department.clone()),
            phone_number: Some(profile.phone_number.clone()),
            image_url: Some(profile.image_url.clone()),
            start_date: Some(profile.start_date),
            status: Some(profile.status),
            bio: Some(profile.bio.clone()),
            education: Some(profile.education.clone()),
            experience: Some(profile.experience.clone()),
            research: Some(profile.research.clone()),
        }
    }

    /// Returns whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
