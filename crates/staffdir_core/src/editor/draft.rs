//! Immutable staff draft.
//!
//! # Invariants
//! - Every transformation returns a new draft; `self` is never modified, so
//!   callers can keep the previous version for controlled re-render.
//! - Nested lists keep insertion order; removal shifts later entries down.
//! - A failed transformation (bad index) produces no draft at all.

use crate::model::staff::{
    Education, Experience, Research, StaffMember, StaffProfile, StaffStatus,
};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DraftResult<T> = Result<T, DraftError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { list, index, len } => {
                write!(f, "{list} entry {index} is out of range (len {len})")
            }
        }
    }
}

impl Error for DraftError {}

/// Free-text scalar fields editable on the main form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    StaffId,
    FirstName,
    LastName,
    Email,
    Position,
    Department,
    PhoneNumber,
    ImageUrl,
    Bio,
}

/// Repeatable sub-sections of a staff record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Education,
    Experience,
    Research,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Experience => "experience",
            Self::Research => "research",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Degree,
    Institution,
    Field,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Title,
    Company,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchField {
    Title,
    Area,
    Description,
}

/// In-progress, not yet submitted version of a staff record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffDraft {
    profile: StaffProfile,
}

impl StaffDraft {
    /// Blank draft: empty text, status `active`, start date `today`, no
    /// nested entries.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            profile: StaffProfile::blank(today),
        }
    }

    /// Draft pre-filled with a copy of an existing record's fields.
    pub fn from_member(member: &StaffMember) -> Self {
        Self {
            profile: member.profile.clone(),
        }
    }

    /// Draft holding `profile` as-is, e.g. one kept across a binding call.
    pub fn from_profile(profile: StaffProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &StaffProfile {
        &self.profile
    }

    pub fn into_profile(self) -> StaffProfile {
        self.profile
    }

    pub fn entry_count(&self, section: Section) -> usize {
        match section {
            Section::Education => self.profile.education.len(),
            Section::Experience => self.profile.experience.len(),
            Section::Research => self.profile.research.len(),
        }
    }

    pub fn with_text(&self, field: TextField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        let p = &mut next.profile;
        match field {
            TextField::StaffId => p.staff_id = value,
            TextField::FirstName => p.first_name = value,
            TextField::LastName => p.last_name = value,
            TextField::Email => p.email = value,
            TextField::Position => p.position = value,
            TextField::Department => p.department = value,
            TextField::PhoneNumber => p.phone_number = value,
            TextField::ImageUrl => p.image_url = value,
            TextField::Bio => p.bio = value,
        }
        next
    }

    pub fn with_start_date(&self, start_date: NaiveDate) -> Self {
        let mut next = self.clone();
        next.profile.start_date = start_date;
        next
    }

    pub fn with_status(&self, status: StaffStatus) -> Self {
        let mut next = self.clone();
        next.profile.status = status;
        next
    }

    /// Appends one blank entry to `section`.
    pub fn with_entry_appended(&self, section: Section) -> Self {
        let mut next = self.clone();
        let p = &mut next.profile;
        match section {
            Section::Education => p.education.push(Education::default()),
            Section::Experience => p.experience.push(Experience::default()),
            Section::Research => p.research.push(Research::default()),
        }
        next
    }

    /// Removes the entry at `index` from `section`.
    pub fn with_entry_removed(&self, section: Section, index: usize) -> DraftResult<Self> {
        let mut next = self.clone();
        let p = &mut next.profile;
        match section {
            Section::Education => remove_at(&mut p.education, section.as_str(), index)?,
            Section::Experience => remove_at(&mut p.experience, section.as_str(), index)?,
            Section::Research => remove_at(&mut p.research, section.as_str(), index)?,
        }
        Ok(next)
    }

    pub fn with_education_field(
        &self,
        index: usize,
        field: EducationField,
        value: impl Into<String>,
    ) -> DraftResult<Self> {
        let mut next = self.clone();
        let value = value.into();
        let entry = entry_mut(&mut next.profile.education, "education", index)?;
        match field {
            EducationField::Degree => entry.degree = value,
            EducationField::Institution => entry.institution = value,
            EducationField::Field => entry.field = value,
            EducationField::Year => entry.year = value,
        }
        Ok(next)
    }

    pub fn with_experience_field(
        &self,
        index: usize,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> DraftResult<Self> {
        let mut next = self.clone();
        let value = value.into();
        let entry = entry_mut(&mut next.profile.experience, "experience", index)?;
        match field {
            ExperienceField::Title => entry.title = value,
            ExperienceField::Company => entry.company = value,
            ExperienceField::StartDate => entry.start_date = value,
            ExperienceField::EndDate => entry.end_date = value,
            ExperienceField::Description => entry.description = value,
        }
        Ok(next)
    }

    pub fn with_research_field(
        &self,
        index: usize,
        field: ResearchField,
        value: impl Into<String>,
    ) -> DraftResult<Self> {
        let mut next = self.clone();
        let value = value.into();
        let entry = entry_mut(&mut next.profile.research, "research", index)?;
        match field {
            ResearchField::Title => entry.title = value,
            ResearchField::Area => entry.area = value,
            ResearchField::Description => entry.description = value,
        }
        Ok(next)
    }

    /// Appends an empty citation to research entry `research_index`.
    pub fn with_publication_appended(&self, research_index: usize) -> DraftResult<Self> {
        let mut next = self.clone();
        entry_mut(&mut next.profile.research, "research", research_index)?
            .publications
            .push(String::new());
        Ok(next)
    }

    pub fn with_publication_removed(
        &self,
        research_index: usize,
        publication_index: usize,
    ) -> DraftResult<Self> {
        let mut next = self.clone();
        let entry = entry_mut(&mut next.profile.research, "research", research_index)?;
        remove_at(&mut entry.publications, "publication", publication_index)?;
        Ok(next)
    }

    pub fn with_publication(
        &self,
        research_index: usize,
        publication_index: usize,
        value: impl Into<String>,
    ) -> DraftResult<Self> {
        let mut next = self.clone();
        let entry = entry_mut(&mut next.profile.research, "research", research_index)?;
        *entry_mut(&mut entry.publications, "publication", publication_index)? = value.into();
        Ok(next)
    }
}

fn entry_mut<'a, T>(list: &'a mut [T], name: &'static str, index: usize) -> DraftResult<&'a mut T> {
    let len = list.len();
    list.get_mut(index).ok_or(DraftError::IndexOutOfRange {
        list: name,
        index,
        len,
    })
}

fn remove_at<T>(list: &mut Vec<T>, name: &'static str, index: usize) -> DraftResult<()> {
    if index >= list.len() {
        return Err(DraftError::IndexOutOfRange {
            list: name,
            index,
            len: list.len(),
        });
    }
    list.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        DraftError, EducationField, ExperienceField, ResearchField, Section, StaffDraft, TextField,
    };
    use crate::model::staff::{Experience, StaffMember, StaffStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
    }

    fn draft_with_degrees(degrees: &[&str]) -> StaffDraft {
        let mut draft = StaffDraft::blank(today());
        for (index, degree) in degrees.iter().enumerate() {
            draft = draft
                .with_entry_appended(Section::Education)
                .with_education_field(index, EducationField::Degree, *degree)
                .expect("index just appended");
        }
        draft
    }

    #[test]
    fn blank_draft_has_defaults() {
        let draft = StaffDraft::blank(today());
        let p = draft.profile();
        assert!(p.first_name.is_empty());
        assert!(p.image_url.is_empty());
        assert_eq!(p.status, StaffStatus::Active);
        assert_eq!(p.start_date, today());
        for section in [Section::Education, Section::Experience, Section::Research] {
            assert_eq!(draft.entry_count(section), 0);
        }
    }

    #[test]
    fn from_member_copies_fields() {
        let edited = StaffDraft::blank(today())
            .with_text(TextField::FirstName, "Ada")
            .with_status(StaffStatus::Inactive);
        let member = StaffMember::new(Uuid::new_v4(), edited.clone().into_profile());
        assert_eq!(StaffDraft::from_member(&member), edited);
    }

    #[test]
    fn transformations_leave_previous_draft_untouched() {
        let before = StaffDraft::blank(today());
        let after = before
            .with_text(TextField::Email, "a@x.com")
            .with_entry_appended(Section::Research);
        assert!(before.profile().email.is_empty());
        assert_eq!(before.entry_count(Section::Research), 0);
        assert_eq!(after.profile().email, "a@x.com");
        assert_eq!(after.entry_count(Section::Research), 1);
    }

    #[test]
    fn append_adds_exactly_one_blank_entry() {
        for section in [Section::Education, Section::Experience, Section::Research] {
            let draft = StaffDraft::blank(today()).with_entry_appended(section);
            let grown = draft.with_entry_appended(section);
            assert_eq!(grown.entry_count(section), draft.entry_count(section) + 1);
        }
        let draft = StaffDraft::blank(today()).with_entry_appended(Section::Experience);
        assert_eq!(draft.profile().experience[0], Experience::default());
    }

    #[test]
    fn remove_shifts_later_entries_and_keeps_order() {
        let draft = draft_with_degrees(&["BSc", "MSc", "PhD", "Postdoc"]);
        let removed = draft
            .with_entry_removed(Section::Education, 1)
            .expect("valid index");
        let degrees: Vec<_> = removed
            .profile()
            .education
            .iter()
            .map(|e| e.degree.as_str())
            .collect();
        assert_eq!(degrees, vec!["BSc", "PhD", "Postdoc"]);
        assert_eq!(draft.entry_count(Section::Education), 4);
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let draft = draft_with_degrees(&["BSc"]);
        let err = draft
            .with_entry_removed(Section::Education, 1)
            .expect_err("index 1 is out of range");
        assert_eq!(
            err,
            DraftError::IndexOutOfRange {
                list: "education",
                index: 1,
                len: 1
            }
        );
    }

    #[test]
    fn patch_touches_one_field_of_one_entry() {
        let draft = StaffDraft::blank(today())
            .with_entry_appended(Section::Experience)
            .with_entry_appended(Section::Experience);
        let patched = draft
            .with_experience_field(1, ExperienceField::Company, "Analytical Engines")
            .expect("valid index");
        assert_eq!(patched.profile().experience[1].company, "Analytical Engines");
        assert!(patched.profile().experience[1].title.is_empty());
        assert_eq!(patched.profile().experience[0], draft.profile().experience[0]);
    }

    #[test]
    fn research_publications_are_editable() {
        let draft = StaffDraft::blank(today())
            .with_entry_appended(Section::Research)
            .with_research_field(0, ResearchField::Title, "Notes on the Engine")
            .and_then(|d| d.with_publication_appended(0))
            .and_then(|d| d.with_publication_appended(0))
            .and_then(|d| d.with_publication(0, 0, "Sketch, 1843"))
            .and_then(|d| d.with_publication(0, 1, "Notes, 1843"))
            .and_then(|d| d.with_publication_removed(0, 0))
            .expect("valid indices");
        let research = &draft.profile().research[0];
        assert_eq!(research.title, "Notes on the Engine");
        assert_eq!(research.publications, vec!["Notes, 1843".to_string()]);
    }

    #[test]
    fn publication_edit_on_missing_research_fails() {
        let err = StaffDraft::blank(today())
            .with_publication_appended(0)
            .expect_err("no research entries");
        assert!(matches!(err, DraftError::IndexOutOfRange { list: "research", .. }));
    }
}
