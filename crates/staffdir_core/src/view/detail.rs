//! Read-only detail projection of one staff record.

use crate::model::staff::StaffMember;
use crate::view::photo_or_placeholder;

/// One entry inside a detail section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntry {
    pub heading: String,
    pub lines: Vec<String>,
    /// Bulleted items (research publications).
    pub bullets: Vec<String>,
}

/// Titled section; only present when the record has entries for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub entries: Vec<DetailEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffDetailView {
    pub display_name: String,
    pub photo_url: String,
    /// Staff code, position, department, email, phone in that order.
    pub header_lines: Vec<String>,
    pub biography: Option<String>,
    pub sections: Vec<DetailSection>,
}

impl StaffDetailView {
    pub fn from_member(member: &StaffMember) -> Self {
        let p = &member.profile;
        let mut sections = Vec::new();

        if !p.education.is_empty() {
            sections.push(DetailSection {
                title: "Education",
                entries: p
                    .education
                    .iter()
                    .map(|edu| DetailEntry {
                        heading: edu.degree.clone(),
                        lines: vec![
                            edu.institution.clone(),
                            format!("{} \u{2022} {}", edu.field, edu.year),
                        ],
                        bullets: Vec::new(),
                    })
                    .collect(),
            });
        }

        if !p.experience.is_empty() {
            sections.push(DetailSection {
                title: "Experience",
                entries: p
                    .experience
                    .iter()
                    .map(|exp| DetailEntry {
                        heading: exp.title.clone(),
                        lines: vec![
                            exp.company.clone(),
                            format!("{} - {}", exp.start_date, exp.end_date),
                            exp.description.clone(),
                        ],
                        bullets: Vec::new(),
                    })
                    .collect(),
            });
        }

        if !p.research.is_empty() {
            sections.push(DetailSection {
                title: "Research",
                entries: p
                    .research
                    .iter()
                    .map(|research| DetailEntry {
                        heading: research.title.clone(),
                        lines: vec![
                            format!("Area: {}", research.area),
                            research.description.clone(),
                        ],
                        bullets: research.publications.clone(),
                    })
                    .collect(),
            });
        }

        Self {
            display_name: p.display_name(),
            photo_url: photo_or_placeholder(&p.image_url),
            header_lines: vec![
                p.staff_id.clone(),
                p.position.clone(),
                p.department.clone(),
                p.email.clone(),
                p.phone_number.clone(),
            ],
            biography: Some(p.bio.clone()).filter(|bio| !bio.trim().is_empty()),
            sections,
        }
    }

    pub fn section(&self, title: &str) -> Option<&DetailSection> {
        self.sections.iter().find(|section| section.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::StaffDetailView;
    use crate::model::staff::{Research, StaffMember, StaffProfile};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn profile() -> StaffProfile {
        StaffProfile::blank(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"))
    }

    #[test]
    fn empty_optional_parts_are_omitted() {
        let view = StaffDetailView::from_member(&StaffMember::new(Uuid::new_v4(), profile()));
        assert!(view.biography.is_none());
        assert!(view.sections.is_empty());
        assert_eq!(view.header_lines.len(), 5);
    }

    #[test]
    fn research_lists_publications() {
        let mut profile = profile();
        profile.bio = "Mathematician.".to_string();
        profile.research.push(Research {
            title: "Engines".to_string(),
            area: "Computing".to_string(),
            description: "Notes".to_string(),
            publications: vec!["Sketch of the Analytical Engine".to_string()],
        });
        let view = StaffDetailView::from_member(&StaffMember::new(Uuid::new_v4(), profile));

        assert_eq!(view.biography.as_deref(), Some("Mathematician."));
        let research = view.section("Research").expect("research section");
        assert_eq!(research.entries[0].lines[0], "Area: Computing");
        assert_eq!(research.entries[0].bullets.len(), 1);
        assert!(view.section("Education").is_none());
    }
}
