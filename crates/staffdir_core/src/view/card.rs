//! Directory card projection.

use crate::model::staff::{StaffMember, StaffRecordId, StaffStatus};
use crate::view::{photo_or_placeholder, short_date};

/// One card in the directory grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffCard {
    pub id: StaffRecordId,
    pub display_name: String,
    /// "ID: {staffId}".
    pub staff_id_line: String,
    /// "Active" / "Inactive".
    pub status_label: &'static str,
    pub is_active: bool,
    pub position: String,
    pub department: String,
    pub email: String,
    pub phone_number: String,
    /// "Started {M/D/YYYY}".
    pub started_line: String,
    pub photo_url: String,
}

impl StaffCard {
    pub fn from_member(member: &StaffMember) -> Self {
        let p = &member.profile;
        Self {
            id: member.id,
            display_name: p.display_name(),
            staff_id_line: format!("ID: {}", p.staff_id),
            status_label: p.status.label(),
            is_active: p.status == StaffStatus::Active,
            position: p.position.clone(),
            department: p.department.clone(),
            email: p.email.clone(),
            phone_number: p.phone_number.clone(),
            started_line: format!("Started {}", short_date(p.start_date)),
            photo_url: photo_or_placeholder(&p.image_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StaffCard;
    use crate::model::staff::{StaffMember, StaffProfile, StaffStatus};
    use crate::view::PLACEHOLDER_PHOTO_URL;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn card_projects_labels() {
        let mut profile =
            StaffProfile::blank(NaiveDate::from_ymd_opt(2023, 9, 4).expect("valid date"));
        profile.staff_id = "S1".to_string();
        profile.first_name = "Ada".to_string();
        profile.last_name = "Lovelace".to_string();
        profile.status = StaffStatus::Inactive;
        let card = StaffCard::from_member(&StaffMember::new(Uuid::new_v4(), profile));

        assert_eq!(card.display_name, "Ada Lovelace");
        assert_eq!(card.staff_id_line, "ID: S1");
        assert_eq!(card.status_label, "Inactive");
        assert!(!card.is_active);
        assert_eq!(card.started_line, "Started 9/4/2023");
        assert_eq!(card.photo_url, PLACEHOLDER_PHOTO_URL);
    }
}
