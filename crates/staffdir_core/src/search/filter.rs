//! Case-insensitive substring filter over the directory view.
//!
//! # Invariants
//! - The result is a subsequence of the input: order is preserved and no
//!   record is invented or duplicated.
//! - A blank query matches everything.
//! - Matching looks at the staff code, first name, last name and the
//!   "first last" concatenation only.

use crate::model::staff::StaffMember;

/// Returns the records matching `query`, in input order.
pub fn filter_staff<'a>(records: &'a [StaffMember], query: &str) -> Vec<&'a StaffMember> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|member| matches_query(member, &needle))
        .collect()
}

/// Returns whether one record matches an already-lowercased query.
pub fn matches_query(member: &StaffMember, lowered_query: &str) -> bool {
    let profile = &member.profile;
    [
        profile.staff_id.to_lowercase(),
        profile.first_name.to_lowercase(),
        profile.last_name.to_lowercase(),
        profile.display_name().to_lowercase(),
    ]
    .iter()
    .any(|candidate| candidate.contains(lowered_query))
}
