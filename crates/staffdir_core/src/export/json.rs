//! JSON profile export.

use crate::export::{write_artifact, ExportResult};
use crate::model::staff::StaffMember;
use log::info;
use std::path::{Path, PathBuf};

/// `{staffId}-{firstName}-{lastName}-profile.json`
pub fn json_file_name(member: &StaffMember) -> String {
    let p = &member.profile;
    format!("{}-{}-{}-profile.json", p.staff_id, p.first_name, p.last_name)
}

/// Full record, store id included, as pretty-printed JSON.
pub fn profile_json(member: &StaffMember) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(member)?)
}

/// Writes the JSON export into `dir` and returns the written path.
pub fn write_profile_json(member: &StaffMember, dir: &Path) -> ExportResult<PathBuf> {
    let body = profile_json(member)?;
    let path = write_artifact(dir, &json_file_name(member), body.as_bytes())?;
    info!(
        "event=export_json module=export status=ok id={} bytes={}",
        member.id,
        body.len()
    );
    Ok(path)
}
