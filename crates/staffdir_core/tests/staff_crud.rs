use chrono::NaiveDate;
use staffdir_core::db::open_db_in_memory;
use staffdir_core::editor::draft::{EducationField, Section};
use staffdir_core::{
    DeleteOutcome, DirectoryViewModel, EditorForm, Education, Experience, Notice, RepoError,
    Research, SqliteStaffRepository, StaffMember, StaffPatch, StaffProfile, StaffRepository,
    StaffService, StaffStatus, TextField,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn ada() -> StaffProfile {
    let mut profile = StaffProfile::blank(start_date());
    profile.staff_id = "S1".to_string();
    profile.first_name = "Ada".to_string();
    profile.last_name = "Lovelace".to_string();
    profile.email = "a@x.com".to_string();
    profile.position = "Engineer".to_string();
    profile.department = "R&D".to_string();
    profile.phone_number = "555".to_string();
    profile.status = StaffStatus::Active;
    profile
}

fn grace() -> StaffProfile {
    let mut profile = StaffProfile::blank(start_date());
    profile.staff_id = "S2".to_string();
    profile.first_name = "Grace".to_string();
    profile.last_name = "Hopper".to_string();
    profile
}

#[test]
fn create_and_get_roundtrip_preserves_nested_lists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let mut profile = ada();
    profile.bio = "First programmer.".to_string();
    profile.education.push(Education {
        degree: "Private tuition".to_string(),
        institution: "Home".to_string(),
        field: "Mathematics".to_string(),
        year: "1833".to_string(),
    });
    profile.experience.push(Experience {
        title: "Translator".to_string(),
        company: "Taylor's Scientific Memoirs".to_string(),
        start_date: "1842-10".to_string(),
        end_date: String::new(),
        description: "Notes on the engine".to_string(),
    });
    profile.research.push(Research {
        title: "Analytical Engine".to_string(),
        area: "Computing".to_string(),
        description: "Bernoulli numbers".to_string(),
        publications: vec!["Note G".to_string(), "Sketch".to_string()],
    });

    let id = repo.create_staff(&profile).unwrap();
    let loaded = repo.get_staff(id).unwrap().unwrap();

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.profile, profile);
    assert!(loaded.profile.experience[0].is_current());
}

#[test]
fn patch_updates_only_named_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();
    let id = repo.create_staff(&ada()).unwrap();

    let patch = StaffPatch {
        position: Some("Lead Engineer".to_string()),
        status: Some(StaffStatus::Inactive),
        ..StaffPatch::default()
    };
    repo.patch_staff(id, &patch).unwrap();

    let loaded = repo.get_staff(id).unwrap().unwrap();
    let mut expected = ada();
    expected.position = "Lead Engineer".to_string();
    expected.status = StaffStatus::Inactive;
    assert_eq!(loaded.profile, expected);
}

#[test]
fn patch_leaves_other_fields_identical_in_view_model() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let directory = DirectoryViewModel::attach(&service).unwrap();

    let mut original = ada();
    original.bio = "First programmer.".to_string();
    original.education.push(Education {
        degree: "Private tuition".to_string(),
        institution: "Home".to_string(),
        field: "Mathematics".to_string(),
        year: "1833".to_string(),
    });
    let id = service.create_staff(&original).unwrap();
    let before = directory.find(id).unwrap();

    let patch = StaffPatch {
        department: Some("Analytics".to_string()),
        ..StaffPatch::default()
    };
    service.patch_staff(id, &patch).unwrap();

    let after = directory.find(id).unwrap();
    assert_eq!(after.profile.department, "Analytics");
    let mut expected = before.profile.clone();
    expected.department = "Analytics".to_string();
    assert_eq!(after.profile, expected);
    assert_eq!(
        serde_json::to_string(&after.profile).unwrap(),
        serde_json::to_string(&expected).unwrap()
    );
}

#[test]
fn patch_and_delete_missing_record_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let patch = StaffPatch {
        bio: Some("ghost".to_string()),
        ..StaffPatch::default()
    };
    assert!(matches!(
        repo.patch_staff(missing, &patch),
        Err(RepoError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        repo.delete_staff(missing),
        Err(RepoError::NotFound(_))
    ));
    assert!(repo.get_staff(missing).unwrap().is_none());
}

#[test]
fn list_keeps_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStaffRepository::try_new(&conn).unwrap();

    let first = repo.create_staff(&grace()).unwrap();
    let second = repo.create_staff(&ada()).unwrap();

    let ids: Vec<_> = repo.list_staff().unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[test]
fn subscribers_receive_full_snapshots_until_dropped() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let subscription = service
        .subscribe(move |snapshot: &[StaffMember]| sink.lock().unwrap().push(snapshot.len()))
        .unwrap();

    let id = service.create_staff(&ada()).unwrap();
    service.create_staff(&grace()).unwrap();
    service
        .patch_staff(
            id,
            &StaffPatch {
                email: Some("ada@x.com".to_string()),
                ..StaffPatch::default()
            },
        )
        .unwrap();
    service.delete_staff(id).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 2, 1]);

    subscription.unsubscribe();
    service.create_staff(&ada()).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 5);
}

#[test]
fn failed_mutation_publishes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let calls = Arc::new(Mutex::new(0_usize));

    let sink = Arc::clone(&calls);
    let _subscription = service
        .subscribe(move |_: &[StaffMember]| *sink.lock().unwrap() += 1)
        .unwrap();
    assert!(service.delete_staff(Uuid::new_v4()).is_err());
    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn created_record_appears_in_view_model() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let directory = DirectoryViewModel::attach(&service).unwrap();
    assert!(directory.is_empty());

    let id = service.create_staff(&ada()).unwrap();

    let records = directory.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert!(!records[0].id.is_nil());
    assert_eq!(records[0].profile, ada());
}

#[test]
fn search_matches_only_ada() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let directory = DirectoryViewModel::attach(&service).unwrap();

    let ada_id = service.create_staff(&ada()).unwrap();
    service.create_staff(&grace()).unwrap();

    let matches = directory.filtered("ada");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, ada_id);

    assert_eq!(directory.filtered("").len(), 2);
    assert_eq!(directory.cards("ADA LOVE")[0].display_name, "Ada Lovelace");
    assert!(directory.cards("nobody").is_empty());
}

#[test]
fn delete_confirmed_and_declined() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let directory = DirectoryViewModel::attach(&service).unwrap();

    let kept = service.create_staff(&grace()).unwrap();
    let removed = service.create_staff(&ada()).unwrap();

    let mut prompted_for = None;
    let outcome = service
        .delete_with_confirmation(kept, |member| {
            prompted_for = Some(member.display_name());
            false
        })
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(prompted_for.as_deref(), Some("Grace Hopper"));
    assert_eq!(directory.find(kept).unwrap().profile, grace());

    let outcome = service.delete_with_confirmation(removed, |_| true).unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(directory.find(removed).is_none());
    assert_eq!(directory.len(), 1);
}

#[test]
fn editor_form_creates_then_patches() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let directory = DirectoryViewModel::attach(&service).unwrap();

    let mut form = EditorForm::new_member(start_date());
    assert_eq!(form.title(), "Add New Staff Member");
    form.update(|draft| {
        draft
            .with_text(TextField::StaffId, "S1")
            .with_text(TextField::FirstName, "Ada")
            .with_text(TextField::LastName, "Lovelace")
            .with_entry_appended(Section::Education)
    });
    form.try_update(|draft| {
        draft.with_education_field(0, EducationField::Degree, "BSc")
    })
    .unwrap();

    let report = form.submit(&service);
    assert_eq!(report.notice, Notice::ADDED);
    let id = report.result.unwrap();

    let member = directory.find(id).unwrap();
    assert_eq!(member.profile.education[0].degree, "BSc");

    let mut form = EditorForm::edit(&member);
    assert_eq!(form.title(), "Edit Staff Member");
    form.try_update(|draft| draft.with_entry_removed(Section::Education, 0))
        .unwrap();
    let report = form.submit(&service);
    assert_eq!(report.notice, Notice::UPDATED);
    assert_eq!(report.result.unwrap(), id);

    assert!(directory.find(id).unwrap().profile.education.is_empty());
    assert_eq!(directory.len(), 1);
}

#[test]
fn editing_deleted_record_reports_error_notice() {
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());
    let id = service.create_staff(&ada()).unwrap();
    let member = service.get_staff(id).unwrap().unwrap();
    service.delete_staff(id).unwrap();

    let report = EditorForm::edit(&member).submit(&service);
    assert!(report.result.is_err());
    assert_eq!(report.notice, Notice::FAILED);
}
