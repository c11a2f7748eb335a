use chrono::NaiveDate;
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::Document;
use staffdir_core::db::open_db_in_memory;
use staffdir_core::export::json::write_profile_json;
use staffdir_core::export::pdf::{fetch_photo, layout_profile, write_profile_pdf};
use staffdir_core::{
    AccessError, AccessGate, BlobStore, CompressionOptions, EditorForm, FsBlobStore,
    GuardedAction, JpegCompressor, PhotoUpload, SharedSecretCheck, SqliteStaffRepository,
    StaffService, TextField,
};
use std::io::Cursor;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn uploaded_photo_flows_into_pdf_export() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FsBlobStore::open(dir.path().join("blobs")).unwrap();
    let compressor = JpegCompressor::new(CompressionOptions::default());

    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());

    let mut form = EditorForm::new_member(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    form.update(|draft| {
        draft
            .with_text(TextField::StaffId, "S1")
            .with_text(TextField::FirstName, "Ada")
            .with_text(TextField::LastName, "Lovelace")
    });
    let upload = PhotoUpload {
        file_name: "ada portrait.png".to_string(),
        bytes: png_bytes(1600, 1200),
    };
    assert!(form.upload_image(&compressor, &blobs, &upload));
    let image_url = form.draft().profile().image_url.clone();
    assert!(image_url.starts_with("file://"));
    assert!(image_url.contains("staff-photos/"));

    let stored = blobs.get(&image_url).unwrap();
    let decoded = image::load_from_memory(&stored).unwrap();
    assert!(decoded.width() <= 800 && decoded.height() <= 800);

    let id = form.submit(&service).result.unwrap();
    let member = service.get_staff(id).unwrap().unwrap();

    let photo = fetch_photo(&blobs, &member.profile.image_url).expect("photo");
    assert!(layout_profile(&member.profile, true).pages[0].photo().is_some());

    let out = dir.path().join("exports");
    let gate = AccessGate::new(SharedSecretCheck::new(Some("letmein".to_string())));

    let denied = gate
        .request(GuardedAction::Export, || write_profile_pdf(&member, Some(&photo), &out))
        .confirm("nope");
    assert_eq!(denied.unwrap_err(), AccessError::Denied(GuardedAction::Export));
    assert!(!out.exists());

    let path = gate
        .request(GuardedAction::Export, || write_profile_pdf(&member, Some(&photo), &out))
        .confirm("letmein")
        .unwrap()
        .unwrap();
    assert!(path.ends_with("Ada_Lovelace_Profile.pdf"));

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn json_export_writes_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let service = StaffService::new(SqliteStaffRepository::try_new(&conn).unwrap());

    let mut form = EditorForm::new_member(NaiveDate::from_ymd_opt(2022, 1, 10).unwrap());
    form.update(|draft| {
        draft
            .with_text(TextField::StaffId, "S9")
            .with_text(TextField::FirstName, "Grace")
            .with_text(TextField::LastName, "Hopper")
    });
    let id = form.submit(&service).result.unwrap();
    let member = service.get_staff(id).unwrap().unwrap();

    let path = write_profile_json(&member, dir.path()).unwrap();
    assert!(path.ends_with("S9-Grace-Hopper-profile.json"));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["id"], id.to_string());
    assert_eq!(value["lastName"], "Hopper");
    assert_eq!(value["status"], "active");
}

#[test]
fn missing_photo_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FsBlobStore::open(dir.path()).unwrap();
    let url = format!("file://{}", dir.path().join("gone.jpg").display());
    assert!(fetch_photo(&blobs, &url).is_none());
    assert!(fetch_photo(&blobs, "").is_none());
}
