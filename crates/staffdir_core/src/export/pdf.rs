//! PDF profile export.
//!
//! Layout is computed in millimetres on an A4 portrait page with the origin at
//! the top-left corner and `y` growing downwards (text `y` is the baseline).
//! `render_pdf` flips coordinates into PDF user space.
//!
//! # Invariants
//! - Whenever the cursor reaches `PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM` it moves
//!   to `TOP_Y_MM` of a new page. The page is only opened when something is
//!   drawn on it, so layouts never end with a blank page.
//! - The photo, when present, is placed on page 1 only.

use crate::export::{write_artifact, ExportError, ExportResult};
use crate::model::staff::{StaffMember, StaffProfile};
use crate::repo::blob_store::BlobStore;
use crate::view::short_date;
use chrono::NaiveDate;
use image::codecs::jpeg::JpegEncoder;
use log::{info, warn};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const LEFT_MARGIN_MM: f32 = 20.0;
pub const MAX_TEXT_WIDTH_MM: f32 = 180.0;
pub const TOP_Y_MM: f32 = 20.0;
pub const BOTTOM_MARGIN_MM: f32 = 20.0;
/// Horizontal offset of values in label/value rows.
pub const VALUE_OFFSET_MM: f32 = 30.0;

pub const PHOTO_X_MM: f32 = 150.0;
pub const PHOTO_Y_MM: f32 = 10.0;
pub const PHOTO_SIZE_MM: f32 = 50.0;

const NAME_SIZE_PT: f32 = 16.0;
const HEADING_SIZE_PT: f32 = 14.0;
const BODY_SIZE_PT: f32 = 12.0;

const ROW_STEP_MM: f32 = 10.0;
const BIO_STEP_MM: f32 = 6.0;
const SECTION_GAP_MM: f32 = 10.0;
const BLOCK_STEP_MM: f32 = 40.0;

const PT_TO_MM: f32 = 25.4 / 72.0;
const MM_TO_PT: f32 = 72.0 / 25.4;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const PHOTO_NAME: &str = "Im1";
const PHOTO_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// One line of text placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub weight: FontWeight,
    pub text: String,
}

/// Photo frame; `y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoItem {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PdfItem {
    Text(TextItem),
    Photo(PhotoItem),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfPage {
    pub items: Vec<PdfItem>,
}

impl PdfPage {
    pub fn texts(&self) -> impl Iterator<Item = &TextItem> {
        self.items.iter().filter_map(|item| match item {
            PdfItem::Text(text) => Some(text),
            PdfItem::Photo(_) => None,
        })
    }

    pub fn photo(&self) -> Option<&PhotoItem> {
        self.items.iter().find_map(|item| match item {
            PdfItem::Photo(photo) => Some(photo),
            PdfItem::Text(_) => None,
        })
    }

    /// First text item whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&TextItem> {
        self.texts().find(|item| item.text == text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLayout {
    pub pages: Vec<PdfPage>,
}

impl ProfileLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// `{firstName}_{lastName}_Profile.pdf`
pub fn pdf_file_name(member: &StaffMember) -> String {
    let p = &member.profile;
    format!("{}_{}_Profile.pdf", p.first_name, p.last_name)
}

struct LayoutCursor {
    pages: Vec<PdfPage>,
    y: f32,
    page_break_pending: bool,
}

impl LayoutCursor {
    fn new() -> Self {
        Self {
            pages: vec![PdfPage::default()],
            y: TOP_Y_MM,
            page_break_pending: false,
        }
    }

    fn push(&mut self, item: PdfItem) {
        if self.page_break_pending {
            self.pages.push(PdfPage::default());
            self.page_break_pending = false;
        }
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn text_at(&mut self, x: f32, dy: f32, size: f32, weight: FontWeight, text: String) {
        let y = self.y + dy;
        self.push(PdfItem::Text(TextItem {
            x,
            y,
            size,
            weight,
            text,
        }));
    }

    fn text(&mut self, size: f32, weight: FontWeight, text: impl Into<String>) {
        self.text_at(LEFT_MARGIN_MM, 0.0, size, weight, text.into());
    }

    fn advance(&mut self, dy: f32) {
        self.y += dy;
        if self.y >= PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.page_break_pending = true;
            self.y = TOP_Y_MM;
        }
    }

    fn heading(&mut self, title: &str) {
        self.text(HEADING_SIZE_PT, FontWeight::Bold, title);
        self.advance(ROW_STEP_MM);
    }

    fn label_row(&mut self, label: &str, value: &str) {
        self.text(BODY_SIZE_PT, FontWeight::Bold, label);
        self.text_at(
            LEFT_MARGIN_MM + VALUE_OFFSET_MM,
            0.0,
            BODY_SIZE_PT,
            FontWeight::Regular,
            value.to_string(),
        );
        self.advance(ROW_STEP_MM);
    }

    /// Four lines drawn relative to the block top, then one block step.
    fn block(&mut self, lines: [String; 4]) {
        for (offset, line) in lines.into_iter().enumerate() {
            self.text_at(
                LEFT_MARGIN_MM,
                offset as f32 * ROW_STEP_MM,
                BODY_SIZE_PT,
                FontWeight::Regular,
                line,
            );
        }
        self.advance(BLOCK_STEP_MM);
    }
}

/// Computes the page layout for one profile.
///
/// `with_photo` reserves the photo frame on page 1; pass `true` only when
/// image bytes will be handed to [`render_pdf`].
pub fn layout_profile(profile: &StaffProfile, with_photo: bool) -> ProfileLayout {
    let mut cursor = LayoutCursor::new();

    if with_photo {
        cursor.push(PdfItem::Photo(PhotoItem {
            x: PHOTO_X_MM,
            y: PHOTO_Y_MM,
            width: PHOTO_SIZE_MM,
            height: PHOTO_SIZE_MM,
        }));
    }

    cursor.text(NAME_SIZE_PT, FontWeight::Bold, profile.display_name());
    cursor.advance(ROW_STEP_MM);

    cursor.label_row("ID:", &profile.staff_id);
    cursor.label_row("Position:", &profile.position);
    cursor.label_row("Department:", &profile.department);
    cursor.label_row("Email:", &profile.email);
    cursor.label_row("Phone:", &profile.phone_number);
    cursor.label_row("Status:", profile.status.as_str());

    cursor.text(BODY_SIZE_PT, FontWeight::Bold, "Bio:");
    cursor.advance(BIO_STEP_MM);

    let bio_lines = wrap_text(profile.bio.trim(), BODY_SIZE_PT, MAX_TEXT_WIDTH_MM);
    let mut bio_lines = bio_lines.into_iter();
    let first = bio_lines.next().unwrap_or_default();
    let centered_x = PAGE_WIDTH_MM / 2.0 - text_width_mm(&first, BODY_SIZE_PT) / 2.0;
    cursor.text_at(centered_x, 0.0, BODY_SIZE_PT, FontWeight::Regular, first);
    cursor.advance(BIO_STEP_MM);
    for line in bio_lines {
        cursor.text(BODY_SIZE_PT, FontWeight::Regular, line);
        cursor.advance(BIO_STEP_MM);
    }

    cursor.y += SECTION_GAP_MM;

    if !profile.education.is_empty() {
        cursor.heading("Education");
        for edu in &profile.education {
            cursor.block([
                format!("Degree: {}", edu.degree),
                format!("Field: {}", edu.field),
                format!("Institution: {}", edu.institution),
                format!("Year: {}", edu.year),
            ]);
        }
    }

    if !profile.experience.is_empty() {
        cursor.heading("Experience");
        for exp in &profile.experience {
            let end = if exp.is_current() {
                "Present".to_string()
            } else {
                display_date(&exp.end_date)
            };
            cursor.block([
                format!("Company: {}", exp.company),
                format!("Title: {}", exp.title),
                format!("Start Date: {}", display_date(&exp.start_date)),
                format!("End Date: {end}"),
            ]);
        }
    }

    if !profile.research.is_empty() {
        cursor.heading("Research");
        for (index, research) in profile.research.iter().enumerate() {
            cursor.text(
                BODY_SIZE_PT,
                FontWeight::Regular,
                format!("{}. {}", index + 1, research.title),
            );
            cursor.advance(ROW_STEP_MM);
            if !research.area.trim().is_empty() {
                cursor.text(
                    BODY_SIZE_PT,
                    FontWeight::Regular,
                    format!("Area: {}", research.area),
                );
                cursor.advance(ROW_STEP_MM);
            }
            let description = research.description.trim();
            if !description.is_empty() {
                for line in wrap_text(description, BODY_SIZE_PT, MAX_TEXT_WIDTH_MM) {
                    cursor.text(BODY_SIZE_PT, FontWeight::Regular, line);
                    cursor.advance(BIO_STEP_MM);
                }
                cursor.advance(ROW_STEP_MM - BIO_STEP_MM);
            }
            for publication in &research.publications {
                cursor.text(
                    BODY_SIZE_PT,
                    FontWeight::Regular,
                    format!("- {publication}"),
                );
                cursor.advance(ROW_STEP_MM);
            }
        }
    }

    ProfileLayout {
        pages: cursor.pages,
    }
}

/// Dates entered as `YYYY-MM-DD` or `YYYY-MM` print as `M/D/YYYY`; anything
/// else prints as typed.
fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .map(short_date)
        .unwrap_or_else(|_| raw.to_string())
}

/// Helvetica advance widths in 1/1000 em, grouped.
fn glyph_width(ch: char) -> u32 {
    match ch {
        'i' | 'j' | 'l' => 222,
        '\'' => 191,
        '|' => 260,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | ']' | '\\' | 'f' | 't' => 278,
        '(' | ')' | '-' | 'r' => 333,
        '"' => 355,
        '*' => 389,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'L' => 556,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        _ => 556,
    }
}

/// Approximate rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    let units: u32 = text.chars().map(glyph_width).sum();
    units as f32 / 1000.0 * size_pt * PT_TO_MM
}

/// Greedy word wrap to `max_width_mm`. Explicit newlines start new lines and
/// words wider than the limit are split by character.
pub fn wrap_text(text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width_mm(&candidate, size_pt) <= max_width_mm {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                current.push(ch);
                if text_width_mm(&current, size_pt) > max_width_mm && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Photo re-encoded as baseline JPEG for a `DCTDecode` image XObject.
#[derive(Debug, Clone)]
pub struct PdfPhoto {
    pub jpeg: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl PdfPhoto {
    /// Decodes any supported image format and re-encodes it as RGB JPEG.
    pub fn from_image_bytes(bytes: &[u8]) -> ExportResult<Self> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, PHOTO_JPEG_QUALITY).encode_image(&rgb)?;
        Ok(Self {
            jpeg,
            width_px: rgb.width(),
            height_px: rgb.height(),
        })
    }
}

/// Reads the record's photo from `blobs`; failures are logged and yield
/// `None` so the export proceeds without a picture.
pub fn fetch_photo(blobs: &impl BlobStore, image_url: &str) -> Option<PdfPhoto> {
    if image_url.trim().is_empty() {
        return None;
    }
    let photo = blobs
        .get(image_url)
        .map_err(|err| err.to_string())
        .and_then(|bytes| PdfPhoto::from_image_bytes(&bytes).map_err(|err| err.to_string()));
    match photo {
        Ok(photo) => Some(photo),
        Err(err) => {
            warn!("event=export_photo module=export status=skipped error={err}");
            None
        }
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// Latin-1 subset of WinAnsi; the bullet maps to its WinAnsi slot.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{2022}' => 0x95,
            ch if (ch as u32) < 0x100 => ch as u8,
            _ => b'?',
        })
        .collect()
}

fn font_name(weight: FontWeight) -> &'static str {
    match weight {
        FontWeight::Regular => FONT_REGULAR,
        FontWeight::Bold => FONT_BOLD,
    }
}

fn page_operations(page: &PdfPage, photo_available: bool) -> Vec<Operation> {
    let mut operations = Vec::new();
    for item in &page.items {
        match item {
            PdfItem::Text(text) => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(font_name(text.weight).as_bytes().to_vec()),
                        Object::from(text.size),
                    ],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![
                        Object::from(mm_to_pt(text.x)),
                        Object::from(mm_to_pt(PAGE_HEIGHT_MM - text.y)),
                    ],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_text(&text.text))],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            PdfItem::Photo(frame) if photo_available => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![
                        Object::from(mm_to_pt(frame.width)),
                        Object::from(0.0_f32),
                        Object::from(0.0_f32),
                        Object::from(mm_to_pt(frame.height)),
                        Object::from(mm_to_pt(frame.x)),
                        Object::from(mm_to_pt(PAGE_HEIGHT_MM - frame.y - frame.height)),
                    ],
                ));
                operations.push(Operation::new(
                    "Do",
                    vec![Object::Name(PHOTO_NAME.as_bytes().to_vec())],
                ));
                operations.push(Operation::new("Q", vec![]));
            }
            PdfItem::Photo(_) => {}
        }
    }
    operations
}

fn font_dictionary(base_font: &'static str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Renders `layout` into PDF bytes. Photo frames are skipped when `photo` is
/// `None`.
pub fn render_pdf(layout: &ProfileLayout, photo: Option<&PdfPhoto>) -> ExportResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));

    let mut resources = dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
    };
    if let Some(photo) = photo {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(photo.width_px),
                "Height" => i64::from(photo.height_px),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            photo.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = doc.add_object(image);
        resources.set("XObject", dictionary! { PHOTO_NAME => image_id });
    }
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(page, photo.is_some()),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::from(mm_to_pt(PAGE_WIDTH_MM)),
        Object::from(mm_to_pt(PAGE_HEIGHT_MM)),
    ];
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(ExportError::Render)?;
    Ok(bytes)
}

/// Lays out and renders one record.
pub fn profile_pdf(member: &StaffMember, photo: Option<&PdfPhoto>) -> ExportResult<Vec<u8>> {
    let layout = layout_profile(&member.profile, photo.is_some());
    render_pdf(&layout, photo)
}

/// Writes the PDF export into `dir` and returns the written path.
pub fn write_profile_pdf(
    member: &StaffMember,
    photo: Option<&PdfPhoto>,
    dir: &Path,
) -> ExportResult<PathBuf> {
    let bytes = profile_pdf(member, photo)?;
    let path = write_artifact(dir, &pdf_file_name(member), &bytes)?;
    info!(
        "event=export_pdf module=export status=ok id={} bytes={} photo={}",
        member.id,
        bytes.len(),
        photo.is_some()
    );
    Ok(path)
}
