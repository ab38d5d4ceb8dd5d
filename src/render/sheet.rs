//! Spreadsheet rendering — projects the Report Model into a row-oriented
//! XLSX sheet mirroring the print section order.
//!
//! The sheet is planned first as an append-only row sequence, then executed
//! against the backend workbook. Every image is anchored below a placeholder
//! row spanning a fixed 6-column by 16-row region — a deliberate
//! simplification with no dynamic sizing, kept for visual parity with the
//! print layout. Zero-item sections are omitted, matching print.

use rust_xlsxwriter::{Format, Image, Workbook, Worksheet, XlsxError};

use crate::asset::EncodedAsset;
use crate::config;
use crate::error::RenderError;
use crate::model::ReportModel;

/// Fixed anchor region for every embedded image, in cells.
const IMAGE_SPAN_COLS: u16 = 6;
const IMAGE_SPAN_ROWS: u32 = 16;

/// Uniform width applied to all columns as the final layout pass.
const COLUMN_WIDTH: f64 = 40.0;

/// Cell geometry used to convert the anchor span into a pixel target.
/// Width follows the character-to-pixel rule for the width-40 columns;
/// height is the default row height.
const COLUMN_PIXELS: f64 = COLUMN_WIDTH * 7.0 + 5.0;
const ROW_PIXELS: f64 = 20.0;

// ---------------------------------------------------------------------------
// Row plan
// ---------------------------------------------------------------------------

/// One planned sheet row (an `Image` expands to placeholder + anchored span).
#[derive(Debug, Clone)]
pub enum Row {
    Title(&'static str),
    Heading(&'static str),
    Kv(&'static str, String),
    TocHeader,
    Toc(u32, String),
    SectionTitle(String),
    Text(String),
    Image(EncodedAsset),
    Blank,
}

/// Plan the sheet top to bottom. Section presence and order here is the
/// cross-format contract shared with the print renderer.
pub fn plan(model: &ReportModel) -> Vec<Row> {
    let f = &model.fields;
    let mut rows = vec![
        Row::Title("ACTIVITY CONDUCTED REPORT"),
        Row::Blank,
        Row::Kv("Activity Name", f.activity_name.clone()),
        Row::Kv("Co-ordinator", f.coordinator.clone()),
        Row::Kv("Date", f.activity_date.clone()),
        Row::Kv("Duration", f.duration.clone()),
        Row::Kv("PO & POs", f.po.clone()),
        Row::Kv("Program Line", f.program_line.clone()),
        Row::Kv("Academic Year", config::ACADEMIC_YEAR.to_string()),
        Row::Blank,
        Row::Heading("TABLE OF CONTENTS"),
        Row::TocHeader,
    ];

    for (i, entry) in model.toc_entries.iter().enumerate() {
        rows.push(Row::Toc(i as u32 + 1, entry.clone()));
    }
    rows.push(Row::Blank);

    image_section(&mut rows, "INVITATION", &model.groups.invitation);
    image_section(&mut rows, "POSTER", &model.groups.poster);

    // The resource section is field-driven and never omitted; only the
    // first resource image is embedded.
    rows.push(Row::Heading("RESOURCE PERSON DETAILS"));
    if let Some(first) = model.groups.resource.first() {
        rows.push(Row::Image(first.clone()));
    }
    rows.push(Row::Text("Description".into()));
    rows.push(Row::Text(f.resource_text.clone()));
    rows.push(Row::Blank);

    rows.push(Row::Heading("SESSION REPORT"));
    rows.push(Row::Kv("Session Name", f.session_name.clone()));
    rows.push(Row::Kv("Resource Person", f.session_resource_person.clone()));
    rows.push(Row::Kv("Co-ordinator(s)", f.session_coordinators.clone()));
    rows.push(Row::Kv("Start Date", f.session_start_date.clone()));
    rows.push(Row::Kv("Start Time", f.session_start_time.clone()));
    rows.push(Row::Kv("End Date", f.session_end_date.clone()));
    rows.push(Row::Kv("End Time", f.session_end_time.clone()));
    rows.push(Row::Kv("Participants", f.session_participants.clone()));
    rows.push(Row::Kv("Activity Title", f.session_activity_title.clone()));
    rows.push(Row::Kv("Preamble", f.session_preamble.clone()));
    // Uncapped here; only the word output truncates the summary.
    rows.push(Row::Kv("Summary", f.session_summary.clone()));
    rows.push(Row::Blank);

    if !model.attendance.is_empty() {
        rows.push(Row::Heading("ATTENDANCE"));
        for section in &model.attendance {
            rows.push(Row::SectionTitle(section.title.clone()));
            for image in &section.images {
                rows.push(Row::Image(image.clone()));
            }
        }
        rows.push(Row::Blank);
    }

    image_section(&mut rows, "PHOTOS", &model.groups.photos);
    image_section(&mut rows, "FEEDBACK", &model.groups.feedback);

    rows
}

fn image_section(rows: &mut Vec<Row>, heading: &'static str, images: &[EncodedAsset]) {
    if images.is_empty() {
        return;
    }
    rows.push(Row::Heading(heading));
    for image in images {
        rows.push(Row::Image(image.clone()));
    }
    rows.push(Row::Blank);
}

// ---------------------------------------------------------------------------
// Backend execution
// ---------------------------------------------------------------------------

/// Render one report to XLSX bytes.
pub fn render(model: &ReportModel) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Report").map_err(backend)?;

    let title = Format::new().set_bold().set_font_size(16);
    let heading = Format::new().set_bold().set_font_size(14);
    let bold = Format::new().set_bold();

    let mut cursor = 0u32;
    for row in plan(model) {
        match row {
            Row::Title(text) => {
                worksheet
                    .write_with_format(cursor, 0, text, &title)
                    .map_err(backend)?;
                cursor += 1;
            }
            Row::Heading(text) => {
                worksheet
                    .write_with_format(cursor, 0, text, &heading)
                    .map_err(backend)?;
                cursor += 1;
            }
            Row::Kv(label, value) => {
                worksheet.write(cursor, 0, label).map_err(backend)?;
                worksheet.write(cursor, 1, value).map_err(backend)?;
                cursor += 1;
            }
            Row::TocHeader => {
                worksheet
                    .write_with_format(cursor, 0, "Sl. No", &bold)
                    .map_err(backend)?;
                worksheet
                    .write_with_format(cursor, 1, "Content", &bold)
                    .map_err(backend)?;
                cursor += 1;
            }
            Row::Toc(number, entry) => {
                worksheet.write(cursor, 0, number).map_err(backend)?;
                worksheet.write(cursor, 1, entry).map_err(backend)?;
                cursor += 1;
            }
            Row::SectionTitle(text) => {
                worksheet
                    .write_with_format(cursor, 0, text, &bold)
                    .map_err(backend)?;
                cursor += 1;
            }
            Row::Text(text) => {
                worksheet.write(cursor, 0, text).map_err(backend)?;
                cursor += 1;
            }
            Row::Image(asset) => {
                cursor = embed_image(worksheet, cursor, &asset)?;
            }
            Row::Blank => {
                cursor += 1;
            }
        }
    }

    // Final layout pass: one fixed width for every column the sheet uses.
    for col in 0..=IMAGE_SPAN_COLS {
        worksheet
            .set_column_width(col, COLUMN_WIDTH)
            .map_err(backend)?;
    }

    workbook.save_to_buffer().map_err(backend)
}

/// Placeholder row, then the image anchored immediately below, spanning the
/// fixed 6x16 cell region. Content continues after the span plus one blank
/// row. Returns the next free row.
fn embed_image(
    worksheet: &mut Worksheet,
    cursor: u32,
    asset: &EncodedAsset,
) -> Result<u32, RenderError> {
    let bytes = asset.decode()?;

    let image = Image::new_from_buffer(&bytes).map_err(|e| {
        RenderError::SheetBackend(format!("{} image rejected: {e}", asset.extension()))
    })?;
    let (scale_w, scale_h) = anchor_scale(image.width(), image.height());
    let image = image.set_scale_width(scale_w).set_scale_height(scale_h);

    worksheet.write(cursor, 0, "(Image Below)").map_err(backend)?;
    worksheet
        .insert_image(cursor + 1, 1, &image)
        .map_err(backend)?;

    Ok(cursor + 1 + IMAGE_SPAN_ROWS + 1)
}

/// Scale factors that stretch an image of the given native pixel size onto
/// the fixed anchor region, ignoring aspect ratio.
fn anchor_scale(native_width: f64, native_height: f64) -> (f64, f64) {
    let target_width = f64::from(IMAGE_SPAN_COLS) * COLUMN_PIXELS;
    let target_height = f64::from(IMAGE_SPAN_ROWS) * ROW_PIXELS;
    (
        target_width / native_width.max(1.0),
        target_height / native_height.max(1.0),
    )
}

fn backend(e: XlsxError) -> RenderError {
    RenderError::SheetBackend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttendanceSection, Branding, FixedImageGroups, ReportModel};
    use base64::Engine;

    /// 1x1 transparent PNG.
    const PNG_1X1: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn png_asset() -> EncodedAsset {
        EncodedAsset {
            media_type: "image/png".into(),
            data: PNG_1X1.into(),
        }
    }

    fn base_model() -> ReportModel {
        ReportModel {
            fields: Default::default(),
            toc_entries: Vec::new(),
            groups: FixedImageGroups::default(),
            attendance: Vec::new(),
            branding: Branding {
                left: png_asset(),
                right: png_asset(),
            },
        }
    }

    fn headings(rows: &[Row]) -> Vec<&'static str> {
        rows.iter()
            .filter_map(|r| match r {
                Row::Heading(h) => Some(*h),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_model_omits_all_image_sections() {
        let rows = plan(&base_model());
        assert_eq!(
            headings(&rows),
            vec![
                "TABLE OF CONTENTS",
                "RESOURCE PERSON DETAILS",
                "SESSION REPORT"
            ]
        );
    }

    #[test]
    fn populated_sections_appear_in_print_order() {
        let mut model = base_model();
        model.groups.invitation = vec![png_asset()];
        model.groups.poster = vec![png_asset()];
        model.groups.photos = vec![png_asset()];
        model.groups.feedback = vec![png_asset()];
        model.attendance = vec![AttendanceSection {
            title: "Day 1".into(),
            images: vec![png_asset()],
        }];

        let rows = plan(&model);
        assert_eq!(
            headings(&rows),
            vec![
                "TABLE OF CONTENTS",
                "INVITATION",
                "POSTER",
                "RESOURCE PERSON DETAILS",
                "SESSION REPORT",
                "ATTENDANCE",
                "PHOTOS",
                "FEEDBACK"
            ]
        );
    }

    #[test]
    fn toc_rows_numbered_from_one() {
        let mut model = base_model();
        model.toc_entries = vec!["Intro".into(), "Closing".into()];

        let rows = plan(&model);
        let toc: Vec<(u32, &str)> = rows
            .iter()
            .filter_map(|r| match r {
                Row::Toc(n, e) => Some((*n, e.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(toc, vec![(1, "Intro"), (2, "Closing")]);
    }

    #[test]
    fn only_first_resource_image_is_embedded() {
        let mut model = base_model();
        model.groups.resource = vec![png_asset(), png_asset(), png_asset()];

        let rows = plan(&model);
        let images = rows
            .iter()
            .filter(|r| matches!(r, Row::Image(_)))
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn attendance_sections_carry_title_then_images() {
        let mut model = base_model();
        model.attendance = vec![
            AttendanceSection {
                title: "Day 1".into(),
                images: vec![png_asset(), png_asset()],
            },
            AttendanceSection {
                title: "Day 2".into(),
                images: Vec::new(),
            },
        ];

        let rows = plan(&model);
        let titles: Vec<&str> = rows
            .iter()
            .filter_map(|r| match r {
                Row::SectionTitle(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["Day 1", "Day 2"]);
    }

    #[test]
    fn summary_is_not_truncated_in_plan() {
        let mut model = base_model();
        model.fields.session_summary = "s".repeat(6000);

        let rows = plan(&model);
        let summary = rows
            .iter()
            .find_map(|r| match r {
                Row::Kv("Summary", v) => Some(v.len()),
                _ => None,
            })
            .unwrap();
        assert_eq!(summary, 6000);
    }

    #[test]
    fn anchor_scale_stretches_to_the_fixed_span() {
        let (sw, sh) = anchor_scale(100.0, 50.0);
        assert!((sw * 100.0 - 6.0 * COLUMN_PIXELS).abs() < 1e-9);
        assert!((sh * 50.0 - 16.0 * ROW_PIXELS).abs() < 1e-9);
    }

    #[test]
    fn render_empty_model_is_a_zip_container() {
        let bytes = render(&base_model()).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn render_with_images_succeeds() {
        let mut model = base_model();
        model.toc_entries = vec!["Intro".into()];
        model.groups.invitation = vec![png_asset()];
        model.attendance = vec![AttendanceSection {
            title: "Day 1".into(),
            images: vec![png_asset(), png_asset()],
        }];

        let bytes = render(&model).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn corrupt_image_bytes_fail_the_render() {
        let mut model = base_model();
        model.groups.poster = vec![EncodedAsset {
            media_type: "image/png".into(),
            data: base64::engine::general_purpose::STANDARD.encode(b"not an image"),
        }];

        let err = render(&model).unwrap_err();
        assert!(matches!(err, RenderError::SheetBackend(_)));
    }
}
