//! Word rendering — projects the Report Model into a flowing DOCX.
//!
//! Word output is text-only by contract: no images and no attendance blocks,
//! a real behavior difference from the print and spreadsheet outputs, not an
//! oversight. Unlike those two, empty fields still render as labelled lines,
//! and the session summary is capped to bound document size.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::config;
use crate::error::RenderError;
use crate::model::ReportModel;

/// One paragraph of the flowing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Heading(String),
    Text(String),
}

/// The document as an ordered paragraph sequence, before backend assembly.
pub fn flow(model: &ReportModel) -> Vec<Block> {
    let f = &model.fields;
    let mut blocks = vec![
        Block::Title("ACTIVITY CONDUCTED REPORT".into()),
        Block::Text(format!("Activity Name: {}", f.activity_name)),
        Block::Text(format!("Co-ordinator: {}", f.coordinator)),
        Block::Text(format!("Date: {}", f.activity_date)),
        Block::Text(format!("Duration: {}", f.duration)),
        Block::Text(format!("PO & POs: {}", f.po)),
        Block::Text(format!("Program Line: {}", f.program_line)),
        Block::Text(String::new()),
        Block::Heading("TABLE OF CONTENTS".into()),
    ];

    for (i, entry) in model.toc_entries.iter().enumerate() {
        blocks.push(Block::Text(format!("{}. {entry}", i + 1)));
    }

    blocks.push(Block::Text(String::new()));
    blocks.push(Block::Heading("SESSION REPORT".into()));
    blocks.push(Block::Text(format!("Session Name: {}", f.session_name)));
    blocks.push(Block::Text(format!(
        "Resource Person: {}",
        f.session_resource_person
    )));
    blocks.push(Block::Text(format!(
        "Co-ordinators: {}",
        f.session_coordinators
    )));
    blocks.push(Block::Text(format!(
        "Start Date: {} Time: {}",
        f.session_start_date, f.session_start_time
    )));
    blocks.push(Block::Text(format!(
        "End Date: {} Time: {}",
        f.session_end_date, f.session_end_time
    )));
    blocks.push(Block::Text(format!(
        "Participants: {}",
        f.session_participants
    )));
    blocks.push(Block::Text(format!(
        "Activity Title: {}",
        f.session_activity_title
    )));
    blocks.push(Block::Text(format!("Preamble: {}", f.session_preamble)));
    blocks.push(Block::Text("Summary:".into()));
    blocks.push(Block::Text(truncate_summary(&f.session_summary)));

    blocks
}

/// Cap the summary at [`config::SUMMARY_MAX_CHARS`] characters.
/// Print and spreadsheet output carry the field uncapped.
fn truncate_summary(summary: &str) -> String {
    summary.chars().take(config::SUMMARY_MAX_CHARS).collect()
}

/// Render one report to DOCX bytes.
pub fn render(model: &ReportModel) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new();
    for block in flow(model) {
        docx = docx.add_paragraph(paragraph(block));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| RenderError::WordBackend(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn paragraph(block: Block) -> Paragraph {
    match block {
        Block::Title(text) => {
            Paragraph::new().add_run(Run::new().add_text(text).bold().size(28))
        }
        Block::Heading(text) => Paragraph::new().add_run(Run::new().add_text(text).bold()),
        Block::Text(text) => Paragraph::new().add_run(Run::new().add_text(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::EncodedAsset;
    use crate::model::{AttendanceSection, Branding, ReportModel};

    fn base_model() -> ReportModel {
        ReportModel {
            fields: Default::default(),
            toc_entries: Vec::new(),
            groups: Default::default(),
            attendance: Vec::new(),
            branding: Branding {
                left: EncodedAsset::from_bytes("image/png", &[1]),
                right: EncodedAsset::from_bytes("image/png", &[2]),
            },
        }
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .map(|b| match b {
                Block::Title(t) | Block::Heading(t) | Block::Text(t) => t.as_str(),
            })
            .collect()
    }

    #[test]
    fn empty_fields_still_render_as_labelled_lines() {
        let blocks = flow(&base_model());
        let texts = texts(&blocks);
        assert!(texts.contains(&"Activity Name: "));
        assert!(texts.contains(&"Co-ordinator: "));
        assert!(texts.contains(&"Participants: "));
    }

    #[test]
    fn toc_entries_numbered_in_order() {
        let mut model = base_model();
        model.toc_entries = vec!["Intro".into(), "Closing".into()];

        let blocks = flow(&model);
        let texts = texts(&blocks);
        let intro = texts.iter().position(|t| *t == "1. Intro").unwrap();
        let closing = texts.iter().position(|t| *t == "2. Closing").unwrap();
        assert!(intro < closing);
    }

    #[test]
    fn attendance_and_images_never_appear() {
        let mut model = base_model();
        model.groups.invitation = vec![EncodedAsset::from_bytes("image/png", &[9])];
        model.attendance = vec![AttendanceSection {
            title: "Day 1".into(),
            images: vec![EncodedAsset::from_bytes("image/png", &[8])],
        }];

        let blocks = flow(&model);
        let texts = texts(&blocks);
        assert!(!texts.iter().any(|t| t.contains("Day 1")));
        assert!(!texts.iter().any(|t| t.contains("INVITATION")));
    }

    #[test]
    fn summary_truncated_to_exactly_the_cap() {
        let mut model = base_model();
        model.fields.session_summary = "x".repeat(6000);

        let blocks = flow(&model);
        let last = match blocks.last().unwrap() {
            Block::Text(t) => t,
            other => panic!("expected summary text, got {other:?}"),
        };
        assert_eq!(last.chars().count(), 5000);
    }

    #[test]
    fn short_summary_kept_whole() {
        let mut model = base_model();
        model.fields.session_summary = "brief".into();

        let blocks = flow(&model);
        assert_eq!(blocks.last(), Some(&Block::Text("brief".into())));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let summary = "é".repeat(5500);
        assert_eq!(truncate_summary(&summary).chars().count(), 5000);
    }

    #[test]
    fn render_produces_a_zip_container() {
        let bytes = render(&base_model()).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn render_succeeds_with_full_model() {
        let mut model = base_model();
        model.toc_entries = vec!["Intro".into()];
        model.fields.session_summary = "y".repeat(10_000);
        assert!(!render(&model).unwrap().is_empty());
    }
}
