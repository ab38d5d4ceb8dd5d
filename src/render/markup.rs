//! Print markup — projects the Report Model into the paginated visual
//! document the headless-browser backend rasterizes.
//!
//! Page geometry lives in CSS: A4, zero margins, backgrounds forced on.
//! Section order is the contract the spreadsheet renderer mirrors: header,
//! table of contents, invitation, poster, resource person, session report,
//! attendance blocks, photos, feedback. A section whose image sequence is
//! empty is omitted entirely, heading included.

use std::fmt::Write;

use crate::asset::EncodedAsset;
use crate::config;
use crate::model::ReportModel;

const PAGE_CSS: &str = r#"
  @page { size: A4; margin: 0; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
  body { font-family: 'Times New Roman', serif; color: #111; }
  .page { width: 210mm; min-height: 297mm; padding: 18mm 16mm; page-break-after: always; }
  .masthead { display: flex; align-items: center; justify-content: space-between; margin-bottom: 10mm; }
  .masthead img { height: 22mm; }
  h1 { text-align: center; font-size: 20pt; margin-bottom: 8mm; }
  h2 { font-size: 14pt; margin: 6mm 0 3mm; border-bottom: 1px solid #444; }
  h3 { font-size: 12pt; margin: 4mm 0 2mm; }
  table.meta { width: 100%; border-collapse: collapse; }
  table.meta td { border: 1px solid #777; padding: 2mm 3mm; font-size: 11pt; }
  table.meta td.label { width: 40%; font-weight: bold; background: #f2f2f2; }
  ol.toc { margin-left: 8mm; font-size: 11pt; }
  ol.toc li { padding: 1mm 0; }
  .gallery img { max-width: 100%; max-height: 240mm; display: block; margin: 3mm auto; }
  p.body-text { font-size: 11pt; text-align: justify; margin: 2mm 0; }
"#;

/// Render the full print markup for one report.
pub fn render(model: &ReportModel) -> String {
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Activity Report</title>\n<style>");
    out.push_str(PAGE_CSS);
    out.push_str("</style>\n</head>\n<body>\n");

    cover_page(&mut out, model);
    toc_section(&mut out, model);
    gallery_section(&mut out, "INVITATION", &model.groups.invitation);
    gallery_section(&mut out, "POSTER", &model.groups.poster);
    resource_section(&mut out, model);
    session_section(&mut out, model);
    attendance_sections(&mut out, model);
    gallery_section(&mut out, "PHOTOS", &model.groups.photos);
    gallery_section(&mut out, "FEEDBACK", &model.groups.feedback);

    out.push_str("</body>\n</html>\n");
    out
}

fn cover_page(out: &mut String, model: &ReportModel) {
    out.push_str("<div class=\"page\">\n<div class=\"masthead\">");
    let _ = write!(
        out,
        "<img src=\"{}\" alt=\"\"><img src=\"{}\" alt=\"\">",
        model.branding.left.data_url(),
        model.branding.right.data_url()
    );
    out.push_str("</div>\n<h1>ACTIVITY CONDUCTED REPORT</h1>\n<table class=\"meta\">\n");

    let f = &model.fields;
    meta_row(out, "Activity Name", &f.activity_name);
    meta_row(out, "Co-ordinator", &f.coordinator);
    meta_row(out, "Date", &f.activity_date);
    meta_row(out, "Duration", &f.duration);
    meta_row(out, "PO &amp; POs", &f.po);
    meta_row(out, "Program Line", &f.program_line);
    meta_row(out, "Academic Year", config::ACADEMIC_YEAR);

    out.push_str("</table>\n</div>\n");
}

fn toc_section(out: &mut String, model: &ReportModel) {
    if model.toc_entries.is_empty() {
        return;
    }
    out.push_str("<div class=\"page\">\n<h2>TABLE OF CONTENTS</h2>\n<ol class=\"toc\">\n");
    for (i, entry) in model.toc_entries.iter().enumerate() {
        let _ = write!(out, "<li>{}. {}</li>\n", i + 1, escape(entry));
    }
    out.push_str("</ol>\n</div>\n");
}

fn gallery_section(out: &mut String, heading: &str, images: &[EncodedAsset]) {
    if images.is_empty() {
        return;
    }
    let _ = write!(out, "<div class=\"page\">\n<h2>{heading}</h2>\n<div class=\"gallery\">\n");
    for image in images {
        let _ = write!(out, "<img src=\"{}\" alt=\"\">\n", image.data_url());
    }
    out.push_str("</div>\n</div>\n");
}

fn resource_section(out: &mut String, model: &ReportModel) {
    out.push_str("<div class=\"page\">\n<h2>RESOURCE PERSON DETAILS</h2>\n");
    if !model.groups.resource.is_empty() {
        out.push_str("<div class=\"gallery\">\n");
        for image in &model.groups.resource {
            let _ = write!(out, "<img src=\"{}\" alt=\"\">\n", image.data_url());
        }
        out.push_str("</div>\n");
    }
    let _ = write!(
        out,
        "<p class=\"body-text\">{}</p>\n</div>\n",
        escape(&model.fields.resource_text)
    );
}

fn session_section(out: &mut String, model: &ReportModel) {
    let f = &model.fields;
    out.push_str("<div class=\"page\">\n<h2>SESSION REPORT</h2>\n<table class=\"meta\">\n");
    meta_row(out, "Session Name", &f.session_name);
    meta_row(out, "Resource Person", &f.session_resource_person);
    meta_row(out, "Co-ordinator(s)", &f.session_coordinators);
    meta_row(out, "Start Date", &f.session_start_date);
    meta_row(out, "Start Time", &f.session_start_time);
    meta_row(out, "End Date", &f.session_end_date);
    meta_row(out, "End Time", &f.session_end_time);
    meta_row(out, "Participants", &f.session_participants);
    meta_row(out, "Activity Title", &f.session_activity_title);
    out.push_str("</table>\n");
    let _ = write!(out, "<h3>Preamble</h3>\n<p class=\"body-text\">{}</p>\n", escape(&f.session_preamble));
    // The summary is never truncated in print output.
    let _ = write!(out, "<h3>Summary</h3>\n<p class=\"body-text\">{}</p>\n", escape(&f.session_summary));
    out.push_str("</div>\n");
}

fn attendance_sections(out: &mut String, model: &ReportModel) {
    if model.attendance.is_empty() {
        return;
    }
    out.push_str("<div class=\"page\">\n<h2>ATTENDANCE</h2>\n");
    for section in &model.attendance {
        let _ = write!(out, "<h3>{}</h3>\n<div class=\"gallery\">\n", escape(&section.title));
        for image in &section.images {
            let _ = write!(out, "<img src=\"{}\" alt=\"\">\n", image.data_url());
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn meta_row(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<tr><td class=\"label\">{label}</td><td>{}</td></tr>\n",
        escape(value)
    );
}

/// Minimal HTML escaping for user-submitted text.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
