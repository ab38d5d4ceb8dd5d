//! Transport layer — multipart intake and the four report routes.
//!
//! All string-keyed field handling lives here, at the boundary: text fields
//! are read by name into [`FormFields`], and attendance image slots are
//! resolved from their indexed field names into an explicit integer-indexed
//! structure before the core ever sees them. Every request stages uploads in
//! its own temp directory, builds one Report Model, hands it to exactly one
//! renderer, and returns the whole document or a single error — never a
//! partial output.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use uuid::Uuid;

use crate::asset::StagedUpload;
use crate::config;
use crate::error::RenderError;
use crate::model::{Branding, RawSubmission, ReportModel};
use crate::render;

/// Read-only state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    branding: Branding,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "report generation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the report server router.
pub fn router(branding: Branding) -> Router {
    let state = Arc::new(AppState { branding });

    Router::new()
        .route("/", get(serve_form_page))
        .route("/preview", post(preview_pdf))
        .route("/generate", post(generate_pdf))
        .route("/generate-docx", post(generate_docx))
        .route("/generate-excel", post(generate_excel))
        .nest_service("/static", ServeDir::new(config::public_dir()))
        .layer(DefaultBodyLimit::max(config::MAX_BODY_BYTES))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn serve_form_page() -> Html<&'static str> {
    Html(FORM_PAGE_HTML)
}

async fn preview_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, RenderError> {
    let model = build_model(&state, multipart).await?;
    let pdf = render::print::render(&model).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        pdf,
    )
        .into_response())
}

async fn generate_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, RenderError> {
    let model = build_model(&state, multipart).await?;
    let pdf = render::print::render(&model).await?;
    Ok(attachment("application/pdf", "report.pdf", pdf))
}

async fn generate_docx(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, RenderError> {
    let model = build_model(&state, multipart).await?;
    let bytes = tokio::task::spawn_blocking(move || render::word::render(&model))
        .await
        .map_err(|e| RenderError::WordBackend(format!("render task: {e}")))??;
    Ok(attachment(
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "report.docx",
        bytes,
    ))
}

async fn generate_excel(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, RenderError> {
    let model = build_model(&state, multipart).await?;
    let bytes = tokio::task::spawn_blocking(move || render::sheet::render(&model))
        .await
        .map_err(|e| RenderError::SheetBackend(format!("render task: {e}")))??;
    Ok(attachment(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "report.xlsx",
        bytes,
    ))
}

fn attachment(content_type: &str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Stage the multipart request and build the Report Model.
/// The staging directory lives until every upload has been encoded.
async fn build_model(
    state: &AppState,
    multipart: Multipart,
) -> Result<ReportModel, RenderError> {
    let staging = tempfile::tempdir()?;
    let raw = read_submission(multipart, staging.path()).await?;

    info!(
        toc = raw.toc_entries.len(),
        attendance_titles = raw.attendance_titles.len(),
        "report submission staged"
    );

    ReportModel::build(raw, state.branding.clone()).await
}

// ---------------------------------------------------------------------------
// Multipart intake
// ---------------------------------------------------------------------------

/// Parse the multipart stream into a raw submission.
///
/// Text fields and file categories are matched by name; unknown fields are
/// ignored. Malformed text never fails the request, but a broken stream or
/// an unreadable upload does — a truncated body must never produce a
/// complete-looking document. Files past a category's limit are dropped
/// with a warning.
async fn read_submission(
    mut multipart: Multipart,
    staging: &Path,
) -> Result<RawSubmission, RenderError> {
    let mut raw = RawSubmission::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(
                    std::io::Error::other(format!("multipart stream failed: {e}")).into(),
                );
            }
        };
        let name = normalize_name(field.name().unwrap_or("")).to_string();

        if field.file_name().is_some() {
            let Some(filename) = non_empty_filename(&field) else {
                continue;
            };
            let media_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .essence_str()
                        .to_string()
                });

            let bytes = field
                .bytes()
                .await
                .map_err(|e| std::io::Error::other(format!("upload read failed: {e}")))?;

            let Some(group) = file_group(&mut raw, &name) else {
                continue;
            };
            if group.files.len() >= group.limit {
                warn!(field = %name, limit = group.limit, "category limit reached, dropping file");
                continue;
            }

            let path = staging.join(format!("{}_{}", Uuid::new_v4(), group.files.len()));
            tokio::fs::write(&path, &bytes).await?;
            group.files.push(StagedUpload { media_type, path });
        } else {
            let text = field.text().await.unwrap_or_default();
            collect_text_field(&mut raw, &name, text);
        }
    }

    Ok(raw)
}

fn non_empty_filename(field: &axum::extract::multipart::Field<'_>) -> Option<String> {
    match field.file_name() {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => None,
    }
}

/// Strip the HTML array suffix: `tocRows[]` and `tocRows` are equivalent.
fn normalize_name(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

/// Slot index of an `attendanceFiles{i}` field, if within capacity.
fn attendance_slot(name: &str) -> Option<usize> {
    name.strip_prefix("attendanceFiles")?
        .parse::<usize>()
        .ok()
        .filter(|&i| i < config::MAX_ATTENDANCE_SECTIONS)
}

struct FileGroup<'a> {
    files: &'a mut Vec<StagedUpload>,
    limit: usize,
}

fn file_group<'a>(raw: &'a mut RawSubmission, name: &str) -> Option<FileGroup<'a>> {
    let (files, limit) = match name {
        "invitation" => (&mut raw.files.invitation, config::MAX_FILES_PER_CATEGORY),
        "poster" => (&mut raw.files.poster, config::MAX_FILES_PER_CATEGORY),
        "resource" => (&mut raw.files.resource, config::MAX_RESOURCE_FILES),
        "photos" => (&mut raw.files.photos, config::MAX_FILES_PER_CATEGORY),
        "feedback" => (&mut raw.files.feedback, config::MAX_FILES_PER_CATEGORY),
        _ => {
            let slot = attendance_slot(name)?;
            (
                &mut raw.files.attendance[slot],
                config::MAX_FILES_PER_CATEGORY,
            )
        }
    };
    Some(FileGroup { files, limit })
}

fn collect_text_field(raw: &mut RawSubmission, name: &str, text: String) {
    let f = &mut raw.fields;
    match name {
        "activityName" => f.activity_name = text,
        "coordinator" => f.coordinator = text,
        "activityDate" => f.activity_date = text,
        "duration" => f.duration = text,
        "po" => f.po = text,
        "programLine" => f.program_line = text,
        "resourceText" => f.resource_text = text,
        "sessionName" => f.session_name = text,
        "sessionResourcePerson" => f.session_resource_person = text,
        "sessionCoordinators" => f.session_coordinators = text,
        "sessionStartDate" => f.session_start_date = text,
        "sessionStartTime" => f.session_start_time = text,
        "sessionEndDate" => f.session_end_date = text,
        "sessionEndTime" => f.session_end_time = text,
        "sessionParticipants" => f.session_participants = text,
        "sessionActivityTitle" => f.session_activity_title = text,
        "sessionPreamble" => f.session_preamble = text,
        "sessionSummary" => f.session_summary = text,
        "tocRows" => raw.toc_entries.push(text),
        "attendanceTitles" => raw.attendance_titles.push(text),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Form page (self-contained, no external resources)
// ---------------------------------------------------------------------------

const FORM_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Activity Report Generator</title>
  <style>
    * { box-sizing: border-box; }
    body { font-family: system-ui, sans-serif; background: #f5f5f4; color: #1c1917;
           max-width: 760px; margin: 0 auto; padding: 24px; }
    h1 { font-size: 24px; margin-bottom: 4px; }
    h2 { font-size: 16px; margin: 24px 0 8px; border-bottom: 1px solid #d6d3d1; padding-bottom: 4px; }
    label { display: block; font-size: 13px; margin: 10px 0 2px; color: #44403c; }
    input[type=text], input[type=date], input[type=time], textarea {
      width: 100%; padding: 8px; border: 1px solid #d6d3d1; border-radius: 6px; font-size: 14px; }
    textarea { min-height: 80px; }
    .row-list > div { display: flex; gap: 8px; margin-bottom: 6px; }
    .att-section { border: 1px solid #d6d3d1; border-radius: 8px; padding: 12px; margin-bottom: 12px; }
    button { padding: 8px 14px; border-radius: 6px; border: 1px solid #d6d3d1;
             background: white; cursor: pointer; font-size: 14px; }
    .actions { display: flex; gap: 10px; margin-top: 24px; flex-wrap: wrap; }
    .actions button { background: #4a7c59; color: white; border: none; padding: 12px 18px; }
  </style>
</head>
<body>
  <h1>Activity Conducted Report</h1>
  <p>Fill in the activity details; download the report as PDF, Word, or Excel.</p>

  <form method="post" enctype="multipart/form-data">
    <h2>Activity</h2>
    <label>Activity Name</label><input type="text" name="activityName">
    <label>Co-ordinator</label><input type="text" name="coordinator">
    <label>Date</label><input type="date" name="activityDate">
    <label>Duration</label><input type="text" name="duration">
    <label>PO &amp; POs</label><input type="text" name="po">
    <label>Program Line</label><input type="text" name="programLine">

    <h2>Table of Contents</h2>
    <div class="row-list" id="toc-rows">
      <div><input type="text" name="tocRows[]" placeholder="Entry"></div>
    </div>
    <button type="button" id="add-toc">Add row</button>

    <h2>Images</h2>
    <label>Invitation</label><input type="file" name="invitation[]" multiple accept="image/*">
    <label>Poster</label><input type="file" name="poster[]" multiple accept="image/*">
    <label>Resource Person</label><input type="file" name="resource[]" multiple accept="image/*">
    <label>Resource Person Description</label><textarea name="resourceText"></textarea>
    <label>Photos</label><input type="file" name="photos[]" multiple accept="image/*">
    <label>Feedback</label><input type="file" name="feedback[]" multiple accept="image/*">

    <h2>Session Report</h2>
    <label>Session Name</label><input type="text" name="sessionName">
    <label>Resource Person</label><input type="text" name="sessionResourcePerson">
    <label>Co-ordinators</label><input type="text" name="sessionCoordinators">
    <label>Start Date</label><input type="date" name="sessionStartDate">
    <label>Start Time</label><input type="time" name="sessionStartTime">
    <label>End Date</label><input type="date" name="sessionEndDate">
    <label>End Time</label><input type="time" name="sessionEndTime">
    <label>Participants</label><input type="text" name="sessionParticipants">
    <label>Activity Title</label><input type="text" name="sessionActivityTitle">
    <label>Preamble</label><textarea name="sessionPreamble"></textarea>
    <label>Summary</label><textarea name="sessionSummary"></textarea>

    <h2>Attendance</h2>
    <div id="attendance-sections">
      <div class="att-section">
        <label>Section Title</label><input type="text" name="attendanceTitles[]">
        <label>Images</label><input type="file" name="attendanceFiles0[]" multiple accept="image/*">
      </div>
    </div>
    <button type="button" id="add-attendance">Add attendance section</button>

    <div class="actions">
      <button formaction="/preview" formtarget="_blank">Preview PDF</button>
      <button formaction="/generate">Download PDF</button>
      <button formaction="/generate-docx">Download Word</button>
      <button formaction="/generate-excel">Download Excel</button>
    </div>
  </form>

  <script>
    var MAX_SECTIONS = 20;

    document.getElementById('add-toc').addEventListener('click', function () {
      var row = document.createElement('div');
      row.innerHTML = '<input type="text" name="tocRows[]" placeholder="Entry">';
      document.getElementById('toc-rows').appendChild(row);
    });

    document.getElementById('add-attendance').addEventListener('click', function () {
      var container = document.getElementById('attendance-sections');
      var index = container.children.length;
      if (index >= MAX_SECTIONS) return;
      var section = document.createElement('div');
      section.className = 'att-section';
      section.innerHTML =
        '<label>Section Title</label><input type="text" name="attendanceTitles[]">' +
        '<label>Images</label><input type="file" name="attendanceFiles' + index + '[]" multiple accept="image/*">';
      container.appendChild(section);
    });
  </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    // -- Field name handling --------------------------------------------------

    #[test]
    fn normalize_strips_array_suffix() {
        assert_eq!(normalize_name("tocRows[]"), "tocRows");
        assert_eq!(normalize_name("tocRows"), "tocRows");
        assert_eq!(normalize_name("attendanceFiles3[]"), "attendanceFiles3");
    }

    #[test]
    fn attendance_slot_parses_valid_indices() {
        assert_eq!(attendance_slot("attendanceFiles0"), Some(0));
        assert_eq!(attendance_slot("attendanceFiles19"), Some(19));
    }

    #[test]
    fn attendance_slot_rejects_out_of_range_and_garbage() {
        assert_eq!(attendance_slot("attendanceFiles20"), None);
        assert_eq!(attendance_slot("attendanceFiles-1"), None);
        assert_eq!(attendance_slot("attendanceFiles"), None);
        assert_eq!(attendance_slot("attendanceFilesX"), None);
        assert_eq!(attendance_slot("poster"), None);
    }

    #[test]
    fn file_group_routes_fixed_categories() {
        let mut raw = RawSubmission::default();
        for (name, limit) in [
            ("invitation", config::MAX_FILES_PER_CATEGORY),
            ("poster", config::MAX_FILES_PER_CATEGORY),
            ("resource", config::MAX_RESOURCE_FILES),
            ("photos", config::MAX_FILES_PER_CATEGORY),
            ("feedback", config::MAX_FILES_PER_CATEGORY),
        ] {
            let group = file_group(&mut raw, name).unwrap();
            assert_eq!(group.limit, limit, "limit for {name}");
        }
        assert!(file_group(&mut raw, "unknown").is_none());
    }

    #[test]
    fn file_group_routes_attendance_slots() {
        let mut raw = RawSubmission::default();
        let group = file_group(&mut raw, "attendanceFiles7").unwrap();
        group.files.push(StagedUpload {
            media_type: "image/png".into(),
            path: "/tmp/x".into(),
        });
        assert_eq!(raw.files.attendance[7].len(), 1);
    }

    #[test]
    fn text_fields_collect_by_name() {
        let mut raw = RawSubmission::default();
        collect_text_field(&mut raw, "activityName", "Workshop A".into());
        collect_text_field(&mut raw, "sessionSummary", "All went well".into());
        collect_text_field(&mut raw, "tocRows", "Intro".into());
        collect_text_field(&mut raw, "tocRows", "".into());
        collect_text_field(&mut raw, "attendanceTitles", "Day 1".into());
        collect_text_field(&mut raw, "unknownField", "ignored".into());

        assert_eq!(raw.fields.activity_name, "Workshop A");
        assert_eq!(raw.fields.session_summary, "All went well");
        // Raw TOC keeps empties; the builder drops them.
        assert_eq!(raw.toc_entries, vec!["Intro", ""]);
        assert_eq!(raw.attendance_titles, vec!["Day 1"]);
    }

    // -- Multipart intake -----------------------------------------------------

    async fn multipart_from(content_type: &str, body: &'static str) -> Multipart {
        use axum::extract::FromRequest;

        let request = axum::http::Request::builder()
            .header(header::CONTENT_TYPE, content_type)
            .body(axum::body::Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn broken_multipart_stream_fails_the_request() {
        // No boundary ever appears: the stream is malformed from the start.
        let multipart = multipart_from(
            "multipart/form-data; boundary=BOUNDARY",
            "not a multipart body",
        )
        .await;

        let staging = tempfile::tempdir().unwrap();
        let err = read_submission(multipart, staging.path()).await.unwrap_err();
        assert!(matches!(err, RenderError::AssetRead(_)));
    }

    #[tokio::test]
    async fn well_formed_multipart_stream_is_read_whole() {
        let body = "--BOUNDARY\r\n\
            Content-Disposition: form-data; name=\"activityName\"\r\n\r\n\
            Workshop A\r\n\
            --BOUNDARY\r\n\
            Content-Disposition: form-data; name=\"tocRows[]\"\r\n\r\n\
            Intro\r\n\
            --BOUNDARY--\r\n";
        let multipart = multipart_from("multipart/form-data; boundary=BOUNDARY", body).await;

        let staging = tempfile::tempdir().unwrap();
        let raw = read_submission(multipart, staging.path()).await.unwrap();
        assert_eq!(raw.fields.activity_name, "Workshop A");
        assert_eq!(raw.toc_entries, vec!["Intro"]);
    }

    // -- Error mapping --------------------------------------------------------

    #[test]
    fn render_errors_map_to_500() {
        let response = RenderError::PrintBackendExit(1).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = RenderError::SheetBackend("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn error_response_body_is_json_with_the_fault_message() {
        use http_body_util::BodyExt;

        let response = RenderError::WordBackend("assembly failed".into()).into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "word backend failed: assembly failed");
    }

    // -- Form page ------------------------------------------------------------

    #[test]
    fn form_page_posts_every_category() {
        for name in [
            "invitation[]",
            "poster[]",
            "resource[]",
            "photos[]",
            "feedback[]",
            "attendanceFiles0[]",
            "tocRows[]",
            "attendanceTitles[]",
        ] {
            assert!(FORM_PAGE_HTML.contains(name), "form missing {name}");
        }
    }

    #[test]
    fn form_page_targets_all_four_routes() {
        for route in ["/preview", "/generate", "/generate-docx", "/generate-excel"] {
            assert!(FORM_PAGE_HTML.contains(route), "form missing {route}");
        }
    }
}
