//! Report Model — the canonical, format-agnostic representation of one
//! submitted activity report.
//!
//! The transport layer parses the multipart request into a [`RawSubmission`]
//! (text fields by name, file groups by explicit integer slot — the core
//! never constructs string keys), and [`ReportModel::build`] normalizes that
//! into the single object every renderer consumes. Building never fails on
//! absent or malformed optional input; absent values become empty defaults.

use futures_util::future::try_join_all;

use crate::asset::{EncodedAsset, StagedUpload};
use crate::config;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Raw submission (built at the transport boundary)
// ---------------------------------------------------------------------------

/// Text fields of the report form. Every field defaults to empty; no field
/// is required and no cross-field validation is performed.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub activity_name: String,
    pub coordinator: String,
    pub activity_date: String,
    pub duration: String,
    pub po: String,
    pub program_line: String,
    pub resource_text: String,
    pub session_name: String,
    pub session_resource_person: String,
    pub session_coordinators: String,
    pub session_start_date: String,
    pub session_start_time: String,
    pub session_end_date: String,
    pub session_end_time: String,
    pub session_participants: String,
    pub session_activity_title: String,
    pub session_preamble: String,
    pub session_summary: String,
}

/// Uploaded files grouped by category, staged on disk.
///
/// `attendance` always has [`config::MAX_ATTENDANCE_SECTIONS`] slots; the
/// transport drops out-of-range slot indices before the core sees them.
#[derive(Debug, Clone)]
pub struct RawFileGroups {
    pub invitation: Vec<StagedUpload>,
    pub poster: Vec<StagedUpload>,
    pub resource: Vec<StagedUpload>,
    pub photos: Vec<StagedUpload>,
    pub feedback: Vec<StagedUpload>,
    pub attendance: Vec<Vec<StagedUpload>>,
}

impl Default for RawFileGroups {
    fn default() -> Self {
        Self {
            invitation: Vec::new(),
            poster: Vec::new(),
            resource: Vec::new(),
            photos: Vec::new(),
            feedback: Vec::new(),
            attendance: vec![Vec::new(); config::MAX_ATTENDANCE_SECTIONS],
        }
    }
}

/// One submitted report, exactly as the transport handed it over.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub fields: FormFields,
    /// Table-of-contents entries in submission order, empties not yet dropped.
    pub toc_entries: Vec<String>,
    /// Attendance section titles in submission order.
    pub attendance_titles: Vec<String>,
    pub files: RawFileGroups,
}

// ---------------------------------------------------------------------------
// Report Model
// ---------------------------------------------------------------------------

/// The five statically-named image categories.
#[derive(Debug, Clone, Default)]
pub struct FixedImageGroups {
    pub invitation: Vec<EncodedAsset>,
    pub poster: Vec<EncodedAsset>,
    pub resource: Vec<EncodedAsset>,
    pub photos: Vec<EncodedAsset>,
    pub feedback: Vec<EncodedAsset>,
}

/// A user-named attendance block: title plus its index-matched image set.
#[derive(Debug, Clone)]
pub struct AttendanceSection {
    pub title: String,
    pub images: Vec<EncodedAsset>,
}

/// The two constant header marks, identical across all reports.
#[derive(Debug, Clone)]
pub struct Branding {
    pub left: EncodedAsset,
    pub right: EncodedAsset,
}

impl Branding {
    /// Load both marks from their fixed local paths.
    ///
    /// Called once at startup; a missing mark is a configuration fault that
    /// must abort the process before any request is served.
    pub fn load() -> Result<Self, RenderError> {
        Ok(Self {
            left: read_mark(config::branding_left_path())?,
            right: read_mark(config::branding_right_path())?,
        })
    }
}

fn read_mark(path: std::path::PathBuf) -> Result<EncodedAsset, RenderError> {
    let bytes = std::fs::read(&path).map_err(|source| RenderError::Branding {
        path: path.clone(),
        source,
    })?;
    Ok(EncodedAsset::from_bytes("image/png", &bytes))
}

/// Canonical in-memory report. Constructed fresh per request, handed to
/// exactly one renderer, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ReportModel {
    pub fields: FormFields,
    /// Non-empty TOC entries; rendered with 1-based numbers in this order.
    pub toc_entries: Vec<String>,
    pub groups: FixedImageGroups,
    /// One section per submitted title, never per submitted image slot.
    pub attendance: Vec<AttendanceSection>,
    pub branding: Branding,
}

impl ReportModel {
    /// Normalize a raw submission into the Report Model.
    ///
    /// All staged files are encoded concurrently; the model is only
    /// assembled once every encoding has finished. The single failure mode
    /// is an unreadable staged file.
    pub async fn build(raw: RawSubmission, branding: Branding) -> Result<Self, RenderError> {
        let (invitation, poster, resource, photos, feedback) = futures_util::try_join!(
            encode_group(&raw.files.invitation),
            encode_group(&raw.files.poster),
            encode_group(&raw.files.resource),
            encode_group(&raw.files.photos),
            encode_group(&raw.files.feedback),
        )?;

        // Title i pairs with image slot i. A title without a slot keeps an
        // empty image set; slots past the last title are silently ignored.
        let attendance_images = try_join_all(
            raw.attendance_titles
                .iter()
                .enumerate()
                .map(|(i, _)| encode_group(slot(&raw.files.attendance, i))),
        )
        .await?;

        let attendance = raw
            .attendance_titles
            .into_iter()
            .zip(attendance_images)
            .map(|(title, images)| AttendanceSection { title, images })
            .collect();

        let toc_entries = raw
            .toc_entries
            .into_iter()
            .filter(|entry| !entry.is_empty())
            .collect();

        Ok(Self {
            fields: raw.fields,
            toc_entries,
            groups: FixedImageGroups {
                invitation,
                poster,
                resource,
                photos,
                feedback,
            },
            attendance,
            branding,
        })
    }
}

fn slot(attendance: &[Vec<StagedUpload>], index: usize) -> &[StagedUpload] {
    attendance.get(index).map(Vec::as_slice).unwrap_or(&[])
}

async fn encode_group(files: &[StagedUpload]) -> Result<Vec<EncodedAsset>, RenderError> {
    try_join_all(files.iter().map(EncodedAsset::read)).await
}
