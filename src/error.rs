//! Fault taxonomy for report generation.
//!
//! Two request-scoped families: upstream I/O (an uploaded asset cannot be
//! read) and rendering-backend faults (the headless browser or a document
//! assembly backend fails mid-build). Missing or malformed form input is
//! never an error — the builder defaults it instead. Branding faults are
//! configuration faults and abort startup, not a request.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read uploaded asset: {0}")]
    AssetRead(#[from] std::io::Error),

    #[error("failed to load branding asset {path}: {source}")]
    Branding {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("print backend failed: {0}")]
    PrintBackend(String),

    #[error("print backend exited with status {0}")]
    PrintBackendExit(i32),

    #[error("word backend failed: {0}")]
    WordBackend(String),

    #[error("spreadsheet backend failed: {0}")]
    SheetBackend(String),
}
