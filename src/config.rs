use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Reportforge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port the report server listens on.
pub const PORT: u16 = 3000;

/// Academic year stamped into the report header and metadata rows.
pub const ACADEMIC_YEAR: &str = "2024-25";

/// Maximum number of attendance sections a single report may carry.
/// Image slots beyond this index are never read.
pub const MAX_ATTENDANCE_SECTIONS: usize = 20;

/// Per-category upload limits, mirrored by the form page.
pub const MAX_FILES_PER_CATEGORY: usize = 50;
pub const MAX_RESOURCE_FILES: usize = 10;

/// Request body limit: 50 MB of uploads plus multipart overhead.
pub const MAX_BODY_BYTES: usize = 55 * 1024 * 1024;

/// Word output caps the session summary to bound document size.
pub const SUMMARY_MAX_CHARS: usize = 5000;

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,reportforge=debug".to_string()
}

/// Directory holding static assets (branding marks, form resources).
/// Overridable for deployments that relocate the asset bundle.
pub fn public_dir() -> PathBuf {
    std::env::var_os("REPORTFORGE_PUBLIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("public"))
}

/// The two fixed branding marks rendered in every report header.
pub fn branding_left_path() -> PathBuf {
    public_dir().join("logo1.png")
}

pub fn branding_right_path() -> PathBuf {
    public_dir().join("logo2.png")
}

/// Headless browser binary used by the print backend.
pub fn chromium_binary() -> String {
    std::env::var("REPORTFORGE_CHROMIUM").unwrap_or_else(|_| "chromium".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn branding_paths_under_public_dir() {
        let public = public_dir();
        assert!(branding_left_path().starts_with(&public));
        assert!(branding_right_path().starts_with(&public));
        assert_ne!(branding_left_path(), branding_right_path());
    }

    #[test]
    fn attendance_slot_cap_is_twenty() {
        assert_eq!(MAX_ATTENDANCE_SECTIONS, 20);
    }
}
