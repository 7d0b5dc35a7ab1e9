use crate::{ExamId, FlashSeverity, JobId, Theme};

/// Identity redirect route on the dashboard server.
pub const LOGIN_PATH: &str = "/auth/login";

/// Artifact view route for an exam.
pub fn exam_path(exam_id: &str) -> String {
    format!("/exam/{exam_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub theme: Theme,
    pub cards: Vec<CardView>,
    pub flash: Option<FlashView>,
    pub upload: UploadFormView,
    pub delete_modal: Option<DeleteModalView>,
    pub login_enabled: bool,
    pub login_label: &'static str,
    pub tracked_job: Option<JobId>,
    pub orphaned_job: Option<JobId>,
    /// Outstanding requests, channels and scheduled reloads.
    pub in_flight: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub dom_id: String,
    pub title: String,
    pub kind: CardKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardKind {
    Loading {
        file_name: String,
    },
    /// Result card: view link plus a delete control keyed to `exam_id`.
    Ready {
        exam_id: ExamId,
        view_path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashView {
    pub text: String,
    pub severity: FlashSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadFormView {
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub upload_enabled: bool,
    pub progress_visible: bool,
    pub success_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteModalView {
    pub exam_id: ExamId,
    pub exam_name: String,
}

/// Human-readable size with up to two decimals, e.g. `4.77 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes_trim_trailing_zeros() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5_000_000), "4.77 MB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
    }
}
