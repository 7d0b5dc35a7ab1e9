use std::fs;
use std::io;
use std::path::Path;

use examdash_core::{FileCandidate, PDF_MIME};

/// Describes a local file the way a file picker would: name, type and size.
pub fn candidate_from_path(path: &Path) -> io::Result<FileCandidate> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileCandidate {
        path: path.to_path_buf(),
        name,
        mime: guess_mime(path).to_string(),
        size: meta.len(),
    })
}

/// Type is decided by extension alone; contents are never sniffed.
pub fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => PDF_MIME,
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert_eq!(guess_mime(Path::new("exam.pdf")), PDF_MIME);
        assert_eq!(guess_mime(Path::new("EXAM.PDF")), PDF_MIME);
        assert_eq!(guess_mime(Path::new("notes.txt")), "text/plain");
        assert_eq!(guess_mime(Path::new("no_extension")), "application/octet-stream");
    }

    #[test]
    fn candidate_reports_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exam.pdf");
        fs::write(&path, vec![0u8; 2048]).unwrap();

        let candidate = candidate_from_path(&path).unwrap();
        assert_eq!(candidate.name, "exam.pdf");
        assert_eq!(candidate.mime, PDF_MIME);
        assert_eq!(candidate.size, 2048);
        assert_eq!(candidate.path, path);
    }

    #[test]
    fn directories_and_missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(candidate_from_path(dir.path()).is_err());
        assert!(candidate_from_path(&PathBuf::from("/definitely/not/here.pdf")).is_err());
    }
}
