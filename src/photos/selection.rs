use bytes::Bytes;

use crate::models::detect_mime;

pub const MAX_PHOTOS_PER_SUBMISSION: usize = 5;
pub const TRUNCATION_NOTICE: &str = "You can upload a maximum of 5 photos at once.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub name: String,
    pub bytes: Bytes,
    pub mime_type: Option<String>,
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let mime_type = detect_mime(&bytes).map(str::to_string);
        Self {
            name: name.into(),
            bytes,
            mime_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSelection {
    pub files: Vec<PhotoFile>,
    /// Set when files beyond the cap were dropped.
    pub notice: Option<&'static str>,
}

/// Keep at most [`MAX_PHOTOS_PER_SUBMISSION`] files. Extra files are cut
/// off, never rejected, and the caller gets a notice to show.
pub fn select_files(mut files: Vec<PhotoFile>) -> PhotoSelection {
    let notice = if files.len() > MAX_PHOTOS_PER_SUBMISSION {
        files.truncate(MAX_PHOTOS_PER_SUBMISSION);
        Some(TRUNCATION_NOTICE)
    } else {
        None
    };
    PhotoSelection { files, notice }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(count: usize) -> Vec<PhotoFile> {
        (0..count)
            .map(|i| PhotoFile::new(format!("photo-{i}.jpg"), vec![i as u8; 4]))
            .collect()
    }

    #[test]
    fn seven_files_are_capped_with_notice() {
        let selection = select_files(files(7));
        assert_eq!(selection.files.len(), 5);
        assert_eq!(selection.files[4].name, "photo-4.jpg");
        assert_eq!(selection.notice, Some(TRUNCATION_NOTICE));
    }

    #[test]
    fn small_selections_pass_through() {
        let selection = select_files(files(3));
        assert_eq!(selection.files.len(), 3);
        assert_eq!(selection.notice, None);

        assert_eq!(select_files(files(5)).notice, None);
        assert!(select_files(Vec::new()).files.is_empty());
    }
}
