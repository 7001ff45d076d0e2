use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Best-effort MIME detection from the payload's magic bytes.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

/// A photo as received by the analysis endpoint, before it is stored.
#[derive(Debug, Clone)]
pub struct IncomingPhoto {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl IncomingPhoto {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let mime_type = detect_mime(&bytes).map(str::to_string);
        Self {
            bytes,
            file_name: None,
            mime_type,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPhoto {
    pub id: String,
    /// Arrival order within the store, starting at 1.
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: u64,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl StoredPhoto {
    pub fn from_incoming(photo: IncomingPhoto, sequence: u64, received_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sequence,
            received_at,
            file_name: photo.file_name,
            mime_type: photo.mime_type,
            size_bytes: photo.bytes.len() as u64,
            bytes: photo.bytes,
        }
    }
}
