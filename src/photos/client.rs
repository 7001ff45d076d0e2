use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::{
    log_error, log_warn,
    models::{ErrorBody, Recommendation, UploadResponse, PHOTO_FIELD, UPLOAD_PATH},
    notify::{Notifier, ToastKind},
};

use super::selection::{
    select_files, PhotoFile, PhotoSelection, MAX_PHOTOS_PER_SUBMISSION, TRUNCATION_NOTICE,
};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("select at least one photo to analyze")]
    NoPhotosSelected,
    #[error("an analysis request is already in flight")]
    Busy,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("analysis service rejected the photo ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

/// Sends a single photo to the analysis service.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn analyze(&self, photo: &PhotoFile) -> Result<Recommendation, SubmissionError>;
}

/// Multipart upload to `POST {base_url}/api/upload-photo`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn analyze(&self, photo: &PhotoFile) -> Result<Recommendation, SubmissionError> {
        let mime = photo
            .mime_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let part = Part::bytes(photo.bytes.to_vec())
            .file_name(photo.name.clone())
            .mime_str(mime)?;
        let form = Form::new().part(PHOTO_FIELD, part);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            return Err(SubmissionError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await?;
        serde_json::from_slice::<UploadResponse>(&body)
            .map(|parsed| parsed.recommendation)
            .map_err(|err| SubmissionError::MalformedResponse(err.to_string()))
    }
}

/// Clears the busy flag once the submission has resolved, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Packages a selection of photos for analysis. At most one submission is
/// in flight per client; failures are returned as-is and never retried.
pub struct PhotoSubmissionClient<T: AnalysisTransport> {
    transport: T,
    notifier: Arc<dyn Notifier>,
    busy: AtomicBool,
}

impl<T: AnalysisTransport> PhotoSubmissionClient<T> {
    pub fn new(transport: T, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Apply the selection cap and surface the truncation warning.
    pub fn select_files(&self, files: Vec<PhotoFile>) -> PhotoSelection {
        let requested = files.len();
        let selection = select_files(files);
        if let Some(notice) = selection.notice {
            log_warn!(
                "Photo selection truncated from {} to {} files",
                requested,
                selection.files.len()
            );
            self.notifier.notify(notice, ToastKind::Warning);
        }
        selection
    }

    /// Analyze every selected photo, one request each, in order. The
    /// per-photo results are merged into a single recommendation. Photos
    /// past the per-submission cap are dropped with the truncation warning.
    pub async fn submit(&self, selected: &[PhotoFile]) -> Result<Recommendation, SubmissionError> {
        if selected.is_empty() {
            return Err(SubmissionError::NoPhotosSelected);
        }
        let selected = if selected.len() > MAX_PHOTOS_PER_SUBMISSION {
            log_warn!(
                "Submission of {} photos capped at {}",
                selected.len(),
                MAX_PHOTOS_PER_SUBMISSION
            );
            self.notifier.notify(TRUNCATION_NOTICE, ToastKind::Warning);
            &selected[..MAX_PHOTOS_PER_SUBMISSION]
        } else {
            selected
        };
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmissionError::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        let mut merged: Option<Recommendation> = None;
        for photo in selected {
            let recommendation = match self.transport.analyze(photo).await {
                Ok(recommendation) => recommendation,
                Err(err) => {
                    log_error!("Posture analysis failed for {}: {}", photo.name, err);
                    return Err(err);
                }
            };
            merged = Some(match merged {
                Some(current) => current.merge(recommendation),
                None => recommendation,
            });
        }

        merged.ok_or(SubmissionError::NoPhotosSelected)
    }
}
