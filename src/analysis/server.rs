use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use tokio::{net::TcpListener, sync::mpsc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::{ErrorBody, IncomingPhoto, UploadResponse, PHOTO_FIELD, UPLOAD_PATH};

use super::{analyzer::PostureAnalyzer, store::PhotoStore};

pub const NO_PHOTO_MESSAGE: &str = "No photo uploaded";

#[derive(Clone)]
pub struct ApiState {
    pub analyzer: Arc<dyn PostureAnalyzer>,
    pub store: Arc<dyn PhotoStore>,
    recorder: PhotoRecorder,
}

impl ApiState {
    /// Must be called inside a tokio runtime: the background writer for
    /// `store` is spawned here.
    pub fn new(analyzer: Arc<dyn PostureAnalyzer>, store: Arc<dyn PhotoStore>) -> Self {
        let recorder = PhotoRecorder::spawn(store.clone());
        Self {
            analyzer,
            store,
            recorder,
        }
    }
}

/// Queues uploads for a single writer task so the handler never waits on
/// the store and photos are appended in arrival order.
#[derive(Clone)]
struct PhotoRecorder {
    queue: mpsc::UnboundedSender<IncomingPhoto>,
}

impl PhotoRecorder {
    fn spawn(store: Arc<dyn PhotoStore>) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<IncomingPhoto>();
        tokio::spawn(async move {
            while let Some(photo) = pending.recv().await {
                match store.append(photo).await {
                    Ok(stored) => info!(
                        "Stored photo #{} ({} bytes, {})",
                        stored.sequence,
                        stored.size_bytes,
                        stored.mime_type.as_deref().unwrap_or("unknown format")
                    ),
                    Err(err) => warn!("Failed to store uploaded photo: {err:#}"),
                }
            }
        });
        Self { queue }
    }

    fn record(&self, photo: IncomingPhoto) {
        if self.queue.send(photo).is_err() {
            warn!("Photo writer has stopped; upload was not stored");
        }
    }
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn no_photo() -> Self {
        Self::new(StatusCode::BAD_REQUEST, NO_PHOTO_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub fn router(state: ApiState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(UPLOAD_PATH, post(upload_photo))
        .route("/api/photos", get(list_photos))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on an already bound listener until the server stops.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Posture analysis API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn upload_photo(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::no_photo())?;
    let photo = read_photo(multipart).await?.ok_or_else(ApiError::no_photo)?;

    // The store is an audit trail; recording must not delay or fail the request.
    state.recorder.record(photo.clone());

    let recommendation = state.analyzer.analyze(&photo).await.map_err(|err| {
        error!("Posture analysis failed: {err:#}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Posture analysis failed")
    })?;

    Ok(Json(UploadResponse { recommendation }))
}

/// First non-empty `photo` field of the form, if any.
async fn read_photo(mut multipart: Multipart) -> Result<Option<IncomingPhoto>, ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::new(err.status(), err.body_text()))?;
        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::new(err.status(), err.body_text()))?;
        if bytes.is_empty() {
            continue;
        }

        let mut photo = IncomingPhoto::new(bytes);
        if photo.mime_type.is_none() {
            photo.mime_type = declared_type;
        }
        if let Some(file_name) = file_name {
            photo = photo.with_file_name(file_name);
        }
        return Ok(Some(photo));
    }
}

async fn list_photos(State(state): State<ApiState>) -> Response {
    match state.store.list().await {
        Ok(photos) => Json(photos).into_response(),
        Err(err) => {
            error!("Failed to list stored photos: {err:#}");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list photos").into_response()
        }
    }
}
