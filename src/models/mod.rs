mod photo;
mod recommendation;

pub use photo::{detect_mime, IncomingPhoto, StoredPhoto};
pub use recommendation::{
    ErrorBody, PostureRating, Recommendation, UploadResponse, PHOTO_FIELD, UPLOAD_PATH,
};
