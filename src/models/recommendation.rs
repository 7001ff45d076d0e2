use serde::{Deserialize, Serialize};

/// Route of the posture analysis endpoint.
pub const UPLOAD_PATH: &str = "/api/upload-photo";
/// Multipart field that carries the photo.
pub const PHOTO_FIELD: &str = "photo";

/// Qualitative posture verdict. Ordered from best to worst so that the
/// worse of two ratings is simply the `max`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PostureRating {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub posture_rating: PostureRating,
    pub tips: Vec<String>,
}

impl Recommendation {
    pub fn new<I, S>(posture_rating: PostureRating, tips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            posture_rating,
            tips: tips.into_iter().map(Into::into).collect(),
        }
    }

    /// Fold another recommendation into this one: the worse rating wins and
    /// tips are appended in first-seen order without duplicates.
    pub fn merge(mut self, other: Recommendation) -> Self {
        self.posture_rating = self.posture_rating.max(other.posture_rating);
        for tip in other.tips {
            if !self.tips.contains(&tip) {
                self.tips.push(tip);
            }
        }
        self
    }
}

/// Body of a successful `POST /api/upload-photo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub recommendation: Recommendation,
}

/// Body of a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
