use anyhow::Result;
use async_trait::async_trait;

use crate::models::{IncomingPhoto, PostureRating, Recommendation};

/// Turns one photo into a posture recommendation.
#[async_trait]
pub trait PostureAnalyzer: Send + Sync {
    async fn analyze(&self, photo: &IncomingPhoto) -> Result<Recommendation>;
}

/// Answers every photo with the same recommendation, regardless of content.
#[derive(Debug, Clone)]
pub struct FixedPostureAnalyzer {
    recommendation: Recommendation,
}

impl FixedPostureAnalyzer {
    pub fn new(recommendation: Recommendation) -> Self {
        Self { recommendation }
    }
}

impl Default for FixedPostureAnalyzer {
    fn default() -> Self {
        Self::new(Recommendation::new(
            PostureRating::Good,
            [
                "Keep your back straight",
                "Adjust your chair height",
                "Take regular breaks",
            ],
        ))
    }
}

#[async_trait]
impl PostureAnalyzer for FixedPostureAnalyzer {
    async fn analyze(&self, _photo: &IncomingPhoto) -> Result<Recommendation> {
        Ok(self.recommendation.clone())
    }
}
