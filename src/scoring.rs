use crate::assessment::QuestionnaireController;

/// General ergonomic advice shown with every assessment result.
pub const GENERAL_TIPS: [&str; 4] = [
    "Maintain good posture and back support.",
    "Adjust your desk and chair for comfort.",
    "Ensure proper lighting in your workspace.",
    "Take regular breaks to avoid strain.",
];

/// Combines assessment signals into the wellness score.
///
/// Only questionnaire completion contributes today; photo analysis does not
/// yet carry a confidence value that could be weighted in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Percentage in `0..=100`.
    pub fn score(&self, questionnaire: &QuestionnaireController) -> u8 {
        questionnaire.progress_percent()
    }

    pub fn recommendation_list(&self) -> Vec<String> {
        GENERAL_TIPS.iter().map(|tip| tip.to_string()).collect()
    }
}
