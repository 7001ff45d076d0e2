use serde::Serialize;

use crate::models::Recommendation;
use crate::scoring::ScoreAggregator;

use super::controller::QuestionnaireController;

pub const CAPTURE_TIPS: [&str; 4] = [
    "Stand straight and face the camera.",
    "Ensure good lighting and a clear background.",
    "Capture side and front views for best results.",
    "Wear comfortable clothing that shows your posture.",
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AssessmentTab {
    Questions,
    Posture,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AssessmentPhase {
    Questions,
    Summary,
    PostureCapture,
    Results,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub score: u8,
    pub recommendations: Vec<String>,
    pub posture: Option<Recommendation>,
}

/// The two-part assessment: questionnaire first, then posture capture.
///
/// The questions tab shows either the questionnaire or its summary; the
/// posture tab shows either the capture screen or the final results. Tabs
/// can be switched freely, the summary only unlocks once the questionnaire
/// is complete.
#[derive(Debug, Clone)]
pub struct AssessmentFlow {
    questionnaire: QuestionnaireController,
    aggregator: ScoreAggregator,
    tab: AssessmentTab,
    summary_shown: bool,
    results_shown: bool,
    latest_analysis: Option<Recommendation>,
}

impl AssessmentFlow {
    pub fn new(questionnaire: QuestionnaireController) -> Self {
        Self {
            questionnaire,
            aggregator: ScoreAggregator::new(),
            tab: AssessmentTab::Questions,
            summary_shown: false,
            results_shown: false,
            latest_analysis: None,
        }
    }

    pub fn questionnaire(&self) -> &QuestionnaireController {
        &self.questionnaire
    }

    pub fn questionnaire_mut(&mut self) -> &mut QuestionnaireController {
        &mut self.questionnaire
    }

    pub fn tab(&self) -> AssessmentTab {
        self.tab
    }

    pub fn phase(&self) -> AssessmentPhase {
        match (self.tab, self.summary_shown, self.results_shown) {
            (AssessmentTab::Questions, false, _) => AssessmentPhase::Questions,
            (AssessmentTab::Questions, true, _) => AssessmentPhase::Summary,
            (AssessmentTab::Posture, _, false) => AssessmentPhase::PostureCapture,
            (AssessmentTab::Posture, _, true) => AssessmentPhase::Results,
        }
    }

    pub fn switch_tab(&mut self, tab: AssessmentTab) {
        self.tab = tab;
    }

    pub fn show_summary(&mut self) -> bool {
        if self.phase() != AssessmentPhase::Questions || !self.questionnaire.is_complete() {
            return false;
        }
        self.summary_shown = true;
        true
    }

    pub fn proceed_to_capture(&mut self) -> bool {
        if self.phase() != AssessmentPhase::Summary {
            return false;
        }
        self.tab = AssessmentTab::Posture;
        true
    }

    pub fn complete(&mut self) -> bool {
        if self.phase() != AssessmentPhase::PostureCapture {
            return false;
        }
        self.results_shown = true;
        true
    }

    pub fn back_to_assessment(&mut self) -> bool {
        if self.phase() != AssessmentPhase::Results {
            return false;
        }
        self.results_shown = false;
        true
    }

    pub fn record_analysis(&mut self, recommendation: Recommendation) {
        self.latest_analysis = Some(recommendation);
    }

    pub fn capture_tips(&self) -> &'static [&'static str] {
        &CAPTURE_TIPS
    }

    pub fn report(&self) -> AssessmentReport {
        AssessmentReport {
            score: self.aggregator.score(&self.questionnaire),
            recommendations: self.aggregator.recommendation_list(),
            posture: self.latest_analysis.clone(),
        }
    }
}
