use std::collections::{HashMap, HashSet};

use log::debug;
use thiserror::Error;

use super::catalog::{Category, Question};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("questionnaire needs at least one category")]
    EmptyCatalog,
    #[error("question key '{0}' appears more than once")]
    DuplicateQuestion(String),
    #[error("question '{0}' has no answer options")]
    NoOptions(String),
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("'{value}' is not an allowed answer for '{key}'")]
    InvalidOption { key: String, value: String },
}

/// Ordered, gated progression through the questionnaire categories.
///
/// Answers only ever accumulate during a session; re-answering a question
/// overwrites its previous value. Moving forward requires the current
/// category to be fully answered, moving backward is always allowed.
#[derive(Debug, Clone)]
pub struct QuestionnaireController {
    categories: Vec<Category>,
    current_index: usize,
    answers: HashMap<String, String>,
    total_questions: usize,
}

impl QuestionnaireController {
    pub fn new(categories: Vec<Category>) -> Result<Self, AssessmentError> {
        if categories.is_empty() {
            return Err(AssessmentError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for question in categories.iter().flat_map(|category| &category.questions) {
            if !seen.insert(question.key.as_str()) {
                return Err(AssessmentError::DuplicateQuestion(question.key.clone()));
            }
            if question.options.is_empty() {
                return Err(AssessmentError::NoOptions(question.key.clone()));
            }
        }
        let total_questions = seen.len();

        Ok(Self {
            categories,
            current_index: 0,
            answers: HashMap::new(),
            total_questions,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_category(&self) -> &Category {
        &self.categories[self.current_index]
    }

    pub fn is_last_category(&self) -> bool {
        self.current_index + 1 == self.categories.len()
    }

    fn find_question(&self, key: &str) -> Option<&Question> {
        self.categories
            .iter()
            .flat_map(|category| &category.questions)
            .find(|question| question.key == key)
    }

    /// Record an answer. Nothing is mutated when the key or value is rejected.
    pub fn answer(&mut self, key: &str, value: &str) -> Result<(), AssessmentError> {
        let question = self
            .find_question(key)
            .ok_or_else(|| AssessmentError::UnknownQuestion(key.to_string()))?;

        if !question.allows(value) {
            return Err(AssessmentError::InvalidOption {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        self.answers.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn answer_for(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn can_advance(&self) -> bool {
        self.current_category()
            .questions
            .iter()
            .all(|question| self.answers.contains_key(&question.key))
    }

    /// Move to the next category. Returns whether the index changed.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() || self.is_last_category() {
            debug!(
                "advance refused at category {} (complete: {})",
                self.current_index,
                self.can_advance()
            );
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Move to the previous category, floored at the first one.
    pub fn retreat(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.is_last_category() && self.can_advance()
    }

    /// Rounded share of answered questions, halves rounding up.
    pub fn progress_percent(&self) -> u8 {
        if self.total_questions == 0 {
            return 0;
        }
        let answered = self.answered_count();
        let total = self.total_questions;
        ((200 * answered + total) / (2 * total)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::catalog::default_catalog;

    fn two_by_two() -> Vec<Category> {
        let category = |name: &str, keys: [&str; 2]| Category {
            name: name.into(),
            description: String::new(),
            icon: String::new(),
            questions: keys
                .iter()
                .map(|key| Question::new(key, "?", &["Yes", "No"]))
                .collect(),
        };
        vec![category("A", ["a1", "a2"]), category("B", ["b1", "b2"])]
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert_eq!(
            QuestionnaireController::new(Vec::new()).unwrap_err(),
            AssessmentError::EmptyCatalog
        );

        let mut categories = two_by_two();
        categories[1].questions[0].key = "a1".into();
        assert_eq!(
            QuestionnaireController::new(categories).unwrap_err(),
            AssessmentError::DuplicateQuestion("a1".into())
        );

        let mut categories = two_by_two();
        categories[1].questions[1].options.clear();
        assert_eq!(
            QuestionnaireController::new(categories).unwrap_err(),
            AssessmentError::NoOptions("b2".into())
        );
    }

    #[test]
    fn invalid_answers_leave_state_untouched() {
        let mut controller = QuestionnaireController::new(two_by_two()).unwrap();
        assert_eq!(
            controller.answer("zz", "Yes"),
            Err(AssessmentError::UnknownQuestion("zz".into()))
        );
        assert!(matches!(
            controller.answer("a1", "Maybe"),
            Err(AssessmentError::InvalidOption { .. })
        ));
        assert_eq!(controller.answered_count(), 0);
    }

    #[test]
    fn answered_count_tracks_distinct_keys() {
        let mut controller = QuestionnaireController::new(two_by_two()).unwrap();
        for value in ["Yes", "No", "Yes"] {
            controller.answer("a1", value).unwrap();
        }
        controller.answer("b2", "No").unwrap();
        assert_eq!(controller.answered_count(), 2);
        assert_eq!(controller.answer_for("a1"), Some("Yes"));
    }

    #[test]
    fn gating_holds_at_every_boundary() {
        let mut controller = QuestionnaireController::new(two_by_two()).unwrap();

        // Answers in a later category do not open the current one.
        controller.answer("b1", "Yes").unwrap();
        controller.answer("b2", "Yes").unwrap();
        controller.answer("a1", "Yes").unwrap();
        assert!(!controller.can_advance());
        assert!(!controller.advance());
        assert_eq!(controller.current_index(), 0);

        controller.answer("a2", "No").unwrap();
        assert!(controller.can_advance());
        assert!(controller.advance());
        assert_eq!(controller.current_index(), 1);
        assert!(controller.can_advance());
        assert!(controller.is_complete());

        // Past the last category advance stays a no-op.
        assert!(!controller.advance());
        assert!(!controller.advance());
        assert_eq!(controller.current_index(), 1);
    }

    #[test]
    fn retreat_is_always_allowed_and_floored() {
        let mut controller = QuestionnaireController::new(two_by_two()).unwrap();
        assert!(!controller.retreat());
        for key in ["a1", "a2"] {
            controller.answer(key, "Yes").unwrap();
        }
        controller.advance();
        assert!(!controller.can_advance());
        assert!(controller.retreat());
        assert_eq!(controller.current_index(), 0);
    }

    #[test]
    fn progress_rounds_half_up() {
        let mut controller = QuestionnaireController::new(two_by_two()).unwrap();
        assert_eq!(controller.progress_percent(), 0);
        controller.answer("a1", "Yes").unwrap();
        controller.answer("b1", "Yes").unwrap();
        assert_eq!(controller.progress_percent(), 50);

        let mut eight = default_catalog();
        eight.extend(default_catalog().into_iter().map(|mut category| {
            for question in &mut category.questions {
                question.key.push_str("Again");
            }
            category
        }));
        let mut controller = QuestionnaireController::new(eight).unwrap();
        controller.answer("deskHeight", "Yes").unwrap();
        // 1 / 8 = 12.5%
        assert_eq!(controller.progress_percent(), 13);
    }

    #[test]
    fn default_catalog_completes_after_four_answers() {
        let mut controller = QuestionnaireController::new(default_catalog()).unwrap();
        for key in ["deskHeight", "chairSupport", "keyboardPosition", "lighting"] {
            controller.answer(key, "Yes").unwrap();
            controller.advance();
        }
        assert!(controller.is_complete());
        assert_eq!(controller.progress_percent(), 100);
    }
}
