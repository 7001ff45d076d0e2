pub mod catalog;
pub mod controller;
pub mod flow;

pub use catalog::{default_catalog, Category, Question};
pub use controller::{AssessmentError, QuestionnaireController};
pub use flow::{AssessmentFlow, AssessmentPhase, AssessmentReport, AssessmentTab};
