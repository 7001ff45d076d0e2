use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// Unique across the whole catalog.
    pub key: String,
    pub prompt: String,
    pub options: Vec<String>,
}

impl Question {
    pub fn new(key: &str, prompt: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            prompt: prompt.to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub description: String,
    /// Presentational icon identifier, never interpreted here.
    pub icon: String,
    pub questions: Vec<Question>,
}

const YES_NO: &[&str] = &["Yes", "No"];

/// The built-in ergonomic questionnaire.
pub fn default_catalog() -> Vec<Category> {
    vec![
        Category {
            name: "Desk Setup".into(),
            description: "Let's start with your desk and workspace positioning.".into(),
            icon: "monitor".into(),
            questions: vec![Question::new(
                "deskHeight",
                "Is your desk height comfortable?",
                YES_NO,
            )],
        },
        Category {
            name: "Chair & Posture".into(),
            description: "Let's check your chair and posture.".into(),
            icon: "armchair".into(),
            questions: vec![Question::new(
                "chairSupport",
                "Does your chair provide good back support?",
                YES_NO,
            )],
        },
        Category {
            name: "Keyboard & Mouse".into(),
            description: "Let's review your keyboard and mouse setup.".into(),
            icon: "keyboard".into(),
            questions: vec![Question::new(
                "keyboardPosition",
                "Is your keyboard at a comfortable position?",
                YES_NO,
            )],
        },
        Category {
            name: "Lighting".into(),
            description: "Let's check your workspace lighting.".into(),
            icon: "lightbulb".into(),
            questions: vec![Question::new(
                "lighting",
                "Is your workspace lighting adequate?",
                YES_NO,
            )],
        },
    ]
}
