use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::types::{Difficulty, TestCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<AnswerOption>,
    pub correct_option_id: String,
    pub tags: BTreeSet<String>,
    pub difficulty: Option<Difficulty>,
}

impl Question {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}

/// Immutable test definition, owned by the store once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub id: String,
    pub title: String,
    pub course_id: String,
    pub category: TestCategory,
    pub questions: Vec<Question>,
    pub passing_score: u8,
    pub max_attempts: u32,
    pub time_limit_minutes: Option<u32>,
}

impl TestDefinition {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// `None` means the attempt has no timer.
    pub fn time_limit_seconds(&self) -> Option<u64> {
        self.time_limit_minutes.map(|minutes| u64::from(minutes) * 60)
    }
}

/// One selection per question; an empty `selected_option_id` marks the
/// question as unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub selected_option_id: String,
}

impl Answer {
    pub fn is_answered(&self) -> bool {
        !self.selected_option_id.is_empty()
    }
}

/// Historical record of one scored submission. Never mutated after scoring,
/// except for the admin override that flips `passed` without touching `score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: String,
    pub test_id: String,
    pub answers: Vec<Answer>,
    pub attempt_number: u32,
    pub score: u8,
    pub passed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
