use std::collections::{BTreeSet, HashMap};

use crate::domain::models::{Answer, TestDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: u8,
    pub passed: bool,
}

/// Scores a submission against the test's answer key. A question is correct
/// iff the selected option id equals the correct option id exactly; empty or
/// missing selections never match.
pub fn evaluate(test: &TestDefinition, answers: &[Answer]) -> ScoreOutcome {
    let selections: HashMap<&str, &str> = answers
        .iter()
        .map(|answer| (answer.question_id.as_str(), answer.selected_option_id.as_str()))
        .collect();

    let total_questions = test.question_count();
    let correct_count = test
        .questions
        .iter()
        .filter(|question| {
            selections
                .get(question.id.as_str())
                .is_some_and(|selected| !selected.is_empty() && *selected == question.correct_option_id)
        })
        .count();

    let score = percent_rounded(correct_count, total_questions);

    ScoreOutcome {
        correct_count,
        total_questions,
        score,
        passed: score >= test.passing_score,
    }
}

/// Tags of every incorrectly answered question, deduplicated for display.
/// Derived on demand, never stored on the attempt.
pub fn remediation_tags(test: &TestDefinition, answers: &[Answer]) -> BTreeSet<String> {
    let selections: HashMap<&str, &str> = answers
        .iter()
        .map(|answer| (answer.question_id.as_str(), answer.selected_option_id.as_str()))
        .collect();

    test.questions
        .iter()
        .filter(|question| {
            !selections
                .get(question.id.as_str())
                .is_some_and(|selected| !selected.is_empty() && *selected == question.correct_option_id)
        })
        .flat_map(|question| question.tags.iter().cloned())
        .collect()
}

/// Percentage rounded half-up, pinned with integer arithmetic so exact .5
/// boundaries round away from fail: (200·correct + total) / (2·total).
fn percent_rounded(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as u8
}
