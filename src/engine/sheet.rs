use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::models::{Answer, TestDefinition};
use crate::engine::errors::EngineError;

/// Ephemeral per-attempt state: selections, review flags and the current
/// position. Pure data, no side effects; discarded when the session ends.
#[derive(Debug, Clone)]
pub struct AnswerSheet {
    question_order: Vec<String>,
    option_ids: HashMap<String, HashSet<String>>,
    selections: HashMap<String, String>,
    flagged: BTreeSet<String>,
    current_index: usize,
}

impl AnswerSheet {
    pub fn new(test: &TestDefinition) -> Self {
        let question_order: Vec<String> =
            test.questions.iter().map(|question| question.id.clone()).collect();
        let option_ids = test
            .questions
            .iter()
            .map(|question| {
                (
                    question.id.clone(),
                    question.options.iter().map(|option| option.id.clone()).collect(),
                )
            })
            .collect();

        Self {
            question_order,
            option_ids,
            selections: HashMap::new(),
            flagged: BTreeSet::new(),
            current_index: 0,
        }
    }

    pub fn question_count(&self) -> usize {
        self.question_order.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Last write wins; selecting the empty string clears the answer. A
    /// question outside the test, or an option outside the question, is a
    /// programming error and fails loudly.
    pub fn select_answer(&mut self, question_id: &str, option_id: &str) -> Result<(), EngineError> {
        let options = self
            .option_ids
            .get(question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))?;

        if !option_id.is_empty() && !options.contains(option_id) {
            return Err(EngineError::UnknownOption {
                question_id: question_id.to_string(),
                option_id: option_id.to_string(),
            });
        }

        self.selections.insert(question_id.to_string(), option_id.to_string());
        Ok(())
    }

    pub fn selection(&self, question_id: &str) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    /// Idempotent set-membership toggle; returns whether the question is
    /// flagged afterwards.
    pub fn toggle_flag(&mut self, question_id: &str) -> Result<bool, EngineError> {
        if !self.option_ids.contains_key(question_id) {
            return Err(EngineError::UnknownQuestion(question_id.to_string()));
        }
        if self.flagged.remove(question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id.to_string());
            Ok(true)
        }
    }

    pub fn is_flagged(&self, question_id: &str) -> bool {
        self.flagged.contains(question_id)
    }

    /// Clamps out-of-range requests instead of erroring.
    pub fn go_to(&mut self, index: usize) {
        let last = self.question_order.len().saturating_sub(1);
        self.current_index = index.min(last);
    }

    pub fn next(&mut self) {
        self.go_to(self.current_index.saturating_add(1));
    }

    pub fn previous(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    pub fn answered_count(&self) -> usize {
        self.selections.values().filter(|selection| !selection.is_empty()).count()
    }

    /// Submission payload: one answer per test question in test order,
    /// unanswered questions carried with an empty selection so a forced
    /// submission never blocks on gaps.
    pub fn to_answers(&self) -> Vec<Answer> {
        self.question_order
            .iter()
            .map(|question_id| Answer {
                question_id: question_id.clone(),
                selected_option_id: self.selections.get(question_id).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn sheet() -> (TestDefinition, AnswerSheet) {
        let test = test_support::sample_test();
        let sheet = AnswerSheet::new(&test);
        (test, sheet)
    }

    #[test]
    fn last_write_wins() {
        let (test, mut sheet) = sheet();
        let question = &test.questions[0];
        let first = &question.options[0].id;
        let second = &question.options[1].id;

        sheet.select_answer(&question.id, first).expect("select");
        sheet.select_answer(&question.id, second).expect("reselect");
        assert_eq!(sheet.selection(&question.id), Some(second.as_str()));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn empty_selection_clears() {
        let (test, mut sheet) = sheet();
        let question = &test.questions[0];
        sheet.select_answer(&question.id, &question.options[0].id).expect("select");
        sheet.select_answer(&question.id, "").expect("clear");
        assert_eq!(sheet.answered_count(), 0);
    }

    #[test]
    fn unknown_question_fails_loudly() {
        let (_, mut sheet) = sheet();
        let err = sheet.select_answer("ghost", "a").expect_err("unknown question");
        assert!(matches!(err, EngineError::UnknownQuestion(_)));
        let err = sheet.toggle_flag("ghost").expect_err("unknown question");
        assert!(matches!(err, EngineError::UnknownQuestion(_)));
    }

    #[test]
    fn foreign_option_fails_loudly() {
        let (test, mut sheet) = sheet();
        let err = sheet
            .select_answer(&test.questions[0].id, "not-an-option")
            .expect_err("unknown option");
        assert!(matches!(err, EngineError::UnknownOption { .. }));
    }

    #[test]
    fn flag_toggle_is_idempotent_membership() {
        let (test, mut sheet) = sheet();
        let question_id = &test.questions[1].id;
        assert!(sheet.toggle_flag(question_id).expect("flag"));
        assert!(sheet.is_flagged(question_id));
        assert!(!sheet.toggle_flag(question_id).expect("unflag"));
        assert!(!sheet.is_flagged(question_id));
    }

    #[test]
    fn navigation_clamps() {
        let (test, mut sheet) = sheet();
        sheet.go_to(999);
        assert_eq!(sheet.current_index(), test.question_count() - 1);
        sheet.next();
        assert_eq!(sheet.current_index(), test.question_count() - 1);
        sheet.go_to(0);
        sheet.previous();
        assert_eq!(sheet.current_index(), 0);
    }

    #[test]
    fn to_answers_covers_every_question_in_order() {
        let (test, mut sheet) = sheet();
        let question = &test.questions[2];
        sheet.select_answer(&question.id, &question.correct_option_id).expect("select");

        let answers = sheet.to_answers();
        assert_eq!(answers.len(), test.question_count());
        for (answer, question) in answers.iter().zip(test.questions.iter()) {
            assert_eq!(answer.question_id, question.id);
        }
        assert_eq!(answers.iter().filter(|answer| answer.is_answered()).count(), 1);
    }
}
