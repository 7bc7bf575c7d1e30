use thiserror::Error;

use crate::domain::types::Phase;
use crate::engine::gate::Eligibility;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("test not found: {0}")]
    TestNotFound(String),
    /// Attempt blocked by the history gate; not retryable without changed
    /// circumstances (e.g. an instructor override).
    #[error("attempt not permitted: {0}")]
    NotEligible(Eligibility),
    #[error("operation not valid in the {0:?} phase")]
    InvalidPhase(Phase),
    /// Session invariant violations: the active sheet never references a
    /// question or option outside the current test.
    #[error("question {0} is not part of the active test")]
    UnknownQuestion(String),
    #[error("option {option_id} is not part of question {question_id}")]
    UnknownOption { question_id: String, option_id: String },
    /// Submission failed; the session returned to testing with all answers
    /// preserved. Retryable when the underlying failure is transient.
    #[error("submission failed: {0}")]
    SubmitFailed(StoreError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::SubmitFailed(err) if err.is_transient())
    }
}
