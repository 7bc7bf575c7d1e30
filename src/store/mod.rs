pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{Answer, Attempt, TestDefinition};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transient store failure: {0}")]
    Transient(String),
    #[error("invalid data: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Transient failures leave the session retryable; everything else is
    /// surfaced to the host as terminal.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Capability set the engine needs from its backing service. Implementations
/// (network clients, mocks) live outside the engine; `MemoryStore` is the
/// in-process one used by embedders without a backend and by tests.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn fetch_test(&self, test_id: &str) -> Result<TestDefinition, StoreError>;

    /// Chronological, oldest first; `attempt_number` equals the 1-based
    /// position in the returned list.
    async fn fetch_attempts(&self, test_id: &str) -> Result<Vec<Attempt>, StoreError>;

    /// Scores and persists one attempt. The store owns the answer key.
    async fn submit_attempt(
        &self,
        test_id: &str,
        answers: &[Answer],
    ) -> Result<Attempt, StoreError>;

    /// Admin override: flips `passed` on a historical attempt without
    /// altering its score. The gate observes this on its next evaluation.
    async fn override_attempt(
        &self,
        attempt_id: &str,
        passed: bool,
        actor_id: &str,
    ) -> Result<(), StoreError>;
}
