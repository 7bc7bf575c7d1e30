pub mod core;
pub mod domain;
pub mod engine;
pub mod store;
pub mod tasks;

#[cfg(test)]
mod test_support;

pub use crate::core::state::EngineContext;
pub use crate::engine::errors::EngineError;
pub use crate::engine::lifecycle::{AttemptOutcome, ExamFlow, SubmitOutcome};
pub use crate::store::{AssessmentStore, StoreError};
