use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestCategory {
    Prerequisite,
    PostCourse,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Lifecycle phase of one attempt session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Testing,
    Submitting,
    Results,
}

/// What pushed the session into submission. Forced completions (expiry,
/// integrity) are reported distinctly from a voluntary submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitTrigger {
    Manual,
    TimeExpired,
    IntegrityForced,
}

impl SubmitTrigger {
    pub fn is_forced(self) -> bool {
        matches!(self, SubmitTrigger::TimeExpired | SubmitTrigger::IntegrityForced)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardEventKind {
    Copy,
    Cut,
    Paste,
}
