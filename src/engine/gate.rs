use std::fmt;

use crate::domain::models::Attempt;

/// Live eligibility decision for starting a new attempt. Always derived
/// from freshly fetched history, never cached, so an instructor override
/// on an old attempt is observed on the next evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// A passed attempt denies permanently, regardless of remaining budget.
    AlreadyPassed,
    AttemptsExhausted,
}

impl Eligibility {
    pub fn permitted(self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible => write!(f, "eligible"),
            Eligibility::AlreadyPassed => write!(f, "test already passed"),
            Eligibility::AttemptsExhausted => write!(f, "maximum attempts reached"),
        }
    }
}

pub fn evaluate(prior_attempts: &[Attempt], max_attempts: u32) -> Eligibility {
    if prior_attempts.iter().any(|attempt| attempt.passed) {
        return Eligibility::AlreadyPassed;
    }
    if prior_attempts.len() as u32 >= max_attempts {
        return Eligibility::AttemptsExhausted;
    }
    Eligibility::Eligible
}

pub fn can_attempt(prior_attempts: &[Attempt], max_attempts: u32) -> bool {
    evaluate(prior_attempts, max_attempts).permitted()
}
