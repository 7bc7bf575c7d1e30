use std::collections::BTreeSet;

use crate::core::state::EngineContext;
use crate::core::time::format_offset;
use crate::domain::models::{Attempt, TestDefinition};
use crate::domain::types::{ClipboardEventKind, Phase, SubmitTrigger};
use crate::engine::errors::EngineError;
use crate::engine::gate::{self, Eligibility};
use crate::engine::integrity::{ClipboardGuard, IntegrityMonitor, IntegritySignal};
use crate::engine::scoring;
use crate::engine::sheet::AnswerSheet;
use crate::engine::timer::CountdownTimer;
use crate::store::StoreError;

/// Completed attempt plus the display-only derivations the results view
/// needs: remediation tags and whether completion was forced.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub attempt: Attempt,
    pub remediation_tags: BTreeSet<String>,
    pub trigger: SubmitTrigger,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Completed(AttemptOutcome),
    /// A submit request raced an in-flight or finished submission and was
    /// dropped; at most one attempt is created per testing session.
    Ignored,
}

/// State machine for one student taking one test: start → testing →
/// submitting → results, with timer expiry, integrity force-submit and
/// manual submit converging on the same submission path.
#[derive(Debug)]
pub struct ExamFlow {
    ctx: EngineContext,
    test: TestDefinition,
    prior_attempts: Vec<Attempt>,
    phase: Phase,
    sheet: AnswerSheet,
    monitor: IntegrityMonitor,
    clipboard: ClipboardGuard,
    timer: CountdownTimer,
    outcome: Option<AttemptOutcome>,
}

impl ExamFlow {
    /// Fetches the test definition and attempt history; starts in `Start`.
    pub async fn load(ctx: EngineContext, test_id: &str) -> Result<Self, EngineError> {
        let test = match ctx.store().fetch_test(test_id).await {
            Ok(test) => test,
            Err(StoreError::NotFound(_)) => {
                return Err(EngineError::TestNotFound(test_id.to_string()))
            }
            Err(err) => return Err(EngineError::Store(err)),
        };
        let prior_attempts = ctx.store().fetch_attempts(test_id).await?;

        let sheet = AnswerSheet::new(&test);
        let monitor = IntegrityMonitor::new(ctx.settings().integrity().warning_threshold);
        let clipboard =
            ClipboardGuard::new(ctx.settings().integrity().clipboard_suppressed.clone());
        let timer = CountdownTimer::new(test.time_limit_seconds().unwrap_or(0));

        Ok(Self {
            ctx,
            test,
            prior_attempts,
            phase: Phase::Start,
            sheet,
            monitor,
            clipboard,
            timer,
            outcome: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn test(&self) -> &TestDefinition {
        &self.test
    }

    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.prior_attempts
    }

    pub fn outcome(&self) -> Option<&AttemptOutcome> {
        self.outcome.as_ref()
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Refetches history and evaluates the gate live, so overrides applied
    /// since the last look are observed.
    pub async fn eligibility(&mut self) -> Result<Eligibility, EngineError> {
        self.prior_attempts = self.ctx.store().fetch_attempts(&self.test.id).await?;
        Ok(gate::evaluate(&self.prior_attempts, self.test.max_attempts))
    }

    /// `start → testing`: permitted only while the gate allows it. Resets
    /// the sheet and monitor, arms the clipboard guard, and starts the
    /// countdown iff the test carries a time limit.
    pub async fn begin(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Start {
            return Err(EngineError::InvalidPhase(self.phase));
        }

        let eligibility = self.eligibility().await?;
        if !eligibility.permitted() {
            return Err(EngineError::NotEligible(eligibility));
        }

        self.sheet = AnswerSheet::new(&self.test);
        self.monitor.activate();
        self.clipboard.activate();
        self.timer = CountdownTimer::new(self.test.time_limit_seconds().unwrap_or(0));
        self.timer.start(self.ctx.clock().now());
        self.outcome = None;
        self.phase = Phase::Testing;

        tracing::info!(
            test_id = %self.test.id,
            attempt_number = self.prior_attempts.len() as u32 + 1,
            time_limit_minutes = ?self.test.time_limit_minutes,
            "attempt started"
        );

        Ok(())
    }

    pub fn select_answer(&mut self, question_id: &str, option_id: &str) -> Result<(), EngineError> {
        self.ensure_testing()?;
        self.sheet.select_answer(question_id, option_id)
    }

    pub fn toggle_flag(&mut self, question_id: &str) -> Result<bool, EngineError> {
        self.ensure_testing()?;
        self.sheet.toggle_flag(question_id)
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), EngineError> {
        self.ensure_testing()?;
        self.sheet.go_to(index);
        Ok(())
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.timer.remaining_seconds(self.ctx.clock().now())
    }

    pub fn progress_percent(&self) -> f64 {
        self.timer.progress_percent(self.ctx.clock().now())
    }

    /// True exactly once when the countdown runs out; the caller then
    /// submits with `SubmitTrigger::TimeExpired`.
    pub fn poll_timer(&mut self) -> bool {
        if self.phase != Phase::Testing {
            return false;
        }
        self.timer.poll_expiry(self.ctx.clock().now())
    }

    pub fn handle_focus_loss(&mut self) -> Option<IntegritySignal> {
        if self.phase != Phase::Testing {
            return None;
        }
        let signal = self.monitor.record_focus_loss();
        if let Some(IntegritySignal::Warning { count, remaining }) = signal {
            tracing::warn!(
                test_id = %self.test.id,
                count,
                remaining,
                "focus lost during attempt"
            );
        }
        signal
    }

    pub fn acknowledge_warning(&mut self) {
        self.monitor.acknowledge_warning();
    }

    pub fn warning_count(&self) -> u32 {
        self.monitor.warning_count()
    }

    pub fn clipboard_blocks(&self, kind: ClipboardEventKind) -> bool {
        self.clipboard.blocks(kind)
    }

    /// `testing → submitting → results`. Re-entrant calls while submitting
    /// or after results are ignored, so racing triggers (expiry vs. third
    /// warning vs. manual) produce exactly one attempt. On a store failure
    /// the session returns to testing with every answer preserved.
    pub async fn submit(&mut self, trigger: SubmitTrigger) -> Result<SubmitOutcome, EngineError> {
        match self.phase {
            Phase::Testing => {}
            Phase::Submitting | Phase::Results => return Ok(SubmitOutcome::Ignored),
            Phase::Start => return Err(EngineError::InvalidPhase(Phase::Start)),
        }

        self.phase = Phase::Submitting;
        self.monitor.deactivate();
        self.clipboard.deactivate();

        let answers = self.sheet.to_answers();
        match self.ctx.store().submit_attempt(&self.test.id, &answers).await {
            Ok(attempt) => {
                self.timer.reset();
                let remediation_tags = scoring::remediation_tags(&self.test, &answers);
                let outcome = AttemptOutcome { attempt, remediation_tags, trigger };
                self.prior_attempts.push(outcome.attempt.clone());
                self.outcome = Some(outcome.clone());
                self.phase = Phase::Results;

                tracing::info!(
                    test_id = %self.test.id,
                    attempt_id = %outcome.attempt.id,
                    score = outcome.attempt.score,
                    passed = outcome.attempt.passed,
                    trigger = ?trigger,
                    created_at = %format_offset(outcome.attempt.created_at),
                    "attempt scored"
                );

                Ok(SubmitOutcome::Completed(outcome))
            }
            Err(err) => {
                // Student work survives the failure; the monitor resumes
                // with its counter intact.
                self.phase = Phase::Testing;
                self.monitor.resume();
                self.clipboard.activate();
                tracing::error!(
                    test_id = %self.test.id,
                    error = %err,
                    "attempt submission failed; answers preserved"
                );
                Err(EngineError::SubmitFailed(err))
            }
        }
    }

    /// Navigating away mid-attempt: cancel the timer, detach the monitor,
    /// discard the sheet. No attempt record is created. A no-op outside
    /// `Testing`.
    pub fn abandon(&mut self) {
        if self.phase != Phase::Testing {
            return;
        }
        self.timer.reset();
        self.monitor.deactivate();
        self.clipboard.deactivate();
        self.sheet = AnswerSheet::new(&self.test);
        self.phase = Phase::Start;
        tracing::info!(test_id = %self.test.id, "attempt abandoned");
    }

    fn ensure_testing(&self) -> Result<(), EngineError> {
        if self.phase != Phase::Testing {
            return Err(EngineError::InvalidPhase(self.phase));
        }
        Ok(())
    }
}
