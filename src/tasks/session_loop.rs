use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::domain::types::SubmitTrigger;
use crate::engine::errors::EngineError;
use crate::engine::integrity::IntegritySignal;
use crate::engine::lifecycle::{AttemptOutcome, ExamFlow, SubmitOutcome};

/// Host-issued commands for an active session.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    SelectAnswer { question_id: String, option_id: String },
    ToggleFlag { question_id: String },
    GoTo { index: usize },
    AcknowledgeWarning,
    Submit,
    Abandon,
}

/// Notifications pushed back to the host UI.
#[derive(Debug)]
pub enum SessionEvent {
    IntegrityWarning { count: u32, remaining: u32 },
    Completed(AttemptOutcome),
    SubmitFailed { transient: bool, message: String },
    Rejected { message: String },
}

/// Drives one attempt from begin to completion or abandonment. Timer ticks,
/// focus-loss signals and host commands are serialized through one
/// `select!` loop, so racing submission triggers funnel into the flow's
/// re-entrancy guard and at most one attempt is created. Dropping the
/// shutdown sender (or either input channel) abandons an in-progress
/// attempt without submitting: the tick schedule stops with the loop.
pub async fn run(
    mut flow: ExamFlow,
    mut focus_rx: mpsc::Receiver<()>,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    events_tx: mpsc::Sender<SessionEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    flow.begin().await?;

    let tick_seconds = flow.context().settings().timer().tick_interval_seconds;
    let mut ticks = interval(Duration::from_secs(tick_seconds));
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if flow.poll_timer() {
                    if submit(&mut flow, SubmitTrigger::TimeExpired, &events_tx).await {
                        break;
                    }
                }
            }
            focus = focus_rx.recv() => {
                match focus {
                    Some(()) => match flow.handle_focus_loss() {
                        Some(IntegritySignal::Warning { count, remaining }) => {
                            send_event(
                                &events_tx,
                                SessionEvent::IntegrityWarning { count, remaining },
                            )
                            .await;
                        }
                        Some(IntegritySignal::ForceSubmit) => {
                            if submit(&mut flow, SubmitTrigger::IntegrityForced, &events_tx).await {
                                break;
                            }
                        }
                        None => {}
                    },
                    None => {
                        flow.abandon();
                        break;
                    }
                }
            }
            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::Submit) => {
                        if submit(&mut flow, SubmitTrigger::Manual, &events_tx).await {
                            break;
                        }
                    }
                    Some(SessionCommand::Abandon) => {
                        flow.abandon();
                        break;
                    }
                    Some(command) => apply_command(&mut flow, command, &events_tx).await,
                    None => {
                        flow.abandon();
                        break;
                    }
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    flow.abandon();
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn apply_command(
    flow: &mut ExamFlow,
    command: SessionCommand,
    events_tx: &mpsc::Sender<SessionEvent>,
) {
    let result = match command {
        SessionCommand::SelectAnswer { question_id, option_id } => {
            flow.select_answer(&question_id, &option_id)
        }
        SessionCommand::ToggleFlag { question_id } => flow.toggle_flag(&question_id).map(|_| ()),
        SessionCommand::GoTo { index } => flow.go_to(index),
        SessionCommand::AcknowledgeWarning => {
            flow.acknowledge_warning();
            Ok(())
        }
        // Submit and Abandon are handled in the main loop.
        SessionCommand::Submit | SessionCommand::Abandon => Ok(()),
    };

    if let Err(err) = result {
        tracing::warn!(error = %err, "session command rejected");
        send_event(events_tx, SessionEvent::Rejected { message: err.to_string() }).await;
    }
}

/// Returns `true` when the session is finished and the loop should exit.
async fn submit(
    flow: &mut ExamFlow,
    trigger: SubmitTrigger,
    events_tx: &mpsc::Sender<SessionEvent>,
) -> bool {
    match flow.submit(trigger).await {
        Ok(SubmitOutcome::Completed(outcome)) => {
            send_event(events_tx, SessionEvent::Completed(outcome)).await;
            true
        }
        Ok(SubmitOutcome::Ignored) => false,
        Err(EngineError::SubmitFailed(err)) => {
            send_event(
                events_tx,
                SessionEvent::SubmitFailed {
                    transient: err.is_transient(),
                    message: err.to_string(),
                },
            )
            .await;
            false
        }
        Err(err) => {
            tracing::error!(error = %err, "submission failed terminally");
            send_event(events_tx, SessionEvent::Rejected { message: err.to_string() }).await;
            true
        }
    }
}

async fn send_event(events_tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if events_tx.send(event).await.is_err() {
        tracing::warn!("session event receiver dropped");
    }
}
