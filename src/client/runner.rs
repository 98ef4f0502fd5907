//! Reconnect supervision: resolve, run a session, wait, repeat.
//!
//! The loop runs until explicitly stopped. Chat session ids rotate between
//! broadcasts, so recovery always goes back through resolution rather than
//! reconnecting to a possibly stale id.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::sleep;

use crate::client::ViewerUpdate;
use crate::client::session::{self, SessionEnd};
use crate::error::ResolveError;
use crate::resolver::ChannelResolver;

/// Fixed delay between attempts. Retries are unbounded; a channel may go
/// live hours after the viewer was started.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Supervisor states. `Connected` carries the chat session id resolved for
/// this attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorState {
    Resolving,
    Connected(String),
    Waiting,
    Stopped,
}

/// Transition taken after a resolution attempt.
fn after_resolve(outcome: Result<String, &ResolveError>) -> SupervisorState {
    match outcome {
        Ok(chat_channel_id) => SupervisorState::Connected(chat_channel_id),
        Err(_) => SupervisorState::Waiting,
    }
}

/// Transition taken after a session ends.
fn after_session(end: &SessionEnd) -> SupervisorState {
    match end {
        SessionEnd::Stopped => SupervisorState::Stopped,
        SessionEnd::Disconnected(_) => SupervisorState::Waiting,
    }
}

/// Drive the resolve/connect/wait loop for `channel_id` until the stop
/// signal is raised. Never returns an error: every failure mode is either
/// retried or reported as a status line.
pub async fn run_supervisor(
    channel_id: String,
    updates: mpsc::UnboundedSender<ViewerUpdate>,
    stop: watch::Receiver<bool>,
) {
    run_supervisor_with_resolver(ChannelResolver::new(), channel_id, updates, stop).await
}

/// Same loop with the resolver supplied by the caller, so tests can point
/// it at a local responder.
pub async fn run_supervisor_with_resolver(
    resolver: ChannelResolver,
    channel_id: String,
    updates: mpsc::UnboundedSender<ViewerUpdate>,
    mut stop: watch::Receiver<bool>,
) {
    let mut state = SupervisorState::Resolving;

    loop {
        if *stop.borrow() {
            state = SupervisorState::Stopped;
        }
        match state {
            SupervisorState::Stopped => {
                status(&updates, "viewer stopped".to_string());
                return;
            }
            SupervisorState::Resolving => {
                status(&updates, format!("resolving chat session for channel {channel_id}"));
                // resolution is a suspension point; a stop raised while the
                // request is pending must not wait for the response
                let outcome = tokio::select! {
                    outcome = resolver.resolve(&channel_id) => outcome,
                    _ = stop.changed() => {
                        state = SupervisorState::Stopped;
                        continue;
                    }
                };
                match &outcome {
                    Ok(chat_channel_id) => {
                        status(&updates, format!("chat session id: {chat_channel_id}"));
                    }
                    Err(e) if e.is_not_live() => {
                        status(
                            &updates,
                            format!("channel is not live; retrying in {}s", RECONNECT_DELAY.as_secs()),
                        );
                    }
                    Err(e) => {
                        status(
                            &updates,
                            format!("{e}; retrying in {}s", RECONNECT_DELAY.as_secs()),
                        );
                    }
                }
                state = after_resolve(outcome.as_ref().map(Clone::clone));
            }
            SupervisorState::Connected(chat_channel_id) => {
                let end =
                    session::run(&session::pick_endpoint(), &chat_channel_id, &updates, &stop).await;
                if matches!(end, SessionEnd::Disconnected(_)) {
                    status(
                        &updates,
                        format!("reconnecting in {}s", RECONNECT_DELAY.as_secs()),
                    );
                }
                state = after_session(&end);
            }
            SupervisorState::Waiting => {
                wait_for_retry(&mut stop).await;
                state = SupervisorState::Resolving;
            }
        }
    }
}

/// Sleep out the retry delay, returning early if the stop signal changes.
async fn wait_for_retry(stop: &mut watch::Receiver<bool>) {
    tokio::select! {
        _ = sleep(RECONNECT_DELAY) => {}
        _ = stop.changed() => {}
    }
}

fn status(updates: &mpsc::UnboundedSender<ViewerUpdate>, message: String) {
    let _ = updates.send(ViewerUpdate::Status(message));
}
