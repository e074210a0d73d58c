//! Run progress events.
//!
//! The orchestrator reports what it is doing through a [`ProgressNotifier`].
//! Notification is fire-and-forget: delivery failures are swallowed and never
//! affect the run. Previews are truncated and never carry base64 payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::input::truncate_for_display;
use crate::llm::Usage;

/// Longest preview carried in a progress event.
pub const PREVIEW_LIMIT: usize = 2000;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressPayload {
    StageStarted {
        stage: String,
    },
    StageInput {
        stage: String,
        preview: String,
    },
    StageOutput {
        stage: String,
        preview: String,
        usage: Usage,
    },
    BranchTaken {
        branch: String,
    },
}

/// One progress event, stamped with the run it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: ProgressPayload,
}

pub trait ProgressNotifier: Send + Sync {
    fn notify(&self, event: ProgressEvent);
}

/// Per-run handle that stamps events with the run id and timestamp.
pub struct RunProgress<'a> {
    run_id: Uuid,
    notifier: &'a dyn ProgressNotifier,
}

impl<'a> RunProgress<'a> {
    pub fn new(run_id: Uuid, notifier: &'a dyn ProgressNotifier) -> Self {
        Self { run_id, notifier }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn emit(&self, payload: ProgressPayload) {
        self.notifier.notify(ProgressEvent {
            run_id: self.run_id,
            at: Utc::now(),
            payload,
        });
    }

    pub fn stage_started(&self, stage: impl Into<String>) {
        self.emit(ProgressPayload::StageStarted {
            stage: stage.into(),
        });
    }

    pub fn stage_input(&self, stage: impl Into<String>, preview: &str) {
        self.emit(ProgressPayload::StageInput {
            stage: stage.into(),
            preview: truncate_for_display(preview, PREVIEW_LIMIT),
        });
    }

    pub fn stage_output(&self, stage: impl Into<String>, preview: &str, usage: Usage) {
        self.emit(ProgressPayload::StageOutput {
            stage: stage.into(),
            preview: truncate_for_display(preview, PREVIEW_LIMIT),
            usage,
        });
    }

    pub fn branch_taken(&self, branch: impl Into<String>) {
        self.emit(ProgressPayload::BranchTaken {
            branch: branch.into(),
        });
    }
}

/// Discards every event. Used for one-shot CLI runs.
pub struct NoopNotifier;

impl ProgressNotifier for NoopNotifier {
    fn notify(&self, _event: ProgressEvent) {}
}

/// Logs events through `tracing`.
pub struct LogNotifier;

impl ProgressNotifier for LogNotifier {
    fn notify(&self, event: ProgressEvent) {
        match &event.payload {
            ProgressPayload::StageStarted { stage } => {
                tracing::info!(run_id = %event.run_id, %stage, "stage started");
            }
            ProgressPayload::StageInput { stage, preview } => {
                tracing::debug!(run_id = %event.run_id, %stage, chars = preview.len(), "stage input");
            }
            ProgressPayload::StageOutput { stage, usage, .. } => {
                tracing::info!(
                    run_id = %event.run_id,
                    %stage,
                    tokens = usage.total(),
                    "stage output"
                );
            }
            ProgressPayload::BranchTaken { branch } => {
                tracing::info!(run_id = %event.run_id, %branch, "branch taken");
            }
        }
    }
}

/// Forwards events to a channel, typically drained by a WebSocket writer.
/// A closed receiver is not an error; the run keeps going.
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressNotifier for ChannelNotifier {
    fn notify(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}
