//! Per-connection frame worker.
//!
//! The socket reader drops frames into a single-slot `watch` mailbox and one
//! worker drains it. A frame that arrives while the worker is busy replaces
//! the pending one, so the worker always picks up the newest frame and
//! results leave in submission order.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::pipeline::{FramePipeline, FrameResult, PoseScore};
use crate::pose::landmarks::Landmarks;

#[derive(Debug, Clone)]
pub enum FramePayload {
    Image(Bytes),
    Landmarks(Landmarks),
}

#[derive(Debug, Clone)]
struct Job {
    seq: u64,
    payload: FramePayload,
    target: Option<String>,
}

/// Text control messages from the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Target {
        #[serde(rename = "targetPose", default)]
        target_pose: Option<String>,
    },
    Landmarks {
        landmarks: Landmarks,
        #[serde(rename = "targetPose", default)]
        target_pose: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseResultMessage {
    /// Sequence number of the frame this result belongs to.
    pub frame: u64,
    pub landmarks: Option<Landmarks>,
    #[serde(flatten)]
    pub score: PoseScore,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    PoseResult(PoseResultMessage),
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    fn pose_result(frame: u64, result: FrameResult) -> Self {
        Self::PoseResult(PoseResultMessage {
            frame,
            landmarks: result.landmarks,
            score: result.score,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: u64,
    pub skipped: u64,
}

/// Writer half of the mailbox, owned by the socket reader.
#[derive(Debug)]
pub struct FrameMailbox {
    tx: watch::Sender<Option<Job>>,
    seq: u64,
}

impl FrameMailbox {
    /// Replaces any frame the worker has not started yet.
    pub fn submit(&mut self, payload: FramePayload, target: Option<String>) -> u64 {
        self.seq += 1;
        self.tx.send_replace(Some(Job {
            seq: self.seq,
            payload,
            target,
        }));
        self.seq
    }
}

/// Spawns the worker for one connection. It stops when the mailbox is
/// dropped or the outbound channel closes, and reports what it did.
pub fn spawn_frame_worker(
    pipeline: FramePipeline,
    out: mpsc::Sender<ServerMessage>,
) -> (FrameMailbox, JoinHandle<WorkerStats>) {
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(run_worker(pipeline, rx, out));
    (FrameMailbox { tx, seq: 0 }, handle)
}

async fn run_worker(
    pipeline: FramePipeline,
    mut rx: watch::Receiver<Option<Job>>,
    out: mpsc::Sender<ServerMessage>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    let mut last_seq = 0;

    while rx.changed().await.is_ok() {
        let Some(job) = rx.borrow_and_update().clone() else {
            continue;
        };
        let skipped = job.seq.saturating_sub(last_seq + 1);
        if skipped > 0 {
            stats.skipped += skipped;
            tracing::debug!(
                frame = job.seq,
                skipped,
                total_skipped = stats.skipped,
                "stale frames dropped"
            );
        }
        last_seq = job.seq;

        let message = handle_job(&pipeline, job).await;
        stats.processed += 1;
        if out.send(message).await.is_err() {
            break;
        }
    }

    tracing::debug!(
        processed = stats.processed,
        skipped = stats.skipped,
        "frame worker stopped"
    );
    stats
}

async fn handle_job(pipeline: &FramePipeline, job: Job) -> ServerMessage {
    let target = job.target.as_deref();
    let result = match job.payload {
        FramePayload::Image(image) => pipeline.process_image(image, target).await,
        FramePayload::Landmarks(landmarks) => {
            pipeline
                .score_landmarks(&landmarks, target)
                .map(|score| FrameResult {
                    landmarks: (!landmarks.is_empty()).then_some(landmarks),
                    score,
                })
        }
    };
    match result {
        Ok(result) => ServerMessage::pose_result(job.seq, result),
        Err(e) => ServerMessage::error(e.to_string()),
    }
}
