//! Per-frame analysis: image check, landmark detection, orientation,
//! matching and feedback.

pub mod frame;
pub mod stream;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use serde::Serialize;

use crate::pose::catalog::{PoseCatalog, PoseDefinition};
use crate::pose::config::AnalysisConfig;
use crate::pose::landmarks::Landmarks;
use crate::pose::matcher::{JointReading, MatchOutcome, PoseMatcher};
use crate::pose::quality::QualityAnalyzer;
use crate::pose::types::Orientation;
use crate::services::detector::LandmarkDetector;

pub use frame::FrameError;

/// Scoring result for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseScore {
    pub pose_name: Option<String>,
    pub confidence: Option<f64>,
    pub orientation: Orientation,
    pub orientation_valid: bool,
    pub orientation_reliable: bool,
    pub feedback: Vec<String>,
    pub joints: Vec<JointReading>,
}

/// A scored image frame. `landmarks` is `None` when nobody was detected.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub landmarks: Option<Landmarks>,
    pub score: PoseScore,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown pose: {0}")]
    UnknownPose(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Clone)]
pub struct FramePipeline {
    matcher: Arc<PoseMatcher>,
    analyzer: Arc<QualityAnalyzer>,
    detector: Arc<dyn LandmarkDetector>,
    detector_timeout: Duration,
    max_frame_bytes: usize,
}

impl FramePipeline {
    pub fn new(
        catalog: Arc<PoseCatalog>,
        analysis: &AnalysisConfig,
        detector: Arc<dyn LandmarkDetector>,
        detector_timeout: Duration,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            matcher: Arc::new(PoseMatcher::new(
                catalog,
                analysis.orientation.clone(),
                analysis.matcher.clone(),
            )),
            analyzer: Arc::new(QualityAnalyzer::new(analysis.feedback.clone())),
            detector,
            detector_timeout,
            max_frame_bytes,
        }
    }

    pub fn catalog(&self) -> &PoseCatalog {
        self.matcher.catalog()
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    /// Looks up an optional target pose by name.
    pub fn resolve_target(
        &self,
        name: Option<&str>,
    ) -> Result<Option<&PoseDefinition>, PipelineError> {
        match name {
            None => Ok(None),
            Some(name) => self
                .catalog()
                .get(name)
                .map(Some)
                .ok_or_else(|| PipelineError::UnknownPose(name.to_string())),
        }
    }

    /// Scores already-detected landmarks. With a target the frame is judged
    /// against that pose only, otherwise the best catalog match is reported.
    pub fn score_landmarks(
        &self,
        landmarks: &Landmarks,
        target: Option<&str>,
    ) -> Result<PoseScore, PipelineError> {
        let target = self.resolve_target(target)?;
        let outcome = match target {
            Some(pose) => self.matcher.match_target(landmarks, pose),
            None => self.matcher.match_best(landmarks),
        };
        let feedback = self.analyzer.feedback(landmarks, &outcome);
        Ok(build_score(&outcome, feedback))
    }

    /// Full path for an encoded image. Detector failures and timeouts are
    /// logged and scored as an empty frame.
    pub async fn process_image(
        &self,
        image: Bytes,
        target: Option<&str>,
    ) -> Result<FrameResult, PipelineError> {
        self.resolve_target(target)?;
        frame::inspect_off_runtime(image.clone(), self.max_frame_bytes).await?;

        let detection = tokio::time::timeout(self.detector_timeout, self.detector.detect(image));
        let landmarks = match detection.await {
            Ok(Ok(landmarks)) => landmarks,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "landmark detection failed");
                Landmarks::empty()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.detector_timeout.as_millis() as u64,
                    "landmark detection timed out"
                );
                Landmarks::empty()
            }
        };

        let score = self.score_landmarks(&landmarks, target)?;
        Ok(FrameResult {
            landmarks: (!landmarks.is_empty()).then_some(landmarks),
            score,
        })
    }
}

fn build_score(outcome: &MatchOutcome<'_>, feedback: Vec<String>) -> PoseScore {
    let reading = outcome.orientation();
    let (pose_name, joints) = match outcome {
        MatchOutcome::Scored(m) => (Some(m.pose.name.clone()), m.joints.clone()),
        MatchOutcome::OrientationMismatch { pose, .. } => (Some(pose.name.clone()), Vec::new()),
        MatchOutcome::InsufficientVisibility { pose, .. } => {
            (pose.map(|p| p.name.clone()), Vec::new())
        }
        MatchOutcome::NoPerson | MatchOutcome::Unrecognized { .. } => (None, Vec::new()),
    };
    PoseScore {
        pose_name,
        confidence: outcome.confidence().map(round3),
        orientation: reading.orientation,
        orientation_valid: outcome.orientation_valid(),
        orientation_reliable: reading.reliable,
        feedback,
        joints,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
