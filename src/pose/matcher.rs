//! Joint-angle scoring against pose definitions.

use std::sync::Arc;

use serde::Serialize;

use crate::pose::catalog::{PoseCatalog, PoseDefinition};
use crate::pose::config::{MatcherConfig, OrientationConfig};
use crate::pose::landmarks::Landmarks;
use crate::pose::orientation::{OrientationClassifier, OrientationReading};
use crate::pose::types::JointAngle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JointStatus {
    Good,
    NeedsImprovement,
    Poor,
}

/// Per-joint comparison for one visible target angle. Angles are rounded to
/// one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JointReading {
    pub joint: JointAngle,
    pub current: f64,
    pub target: f64,
    pub difference: f64,
    pub tolerance: f64,
    pub status: JointStatus,
}

impl JointReading {
    /// True when the live angle is smaller than the target, i.e. the joint
    /// is more bent than it should be.
    pub fn is_too_bent(&self) -> bool {
        self.current < self.target
    }
}

#[derive(Debug, Clone)]
pub struct PoseMatch<'a> {
    pub pose: &'a PoseDefinition,
    pub confidence: f64,
    pub orientation: OrientationReading,
    pub joints: Vec<JointReading>,
}

#[derive(Debug, Clone)]
pub enum MatchOutcome<'a> {
    NoPerson,
    Scored(PoseMatch<'a>),
    OrientationMismatch {
        pose: &'a PoseDefinition,
        orientation: OrientationReading,
    },
    InsufficientVisibility {
        pose: Option<&'a PoseDefinition>,
        orientation: OrientationReading,
        visible: usize,
        required: usize,
    },
    Unrecognized {
        orientation: OrientationReading,
        best_confidence: f64,
    },
}

impl<'a> MatchOutcome<'a> {
    pub fn pose(&self) -> Option<&'a PoseDefinition> {
        match self {
            Self::Scored(m) => Some(m.pose),
            Self::OrientationMismatch { pose, .. } => Some(*pose),
            Self::InsufficientVisibility { pose, .. } => *pose,
            Self::NoPerson | Self::Unrecognized { .. } => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Scored(m) => Some(m.confidence),
            Self::Unrecognized {
                best_confidence, ..
            } => Some(*best_confidence),
            _ => None,
        }
    }

    pub fn orientation(&self) -> OrientationReading {
        match self {
            Self::NoPerson => OrientationReading::unreliable(),
            Self::Scored(m) => m.orientation,
            Self::OrientationMismatch { orientation, .. }
            | Self::InsufficientVisibility { orientation, .. }
            | Self::Unrecognized { orientation, .. } => *orientation,
        }
    }

    pub fn orientation_valid(&self) -> bool {
        !matches!(self, Self::OrientationMismatch { .. })
    }
}

struct Evaluation {
    confidence: f64,
    joints: Vec<JointReading>,
    visible: usize,
    required: usize,
}

#[derive(Debug, Clone)]
pub struct PoseMatcher {
    catalog: Arc<PoseCatalog>,
    classifier: OrientationClassifier,
    config: MatcherConfig,
}

impl PoseMatcher {
    pub fn new(
        catalog: Arc<PoseCatalog>,
        orientation: OrientationConfig,
        config: MatcherConfig,
    ) -> Self {
        Self {
            catalog,
            classifier: OrientationClassifier::new(orientation),
            config,
        }
    }

    pub fn catalog(&self) -> &PoseCatalog {
        &self.catalog
    }

    pub fn classifier(&self) -> &OrientationClassifier {
        &self.classifier
    }

    /// Session mode: score the frame against one known pose.
    pub fn match_target<'p>(
        &self,
        landmarks: &Landmarks,
        pose: &'p PoseDefinition,
    ) -> MatchOutcome<'p> {
        if landmarks.is_empty() {
            return MatchOutcome::NoPerson;
        }
        let orientation = self.classifier.classify(landmarks);
        if !pose.accepts(orientation.orientation) {
            return MatchOutcome::OrientationMismatch { pose, orientation };
        }

        let eval = self.evaluate(landmarks, pose);
        if eval.visible < eval.required {
            return MatchOutcome::InsufficientVisibility {
                pose: Some(pose),
                orientation,
                visible: eval.visible,
                required: eval.required,
            };
        }

        MatchOutcome::Scored(PoseMatch {
            pose,
            confidence: eval.confidence,
            orientation,
            joints: eval.joints,
        })
    }

    /// Free-practice mode: find the best pose valid for the observed view.
    pub fn match_best(&self, landmarks: &Landmarks) -> MatchOutcome<'_> {
        if landmarks.is_empty() {
            return MatchOutcome::NoPerson;
        }
        let orientation = self.classifier.classify(landmarks);

        let mut best: Option<(&PoseDefinition, Evaluation)> = None;
        let mut most_visible = 0;
        let mut fewest_required = usize::MAX;
        for pose in self.catalog.iter() {
            if !pose.accepts(orientation.orientation) {
                continue;
            }
            let eval = self.evaluate(landmarks, pose);
            if eval.visible < eval.required {
                most_visible = most_visible.max(eval.visible);
                fewest_required = fewest_required.min(eval.required);
                continue;
            }
            // Strictly greater keeps the earlier pose on ties.
            let better = best
                .as_ref()
                .map_or(true, |(_, current)| eval.confidence > current.confidence);
            if better {
                best = Some((pose, eval));
            }
        }

        let Some((pose, eval)) = best else {
            if fewest_required == usize::MAX {
                // No pose in the catalog accepts this view.
                return MatchOutcome::Unrecognized {
                    orientation,
                    best_confidence: 0.0,
                };
            }
            return MatchOutcome::InsufficientVisibility {
                pose: None,
                orientation,
                visible: most_visible,
                required: fewest_required,
            };
        };

        if eval.confidence < self.config.recognition_threshold {
            tracing::debug!(
                best = %pose.name,
                confidence = eval.confidence,
                "no pose above recognition threshold"
            );
            return MatchOutcome::Unrecognized {
                orientation,
                best_confidence: eval.confidence,
            };
        }

        MatchOutcome::Scored(PoseMatch {
            pose,
            confidence: eval.confidence,
            orientation,
            joints: eval.joints,
        })
    }

    fn evaluate(&self, landmarks: &Landmarks, pose: &PoseDefinition) -> Evaluation {
        let threshold = self.config.visibility_threshold;
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut joints = Vec::with_capacity(pose.target_angles.len());

        for target in &pose.target_angles {
            let (a, b, c) = target.joint.triple();
            let (Some(pa), Some(pb), Some(pc)) = (
                landmarks.visible(a, threshold),
                landmarks.visible(b, threshold),
                landmarks.visible(c, threshold),
            ) else {
                continue;
            };
            let Some(live) = self.config.landmark_space.angle(pa, pb, pc) else {
                continue;
            };

            let tolerance = pose.tolerance_for(target);
            let diff = (live - target.degrees).abs();
            let score = (1.0 - diff / tolerance).clamp(0.0, 1.0);
            weighted += score * target.weight;
            total_weight += target.weight;

            let status = if diff <= tolerance {
                JointStatus::Good
            } else if diff <= tolerance * self.config.needs_improvement_factor {
                JointStatus::NeedsImprovement
            } else {
                JointStatus::Poor
            };
            joints.push(JointReading {
                joint: target.joint,
                current: round1(live),
                target: target.degrees,
                difference: round1(diff),
                tolerance,
                status,
            });
        }

        let total = pose.target_angles.len();
        let by_ratio = (self.config.min_visible_ratio * total as f64).ceil() as usize;
        let required = self.config.min_visible_joints.max(by_ratio).min(total.max(1));

        Evaluation {
            confidence: if total_weight > 0.0 {
                weighted / total_weight
            } else {
                0.0
            },
            visible: joints.len(),
            required,
            joints,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
