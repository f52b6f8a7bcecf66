//! Corrective feedback for a scored frame.
//!
//! Items are emitted in priority order and capped at
//! `FeedbackConfig::max_feedback_items`:
//! visibility prompts, joint corrections (worst first), symmetry, alignment.

use serde::{Deserialize, Serialize};

use crate::pose::catalog::PoseDefinition;
use crate::pose::config::FeedbackConfig;
use crate::pose::geometry::midpoint;
use crate::pose::landmarks::{
    Landmark, Landmarks, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::pose::matcher::{JointReading, JointStatus, MatchOutcome, PoseMatch};
use crate::pose::types::{JointKind, Orientation, Side};

pub const NO_PERSON: &str = "No person detected";
pub const MOVE_INTO_FRAME: &str = "Move into the frame so your whole body is visible";
pub const PRAISE: &str = "Great form! Hold the pose and keep breathing";

const KNEE_OVER_ANKLE_TOLERANCE: f64 = 0.05;
const ARM_HEIGHT_TOLERANCE: f64 = 0.1;
const HIP_SAG_TOLERANCE: f64 = 0.1;
const HIP_PIKE_TOLERANCE: f64 = 0.05;
const SPINE_TOLERANCE: f64 = 0.05;
const CENTERING_TOLERANCE: f64 = 0.1;
const KNEES_STACKED_MAX: f64 = 0.15;
const KNEES_HIP_WIDTH_MIN: f64 = 0.1;
const KNEES_HIP_WIDTH_MAX: f64 = 0.3;

/// Pose-specific landmark relationships checked after the joint angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "check", content = "side")]
pub enum AlignmentCheck {
    KneeOverAnkle(Side),
    ArmsAtShoulderHeight,
    HipsAboveHead,
    StraightBodyLine,
    TallSpine,
    /// The raised foot should sit above the standing knee.
    RaisedFootAboveKnee(Side),
    CenteredOverLeg(Side),
    KneesTogether,
    KneesHipWidth,
    HipsLifted,
    FoldForward,
}

const VISIBILITY_PAIRS: [(usize, usize, &str); 6] = [
    (LEFT_SHOULDER, RIGHT_SHOULDER, "shoulder"),
    (LEFT_ELBOW, RIGHT_ELBOW, "elbow"),
    (LEFT_WRIST, RIGHT_WRIST, "wrist"),
    (LEFT_HIP, RIGHT_HIP, "hip"),
    (LEFT_KNEE, RIGHT_KNEE, "knee"),
    (LEFT_ANKLE, RIGHT_ANKLE, "ankle"),
];

#[derive(Debug, Clone, Default)]
pub struct QualityAnalyzer {
    config: FeedbackConfig,
}

impl QualityAnalyzer {
    pub fn new(config: FeedbackConfig) -> Self {
        Self { config }
    }

    pub fn feedback(&self, landmarks: &Landmarks, outcome: &MatchOutcome<'_>) -> Vec<String> {
        match outcome {
            MatchOutcome::NoPerson => vec![NO_PERSON.to_string()],
            MatchOutcome::OrientationMismatch { pose, .. } => vec![reposition(pose)],
            MatchOutcome::InsufficientVisibility { .. } => vec![MOVE_INTO_FRAME.to_string()],
            MatchOutcome::Unrecognized { .. } => Vec::new(),
            MatchOutcome::Scored(result) => self.corrections(landmarks, result),
        }
    }

    fn corrections(&self, landmarks: &Landmarks, result: &PoseMatch<'_>) -> Vec<String> {
        let cap = self.config.max_feedback_items;
        let mut items = Vec::new();
        let pose = result.pose;

        if pose.symmetric {
            items.extend(self.visibility_prompts(landmarks));
        }
        items.extend(joint_corrections(&result.joints));
        let axis = self.body_axis(landmarks);
        if pose.symmetric {
            items.extend(self.symmetry_checks(landmarks, &axis));
        }
        for check in &pose.alignment_checks {
            if items.len() >= cap {
                break;
            }
            if let Some(cue) = self.alignment(landmarks, &axis, *check) {
                items.push(cue);
            }
        }

        if items.is_empty() {
            return vec![PRAISE.to_string()];
        }
        items.truncate(cap);
        items
    }

    fn visibility_prompts(&self, landmarks: &Landmarks) -> Vec<String> {
        let threshold = self.config.visibility_threshold;
        VISIBILITY_PAIRS
            .iter()
            .filter_map(|&(left, right, part)| {
                let l = landmarks.visible(left, threshold).is_some();
                let r = landmarks.visible(right, threshold).is_some();
                match (l, r) {
                    (false, true) => Some(format!(
                        "Turn so your left {part} is visible to the camera"
                    )),
                    (true, false) => Some(format!(
                        "Turn so your right {part} is visible to the camera"
                    )),
                    _ => None,
                }
            })
            .collect()
    }

    /// Torso axis from the hip center to the shoulder center, or the image
    /// vertical when the torso is not visible.
    fn body_axis(&self, lm: &Landmarks) -> BodyAxis {
        match (
            self.center(lm, LEFT_SHOULDER, RIGHT_SHOULDER),
            self.center(lm, LEFT_HIP, RIGHT_HIP),
        ) {
            (Some(shoulders), Some(hips)) => BodyAxis::from_torso(&hips, &shoulders),
            _ => BodyAxis::UPRIGHT,
        }
    }

    fn symmetry_checks(&self, landmarks: &Landmarks, axis: &BodyAxis) -> Vec<String> {
        let mut items = Vec::new();
        let level = self.config.level_threshold;
        if let Some((l, r)) = self.pair(landmarks, LEFT_SHOULDER, RIGHT_SHOULDER) {
            let (l, r) = (axis.along(l), axis.along(r));
            if (l - r).abs() > level {
                let lower = if l < r { "left" } else { "right" };
                items.push(format!(
                    "Level your shoulders, your {lower} shoulder is lower"
                ));
            }
        }
        if let Some((l, r)) = self.pair(landmarks, LEFT_HIP, RIGHT_HIP) {
            if (axis.along(l) - axis.along(r)).abs() > level {
                items.push("Keep your hips level".to_string());
            }
        }
        items
    }

    fn alignment(
        &self,
        lm: &Landmarks,
        axis: &BodyAxis,
        check: AlignmentCheck,
    ) -> Option<String> {
        match check {
            AlignmentCheck::KneeOverAnkle(side) => {
                let (knee, ankle) = self.pair(lm, side.knee(), side.ankle())?;
                ((knee.x - ankle.x).abs() > KNEE_OVER_ANKLE_TOLERANCE)
                    .then(|| format!("Keep your {} knee over your ankle", side.as_str()))
            }
            AlignmentCheck::ArmsAtShoulderHeight => [Side::Left, Side::Right]
                .into_iter()
                .find_map(|side| {
                    let (wrist, shoulder) = self.pair(lm, side.wrist(), side.shoulder())?;
                    ((wrist.y - shoulder.y).abs() > ARM_HEIGHT_TOLERANCE).then(|| {
                        format!("Extend your {} arm at shoulder height", side.as_str())
                    })
                }),
            AlignmentCheck::HipsAboveHead => {
                let nose = self.point(lm, NOSE)?;
                let hips = self.center(lm, LEFT_HIP, RIGHT_HIP)?;
                (nose.y < hips.y).then(|| "Lift your hips higher".to_string())
            }
            AlignmentCheck::StraightBodyLine => {
                let shoulders = self.center(lm, LEFT_SHOULDER, RIGHT_SHOULDER)?;
                let hips = self.center(lm, LEFT_HIP, RIGHT_HIP)?;
                if hips.y > shoulders.y + HIP_SAG_TOLERANCE {
                    Some("Engage your core and don't let your hips sag".to_string())
                } else if hips.y < shoulders.y - HIP_PIKE_TOLERANCE {
                    Some("Lower your hips to keep your body in a straight line".to_string())
                } else {
                    None
                }
            }
            AlignmentCheck::TallSpine => {
                let shoulders = self.center(lm, LEFT_SHOULDER, RIGHT_SHOULDER)?;
                let hips = self.center(lm, LEFT_HIP, RIGHT_HIP)?;
                (shoulders.y > hips.y - SPINE_TOLERANCE)
                    .then(|| "Sit up taller and lengthen your spine".to_string())
            }
            AlignmentCheck::RaisedFootAboveKnee(raised) => {
                let ankle = self.point(lm, raised.ankle())?;
                let knee = self.point(lm, raised.opposite().knee())?;
                (ankle.y > knee.y).then(|| {
                    format!(
                        "Raise your {} foot higher on your inner thigh",
                        raised.as_str()
                    )
                })
            }
            AlignmentCheck::CenteredOverLeg(standing) => {
                let nose = self.point(lm, NOSE)?;
                let hips = self.center(lm, LEFT_HIP, RIGHT_HIP)?;
                ((nose.x - hips.x).abs() > CENTERING_TOLERANCE).then(|| {
                    format!("Center your body over your {} leg", standing.as_str())
                })
            }
            AlignmentCheck::KneesTogether => {
                let (l, r) = self.pair(lm, LEFT_KNEE, RIGHT_KNEE)?;
                ((axis.across(l) - axis.across(r)).abs() > KNEES_STACKED_MAX)
                    .then(|| "Bring your knees closer together and stack them".to_string())
            }
            AlignmentCheck::KneesHipWidth => {
                let (l, r) = self.pair(lm, LEFT_KNEE, RIGHT_KNEE)?;
                let width = (axis.across(l) - axis.across(r)).abs();
                if width < KNEES_HIP_WIDTH_MIN {
                    Some("Widen your knees to hip-width apart".to_string())
                } else if width > KNEES_HIP_WIDTH_MAX {
                    Some("Bring your knees closer together".to_string())
                } else {
                    None
                }
            }
            AlignmentCheck::HipsLifted => {
                let shoulders = self.center(lm, LEFT_SHOULDER, RIGHT_SHOULDER)?;
                let hips = self.center(lm, LEFT_HIP, RIGHT_HIP)?;
                (hips.y > shoulders.y)
                    .then(|| "Lift your hips higher and press through your hands".to_string())
            }
            AlignmentCheck::FoldForward => {
                let nose = self.point(lm, NOSE)?;
                let hips = self.center(lm, LEFT_HIP, RIGHT_HIP)?;
                (nose.y < hips.y).then(|| "Fold deeper from your hips".to_string())
            }
        }
    }

    fn point<'l>(&self, lm: &'l Landmarks, index: usize) -> Option<&'l Landmark> {
        lm.visible(index, self.config.visibility_threshold)
    }

    fn pair<'l>(
        &self,
        lm: &'l Landmarks,
        a: usize,
        b: usize,
    ) -> Option<(&'l Landmark, &'l Landmark)> {
        Some((self.point(lm, a)?, self.point(lm, b)?))
    }

    fn center(&self, lm: &Landmarks, a: usize, b: usize) -> Option<Landmark> {
        self.pair(lm, a, b).map(|(p, q)| midpoint(p, q))
    }
}

/// Unit vector pointing from the hips towards the head, in image space.
#[derive(Debug, Clone, Copy)]
struct BodyAxis {
    x: f64,
    y: f64,
}

impl BodyAxis {
    /// Image y grows downwards, so an upright subject points to -y.
    const UPRIGHT: Self = Self { x: 0.0, y: -1.0 };

    fn from_torso(hips: &Landmark, shoulders: &Landmark) -> Self {
        let (dx, dy) = (shoulders.x - hips.x, shoulders.y - hips.y);
        let len = dx.hypot(dy);
        if !len.is_finite() || len < 1e-6 {
            return Self::UPRIGHT;
        }
        Self {
            x: dx / len,
            y: dy / len,
        }
    }

    /// Position along the torso; larger is closer to the head.
    fn along(&self, p: &Landmark) -> f64 {
        p.x * self.x + p.y * self.y
    }

    /// Position across the torso, for left/right spacing.
    fn across(&self, p: &Landmark) -> f64 {
        p.x * -self.y + p.y * self.x
    }
}

fn joint_corrections(joints: &[JointReading]) -> Vec<String> {
    let mut off: Vec<&JointReading> = joints
        .iter()
        .filter(|j| j.status != JointStatus::Good)
        .collect();
    off.sort_by(|a, b| b.difference.total_cmp(&a.difference));
    off.into_iter().map(joint_correction).collect()
}

fn joint_correction(reading: &JointReading) -> String {
    let side = reading.joint.side().as_str();
    let too_bent = reading.is_too_bent();
    match (reading.joint.kind(), too_bent) {
        (JointKind::Knee, true) => format!("Straighten your {side} knee"),
        (JointKind::Knee, false) => format!("Bend your {side} knee more"),
        (JointKind::Elbow, true) => format!("Straighten your {side} arm"),
        (JointKind::Elbow, false) => format!("Bend your {side} elbow more"),
        (JointKind::Hip, true) => format!("Open your {side} hip"),
        (JointKind::Hip, false) => format!("Fold deeper at your {side} hip"),
        (JointKind::Shoulder, true) => format!("Raise your {side} arm higher"),
        (JointKind::Shoulder, false) => format!("Lower your {side} arm"),
    }
}

fn view_phrase(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Front => "face the camera",
        Orientation::SideLeft => "turn your left side to the camera",
        Orientation::SideRight => "turn your right side to the camera",
        Orientation::Supine => "lie on your back",
    }
}

/// Single instruction naming the views the pose can be scored from.
fn reposition(pose: &PoseDefinition) -> String {
    let views = &pose.valid_orientations;
    let both_sides =
        views.contains(&Orientation::SideLeft) && views.contains(&Orientation::SideRight);

    let mut phrases: Vec<&str> = Vec::new();
    for view in views {
        if both_sides && view.is_side() {
            if !phrases.contains(&"turn sideways to the camera") {
                phrases.push("turn sideways to the camera");
            }
            continue;
        }
        phrases.push(view_phrase(*view));
    }

    let joined = phrases.join(" or ");
    let mut chars = joined.chars();
    let sentence = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{sentence} for {}", pose.name)
}
