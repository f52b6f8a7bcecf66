//! Camera-relative body orientation from the torso landmarks.

use serde::Serialize;

use crate::pose::config::OrientationConfig;
use crate::pose::geometry::{distance_2d, midpoint};
use crate::pose::landmarks::{Landmark, Landmarks, LEFT_HIP, LEFT_SHOULDER, RIGHT_HIP, RIGHT_SHOULDER};
use crate::pose::types::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationReading {
    pub orientation: Orientation,
    /// False when the torso was not visible enough to classify and the
    /// orientation fell back to `front`.
    pub reliable: bool,
}

impl OrientationReading {
    pub fn unreliable() -> Self {
        Self {
            orientation: Orientation::Front,
            reliable: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrientationClassifier {
    config: OrientationConfig,
}

impl OrientationClassifier {
    pub fn new(config: OrientationConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, landmarks: &Landmarks) -> OrientationReading {
        let threshold = self.config.visibility_threshold;
        let left_shoulder = landmarks.visible(LEFT_SHOULDER, threshold);
        let right_shoulder = landmarks.visible(RIGHT_SHOULDER, threshold);
        let left_hip = landmarks.visible(LEFT_HIP, threshold);
        let right_hip = landmarks.visible(RIGHT_HIP, threshold);

        let (Some(shoulder), Some(hip)) = (
            center(left_shoulder, right_shoulder),
            center(left_hip, right_hip),
        ) else {
            tracing::debug!("torso not visible, orientation defaults to front");
            return OrientationReading::unreliable();
        };

        let dx = (hip.x - shoulder.x).abs();
        let dy = (hip.y - shoulder.y).abs();
        let sep = self.config.side_separation_threshold;

        let orientation = if dx > dy * self.config.lying_axis_ratio {
            match (left_shoulder, right_shoulder) {
                (Some(l), Some(r)) if distance_2d(l, r) >= sep => Orientation::Supine,
                _ => resolve_side(landmarks),
            }
        } else {
            let shoulder_span = span(left_shoulder, right_shoulder);
            let hip_span = span(left_hip, right_hip);
            let side_view = match (shoulder_span, hip_span) {
                (Some(s), Some(h)) => s < sep && h < sep,
                (Some(s), None) => s < sep,
                (None, Some(h)) => h < sep,
                (None, None) => true,
            };
            if side_view {
                resolve_side(landmarks)
            } else {
                Orientation::Front
            }
        };

        OrientationReading {
            orientation,
            reliable: true,
        }
    }
}

fn center(left: Option<&Landmark>, right: Option<&Landmark>) -> Option<Landmark> {
    match (left, right) {
        (Some(l), Some(r)) => Some(midpoint(l, r)),
        (Some(only), None) | (None, Some(only)) => Some(*only),
        (None, None) => None,
    }
}

fn span(left: Option<&Landmark>, right: Option<&Landmark>) -> Option<f64> {
    match (left, right) {
        (Some(l), Some(r)) => Some((l.x - r.x).abs()),
        _ => None,
    }
}

/// The shoulder nearer the camera has the smaller depth and is usually the
/// more visible one. Ties go to `SideLeft`.
fn resolve_side(landmarks: &Landmarks) -> Orientation {
    let depth = match (landmarks.get(LEFT_SHOULDER), landmarks.get(RIGHT_SHOULDER)) {
        (Some(l), Some(r)) => r.z - l.z,
        _ => 0.0,
    };
    let visibility = landmarks.visibility(LEFT_SHOULDER) - landmarks.visibility(RIGHT_SHOULDER);
    let score = depth + visibility;
    if !score.is_finite() || score >= 0.0 {
        Orientation::SideLeft
    } else {
        Orientation::SideRight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::sample::FrameBuilder;
    use crate::pose::types::Side;

    fn classify(frame: &Landmarks) -> OrientationReading {
        OrientationClassifier::default().classify(frame)
    }

    #[test]
    fn standing_facing_camera_is_front() {
        let reading = classify(&FrameBuilder::standing_front().build());
        assert_eq!(reading.orientation, Orientation::Front);
        assert!(reading.reliable);
    }

    #[test]
    fn side_views_resolve_to_the_near_side() {
        let left = classify(&FrameBuilder::standing_side(Side::Left).build());
        assert_eq!(left.orientation, Orientation::SideLeft);

        let right = classify(&FrameBuilder::standing_side(Side::Right).build());
        assert_eq!(right.orientation, Orientation::SideRight);
    }

    #[test]
    fn lying_with_separated_shoulders_is_supine() {
        let reading = classify(&FrameBuilder::lying_supine().build());
        assert_eq!(reading.orientation, Orientation::Supine);
    }

    #[test]
    fn lying_with_overlapping_shoulders_is_side() {
        let frame = FrameBuilder::lying_supine()
            .set(LEFT_SHOULDER, 0.3, 0.5)
            .set(RIGHT_SHOULDER, 0.31, 0.51)
            .depth(LEFT_SHOULDER, 0.2)
            .depth(RIGHT_SHOULDER, -0.2)
            .build();
        assert_eq!(classify(&frame).orientation, Orientation::SideRight);
    }

    #[test]
    fn hidden_torso_falls_back_to_unreliable_front() {
        let frame = FrameBuilder::standing_side(Side::Left)
            .visibility(LEFT_HIP, 0.1)
            .visibility(RIGHT_HIP, 0.2)
            .build();
        let reading = classify(&frame);
        assert_eq!(reading, OrientationReading::unreliable());

        let reading = classify(&Landmarks::empty());
        assert!(!reading.reliable);
    }

    #[test]
    fn one_hidden_shoulder_still_reads_front_from_hips() {
        let frame = FrameBuilder::standing_front()
            .visibility(LEFT_SHOULDER, 0.1)
            .build();
        let reading = classify(&frame);
        assert_eq!(reading.orientation, Orientation::Front);
        assert!(reading.reliable);
    }

    #[test]
    fn only_one_side_visible_is_a_side_view() {
        let frame = FrameBuilder::standing_front()
            .visibility(RIGHT_SHOULDER, 0.0)
            .visibility(RIGHT_HIP, 0.0)
            .build();
        assert!(classify(&frame).orientation.is_side());
    }

    #[test]
    fn depth_tie_goes_to_side_left() {
        let frame = FrameBuilder::standing_front()
            .set(LEFT_SHOULDER, 0.5, 0.3)
            .set(RIGHT_SHOULDER, 0.5, 0.3)
            .set(LEFT_HIP, 0.5, 0.6)
            .set(RIGHT_HIP, 0.5, 0.6)
            .build();
        assert_eq!(classify(&frame).orientation, Orientation::SideLeft);
    }
}
