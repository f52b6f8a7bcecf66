//! Synthetic landmark frames.
//!
//! The mock detector serves [`standing_front`]; tests build on the same frames
//! and move individual points to produce specific joint angles.

use crate::pose::landmarks::{
    Landmark, Landmarks, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE,
    LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE,
    RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::pose::types::Side;

/// Mutable frame used to assemble synthetic landmarks.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    points: Vec<Landmark>,
}

impl FrameBuilder {
    /// Subject standing upright facing the camera, arms hanging straight.
    /// Every tracked limb is a straight vertical segment, so elbows, hips
    /// and knees all measure 180 degrees.
    pub fn standing_front() -> Self {
        let head = Landmark::new(0.5, 0.15, 0.0, 1.0);
        let mut points = vec![head; LANDMARK_COUNT];
        let mut put = |index: usize, x: f64, y: f64| points[index] = Landmark::new(x, y, 0.0, 1.0);

        // The subject's left appears on the right half of the image.
        put(NOSE, 0.5, 0.15);
        put(LEFT_SHOULDER, 0.6, 0.3);
        put(RIGHT_SHOULDER, 0.4, 0.3);
        put(LEFT_ELBOW, 0.6, 0.45);
        put(RIGHT_ELBOW, 0.4, 0.45);
        put(LEFT_WRIST, 0.6, 0.58);
        put(RIGHT_WRIST, 0.4, 0.58);
        put(LEFT_HIP, 0.6, 0.6);
        put(RIGHT_HIP, 0.4, 0.6);
        put(LEFT_KNEE, 0.6, 0.78);
        put(RIGHT_KNEE, 0.4, 0.78);
        put(LEFT_ANKLE, 0.6, 0.95);
        put(RIGHT_ANKLE, 0.4, 0.95);
        Self { points }
    }

    /// Standing subject seen from the side, `facing` side towards the camera.
    pub fn standing_side(facing: Side) -> Self {
        let mut builder = Self::standing_front();
        let (near_z, far_z) = (-0.1, 0.1);
        for point in &mut builder.points {
            point.x = 0.5 + (point.x - 0.5) * 0.1;
        }
        for (left, right) in PAIRS {
            let (near, far) = match facing {
                Side::Left => (left, right),
                Side::Right => (right, left),
            };
            builder.points[near].z = near_z;
            builder.points[far].z = far_z;
            builder.points[far].visibility = 0.6;
        }
        builder
    }

    /// Subject lying on their back, seen from above the head.
    pub fn lying_supine() -> Self {
        let mut builder = Self::standing_front();
        for point in &mut builder.points {
            std::mem::swap(&mut point.x, &mut point.y);
        }
        builder
    }

    pub fn set(mut self, index: usize, x: f64, y: f64) -> Self {
        if let Some(point) = self.points.get_mut(index) {
            point.x = x;
            point.y = y;
        }
        self
    }

    pub fn visibility(mut self, index: usize, visibility: f64) -> Self {
        if let Some(point) = self.points.get_mut(index) {
            point.visibility = visibility;
        }
        self
    }

    pub fn depth(mut self, index: usize, z: f64) -> Self {
        if let Some(point) = self.points.get_mut(index) {
            point.z = z;
        }
        self
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn build(self) -> Landmarks {
        Landmarks::new(self.points)
    }
}

const PAIRS: [(usize, usize); 6] = [
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_ELBOW, RIGHT_ELBOW),
    (LEFT_WRIST, RIGHT_WRIST),
    (LEFT_HIP, RIGHT_HIP),
    (LEFT_KNEE, RIGHT_KNEE),
    (LEFT_ANKLE, RIGHT_ANKLE),
];

pub fn standing_front() -> Landmarks {
    FrameBuilder::standing_front().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::geometry::angle_between;
    use crate::pose::types::JointAngle;

    fn angle(frame: &Landmarks, joint: JointAngle) -> f64 {
        let (a, b, c) = joint.triple();
        angle_between(
            frame.get(a).unwrap(),
            frame.get(b).unwrap(),
            frame.get(c).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn standing_frame_has_straight_limbs() {
        let frame = standing_front();
        assert_eq!(frame.len(), LANDMARK_COUNT);
        for joint in [
            JointAngle::LeftElbow,
            JointAngle::RightElbow,
            JointAngle::LeftKnee,
            JointAngle::RightKnee,
            JointAngle::LeftHip,
            JointAngle::RightHip,
        ] {
            assert!((angle(&frame, joint) - 180.0).abs() < 1e-6, "{:?}", joint);
        }
    }

    #[test]
    fn supine_frame_keeps_joint_angles() {
        let frame = FrameBuilder::lying_supine().build();
        assert!((angle(&frame, JointAngle::LeftKnee) - 180.0).abs() < 1e-6);
    }
}
