//! Built-in pose data set.

use crate::pose::catalog::{AngleTarget, PairLink, PoseDefinition};
use crate::pose::quality::AlignmentCheck;
use crate::pose::types::BodyPart::{self, *};
use crate::pose::types::JointAngle::{self, *};
use crate::pose::types::Orientation::{self, Front, SideLeft, SideRight, Supine};
use crate::pose::types::{Difficulty, PoseCategory, Side};

const SIDE_VIEW: &[Orientation] = &[SideLeft, SideRight];
const FRONT_VIEW: &[Orientation] = &[Front];
const LYING_VIEW: &[Orientation] = &[Front, Supine];
const ANY_VIEW: &[Orientation] = &[Front, SideLeft, SideRight];

struct Spec {
    name: &'static str,
    description: &'static str,
    category: PoseCategory,
    difficulty: Difficulty,
    duration: u32,
    tolerance: f64,
    angles: &'static [(JointAngle, f64)],
    views: &'static [Orientation],
    parts: &'static [BodyPart],
    pair: Option<(&'static str, Side)>,
    symmetric: bool,
    checks: Vec<AlignmentCheck>,
}

impl Spec {
    fn into_definition(self) -> PoseDefinition {
        PoseDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category,
            difficulty: self.difficulty,
            default_duration_sec: self.duration,
            tolerance_deg: self.tolerance,
            target_angles: self
                .angles
                .iter()
                .map(|&(joint, degrees)| AngleTarget::new(joint, degrees))
                .collect(),
            valid_orientations: self.views.to_vec(),
            target_body_parts: self.parts.to_vec(),
            asymmetric_pair: self.pair.map(|(key, side)| PairLink {
                key: key.to_string(),
                side,
            }),
            symmetric: self.symmetric,
            alignment_checks: self.checks,
        }
    }
}

/// The eighteen poses in declaration order. Left/right variants are declared
/// back to back, left first.
pub fn definitions() -> Vec<PoseDefinition> {
    use AlignmentCheck as A;
    use Difficulty::{Easy, Hard, Medium};
    use PoseCategory::{Cooldown, Peak, Warmup};

    let specs = vec![
        Spec {
            name: "Mountain Pose",
            description: "Stand tall with feet together and arms resting by your sides.",
            category: Warmup,
            difficulty: Easy,
            duration: 60,
            tolerance: 20.0,
            angles: &[
                (LeftElbow, 180.0),
                (RightElbow, 180.0),
                (LeftKnee, 180.0),
                (RightKnee, 180.0),
                (LeftHip, 180.0),
                (RightHip, 180.0),
            ],
            views: FRONT_VIEW,
            parts: &[Neck, Posture],
            pair: None,
            symmetric: true,
            checks: vec![A::KneeOverAnkle(Side::Left), A::KneeOverAnkle(Side::Right)],
        },
        Spec {
            name: "Easy Seat",
            description: "Sit cross-legged with a long spine and relaxed shoulders.",
            category: Warmup,
            difficulty: Easy,
            duration: 90,
            tolerance: 30.0,
            angles: &[
                (LeftKnee, 55.0),
                (RightKnee, 55.0),
                (LeftHip, 85.0),
                (RightHip, 85.0),
            ],
            views: FRONT_VIEW,
            parts: &[Neck, LowerBack, Hips, Knees, StressRelief, Posture],
            pair: None,
            symmetric: true,
            checks: vec![A::TallSpine],
        },
        Spec {
            name: "Seated Hands Behind Back Stretch",
            description: "Seated, clasp your hands behind your back and open the chest.",
            category: Warmup,
            difficulty: Easy,
            duration: 60,
            tolerance: 20.0,
            angles: &[
                (LeftElbow, 165.0),
                (RightElbow, 165.0),
                (LeftShoulder, 35.0),
                (RightShoulder, 35.0),
            ],
            views: FRONT_VIEW,
            parts: &[Neck, Shoulders, UpperBack],
            pair: None,
            symmetric: true,
            checks: vec![A::TallSpine],
        },
        Spec {
            name: "Warrior II Left",
            description: "Lunge over the left leg with arms extended at shoulder height.",
            category: Peak,
            difficulty: Medium,
            duration: 45,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 90.0),
                (RightKnee, 180.0),
                (LeftShoulder, 90.0),
                (RightShoulder, 90.0),
            ],
            views: FRONT_VIEW,
            parts: &[Hips, Balance],
            pair: Some(("warrior_ii", Side::Left)),
            symmetric: false,
            checks: vec![A::KneeOverAnkle(Side::Left), A::ArmsAtShoulderHeight],
        },
        Spec {
            name: "Warrior II Right",
            description: "Lunge over the right leg with arms extended at shoulder height.",
            category: Peak,
            difficulty: Medium,
            duration: 45,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 180.0),
                (RightKnee, 90.0),
                (LeftShoulder, 90.0),
                (RightShoulder, 90.0),
            ],
            views: FRONT_VIEW,
            parts: &[Hips, Balance],
            pair: Some(("warrior_ii", Side::Right)),
            symmetric: false,
            checks: vec![A::KneeOverAnkle(Side::Right), A::ArmsAtShoulderHeight],
        },
        Spec {
            name: "Tree Pose Left",
            description: "Balance on the left leg with the right foot on the inner thigh.",
            category: Peak,
            difficulty: Medium,
            duration: 45,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 180.0),
                (RightKnee, 90.0),
                (LeftHip, 180.0),
                (RightHip, 45.0),
            ],
            views: FRONT_VIEW,
            parts: &[Hips, Balance],
            pair: Some(("tree", Side::Left)),
            symmetric: false,
            checks: vec![
                A::RaisedFootAboveKnee(Side::Right),
                A::CenteredOverLeg(Side::Left),
            ],
        },
        Spec {
            name: "Tree Pose Right",
            description: "Balance on the right leg with the left foot on the inner thigh.",
            category: Peak,
            difficulty: Medium,
            duration: 45,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 90.0),
                (RightKnee, 180.0),
                (LeftHip, 45.0),
                (RightHip, 180.0),
            ],
            views: FRONT_VIEW,
            parts: &[Hips, Balance],
            pair: Some(("tree", Side::Right)),
            symmetric: false,
            checks: vec![
                A::RaisedFootAboveKnee(Side::Left),
                A::CenteredOverLeg(Side::Right),
            ],
        },
        Spec {
            name: "Downward Dog",
            description: "Hands and feet on the floor, hips lifted into an inverted V.",
            category: Peak,
            difficulty: Medium,
            duration: 45,
            tolerance: 25.0,
            angles: &[
                (LeftHip, 45.0),
                (RightHip, 45.0),
                (LeftKnee, 180.0),
                (RightKnee, 180.0),
                (LeftShoulder, 180.0),
                (RightShoulder, 180.0),
            ],
            views: SIDE_VIEW,
            parts: &[
                Shoulders,
                UpperBack,
                LowerBack,
                Hamstrings,
                Core,
                Flexibility,
                Posture,
            ],
            pair: None,
            symmetric: false,
            checks: vec![A::HipsAboveHead],
        },
        Spec {
            name: "Plank",
            description: "Hold a straight line from head to heels on extended arms.",
            category: Peak,
            difficulty: Hard,
            duration: 30,
            tolerance: 15.0,
            angles: &[
                (LeftElbow, 180.0),
                (RightElbow, 180.0),
                (LeftHip, 180.0),
                (RightHip, 180.0),
                (LeftKnee, 180.0),
                (RightKnee, 180.0),
            ],
            views: SIDE_VIEW,
            parts: &[Shoulders, Core],
            pair: None,
            symmetric: false,
            checks: vec![A::StraightBodyLine],
        },
        Spec {
            name: "Reverse Table Top",
            description: "Press up from seated with knees bent and hips level with shoulders.",
            category: Peak,
            difficulty: Hard,
            duration: 30,
            tolerance: 20.0,
            angles: &[
                (LeftElbow, 180.0),
                (RightElbow, 180.0),
                (LeftHip, 90.0),
                (RightHip, 90.0),
                (LeftShoulder, 90.0),
                (RightShoulder, 90.0),
            ],
            views: SIDE_VIEW,
            parts: &[Shoulders, UpperBack, Core],
            pair: None,
            symmetric: false,
            checks: vec![A::HipsLifted],
        },
        Spec {
            name: "Gomukasana Legs Fold",
            description: "Seated with one knee stacked over the other.",
            category: Peak,
            difficulty: Medium,
            duration: 75,
            tolerance: 20.0,
            angles: &[
                (LeftKnee, 90.0),
                (RightKnee, 90.0),
                (LeftHip, 85.0),
                (RightHip, 85.0),
            ],
            views: FRONT_VIEW,
            parts: &[Hips, Flexibility],
            pair: None,
            symmetric: false,
            checks: vec![A::KneesTogether, A::TallSpine],
        },
        Spec {
            name: "Janu Sirsasana Twist Left",
            description: "Left leg extended, right foot to inner thigh, twist towards the left.",
            category: Peak,
            difficulty: Medium,
            duration: 60,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 180.0),
                (RightKnee, 90.0),
                (LeftHip, 90.0),
                (RightHip, 90.0),
            ],
            views: ANY_VIEW,
            parts: &[Hips, Hamstrings],
            pair: Some(("janu_sirsasana_twist", Side::Left)),
            symmetric: false,
            checks: vec![A::FoldForward],
        },
        Spec {
            name: "Janu Sirsasana Twist Right",
            description: "Right leg extended, left foot to inner thigh, twist towards the right.",
            category: Peak,
            difficulty: Medium,
            duration: 60,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 90.0),
                (RightKnee, 180.0),
                (LeftHip, 90.0),
                (RightHip, 90.0),
            ],
            views: ANY_VIEW,
            parts: &[Hips, Hamstrings],
            pair: Some(("janu_sirsasana_twist", Side::Right)),
            symmetric: false,
            checks: vec![A::FoldForward],
        },
        Spec {
            name: "Janu Sirsasana Revolved Left",
            description: "Left leg extended, fold forward from the hips over the left leg.",
            category: Peak,
            difficulty: Medium,
            duration: 60,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 180.0),
                (RightKnee, 90.0),
                (LeftHip, 70.0),
                (RightHip, 90.0),
            ],
            views: ANY_VIEW,
            parts: &[Flexibility],
            pair: Some(("janu_sirsasana_revolved", Side::Left)),
            symmetric: false,
            checks: vec![A::FoldForward],
        },
        Spec {
            name: "Janu Sirsasana Revolved Right",
            description: "Right leg extended, fold forward from the hips over the right leg.",
            category: Peak,
            difficulty: Medium,
            duration: 60,
            tolerance: 25.0,
            angles: &[
                (LeftKnee, 90.0),
                (RightKnee, 180.0),
                (LeftHip, 90.0),
                (RightHip, 70.0),
            ],
            views: ANY_VIEW,
            parts: &[Flexibility],
            pair: Some(("janu_sirsasana_revolved", Side::Right)),
            symmetric: false,
            checks: vec![A::FoldForward],
        },
        Spec {
            name: "Supine Bound Angle",
            description: "Lying on your back, soles together and knees falling open.",
            category: Cooldown,
            difficulty: Easy,
            duration: 90,
            tolerance: 20.0,
            angles: &[
                (LeftKnee, 55.0),
                (RightKnee, 55.0),
                (LeftHip, 55.0),
                (RightHip, 55.0),
            ],
            views: LYING_VIEW,
            parts: &[Hips, Flexibility, StressRelief],
            pair: None,
            symmetric: true,
            checks: Vec::new(),
        },
        Spec {
            name: "Hug the Knees",
            description: "Lying on your back, draw both knees into the chest.",
            category: Cooldown,
            difficulty: Easy,
            duration: 60,
            tolerance: 20.0,
            angles: &[
                (LeftKnee, 50.0),
                (RightKnee, 50.0),
                (LeftHip, 50.0),
                (RightHip, 50.0),
            ],
            views: LYING_VIEW,
            parts: &[LowerBack, StressRelief],
            pair: None,
            symmetric: true,
            checks: Vec::new(),
        },
        Spec {
            name: "Supine Bent Knees",
            description: "Lying on your back with knees bent and feet flat, hip-width apart.",
            category: Cooldown,
            difficulty: Easy,
            duration: 90,
            tolerance: 20.0,
            angles: &[
                (LeftKnee, 90.0),
                (RightKnee, 90.0),
                (LeftHip, 90.0),
                (RightHip, 90.0),
            ],
            views: LYING_VIEW,
            parts: &[LowerBack, Knees, StressRelief],
            pair: None,
            symmetric: true,
            checks: vec![A::KneesHipWidth],
        },
    ];

    specs.into_iter().map(Spec::into_definition).collect()
}
