use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pose::landmarks::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE,
    RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn shoulder(self) -> usize {
        match self {
            Self::Left => LEFT_SHOULDER,
            Self::Right => RIGHT_SHOULDER,
        }
    }

    pub fn wrist(self) -> usize {
        match self {
            Self::Left => LEFT_WRIST,
            Self::Right => RIGHT_WRIST,
        }
    }

    pub fn hip(self) -> usize {
        match self {
            Self::Left => LEFT_HIP,
            Self::Right => RIGHT_HIP,
        }
    }

    pub fn knee(self) -> usize {
        match self {
            Self::Left => LEFT_KNEE,
            Self::Right => RIGHT_KNEE,
        }
    }

    pub fn ankle(self) -> usize {
        match self {
            Self::Left => LEFT_ANKLE,
            Self::Right => RIGHT_ANKLE,
        }
    }
}

/// The fixed set of joint angles every pose definition draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointAngle {
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
    LeftHip,
    RightHip,
    LeftShoulder,
    RightShoulder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Elbow,
    Knee,
    Hip,
    Shoulder,
}

impl JointAngle {
    pub const ALL: [JointAngle; 8] = [
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftShoulder,
        Self::RightShoulder,
    ];

    /// Landmark indices `(a, vertex, c)`.
    pub fn triple(self) -> (usize, usize, usize) {
        match self {
            Self::LeftElbow => (LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST),
            Self::RightElbow => (RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST),
            Self::LeftKnee => (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
            Self::RightKnee => (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
            Self::LeftHip => (LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE),
            Self::RightHip => (RIGHT_SHOULDER, RIGHT_HIP, RIGHT_KNEE),
            Self::LeftShoulder => (LEFT_ELBOW, LEFT_SHOULDER, LEFT_HIP),
            Self::RightShoulder => (RIGHT_ELBOW, RIGHT_SHOULDER, RIGHT_HIP),
        }
    }

    pub fn side(self) -> Side {
        match self {
            Self::LeftElbow | Self::LeftKnee | Self::LeftHip | Self::LeftShoulder => Side::Left,
            Self::RightElbow | Self::RightKnee | Self::RightHip | Self::RightShoulder => {
                Side::Right
            }
        }
    }

    pub fn kind(self) -> JointKind {
        match self {
            Self::LeftElbow | Self::RightElbow => JointKind::Elbow,
            Self::LeftKnee | Self::RightKnee => JointKind::Knee,
            Self::LeftHip | Self::RightHip => JointKind::Hip,
            Self::LeftShoulder | Self::RightShoulder => JointKind::Shoulder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
        }
    }

    /// Human readable joint name, e.g. "left knee".
    pub fn joint_name(self) -> &'static str {
        match self {
            Self::LeftElbow => "left elbow",
            Self::RightElbow => "right elbow",
            Self::LeftKnee => "left knee",
            Self::RightKnee => "right knee",
            Self::LeftHip => "left hip",
            Self::RightHip => "right hip",
            Self::LeftShoulder => "left shoulder",
            Self::RightShoulder => "right shoulder",
        }
    }
}

/// Camera-relative body orientation. `SideLeft` means the subject's left
/// side faces the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Front,
    SideLeft,
    SideRight,
    Supine,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::SideLeft => "side_left",
            Self::SideRight => "side_right",
            Self::Supine => "supine",
        }
    }

    pub fn is_side(self) -> bool {
        matches!(self, Self::SideLeft | Self::SideRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseCategory {
    Warmup,
    Peak,
    Cooldown,
}

impl PoseCategory {
    pub const ALL: [PoseCategory; 3] = [Self::Warmup, Self::Peak, Self::Cooldown];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warmup => "warmup",
            Self::Peak => "peak",
            Self::Cooldown => "cooldown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Neck,
    #[serde(alias = "shoulder")]
    Shoulders,
    UpperBack,
    LowerBack,
    #[serde(alias = "hip")]
    Hips,
    #[serde(alias = "knee")]
    Knees,
    #[serde(alias = "hamstring")]
    Hamstrings,
    Core,
    Balance,
    Flexibility,
    StressRelief,
    Posture,
}

impl BodyPart {
    pub const ALL: [BodyPart; 12] = [
        Self::Neck,
        Self::Shoulders,
        Self::UpperBack,
        Self::LowerBack,
        Self::Hips,
        Self::Knees,
        Self::Hamstrings,
        Self::Core,
        Self::Balance,
        Self::Flexibility,
        Self::StressRelief,
        Self::Posture,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neck => "neck",
            Self::Shoulders => "shoulders",
            Self::UpperBack => "upper_back",
            Self::LowerBack => "lower_back",
            Self::Hips => "hips",
            Self::Knees => "knees",
            Self::Hamstrings => "hamstrings",
            Self::Core => "core",
            Self::Balance => "balance",
            Self::Flexibility => "flexibility",
            Self::StressRelief => "stress_relief",
            Self::Posture => "posture",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBodyPart(pub String);

impl fmt::Display for UnknownBodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown body part: {}", self.0)
    }
}

impl std::error::Error for UnknownBodyPart {}

impl FromStr for BodyPart {
    type Err = UnknownBodyPart;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let part = match normalized.as_str() {
            "neck" => Self::Neck,
            "shoulders" | "shoulder" => Self::Shoulders,
            "upper_back" => Self::UpperBack,
            "lower_back" => Self::LowerBack,
            "hips" | "hip" => Self::Hips,
            "knees" | "knee" => Self::Knees,
            "hamstrings" | "hamstring" => Self::Hamstrings,
            "core" => Self::Core,
            "balance" => Self::Balance,
            "flexibility" => Self::Flexibility,
            "stress_relief" => Self::StressRelief,
            "posture" => Self::Posture,
            _ => return Err(UnknownBodyPart(raw.to_string())),
        };
        Ok(part)
    }
}
