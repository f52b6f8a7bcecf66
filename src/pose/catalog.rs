//! Immutable pose reference data and its lookup indices.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pose::builtin;
use crate::pose::quality::AlignmentCheck;
use crate::pose::types::{BodyPart, Difficulty, JointAngle, Orientation, PoseCategory, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleTarget {
    pub joint: JointAngle,
    pub degrees: f64,
    /// Overrides the pose-wide tolerance for this joint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_deg: Option<f64>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl AngleTarget {
    pub fn new(joint: JointAngle, degrees: f64) -> Self {
        Self {
            joint,
            degrees,
            tolerance_deg: None,
            weight: 1.0,
        }
    }
}

/// Links the left and right variants of an asymmetric pose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairLink {
    pub key: String,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: PoseCategory,
    pub difficulty: Difficulty,
    pub default_duration_sec: u32,
    pub tolerance_deg: f64,
    pub target_angles: Vec<AngleTarget>,
    pub valid_orientations: Vec<Orientation>,
    pub target_body_parts: Vec<BodyPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asymmetric_pair: Option<PairLink>,
    #[serde(default)]
    pub symmetric: bool,
    #[serde(default)]
    pub alignment_checks: Vec<AlignmentCheck>,
}

impl PoseDefinition {
    pub fn tolerance_for(&self, target: &AngleTarget) -> f64 {
        target.tolerance_deg.unwrap_or(self.tolerance_deg)
    }

    pub fn accepts(&self, orientation: Orientation) -> bool {
        self.valid_orientations.contains(&orientation)
    }

    pub fn targets_any(&self, parts: &[BodyPart]) -> bool {
        self.target_body_parts.iter().any(|p| parts.contains(p))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PosePair<'a> {
    pub left: &'a PoseDefinition,
    pub right: &'a PoseDefinition,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,
    #[error("duplicate pose name: {0}")]
    DuplicateName(String),
    #[error("pose {pose}: {message}")]
    InvalidPose { pose: String, message: String },
    #[error("asymmetric pair {key}: {message}")]
    InvalidPair { key: String, message: String },
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct PoseCatalog {
    poses: Vec<PoseDefinition>,
    by_name: HashMap<String, usize>,
    by_part: HashMap<BodyPart, Vec<usize>>,
    pairs: HashMap<String, (usize, usize)>,
}

impl PoseCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_definitions(builtin::definitions())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let definitions: Vec<PoseDefinition> = serde_json::from_str(&raw)?;
        Self::from_definitions(definitions)
    }

    pub fn from_definitions(poses: Vec<PoseDefinition>) -> Result<Self, CatalogError> {
        if poses.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_name = HashMap::with_capacity(poses.len());
        let mut by_part: HashMap<BodyPart, Vec<usize>> = HashMap::new();
        let mut halves: HashMap<String, (Option<usize>, Option<usize>)> = HashMap::new();

        for (index, pose) in poses.iter().enumerate() {
            validate_pose(pose)?;
            if by_name.insert(pose.name.clone(), index).is_some() {
                return Err(CatalogError::DuplicateName(pose.name.clone()));
            }
            let parts: HashSet<BodyPart> = pose.target_body_parts.iter().copied().collect();
            for part in parts {
                by_part.entry(part).or_default().push(index);
            }
            if let Some(link) = &pose.asymmetric_pair {
                let slot = halves.entry(link.key.clone()).or_default();
                let half = match link.side {
                    Side::Left => &mut slot.0,
                    Side::Right => &mut slot.1,
                };
                if half.replace(index).is_some() {
                    return Err(CatalogError::InvalidPair {
                        key: link.key.clone(),
                        message: format!("more than one {} variant", link.side.as_str()),
                    });
                }
            }
        }

        let mut pairs = HashMap::with_capacity(halves.len());
        for (key, half) in halves {
            let (Some(left), Some(right)) = half else {
                return Err(CatalogError::InvalidPair {
                    key,
                    message: "needs exactly one left and one right variant".to_string(),
                });
            };
            let (l, r) = (&poses[left], &poses[right]);
            if l.category != r.category {
                return Err(CatalogError::InvalidPair {
                    key,
                    message: "variants must share a category".to_string(),
                });
            }
            let l_parts: HashSet<_> = l.target_body_parts.iter().collect();
            let r_parts: HashSet<_> = r.target_body_parts.iter().collect();
            if l_parts != r_parts {
                return Err(CatalogError::InvalidPair {
                    key,
                    message: "variants must target the same body parts".to_string(),
                });
            }
            pairs.insert(key, (left, right));
        }

        Ok(Self {
            poses,
            by_name,
            by_part,
            pairs,
        })
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Poses in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PoseDefinition> {
        self.poses.iter()
    }

    pub fn get(&self, name: &str) -> Option<&PoseDefinition> {
        self.by_name.get(name).map(|&i| &self.poses[i])
    }

    /// Names of poses targeting `part`, in declaration order.
    pub fn by_body_part(&self, part: BodyPart) -> Vec<&str> {
        self.by_part
            .get(&part)
            .map(|indices| indices.iter().map(|&i| self.poses[i].name.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn pair(&self, key: &str) -> Option<PosePair<'_>> {
        self.pairs.get(key).map(|&(l, r)| PosePair {
            left: &self.poses[l],
            right: &self.poses[r],
        })
    }

    pub fn partner_of(&self, name: &str) -> Option<&PoseDefinition> {
        let link = self.get(name)?.asymmetric_pair.as_ref()?;
        let pair = self.pair(&link.key)?;
        match link.side {
            Side::Left => Some(pair.right),
            Side::Right => Some(pair.left),
        }
    }

    pub fn category(&self, category: PoseCategory) -> Vec<&PoseDefinition> {
        self.poses.iter().filter(|p| p.category == category).collect()
    }
}

fn validate_pose(pose: &PoseDefinition) -> Result<(), CatalogError> {
    let invalid = |message: &str| CatalogError::InvalidPose {
        pose: pose.name.clone(),
        message: message.to_string(),
    };

    if pose.name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if !(pose.tolerance_deg > 0.0 && pose.tolerance_deg.is_finite()) {
        return Err(invalid("tolerance must be a positive number of degrees"));
    }
    if pose.default_duration_sec == 0 {
        return Err(invalid("default duration must be positive"));
    }
    if pose.target_angles.is_empty() {
        return Err(invalid("at least one target angle is required"));
    }
    if pose.valid_orientations.is_empty() {
        return Err(invalid("at least one valid orientation is required"));
    }
    let mut seen = HashSet::new();
    for target in &pose.target_angles {
        if !seen.insert(target.joint) {
            return Err(invalid(&format!("duplicate target for {}", target.joint.as_str())));
        }
        if !(0.0..=180.0).contains(&target.degrees) {
            return Err(invalid(&format!(
                "target for {} must be within [0, 180] degrees",
                target.joint.as_str()
            )));
        }
        if let Some(tolerance) = target.tolerance_deg {
            if !(tolerance > 0.0 && tolerance.is_finite()) {
                return Err(invalid(&format!(
                    "tolerance override for {} must be positive",
                    target.joint.as_str()
                )));
            }
        }
        if !(target.weight > 0.0 && target.weight.is_finite()) {
            return Err(invalid(&format!(
                "weight for {} must be positive",
                target.joint.as_str()
            )));
        }
    }
    Ok(())
}
