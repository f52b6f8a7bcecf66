//! Landmark frame as produced by the external detector.
//!
//! Indices follow the 33-point body topology used by the detector; any other
//! topology must be translated before it reaches this module.

use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// One tracked body point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility >= threshold
    }
}

/// An immutable frame of landmarks.
///
/// Frames shorter than [`LANDMARK_COUNT`] are accepted: indices past the end
/// behave like landmarks with zero visibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks(Vec<Landmark>);

impl Landmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self(points)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.0.get(index)
    }

    /// Landmark at `index` if it exists and meets the visibility threshold.
    pub fn visible(&self, index: usize, threshold: f64) -> Option<&Landmark> {
        self.0.get(index).filter(|lm| lm.is_visible(threshold))
    }

    pub fn visibility(&self, index: usize) -> f64 {
        self.0.get(index).map_or(0.0, |lm| lm.visibility)
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Landmark> {
        self.0
    }
}

impl From<Vec<Landmark>> for Landmarks {
    fn from(points: Vec<Landmark>) -> Self {
        Self(points)
    }
}
