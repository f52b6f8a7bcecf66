//! Joint angle and distance helpers. Pure functions, no state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pose::landmarks::Landmark;

/// Rays shorter than this are treated as degenerate.
const MIN_RAY_LENGTH: f64 = 1e-9;

/// Angle in degrees at vertex `b` between rays `b→a` and `b→c`, measured on
/// the (x, y) projection. Depth is ignored because the detector's z estimate
/// is far noisier than its image-plane coordinates.
///
/// Returns `None` when either ray is degenerate or any input is non-finite.
pub fn angle_between(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    ray_angle([a.x - b.x, a.y - b.y, 0.0], [c.x - b.x, c.y - b.y, 0.0])
}

/// Same as [`angle_between`] but using all three coordinates.
pub fn angle_between_3d(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    ray_angle(
        [a.x - b.x, a.y - b.y, a.z - b.z],
        [c.x - b.x, c.y - b.y, c.z - b.z],
    )
}

fn ray_angle(v1: [f64; 3], v2: [f64; 3]) -> Option<f64> {
    let n1 = norm(v1);
    let n2 = norm(v2);
    if !n1.is_finite() || !n2.is_finite() || n1 < MIN_RAY_LENGTH || n2 < MIN_RAY_LENGTH {
        return None;
    }
    let dot = v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2];
    let cos = (dot / (n1 * n2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Coordinates joint angles are measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkSpace {
    /// Image plane only.
    #[default]
    Planar,
    /// Image plane plus the detector's depth estimate.
    Spatial,
}

impl LandmarkSpace {
    pub fn angle(self, a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
        match self {
            Self::Planar => angle_between(a, b, c),
            Self::Spatial => angle_between_3d(a, b, c),
        }
    }
}

impl FromStr for LandmarkSpace {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "planar" | "2d" => Ok(Self::Planar),
            "spatial" | "3d" => Ok(Self::Spatial),
            other => Err(format!("unknown landmark space: {other}")),
        }
    }
}

pub fn distance_2d(a: &Landmark, b: &Landmark) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Midpoint of two landmarks; visibility is the lower of the two.
pub fn midpoint(a: &Landmark, b: &Landmark) -> Landmark {
    Landmark {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
        z: (a.z + b.z) / 2.0,
        visibility: a.visibility.min(b.visibility),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y, 0.0, 1.0)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn straight_line_is_180() {
        let angle = angle_between(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)).unwrap();
        assert!(approx(angle, 180.0));
    }

    #[test]
    fn right_angle_is_90() {
        let angle = angle_between(&p(0.0, 1.0), &p(0.0, 0.0), &p(1.0, 0.0)).unwrap();
        assert!(approx(angle, 90.0));
    }

    #[test]
    fn forty_five_degrees() {
        let angle = angle_between(&p(1.0, 0.0), &p(0.0, 0.0), &p(1.0, 1.0)).unwrap();
        assert!(approx(angle, 45.0));
    }

    #[test]
    fn argument_order_of_rays_does_not_matter() {
        let a = p(0.2, 0.7);
        let b = p(0.4, 0.4);
        let c = p(0.9, 0.5);
        let forward = angle_between(&a, &b, &c).unwrap();
        let backward = angle_between(&c, &b, &a).unwrap();
        assert!(approx(forward, backward));
    }

    #[test]
    fn coincident_points_are_degenerate() {
        assert!(angle_between(&p(0.5, 0.5), &p(0.5, 0.5), &p(1.0, 0.0)).is_none());
        assert!(angle_between(&p(0.0, 0.0), &p(0.5, 0.5), &p(0.5, 0.5)).is_none());
    }

    #[test]
    fn non_finite_input_is_degenerate() {
        assert!(angle_between(&p(f64::NAN, 0.0), &p(0.0, 0.0), &p(1.0, 0.0)).is_none());
    }

    #[test]
    fn depth_counts_only_in_spatial_space() {
        let a = Landmark::new(0.0, 1.0, 0.0, 1.0);
        let b = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let c = Landmark::new(1.0, 0.0, 5.0, 1.0);
        assert!(approx(LandmarkSpace::Planar.angle(&a, &b, &c).unwrap(), 90.0));
        assert!(approx(LandmarkSpace::Spatial.angle(&a, &b, &c).unwrap(), 90.0));

        let c_depth = Landmark::new(0.0, 1.0, 1.0, 1.0);
        assert!(approx(LandmarkSpace::Planar.angle(&a, &b, &c_depth).unwrap(), 0.0));
        assert!(approx(LandmarkSpace::Spatial.angle(&a, &b, &c_depth).unwrap(), 45.0));
    }

    #[test]
    fn landmark_space_parses_from_env_values() {
        assert_eq!("3D".parse::<LandmarkSpace>().unwrap(), LandmarkSpace::Spatial);
        assert_eq!(" planar ".parse::<LandmarkSpace>().unwrap(), LandmarkSpace::Planar);
        assert!("hyperbolic".parse::<LandmarkSpace>().is_err());
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let b = Landmark::new(3.0, 4.0, 12.0, 1.0);
        assert!(approx(distance_2d(&a, &b), 5.0));
    }

    #[test]
    fn midpoint_keeps_weaker_visibility() {
        let m = midpoint(
            &Landmark::new(0.0, 0.0, 0.0, 0.9),
            &Landmark::new(1.0, 2.0, 0.0, 0.3),
        );
        assert!(approx(m.x, 0.5));
        assert!(approx(m.y, 1.0));
        assert!(approx(m.visibility, 0.3));
    }
}
