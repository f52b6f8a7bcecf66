use serde::{Deserialize, Serialize};

use crate::pose::geometry::LandmarkSpace;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationConfig {
    pub visibility_threshold: f64,
    /// Normalized horizontal distance below which a left/right landmark
    /// pair is considered overlapping (the body is seen from the side).
    pub side_separation_threshold: f64,
    /// The torso is treated as horizontal when `|dx| > |dy| * ratio`.
    pub lying_axis_ratio: f64,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            side_separation_threshold: 0.15,
            lying_axis_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    pub visibility_threshold: f64,
    /// Free-practice matches below this confidence are reported as unrecognized.
    pub recognition_threshold: f64,
    pub min_visible_joints: usize,
    pub min_visible_ratio: f64,
    /// Joints within `tolerance * factor` are "needs_improvement", beyond are "poor".
    pub needs_improvement_factor: f64,
    #[serde(default)]
    pub landmark_space: LandmarkSpace,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            recognition_threshold: 0.6,
            min_visible_joints: 2,
            min_visible_ratio: 0.5,
            needs_improvement_factor: 1.5,
            landmark_space: LandmarkSpace::Planar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackConfig {
    pub visibility_threshold: f64,
    pub max_feedback_items: usize,
    /// Maximum normalized height difference between paired shoulders or hips.
    pub level_threshold: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            max_feedback_items: 3,
            level_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default)]
    pub orientation: OrientationConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl AnalysisConfig {
    pub fn from_env(env_config: &crate::config::AnalysisEnvConfig) -> Self {
        let mut config = Self::default();
        config.orientation.visibility_threshold = env_config.visibility_threshold;
        config.matcher.visibility_threshold = env_config.visibility_threshold;
        config.feedback.visibility_threshold = env_config.visibility_threshold;
        config.matcher.recognition_threshold = env_config.recognition_threshold;
        config.matcher.landmark_space = env_config.landmark_space;
        config.feedback.max_feedback_items = env_config.max_feedback_items;
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.orientation.visibility_threshold) {
            return Err("orientation.visibility_threshold must be in [0,1]".to_string());
        }
        if !(self.orientation.side_separation_threshold > 0.0) {
            return Err("orientation.side_separation_threshold must be > 0".to_string());
        }
        if !(self.orientation.lying_axis_ratio > 0.0) {
            return Err("orientation.lying_axis_ratio must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.matcher.visibility_threshold) {
            return Err("matcher.visibility_threshold must be in [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.matcher.recognition_threshold) {
            return Err("matcher.recognition_threshold must be in [0,1]".to_string());
        }
        if self.matcher.min_visible_joints == 0 {
            return Err("matcher.min_visible_joints must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.matcher.min_visible_ratio) {
            return Err("matcher.min_visible_ratio must be in [0,1]".to_string());
        }
        if !(self.matcher.needs_improvement_factor >= 1.0) {
            return Err("matcher.needs_improvement_factor must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.feedback.visibility_threshold) {
            return Err("feedback.visibility_threshold must be in [0,1]".to_string());
        }
        if self.feedback.max_feedback_items == 0 {
            return Err("feedback.max_feedback_items must be >= 1".to_string());
        }
        if !(self.feedback.level_threshold > 0.0) {
            return Err("feedback.level_threshold must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisEnvConfig;

    #[test]
    fn defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn env_overrides_apply_to_every_stage() {
        let cfg = AnalysisConfig::from_env(&AnalysisEnvConfig {
            visibility_threshold: 0.3,
            recognition_threshold: 0.7,
            max_feedback_items: 5,
            landmark_space: LandmarkSpace::Spatial,
        });
        assert_eq!(cfg.orientation.visibility_threshold, 0.3);
        assert_eq!(cfg.matcher.visibility_threshold, 0.3);
        assert_eq!(cfg.feedback.visibility_threshold, 0.3);
        assert_eq!(cfg.matcher.recognition_threshold, 0.7);
        assert_eq!(cfg.feedback.max_feedback_items, 5);
        assert_eq!(cfg.matcher.landmark_space, LandmarkSpace::Spatial);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut cfg = AnalysisConfig::default();
        cfg.matcher.recognition_threshold = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.feedback.max_feedback_items = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AnalysisConfig::default();
        cfg.orientation.side_separation_threshold = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
