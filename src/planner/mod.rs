//! Session planning: pose selection, warmup/peak/cooldown ordering and
//! duration allocation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::constants::{MAX_SESSION_MINUTES, MIN_SESSION_MINUTES};
use crate::pose::catalog::{PoseCatalog, PoseDefinition};
use crate::pose::types::{BodyPart, PoseCategory};
use crate::store::operations::yoga_sessions::{SessionPose, YogaSession};

#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    #[error("duration must be between 10 and 90 minutes, got {0}")]
    InvalidDuration(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPreview {
    pub estimated_poses: usize,
    pub targets_pain: bool,
    pub targets_improvement: bool,
}

#[derive(Debug, Clone)]
pub struct SessionPlanner {
    catalog: Arc<PoseCatalog>,
}

impl SessionPlanner {
    pub fn new(catalog: Arc<PoseCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PoseCatalog {
        &self.catalog
    }

    /// Builds a new session with a fresh id. Everything except the id and
    /// timestamp is a pure function of the catalog and the inputs.
    pub fn generate(
        &self,
        pain: &[BodyPart],
        improvement: &[BodyPart],
        minutes: f64,
    ) -> Result<YogaSession, PlannerError> {
        let poses = self.plan(pain, improvement, minutes)?;
        let total_duration_sec = poses.iter().map(|p| p.duration_sec).sum();
        let session = YogaSession {
            id: uuid::Uuid::new_v4().to_string(),
            num_poses: poses.len(),
            poses,
            total_duration_min: minutes,
            total_duration_sec,
            pain_areas: pain.to_vec(),
            improvement_areas: improvement.to_vec(),
            created_at: Utc::now(),
            completion: None,
        };
        tracing::info!(
            session_id = %session.id,
            num_poses = session.num_poses,
            total_duration_sec,
            "session planned"
        );
        Ok(session)
    }

    /// Ordered poses with allocated durations.
    pub fn plan(
        &self,
        pain: &[BodyPart],
        improvement: &[BodyPart],
        minutes: f64,
    ) -> Result<Vec<SessionPose>, PlannerError> {
        if !minutes.is_finite() || !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&minutes)
        {
            return Err(PlannerError::InvalidDuration(minutes));
        }
        let total_sec = (minutes * 60.0).round() as u32;

        let ordered = self.select(pain, improvement);
        let defaults: Vec<u32> = ordered.iter().map(|p| p.default_duration_sec).collect();
        let durations = allocate(&defaults, total_sec);

        Ok(ordered
            .iter()
            .zip(durations)
            .enumerate()
            .map(|(i, (pose, duration_sec))| SessionPose {
                pose_name: pose.name.clone(),
                duration_sec,
                order: i as u32 + 1,
                category: pose.category,
                is_pain_target: pose.targets_any(pain),
                is_improvement_target: pose.targets_any(improvement),
            })
            .collect())
    }

    pub fn preview(&self, pain: &[BodyPart], improvement: &[BodyPart]) -> SessionPreview {
        let matches = |parts: &[BodyPart]| self.catalog.iter().any(|p| p.targets_any(parts));
        SessionPreview {
            estimated_poses: self.select(pain, improvement).len(),
            targets_pain: matches(pain),
            targets_improvement: matches(improvement),
        }
    }

    /// Candidate poses in session order: category blocks, catalog order
    /// within a block, each asymmetric variant followed by its partner.
    fn select(&self, pain: &[BodyPart], improvement: &[BodyPart]) -> Vec<&PoseDefinition> {
        let requested: Vec<BodyPart> = pain.iter().chain(improvement).copied().collect();

        let mut chosen: HashSet<&str> = if requested.is_empty() {
            self.catalog.iter().map(|p| p.name.as_str()).collect()
        } else {
            self.catalog
                .iter()
                .filter(|p| p.targets_any(&requested))
                .map(|p| p.name.as_str())
                .collect()
        };
        if chosen.is_empty() {
            tracing::warn!(
                ?requested,
                "no pose targets the requested body parts, using the full catalog"
            );
            chosen = self.catalog.iter().map(|p| p.name.as_str()).collect();
        }

        let partners: Vec<&str> = chosen
            .iter()
            .filter_map(|name| self.catalog.partner_of(name))
            .map(|p| p.name.as_str())
            .collect();
        chosen.extend(partners);

        let mut ordered = Vec::with_capacity(chosen.len());
        let mut emitted: HashSet<&str> = HashSet::with_capacity(chosen.len());
        for category in PoseCategory::ALL {
            for pose in self.catalog.iter().filter(|p| p.category == category) {
                if !chosen.contains(pose.name.as_str()) || !emitted.insert(pose.name.as_str()) {
                    continue;
                }
                ordered.push(pose);
                if let Some(partner) = self.catalog.partner_of(&pose.name) {
                    if emitted.insert(partner.name.as_str()) {
                        ordered.push(partner);
                    }
                }
            }
        }
        ordered
    }
}

/// Scales `defaults` by one common factor so the rounded durations sum to
/// `total_sec`. Rounding drift lands on the last pose and spills backwards
/// only when a pose would drop below one second.
fn allocate(defaults: &[u32], total_sec: u32) -> Vec<u32> {
    let base_sum: u64 = defaults.iter().map(|&d| u64::from(d)).sum();
    if base_sum == 0 {
        return vec![0; defaults.len()];
    }
    let factor = f64::from(total_sec) / base_sum as f64;

    let mut durations: Vec<i64> = defaults
        .iter()
        .map(|&d| ((f64::from(d) * factor).round() as i64).max(1))
        .collect();

    let mut drift = i64::from(total_sec) - durations.iter().sum::<i64>();
    for duration in durations.iter_mut().rev() {
        if drift == 0 {
            break;
        }
        let adjusted = (*duration + drift).max(1);
        drift -= adjusted - *duration;
        *duration = adjusted;
    }

    durations.into_iter().map(|d| d as u32).collect()
}
