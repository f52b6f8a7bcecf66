use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CAS_RETRIES;
use crate::pose::types::{BodyPart, PoseCategory};
use crate::store::keys;
use crate::store::{Store, StoreError};

const ENTITY: &str = "yoga_session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPose {
    pub pose_name: String,
    pub duration_sec: u32,
    /// 1-based position in the session.
    pub order: u32,
    pub category: PoseCategory,
    pub is_pain_target: bool,
    pub is_improvement_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompletion {
    pub completed_poses: u32,
    pub actual_duration_sec: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YogaSession {
    pub id: String,
    pub poses: Vec<SessionPose>,
    pub num_poses: usize,
    pub total_duration_min: f64,
    pub total_duration_sec: u32,
    pub pain_areas: Vec<BodyPart>,
    pub improvement_areas: Vec<BodyPart>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completion: Option<SessionCompletion>,
}

impl Store {
    pub fn create_yoga_session(&self, session: &YogaSession) -> Result<(), StoreError> {
        let key = keys::yoga_session_key(&session.id);
        let index_key =
            keys::yoga_session_created_key(session.created_at.timestamp_millis(), &session.id);
        let session_bytes = Self::serialize(session)?;

        let key_bytes = key.as_bytes().to_vec();
        let index_key_bytes = index_key.as_bytes().to_vec();
        self.yoga_sessions
            .transaction(move |tx| {
                tx.insert(key_bytes.as_slice(), session_bytes.as_slice())?;
                tx.insert(index_key_bytes.as_slice(), &[] as &[u8])?;
                Ok(())
            })
            .map_err(Self::tx_error)?;
        Ok(())
    }

    pub fn get_yoga_session(&self, session_id: &str) -> Result<Option<YogaSession>, StoreError> {
        if session_id.starts_with(keys::YOGA_SESSION_CREATED_PREFIX) {
            return Ok(None);
        }
        let key = keys::yoga_session_key(session_id);
        match self.yoga_sessions.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Records the completion exactly once. A second call fails with
    /// `Conflict`, concurrent callers race through compare-and-swap.
    pub fn complete_yoga_session(
        &self,
        session_id: &str,
        completion: SessionCompletion,
    ) -> Result<YogaSession, StoreError> {
        let not_found = || StoreError::NotFound {
            entity: ENTITY.to_string(),
            key: session_id.to_string(),
        };
        if session_id.starts_with(keys::YOGA_SESSION_CREATED_PREFIX) {
            return Err(not_found());
        }
        let key = keys::yoga_session_key(session_id);

        for _ in 0..MAX_CAS_RETRIES {
            let Some(current) = self.yoga_sessions.get(key.as_bytes())? else {
                return Err(not_found());
            };
            let mut session: YogaSession = Self::deserialize(&current)?;
            if session.completion.is_some() {
                return Err(StoreError::Conflict {
                    entity: ENTITY.to_string(),
                    key: session_id.to_string(),
                });
            }
            session.completion = Some(completion.clone());
            let next = Self::serialize(&session)?;

            match self
                .yoga_sessions
                .compare_and_swap(key.as_bytes(), Some(current), Some(next))?
            {
                Ok(()) => return Ok(session),
                Err(_) => {
                    tracing::debug!(session_id, "completion lost CAS race, retrying");
                    continue;
                }
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: ENTITY.to_string(),
            key: session_id.to_string(),
            attempts: MAX_CAS_RETRIES,
        })
    }

    /// Deletes sessions created before `cutoff`, oldest first, at most
    /// `max_batch` per call. Returns the number removed.
    pub fn cleanup_expired_yoga_sessions(
        &self,
        cutoff: DateTime<Utc>,
        max_batch: usize,
    ) -> Result<u32, StoreError> {
        let cutoff_ms = cutoff.timestamp_millis();
        let mut expired = Vec::new();
        for item in self
            .yoga_sessions
            .scan_prefix(keys::YOGA_SESSION_CREATED_PREFIX.as_bytes())
        {
            let (k, _) = item?;
            let key_str = String::from_utf8_lossy(&k);
            let Some((created_ms, id)) = keys::parse_yoga_session_created_key(&key_str) else {
                tracing::warn!(key = %key_str, "skipping malformed session index key");
                continue;
            };
            if created_ms >= cutoff_ms || expired.len() >= max_batch {
                break;
            }
            expired.push((k.to_vec(), keys::yoga_session_key(id).into_bytes()));
        }

        let count = expired.len() as u32;
        for (index_key, key) in expired {
            self.yoga_sessions
                .transaction(move |tx| {
                    tx.remove(index_key.as_slice())?;
                    tx.remove(key.as_slice())?;
                    Ok(())
                })
                .map_err(Self::tx_error)?;
        }
        Ok(count)
    }

    pub fn count_yoga_sessions(&self) -> Result<usize, StoreError> {
        let mut count = 0;
        for item in self
            .yoga_sessions
            .scan_prefix(keys::YOGA_SESSION_CREATED_PREFIX.as_bytes())
        {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
