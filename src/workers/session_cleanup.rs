use chrono::{DateTime, Duration, Utc};

use crate::constants::CLEANUP_BATCH_SIZE;
use crate::store::{Store, StoreError};

/// Upper bound on batches per run so one sweep cannot monopolize the store.
const MAX_BATCHES_PER_RUN: usize = 100;

pub async fn run(store: &Store, retention_days: i64) {
    tracing::debug!(retention_days, "session_cleanup: start");
    match sweep(store, Utc::now(), retention_days, CLEANUP_BATCH_SIZE) {
        Ok(count) => tracing::info!(cleaned = count, "session_cleanup: done"),
        Err(e) => tracing::error!(error = %e, "session_cleanup failed"),
    }
}

/// Deletes sessions created more than `retention_days` before `now`, in
/// batches, and returns how many were removed.
pub fn sweep(
    store: &Store,
    now: DateTime<Utc>,
    retention_days: i64,
    batch_size: usize,
) -> Result<u32, StoreError> {
    let Some(cutoff) = Duration::try_days(retention_days.max(0))
        .and_then(|window| now.checked_sub_signed(window))
    else {
        tracing::warn!(retention_days, "session_cleanup: retention out of range, skipping");
        return Ok(0);
    };
    let mut total = 0;
    for _ in 0..MAX_BATCHES_PER_RUN {
        let removed = store.cleanup_expired_yoga_sessions(cutoff, batch_size)?;
        total += removed;
        if (removed as usize) < batch_size {
            break;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::operations::yoga_sessions::YogaSession;

    fn session(id: &str, created_at: DateTime<Utc>) -> YogaSession {
        YogaSession {
            id: id.to_string(),
            poses: Vec::new(),
            num_poses: 0,
            total_duration_min: 10.0,
            total_duration_sec: 600,
            pain_areas: Vec::new(),
            improvement_areas: Vec::new(),
            created_at,
            completion: None,
        }
    }

    #[test]
    fn sweep_drains_every_batch_past_retention() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Store::open(tmp.path().join("cleanup.sled").to_str().unwrap()).unwrap();
        let now = Utc::now();
        for i in 0..5 {
            store
                .create_yoga_session(&session(&format!("old-{i}"), now - Duration::days(31 + i)))
                .unwrap();
        }
        store
            .create_yoga_session(&session("recent", now - Duration::days(29)))
            .unwrap();

        assert_eq!(sweep(&store, now, 30, 2).unwrap(), 5);
        assert_eq!(store.count_yoga_sessions().unwrap(), 1);
        assert!(store.get_yoga_session("recent").unwrap().is_some());
    }

    #[test]
    fn sweep_on_empty_store_is_a_no_op() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Store::open(tmp.path().join("cleanup.sled").to_str().unwrap()).unwrap();
        assert_eq!(sweep(&store, Utc::now(), 30, 10).unwrap(), 0);
    }

    #[test]
    fn out_of_range_retention_keeps_everything() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Store::open(tmp.path().join("cleanup.sled").to_str().unwrap()).unwrap();
        let now = Utc::now();
        store
            .create_yoga_session(&session("ancient", now - Duration::days(3650)))
            .unwrap();

        assert_eq!(sweep(&store, now, i64::MAX, 10).unwrap(), 0);
        assert_eq!(store.count_yoga_sessions().unwrap(), 1);
    }
}
