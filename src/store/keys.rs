/// Prefix of the creation-time index kept inside the `yoga_sessions` tree.
pub const YOGA_SESSION_CREATED_PREFIX: &str = "created:";

pub fn yoga_session_key(session_id: &str) -> String {
    session_id.to_string()
}

/// Zero-padded so lexicographic order is chronological order.
pub fn yoga_session_created_key(created_at_ms: i64, session_id: &str) -> String {
    let ts = created_at_ms.max(0) as u64;
    format!("{}{:020}:{}", YOGA_SESSION_CREATED_PREFIX, ts, session_id)
}

/// Splits a creation index key back into `(created_at_ms, session_id)`.
pub fn parse_yoga_session_created_key(key: &str) -> Option<(i64, &str)> {
    let rest = key.strip_prefix(YOGA_SESSION_CREATED_PREFIX)?;
    let (ts, id) = rest.split_once(':')?;
    let ts = ts.parse::<u64>().ok()?;
    Some((i64::try_from(ts).ok()?, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_keys_order_by_time_asc() {
        let older = yoga_session_created_key(1_000, "b");
        let newer = yoga_session_created_key(20_000, "a");
        assert!(older < newer);
    }

    #[test]
    fn created_key_parses_back() {
        let key = yoga_session_created_key(1_700_000_000_000, "abc-123");
        assert_eq!(
            parse_yoga_session_created_key(&key),
            Some((1_700_000_000_000, "abc-123"))
        );
        assert_eq!(parse_yoga_session_created_key("abc-123"), None);
    }

    #[test]
    fn negative_timestamps_clamp_to_zero() {
        let key = yoga_session_created_key(-5, "x");
        assert_eq!(parse_yoga_session_created_key(&key), Some((0, "x")));
    }
}
