/// Maximum retries for compare-and-swap updates.
pub const MAX_CAS_RETRIES: u32 = 20;

/// Accepted session length in minutes, inclusive.
pub const MIN_SESSION_MINUTES: f64 = 10.0;
pub const MAX_SESSION_MINUTES: f64 = 90.0;

/// Upper bound for JSON request bodies.
pub const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Capacity of the per-connection outbound WebSocket queue.
pub const STREAM_OUTBOUND_BUFFER: usize = 32;

/// Sessions removed per cleanup pass.
pub const CLEANUP_BATCH_SIZE: usize = 500;
/// Retention beyond a century is treated as "keep forever".
pub const MAX_RETENTION_DAYS: i64 = 36_500;
