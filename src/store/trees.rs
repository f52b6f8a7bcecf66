pub const YOGA_SESSIONS: &str = "yoga_sessions";
