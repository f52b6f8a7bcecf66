pub mod yoga_sessions;
