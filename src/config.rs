use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_RETENTION_DAYS;
use crate::pose::geometry::LandmarkSpace;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    /// JSON pose catalog replacing the built-in data set.
    pub catalog_path: Option<String>,
    pub detector: DetectorConfig,
    pub stream: StreamConfig,
    pub worker: WorkerConfig,
    pub analysis: AnalysisEnvConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorMode {
    Http,
    Mock,
    Disabled,
}

impl DetectorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Mock => "mock",
            Self::Disabled => "disabled",
        }
    }
}

impl FromStr for DetectorMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            "disabled" | "off" => Ok(Self::Disabled),
            other => Err(format!("unknown detector mode: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct DetectorConfig {
    pub mode: DetectorMode,
    pub url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub max_connections: usize,
    pub max_frame_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub session_retention_days: i64,
}

#[derive(Debug, Clone)]
pub struct AnalysisEnvConfig {
    pub visibility_threshold: f64,
    pub recognition_threshold: f64,
    pub max_feedback_items: usize,
    pub landmark_space: LandmarkSpace,
}

impl fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("mode", &self.mode)
            .field("url", &self.url)
            .field("api_key", &"***REDACTED***")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/yoga.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            catalog_path: env::var("CATALOG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            detector: DetectorConfig {
                mode: env_or_parse("DETECTOR_MODE", DetectorMode::Mock),
                url: env_or("DETECTOR_URL", "http://127.0.0.1:8001/detect"),
                api_key: env_or("DETECTOR_API_KEY", ""),
                timeout_ms: env_or_parse("DETECTOR_TIMEOUT_MS", 2_000_u64),
            },
            stream: StreamConfig {
                max_connections: env_or_parse("MAX_STREAM_CONNECTIONS", 64_usize),
                max_frame_bytes: env_or_parse("MAX_FRAME_BYTES", 2 * 1024 * 1024_usize),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                session_retention_days: env_or_parse("SESSION_RETENTION_DAYS", 30_i64)
                    .clamp(0, MAX_RETENTION_DAYS),
            },
            analysis: AnalysisEnvConfig {
                visibility_threshold: env_or_parse("VISIBILITY_THRESHOLD", 0.5_f64),
                recognition_threshold: env_or_parse("RECOGNITION_THRESHOLD", 0.6_f64),
                max_feedback_items: env_or_parse("MAX_FEEDBACK_ITEMS", 3_usize),
                landmark_space: env_or_parse("LANDMARK_SPACE", LandmarkSpace::Planar),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "CATALOG_PATH",
            "DETECTOR_MODE",
            "DETECTOR_TIMEOUT_MS",
            "DETECTOR_API_KEY",
            "MAX_STREAM_CONNECTIONS",
            "WORKER_LEADER",
            "RECOGNITION_THRESHOLD",
            "SESSION_RETENTION_DAYS",
            "LANDMARK_SPACE",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.detector.mode, DetectorMode::Mock);
        assert_eq!(cfg.detector.timeout_ms, 2_000);
        assert_eq!(cfg.stream.max_connections, 64);
        assert!(cfg.catalog_path.is_none());
        assert_eq!(cfg.analysis.recognition_threshold, 0.6);
        assert_eq!(cfg.analysis.landmark_space, LandmarkSpace::Planar);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("DETECTOR_TIMEOUT_MS", "750");
        env::set_var("MAX_STREAM_CONNECTIONS", "8");
        env::set_var("RECOGNITION_THRESHOLD", "0.75");
        env::set_var("LANDMARK_SPACE", "spatial");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.detector.timeout_ms, 750);
        assert_eq!(cfg.stream.max_connections, 8);
        assert_eq!(cfg.analysis.recognition_threshold, 0.75);
        assert_eq!(cfg.analysis.landmark_space, LandmarkSpace::Spatial);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("DETECTOR_MODE", "telepathy");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.detector.mode, DetectorMode::Mock);
        clear_keys(managed_keys());
    }

    #[test]
    fn retention_is_clamped() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("SESSION_RETENTION_DAYS", "9223372036854775807");
        assert_eq!(Config::from_env().worker.session_retention_days, MAX_RETENTION_DAYS);

        env::set_var("SESSION_RETENTION_DAYS", "-4");
        assert_eq!(Config::from_env().worker.session_retention_days, 0);
        clear_keys(managed_keys());
    }

    #[test]
    fn detector_mode_and_flags() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("DETECTOR_MODE", "HTTP");
        env::set_var("WORKER_LEADER", "off");
        env::set_var("CATALOG_PATH", "  ");

        let cfg = Config::from_env();
        assert_eq!(cfg.detector.mode, DetectorMode::Http);
        assert!(!cfg.worker.is_leader);
        assert!(cfg.catalog_path.is_none());
        clear_keys(managed_keys());
    }

    #[test]
    fn debug_output_redacts_detector_key() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("DETECTOR_API_KEY", "super-secret");
        let cfg = Config::from_env();
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
        clear_keys(managed_keys());
    }
}
