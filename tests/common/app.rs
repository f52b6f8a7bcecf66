use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use yoga_coach_backend::config::{
    AnalysisEnvConfig, Config, DetectorConfig, DetectorMode, StreamConfig, WorkerConfig,
};
use yoga_coach_backend::pose::geometry::LandmarkSpace;
use yoga_coach_backend::pose::{AnalysisConfig, PoseCatalog};
use yoga_coach_backend::routes::build_router;
use yoga_coach_backend::services::detector::DetectorClient;
use yoga_coach_backend::state::AppState;
use yoga_coach_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

/// Builds the config directly so tests never race on process env vars.
pub fn test_config(sled_path: String) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        catalog_path: None,
        detector: DetectorConfig {
            mode: DetectorMode::Mock,
            url: String::new(),
            api_key: String::new(),
            timeout_ms: 500,
        },
        stream: StreamConfig {
            max_connections: 4,
            max_frame_bytes: 1024 * 1024,
        },
        worker: WorkerConfig {
            is_leader: false,
            session_retention_days: 30,
        },
        analysis: AnalysisEnvConfig {
            visibility_threshold: 0.5,
            recognition_threshold: 0.6,
            max_feedback_items: 3,
            landmark_space: LandmarkSpace::Planar,
        },
    }
}

pub async fn spawn_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("yoga-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string());

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    let catalog = Arc::new(PoseCatalog::builtin().expect("builtin catalog"));
    let analysis = AnalysisConfig::from_env(&config.analysis);
    let detector = DetectorClient::shared(&config.detector);
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, catalog, &analysis, detector, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_test_app().await
}
