use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::Config;
use crate::pipeline::FramePipeline;
use crate::planner::SessionPlanner;
use crate::pose::catalog::PoseCatalog;
use crate::pose::config::AnalysisConfig;
use crate::services::detector::LandmarkDetector;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    catalog: Arc<PoseCatalog>,
    planner: Arc<SessionPlanner>,
    pipeline: FramePipeline,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        catalog: Arc<PoseCatalog>,
        analysis: &AnalysisConfig,
        detector: Arc<dyn LandmarkDetector>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let pipeline = FramePipeline::new(
            catalog.clone(),
            analysis,
            detector,
            Duration::from_millis(config.detector.timeout_ms),
            config.stream.max_frame_bytes,
        );

        Self {
            store,
            planner: Arc::new(SessionPlanner::new(catalog.clone())),
            catalog,
            pipeline,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn catalog(&self) -> &PoseCatalog {
        &self.catalog
    }

    pub fn planner(&self) -> &SessionPlanner {
        &self.planner
    }

    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::Config;
    use crate::services::detector::DetectorClient;
    use crate::store::Store;

    use super::*;

    fn state_in(dir: &tempfile::TempDir, tx: broadcast::Sender<()>) -> AppState {
        let cfg = Config::from_env();
        let store = Arc::new(Store::open(dir.path().join("state.sled").to_str().unwrap()).unwrap());
        let catalog = Arc::new(PoseCatalog::builtin().unwrap());
        let detector = DetectorClient::shared(&cfg.detector);
        AppState::new(
            store,
            catalog,
            &AnalysisConfig::default(),
            detector,
            &cfg,
            tx,
        )
    }

    #[tokio::test]
    async fn planner_and_pipeline_share_the_catalog() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (tx, _) = broadcast::channel(4);
        let state = state_in(&tmp, tx);

        assert_eq!(state.catalog().len(), state.planner().catalog().len());
        assert_eq!(state.catalog().len(), state.pipeline().catalog().len());
        assert_eq!(
            state.pipeline().max_frame_bytes(),
            state.config().stream.max_frame_bytes
        );
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let (tx, _) = broadcast::channel(4);
        let state = state_in(&tmp, tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }
}
