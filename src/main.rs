use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use widgetpilot::config::{self, AppConfig};
use widgetpilot::detector::{DetectionEvent, DetectionService, Detector};
use widgetpilot::perception::button::ButtonPalette;
use widgetpilot::perception::disambiguate::ProbeTable;
use widgetpilot::perception::screenshot::MonitorCapture;
use widgetpilot::perception::types::SignatureDb;
use widgetpilot::window::GameWindow;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            AppConfig::default()
        }
    };

    let db = match SignatureDb::load(&config.data.signatures_file) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "failed to load signature database, nothing will be recognized");
            SignatureDb::default()
        }
    };

    let palette = match &config.data.palette_file {
        Some(path) => ButtonPalette::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load palette file, using built-in palette");
            ButtonPalette::default()
        }),
        None => ButtonPalette::default(),
    };

    let probes = match &config.data.probes_file {
        Some(path) => ProbeTable::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load probe table, ambiguous frames will not be resolved");
            ProbeTable::default()
        }),
        None => ProbeTable::default(),
    };

    let detector = Arc::new(Detector::new(
        db,
        Arc::new(palette),
        probes,
        &config.detection,
    ));
    let window = Arc::new(GameWindow::new(config.window.title_fragment.clone()));

    let (tx, mut rx) = mpsc::channel::<DetectionEvent>(32);
    let service = DetectionService::new(
        detector,
        window,
        Arc::new(MonitorCapture),
        Duration::from_millis(config.detection.poll_interval_ms),
        tx,
    );
    tokio::spawn(service.run());

    // Log state transitions only; steady-state detections stay quiet.
    let mut current: Option<String> = None;
    while let Some(event) = rx.recv().await {
        match event {
            DetectionEvent::Detected(d) => {
                if current.as_deref() != Some(d.frame_id.as_str()) {
                    tracing::info!(
                        frame_id = %d.frame_id,
                        score = %format!("{:.1}", d.score),
                        confidence = %format!("{:.2}", d.confidence),
                        "screen recognized"
                    );
                    current = Some(d.frame_id);
                }
            }
            DetectionEvent::Unrecognized { best_score } => {
                if current.take().is_some() {
                    tracing::info!(best_score = %format!("{best_score:.1}"), "screen unrecognized");
                }
            }
            DetectionEvent::WindowLost { error } => {
                if current.take().is_some() {
                    tracing::info!(error = %error, "target window lost");
                }
            }
            DetectionEvent::Failed { error } => {
                tracing::warn!(error = %error, "detection failure");
            }
        }
    }
}
