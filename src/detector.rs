//! Frame detection service: matcher plus disambiguator behind a result cache,
//! and the background polling loop that feeds consumers over a channel.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use image::RgbImage;
use tokio::sync::mpsc;

use crate::config::DetectionConfig;
use crate::errors::{PilotError, PilotResult};
use crate::geometry::ContentArea;
use crate::perception::border::{BorderRegionSpec, SignatureMatcher};
use crate::perception::button::ButtonPalette;
use crate::perception::disambiguate::{disambiguate, ProbeTable};
use crate::perception::screenshot::ScreenshotSource;
use crate::perception::types::SignatureDb;
use crate::window::WindowLocator;

/// One recognized screen, as posted to consumers.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Detection {
    pub frame_id: String,
    pub score: f64,
    pub confidence: f64,
    pub content_area: ContentArea,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Identifies the current game screen from a content-area screenshot.
///
/// Holds the read-only signature database, palette, and probe table; safe to
/// share across threads (read-only after load, cache behind a mutex).
pub struct Detector {
    matcher: SignatureMatcher,
    palette: Arc<ButtonPalette>,
    probes: ProbeTable,
    spec: BorderRegionSpec,
    button_tolerance: f64,
    cache_ttl: Duration,
    cache: Mutex<Option<(Instant, Detection)>>,
}

impl Detector {
    pub fn new(
        db: SignatureDb,
        palette: Arc<ButtonPalette>,
        probes: ProbeTable,
        config: &DetectionConfig,
    ) -> Self {
        Self {
            matcher: SignatureMatcher::new(db, config.match_threshold, config.confidence_divisor),
            palette,
            probes,
            spec: config.border_spec(),
            button_tolerance: config.button_tolerance,
            cache_ttl: Duration::from_millis(config.cache_ttl_ms),
            cache: Mutex::new(None),
        }
    }

    pub fn palette(&self) -> &Arc<ButtonPalette> {
        &self.palette
    }

    /// Match borders, then break ties for frames in an ambiguity group.
    ///
    /// When probes are inconclusive the first candidate of the group is kept,
    /// with a warning. Callers that need to handle the tie themselves use
    /// `disambiguate` directly and get the `AmbiguousMatch` error.
    pub fn detect(&self, img: &RgbImage, area: ContentArea) -> PilotResult<Detection> {
        let m = self.matcher.match_image(img, &self.spec)?;

        let frame_id = match self.probes.group_for(&m.frame_id) {
            Some(group) => {
                let candidates = group.to_vec();
                match disambiguate(
                    &candidates,
                    &self.probes,
                    img,
                    &area,
                    &self.palette,
                    self.button_tolerance,
                ) {
                    Ok(id) => id,
                    Err(PilotError::AmbiguousMatch { .. }) => {
                        let fallback = candidates[0].clone();
                        tracing::warn!(
                            candidates = ?candidates,
                            fallback = %fallback,
                            "probes inconclusive, keeping first candidate"
                        );
                        fallback
                    }
                    Err(e) => return Err(e),
                }
            }
            None => m.frame_id,
        };

        Ok(Detection {
            frame_id,
            score: m.score,
            confidence: m.confidence,
            content_area: area,
            at: chrono::Utc::now(),
        })
    }

    /// `detect`, rate-limited: a result younger than the cache TTL is returned
    /// as-is without re-sampling, even if the window has since moved.
    pub fn detect_cached(&self, img: &RgbImage, area: ContentArea) -> PilotResult<Detection> {
        {
            let cache = self.cache.lock().expect("detection cache poisoned");
            if let Some((at, detection)) = cache.as_ref() {
                if at.elapsed() < self.cache_ttl {
                    return Ok(detection.clone());
                }
            }
        }

        let detection = self.detect(img, area)?;
        *self.cache.lock().expect("detection cache poisoned") =
            Some((Instant::now(), detection.clone()));
        Ok(detection)
    }

    pub fn invalidate_cache(&self) {
        *self.cache.lock().expect("detection cache poisoned") = None;
    }
}

/// Immutable results posted by the polling loop.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectionEvent {
    Detected(Detection),
    /// The screen is showing something the database does not know.
    Unrecognized { best_score: f64 },
    /// Target window missing or degenerate.
    WindowLost { error: String },
    /// Capture or other transient failure.
    Failed { error: String },
}

/// Background detection loop: poll, detect, post to a single consumer.
///
/// Exits when the consumer drops its receiver.
pub struct DetectionService {
    detector: Arc<Detector>,
    window: Arc<dyn WindowLocator>,
    source: Arc<dyn ScreenshotSource>,
    poll_interval: Duration,
    tx: mpsc::Sender<DetectionEvent>,
}

impl DetectionService {
    pub fn new(
        detector: Arc<Detector>,
        window: Arc<dyn WindowLocator>,
        source: Arc<dyn ScreenshotSource>,
        poll_interval: Duration,
        tx: mpsc::Sender<DetectionEvent>,
    ) -> Self {
        Self {
            detector,
            window,
            source,
            poll_interval,
            tx,
        }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(interval_ms = self.poll_interval.as_millis() as u64, "detection loop started");

        loop {
            ticker.tick().await;
            let event = self.step();
            if self.tx.send(event).await.is_err() {
                tracing::info!("detection consumer gone, stopping loop");
                break;
            }
        }
    }

    fn step(&self) -> DetectionEvent {
        match self.observe() {
            Ok(detection) => {
                tracing::debug!(frame_id = %detection.frame_id, score = detection.score, "frame detected");
                DetectionEvent::Detected(detection)
            }
            Err(PilotError::NoSignatureMatch { best_score }) => {
                tracing::debug!(best_score, "unrecognized screen");
                DetectionEvent::Unrecognized { best_score }
            }
            Err(e @ (PilotError::Window(_) | PilotError::InvalidGeometry { .. })) => {
                tracing::debug!(error = %e, "target window unavailable");
                DetectionEvent::WindowLost {
                    error: e.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "detection step failed");
                DetectionEvent::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn observe(&self) -> PilotResult<Detection> {
        let client = self.window.client_area()?;
        let area = ContentArea::compute(client)?;
        let img = self.source.capture(&area)?;
        self.detector.detect_cached(&img, area)
    }
}
