//! Border signature extraction and matching.
//!
//! A frame is identified by the average color of two thin strips at the left
//! and right edges of the content area: cheap to sample and resolution
//! independent. Regions are sized by fraction of the screenshot, never by
//! fixed pixel counts (a hard-coded-size version broke on non-reference
//! resolutions).

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::errors::{PilotError, PilotResult};
use crate::perception::types::{Rgb, SignatureDb};

/// How border strips are cropped from a screenshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BorderRegionSpec {
    /// Fraction of the width taken from each edge.
    pub inset_fraction: f64,
    /// Fraction of the height forming the vertical center band.
    pub strip_fraction: f64,
}

impl Default for BorderRegionSpec {
    fn default() -> Self {
        Self {
            inset_fraction: 0.05,
            strip_fraction: 0.20,
        }
    }
}

/// Average border colors sampled from one screenshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSample {
    pub left: Rgb,
    pub right: Rgb,
}

/// Extract the left/right border strips and average their colors.
///
/// Strips span columns `[0, inset)` and `[W-inset, W)` over the vertical band
/// centered at `H/2`. Fails with `RegionTooSmall` when either region would be
/// empty or the strips would overlap.
pub fn sample_borders(img: &RgbImage, spec: &BorderRegionSpec) -> PilotResult<BorderSample> {
    let (width, height) = img.dimensions();
    let inset = (width as f64 * spec.inset_fraction).floor() as u32;
    let strip = (height as f64 * spec.strip_fraction).floor() as u32;

    if inset == 0 || strip == 0 || inset * 2 > width || strip > height {
        return Err(PilotError::RegionTooSmall {
            width,
            height,
            inset,
            strip,
        });
    }

    let start_y = height / 2 - strip / 2;
    let left = region_average(img, 0, start_y, inset, strip);
    let right = region_average(img, width - inset, start_y, inset, strip);

    Ok(BorderSample { left, right })
}

fn region_average(img: &RgbImage, x0: u32, y0: u32, w: u32, h: u32) -> Rgb {
    let mut sums = [0.0f64; 3];
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let p = img.get_pixel(x, y);
            sums[0] += p[0] as f64;
            sums[1] += p[1] as f64;
            sums[2] += p[2] as f64;
        }
    }
    let n = (w * h) as f64;
    Rgb([sums[0] / n, sums[1] / n, sums[2] / n])
}

/// Result of matching a border sample against the signature database.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatch {
    pub frame_id: String,
    /// Sum of the two per-strip Euclidean color distances (0–255 channel scale).
    pub score: f64,
    /// `clamp(1 - score/divisor, 0, 1)`.
    pub confidence: f64,
}

/// Matches border samples against a read-only signature database.
///
/// `threshold` and `confidence_divisor` are empirically tuned constants
/// (defaults 100 and 200 on the 0–255 channel scale); treat them as
/// configuration, not physics.
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    db: SignatureDb,
    threshold: f64,
    confidence_divisor: f64,
}

impl SignatureMatcher {
    pub const DEFAULT_THRESHOLD: f64 = 100.0;
    pub const DEFAULT_CONFIDENCE_DIVISOR: f64 = 200.0;

    pub fn new(db: SignatureDb, threshold: f64, confidence_divisor: f64) -> Self {
        Self {
            db,
            threshold,
            confidence_divisor,
        }
    }

    pub fn with_defaults(db: SignatureDb) -> Self {
        Self::new(
            db,
            Self::DEFAULT_THRESHOLD,
            Self::DEFAULT_CONFIDENCE_DIVISOR,
        )
    }

    pub fn db(&self) -> &SignatureDb {
        &self.db
    }

    /// Best-scoring signature for `sample`, or `NoSignatureMatch` when the
    /// best score exceeds the threshold or the database is empty.
    pub fn match_sample(&self, sample: &BorderSample) -> PilotResult<FrameMatch> {
        let mut best: Option<(&str, f64)> = None;
        for (frame_id, sig) in &self.db.frames {
            let score =
                sample.left.distance(&sig.left_color) + sample.right.distance(&sig.right_color);
            // Strict comparison: ties keep the first id in sorted order.
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((frame_id, score));
            }
        }

        match best {
            Some((frame_id, score)) if score <= self.threshold => Ok(FrameMatch {
                frame_id: frame_id.to_string(),
                score,
                confidence: (1.0 - score / self.confidence_divisor).clamp(0.0, 1.0),
            }),
            Some((_, score)) => Err(PilotError::NoSignatureMatch { best_score: score }),
            None => Err(PilotError::NoSignatureMatch {
                best_score: f64::INFINITY,
            }),
        }
    }

    /// Sample the borders of `img` and match in one step.
    pub fn match_image(&self, img: &RgbImage, spec: &BorderRegionSpec) -> PilotResult<FrameMatch> {
        let sample = sample_borders(img, spec)?;
        self.match_sample(&sample)
    }
}
