use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::PilotResult;

/// Average color as floats on the 0–255 per-channel scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub [f64; 3]);

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Rgb) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    pub fn from_pixel(pixel: &image::Rgb<u8>) -> Self {
        Self([pixel[0] as f64, pixel[1] as f64, pixel[2] as f64])
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self([r as f64, g as f64, b as f64])
    }
}

/// Border-color fingerprint of one known game screen.
///
/// Immutable once loaded; the database is read-only input to the matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSignature {
    pub left_color: Rgb,
    pub right_color: Rgb,
    /// Per-strip color variance from the offline analysis pass. Carried for
    /// diagnostics; not used in matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_variance: Option<f64>,
}

/// The signature database: `frame_id -> FrameSignature`.
///
/// A `BTreeMap` keeps iteration order stable so tie scores resolve
/// deterministically. Produced by a separate offline analysis tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureDb {
    pub frames: BTreeMap<String, FrameSignature>,
}

impl SignatureDb {
    pub fn load(path: impl AsRef<Path>) -> PilotResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let db: SignatureDb = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            frames = db.frames.len(),
            "signature database loaded"
        );
        Ok(db)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_distance() {
        let a = Rgb::new(0.0, 0.0, 0.0);
        let b = Rgb::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn db_parses_flat_json_schema() {
        let json = r#"{
            "3.1": { "left_color": [10.0, 20.0, 30.0], "right_color": [40.0, 50.0, 60.0] },
            "3.2": { "left_color": [1.0, 2.0, 3.0], "right_color": [4.0, 5.0, 6.0], "left_variance": 12.5 }
        }"#;
        let db: SignatureDb = serde_json::from_str(json).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.frames["3.1"].left_color, Rgb::new(10.0, 20.0, 30.0));
        assert_eq!(db.frames["3.2"].left_variance, Some(12.5));
        assert_eq!(db.frames["3.2"].right_variance, None);
    }
}
