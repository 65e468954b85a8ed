//! Tie-breaking for frames whose border signatures are indistinguishable.
//!
//! A few screens differ only by one UI element. Each such frame gets a probe:
//! a known point that shows an active button only on that screen. Probe
//! knowledge lives in a data file, not in per-minigame code.

use std::collections::HashMap;
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::errors::{PilotError, PilotResult};
use crate::geometry::{ContentArea, FramePercent};
use crate::perception::button::{is_button_active, ButtonColor, ButtonPalette};

/// One distinguishing probe: where to look and what should be lit there.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProbeSpec {
    pub point: FramePercent,
    pub color: ButtonColor,
}

/// Probe points plus the candidate groups they disambiguate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeTable {
    #[serde(default)]
    pub groups: Vec<Vec<String>>,
    #[serde(default)]
    pub probes: HashMap<String, ProbeSpec>,
}

impl ProbeTable {
    pub fn load(path: impl AsRef<Path>) -> PilotResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let table: ProbeTable = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            groups = table.groups.len(),
            probes = table.probes.len(),
            "probe table loaded"
        );
        Ok(table)
    }

    /// The ambiguity group containing `frame_id`, if any.
    pub fn group_for(&self, frame_id: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|g| g.iter().any(|id| id == frame_id))
            .map(Vec::as_slice)
    }
}

/// Resolve a tie by sampling each candidate's probe point.
///
/// Exactly one active probe decides the frame. Zero or several active probes
/// fail with `AmbiguousMatch`; callers that want a first-candidate fallback
/// apply it on top.
pub fn disambiguate(
    candidates: &[String],
    table: &ProbeTable,
    img: &RgbImage,
    area: &ContentArea,
    palette: &ButtonPalette,
    tolerance: f64,
) -> PilotResult<String> {
    let mut hits = Vec::new();
    for id in candidates {
        let Some(probe) = table.probes.get(id) else {
            tracing::debug!(frame_id = %id, "candidate has no probe");
            continue;
        };
        if is_button_active(probe.point, probe.color, img, area, palette, tolerance) {
            hits.push(id.clone());
        }
    }

    match hits.len() {
        1 => Ok(hits.remove(0)),
        _ => Err(PilotError::AmbiguousMatch {
            candidates: candidates.to_vec(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ClientArea;

    fn area() -> ContentArea {
        ContentArea::compute(ClientArea {
            origin_x: 0,
            origin_y: 0,
            width: 1500,
            height: 1000,
        })
        .unwrap()
    }

    fn table() -> ProbeTable {
        let mut probes = HashMap::new();
        probes.insert(
            "11.1".to_string(),
            ProbeSpec {
                point: FramePercent::new(0.3, 0.7),
                color: ButtonColor::Red,
            },
        );
        probes.insert(
            "11.2".to_string(),
            ProbeSpec {
                point: FramePercent::new(0.7, 0.7),
                color: ButtonColor::Red,
            },
        );
        ProbeTable {
            groups: vec![vec!["11.1".to_string(), "11.2".to_string()]],
            probes,
        }
    }

    fn candidates() -> Vec<String> {
        vec!["11.1".to_string(), "11.2".to_string()]
    }

    fn blank() -> RgbImage {
        let a = area();
        RgbImage::from_pixel(a.width, a.height, image::Rgb([30, 30, 30]))
    }

    fn paint_probe(img: &mut RgbImage, table: &ProbeTable, id: &str, rgb: [u8; 3]) {
        let px = area().percent_to_frame(table.probes[id].point);
        img.put_pixel(px.x as u32, px.y as u32, image::Rgb(rgb));
    }

    #[test]
    fn single_active_probe_decides() {
        let table = table();
        let mut img = blank();
        paint_probe(&mut img, &table, "11.2", [199, 35, 21]);

        let winner = disambiguate(
            &candidates(),
            &table,
            &img,
            &area(),
            &ButtonPalette::default(),
            ButtonPalette::DEFAULT_TOLERANCE,
        )
        .unwrap();
        assert_eq!(winner, "11.2");
    }

    #[test]
    fn no_active_probe_is_ambiguous() {
        let table = table();
        let img = blank();
        assert!(matches!(
            disambiguate(
                &candidates(),
                &table,
                &img,
                &area(),
                &ButtonPalette::default(),
                ButtonPalette::DEFAULT_TOLERANCE,
            ),
            Err(PilotError::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn multiple_active_probes_are_ambiguous() {
        let table = table();
        let mut img = blank();
        paint_probe(&mut img, &table, "11.1", [199, 35, 21]);
        paint_probe(&mut img, &table, "11.2", [251, 36, 18]);

        assert!(matches!(
            disambiguate(
                &candidates(),
                &table,
                &img,
                &area(),
                &ButtonPalette::default(),
                ButtonPalette::DEFAULT_TOLERANCE,
            ),
            Err(PilotError::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn group_lookup() {
        let table = table();
        assert_eq!(table.group_for("11.1").unwrap().len(), 2);
        assert!(table.group_for("3.1").is_none());
    }
}
