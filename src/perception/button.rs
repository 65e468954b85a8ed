//! Button state classification by pixel color.
//!
//! Every minigame click loop reduces to "is this button clickable right now",
//! answered by sampling one pixel at the button's known location and matching
//! it against a fixed palette. One sample per call, no retries, no temporal
//! smoothing; callers own polling cadence.

use std::collections::HashMap;
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::errors::PilotResult;
use crate::geometry::{ContentArea, FramePercent};
use crate::perception::types::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonColor {
    Red,
    Blue,
    Green,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Default,
    Focus,
    Inactive,
}

impl ButtonState {
    /// Default and focus both mean the button accepts a click.
    pub fn is_clickable(self) -> bool {
        matches!(self, ButtonState::Default | ButtonState::Focus)
    }
}

/// Reference colors for one button color across its three visual states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StateColors {
    pub default: Rgb,
    pub focus: Rgb,
    pub inactive: Rgb,
}

impl StateColors {
    fn get(&self, state: ButtonState) -> Rgb {
        match state {
            ButtonState::Default => self.default,
            ButtonState::Focus => self.focus,
            ButtonState::Inactive => self.inactive,
        }
    }
}

const ALL_STATES: [ButtonState; 3] = [
    ButtonState::Default,
    ButtonState::Focus,
    ButtonState::Inactive,
];

/// Static palette mapping color-name x state to a reference RGB.
///
/// Read-only after load; safe to share across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ButtonPalette {
    colors: HashMap<ButtonColor, StateColors>,
}

impl Default for ButtonPalette {
    /// The game's stock button colors.
    fn default() -> Self {
        let mut colors = HashMap::new();
        colors.insert(
            ButtonColor::Red,
            StateColors {
                default: Rgb::from((199, 35, 21)),
                focus: Rgb::from((251, 36, 18)),
                inactive: Rgb::from((57, 23, 20)),
            },
        );
        colors.insert(
            ButtonColor::Blue,
            StateColors {
                default: Rgb::from((21, 87, 199)),
                focus: Rgb::from((18, 104, 251)),
                inactive: Rgb::from((20, 34, 57)),
            },
        );
        colors.insert(
            ButtonColor::Green,
            StateColors {
                default: Rgb::from((17, 162, 40)),
                focus: Rgb::from((15, 204, 45)),
                inactive: Rgb::from((16, 46, 22)),
            },
        );
        colors.insert(
            ButtonColor::Yellow,
            StateColors {
                default: Rgb::from((242, 151, 0)),
                focus: Rgb::from((198, 125, 0)),
                inactive: Rgb::from((60, 39, 8)),
            },
        );
        Self { colors }
    }
}

impl ButtonPalette {
    pub const DEFAULT_TOLERANCE: f64 = 20.0;

    pub fn load(path: impl AsRef<Path>) -> PilotResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let palette: ButtonPalette = serde_json::from_str(&content)?;
        tracing::info!(path = %path.as_ref().display(), "button palette loaded");
        Ok(palette)
    }

    pub fn get(&self, color: ButtonColor) -> Option<&StateColors> {
        self.colors.get(&color)
    }

    /// Nearest palette entry within `tolerance`, or `None` for an unknown color.
    pub fn classify(&self, sampled: Rgb, tolerance: f64) -> Option<(ButtonColor, ButtonState)> {
        let mut best: Option<(ButtonColor, ButtonState, f64)> = None;
        for (&color, states) in &self.colors {
            for state in ALL_STATES {
                let dist = sampled.distance(&states.get(state));
                if best.map_or(true, |(_, _, d)| dist < d) {
                    best = Some((color, state, dist));
                }
            }
        }
        best.filter(|&(_, _, d)| d <= tolerance)
            .map(|(c, s, _)| (c, s))
    }

    /// Like `classify`, but restricted to the states of one known color.
    pub fn classify_state(
        &self,
        color: ButtonColor,
        sampled: Rgb,
        tolerance: f64,
    ) -> Option<ButtonState> {
        let states = self.colors.get(&color)?;
        ALL_STATES
            .into_iter()
            .map(|s| (s, sampled.distance(&states.get(s))))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|&(_, d)| d <= tolerance)
            .map(|(s, _)| s)
    }
}

/// Sample the pixel under a frame-percentage point.
///
/// Deterministic: a single pixel at the rounded frame-pixel location, assuming
/// `img` is a screenshot of exactly the content area. `None` when the point
/// falls outside the image.
pub fn sample_at(img: &RgbImage, area: &ContentArea, point: FramePercent) -> Option<Rgb> {
    let px = area.percent_to_frame(point);
    if px.x < 0 || px.y < 0 {
        return None;
    }
    let (x, y) = (px.x as u32, px.y as u32);
    if x >= img.width() || y >= img.height() {
        return None;
    }
    Some(Rgb::from_pixel(img.get_pixel(x, y)))
}

/// True iff the button at `point` currently shows its `color` in a clickable
/// state (default or focus). Inactive, unknown, and out-of-image all read as
/// not clickable.
pub fn is_button_active(
    point: FramePercent,
    color: ButtonColor,
    img: &RgbImage,
    area: &ContentArea,
    palette: &ButtonPalette,
    tolerance: f64,
) -> bool {
    sample_at(img, area, point)
        .and_then(|rgb| palette.classify_state(color, rgb, tolerance))
        .map_or(false, ButtonState::is_clickable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ClientArea;

    fn area_1500x1000() -> ContentArea {
        ContentArea::compute(ClientArea {
            origin_x: 0,
            origin_y: 0,
            width: 1500,
            height: 1000,
        })
        .unwrap()
    }

    #[test]
    fn classifies_exact_palette_colors() {
        let palette = ButtonPalette::default();
        assert_eq!(
            palette.classify(Rgb::from((199, 35, 21)), ButtonPalette::DEFAULT_TOLERANCE),
            Some((ButtonColor::Red, ButtonState::Default))
        );
        assert_eq!(
            palette.classify(Rgb::from((57, 23, 20)), ButtonPalette::DEFAULT_TOLERANCE),
            Some((ButtonColor::Red, ButtonState::Inactive))
        );
        assert_eq!(
            palette.classify(Rgb::from((15, 204, 45)), ButtonPalette::DEFAULT_TOLERANCE),
            Some((ButtonColor::Green, ButtonState::Focus))
        );
    }

    #[test]
    fn unknown_color_is_none() {
        let palette = ButtonPalette::default();
        assert_eq!(
            palette.classify(Rgb::from((255, 255, 255)), ButtonPalette::DEFAULT_TOLERANCE),
            None
        );
    }

    #[test]
    fn tolerance_bounds_the_match() {
        let palette = ButtonPalette::default();
        // 10 units off red default on one channel.
        let near = Rgb::from((209, 35, 21));
        assert_eq!(
            palette.classify(near, 20.0),
            Some((ButtonColor::Red, ButtonState::Default))
        );
        assert_eq!(palette.classify(near, 5.0), None);
    }

    #[test]
    fn active_button_reads_clickable() {
        let area = area_1500x1000();
        let mut img = RgbImage::from_pixel(area.width, area.height, image::Rgb([0, 0, 0]));
        let point = FramePercent::new(0.5, 0.5);
        let px = area.percent_to_frame(point);
        img.put_pixel(px.x as u32, px.y as u32, image::Rgb([199, 35, 21]));

        let palette = ButtonPalette::default();
        assert!(is_button_active(
            point,
            ButtonColor::Red,
            &img,
            &area,
            &palette,
            ButtonPalette::DEFAULT_TOLERANCE
        ));
        // Same pixel is not an active blue button.
        assert!(!is_button_active(
            point,
            ButtonColor::Blue,
            &img,
            &area,
            &palette,
            ButtonPalette::DEFAULT_TOLERANCE
        ));
    }

    #[test]
    fn inactive_and_unknown_read_not_clickable() {
        let area = area_1500x1000();
        let mut img = RgbImage::from_pixel(area.width, area.height, image::Rgb([0, 0, 0]));
        let point = FramePercent::new(0.25, 0.25);
        let px = area.percent_to_frame(point);
        img.put_pixel(px.x as u32, px.y as u32, image::Rgb([57, 23, 20]));

        let palette = ButtonPalette::default();
        assert!(!is_button_active(
            point,
            ButtonColor::Red,
            &img,
            &area,
            &palette,
            ButtonPalette::DEFAULT_TOLERANCE
        ));
        // Background pixel: unknown.
        assert!(!is_button_active(
            FramePercent::new(0.1, 0.1),
            ButtonColor::Red,
            &img,
            &area,
            &palette,
            ButtonPalette::DEFAULT_TOLERANCE
        ));
        // Out of the image entirely.
        assert!(!is_button_active(
            FramePercent::new(2.0, 2.0),
            ButtonColor::Red,
            &img,
            &area,
            &palette,
            ButtonPalette::DEFAULT_TOLERANCE
        ));
    }

    #[test]
    fn palette_round_trips_through_json() {
        let json = r#"{
            "red": {
                "default": [199.0, 35.0, 21.0],
                "focus": [251.0, 36.0, 18.0],
                "inactive": [57.0, 23.0, 20.0]
            }
        }"#;
        let palette: ButtonPalette = serde_json::from_str(json).unwrap();
        assert!(palette.get(ButtonColor::Red).is_some());
        assert!(palette.get(ButtonColor::Blue).is_none());
    }
}
