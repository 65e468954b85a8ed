//! Coordinate spaces and the letterbox-corrected content area.
//!
//! Three spaces are in play:
//!   - frame-percentage: (x, y) in [0,1], resolution independent; the
//!     canonical way click targets are described
//!   - frame-pixel: pixels relative to the content area's top-left corner
//!   - screen-pixel: absolute desktop coordinates (may be negative on
//!     multi-monitor setups)
//!
//! Pixel conversions round to nearest; sub-pixel targets do not exist.
//! Conversions never clamp, callers decide whether an out-of-bounds point
//! is meaningful.

use serde::{Deserialize, Serialize};

use crate::errors::{PilotError, PilotResult};

/// The game renders at a fixed 3:2 aspect ratio; anything outside is letterbox.
pub const TARGET_ASPECT: f64 = 3.0 / 2.0;

/// Resolution-independent location within the content area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePercent {
    pub x: f64,
    pub y: f64,
}

impl FramePercent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel offset from the content area's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePixel {
    pub x: i32,
    pub y: i32,
}

/// Absolute desktop coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

/// Raw client area of the target window: screen-space origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientArea {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
}

/// Letterbox-corrected rectangle of actual game pixels.
///
/// Recomputed from live window geometry every detection/click cycle; it has
/// no identity beyond "current measurement" and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentArea {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
}

impl ContentArea {
    /// Largest 3:2 rectangle centered within the client area.
    ///
    /// Wider than 3:2 letterboxes left/right; taller letterboxes top/bottom.
    /// Degenerate input (either dimension <= 0, or so small the corrected
    /// rectangle collapses to zero) fails with `InvalidGeometry`.
    pub fn compute(client: ClientArea) -> PilotResult<Self> {
        if client.width <= 0 || client.height <= 0 {
            return Err(PilotError::InvalidGeometry {
                width: client.width,
                height: client.height,
            });
        }

        let client_ratio = client.width as f64 / client.height as f64;

        let (width, height, off_x, off_y) = if client_ratio > TARGET_ASPECT {
            let height = client.height;
            let width = (height as f64 * TARGET_ASPECT) as i32;
            (width, height, (client.width - width) / 2, 0)
        } else {
            let width = client.width;
            let height = (width as f64 / TARGET_ASPECT) as i32;
            (width, height, 0, (client.height - height) / 2)
        };

        if width <= 0 || height <= 0 {
            return Err(PilotError::InvalidGeometry {
                width: client.width,
                height: client.height,
            });
        }

        Ok(Self {
            origin_x: client.origin_x + off_x,
            origin_y: client.origin_y + off_y,
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn percent_to_frame(&self, pct: FramePercent) -> FramePixel {
        FramePixel {
            x: (pct.x * self.width as f64).round() as i32,
            y: (pct.y * self.height as f64).round() as i32,
        }
    }

    pub fn frame_to_percent(&self, px: FramePixel) -> FramePercent {
        FramePercent {
            x: px.x as f64 / self.width as f64,
            y: px.y as f64 / self.height as f64,
        }
    }

    pub fn frame_to_screen(&self, px: FramePixel) -> ScreenPoint {
        ScreenPoint {
            x: self.origin_x + px.x,
            y: self.origin_y + px.y,
        }
    }

    pub fn screen_to_frame(&self, pt: ScreenPoint) -> FramePixel {
        FramePixel {
            x: pt.x - self.origin_x,
            y: pt.y - self.origin_y,
        }
    }

    pub fn percent_to_screen(&self, pct: FramePercent) -> ScreenPoint {
        self.frame_to_screen(self.percent_to_frame(pct))
    }

    pub fn screen_to_percent(&self, pt: ScreenPoint) -> FramePercent {
        self.frame_to_percent(self.screen_to_frame(pt))
    }
}
