//! Content-area screenshot capture.

use image::RgbImage;
use xcap::Monitor;

use crate::errors::{PilotError, PilotResult};
use crate::geometry::ContentArea;

/// Boundary contract for screenshot capture: the core only needs width,
/// height, and per-pixel RGB access for the content-area rectangle.
pub trait ScreenshotSource: Send + Sync {
    fn capture(&self, area: &ContentArea) -> PilotResult<RgbImage>;
}

/// Captures via the monitor that contains the content area's origin.
pub struct MonitorCapture;

impl ScreenshotSource for MonitorCapture {
    fn capture(&self, area: &ContentArea) -> PilotResult<RgbImage> {
        let monitors = Monitor::all().map_err(|e| PilotError::Capture(e.to_string()))?;
        let monitor = monitors
            .iter()
            .find(|m| {
                area.origin_x >= m.x()
                    && area.origin_x < m.x() + m.width() as i32
                    && area.origin_y >= m.y()
                    && area.origin_y < m.y() + m.height() as i32
            })
            .or_else(|| monitors.first())
            .ok_or_else(|| PilotError::Capture("no monitor found".into()))?;

        let full = monitor
            .capture_image()
            .map_err(|e| PilotError::Capture(e.to_string()))?;

        // Content area in monitor-local pixels.
        let x = area.origin_x - monitor.x();
        let y = area.origin_y - monitor.y();
        if x < 0
            || y < 0
            || x as u32 + area.width > full.width()
            || y as u32 + area.height > full.height()
        {
            return Err(PilotError::Capture(format!(
                "content area {}x{} at ({x}, {y}) exceeds monitor capture {}x{}",
                area.width,
                area.height,
                full.width(),
                full.height()
            )));
        }

        let cropped = image::imageops::crop_imm(&full, x as u32, y as u32, area.width, area.height)
            .to_image();
        Ok(image::DynamicImage::ImageRgba8(cropped).to_rgb8())
    }
}
