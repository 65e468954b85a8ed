//! Button engine: validated clicking against live button state.
//!
//! A click only goes out when the button currently shows a clickable color;
//! an unexpected state after retries is an error for the caller, never a
//! process exit.

use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;

use crate::errors::{PilotError, PilotResult};
use crate::geometry::{ContentArea, FramePercent};
use crate::perception::button::{is_button_active, ButtonColor, ButtonPalette};
use crate::perception::screenshot::ScreenshotSource;

use super::input::MouseInput;

/// One clickable UI element, located by frame-percentage.
#[derive(Debug, Clone)]
pub struct Button {
    pub name: String,
    pub point: FramePercent,
    pub color: ButtonColor,
}

impl Button {
    pub fn new(name: impl Into<String>, point: FramePercent, color: ButtonColor) -> Self {
        Self {
            name: name.into(),
            point,
            color,
        }
    }
}

/// Everything a click loop needs for one automation session: the current
/// content area, fresh screenshots, the palette, and the mouse.
pub struct AutomationCtx {
    pub area: ContentArea,
    source: Arc<dyn ScreenshotSource>,
    palette: Arc<ButtonPalette>,
    tolerance: f64,
    driver: Box<dyn MouseInput>,
    click_retries: u32,
    retry_delay: Duration,
}

impl AutomationCtx {
    pub fn new(
        area: ContentArea,
        source: Arc<dyn ScreenshotSource>,
        palette: Arc<ButtonPalette>,
        tolerance: f64,
        driver: Box<dyn MouseInput>,
    ) -> Self {
        Self {
            area,
            source,
            palette,
            tolerance,
            driver,
            click_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }

    pub fn screenshot(&self) -> PilotResult<RgbImage> {
        self.source.capture(&self.area)
    }

    /// Fresh sample of the button's state.
    pub fn button_active(&self, button: &Button) -> PilotResult<bool> {
        let img = self.screenshot()?;
        Ok(is_button_active(
            button.point,
            button.color,
            &img,
            &self.area,
            &self.palette,
            self.tolerance,
        ))
    }

    /// Click once the button reads clickable, re-sampling up to the retry
    /// limit. Fails with `Input` when it never becomes clickable.
    pub fn click(&mut self, button: &Button) -> PilotResult<()> {
        for attempt in 0..self.click_retries {
            if self.button_active(button)? {
                let pt = self.area.percent_to_screen(button.point);
                self.driver.click(pt)?;
                tracing::debug!(button = %button.name, x = pt.x, y = pt.y, "clicked");
                return Ok(());
            }
            if attempt + 1 < self.click_retries {
                tracing::debug!(button = %button.name, attempt = attempt + 1, "not clickable, retrying");
                std::thread::sleep(self.retry_delay);
            }
        }
        Err(PilotError::Input(format!(
            "button '{}' not clickable after {} attempts",
            button.name, self.click_retries
        )))
    }

    /// Click without state validation.
    pub fn click_unchecked(&mut self, button: &Button) -> PilotResult<()> {
        let pt = self.area.percent_to_screen(button.point);
        self.driver.click(pt)
    }

    /// Hold the button down for `duration`. The press is validated like
    /// `click`; the release is attempted even if the hold is interrupted.
    pub fn hold(&mut self, button: &Button, duration: Duration) -> PilotResult<()> {
        if !self.button_active(button)? {
            return Err(PilotError::Input(format!(
                "button '{}' not clickable for hold",
                button.name
            )));
        }
        let pt = self.area.percent_to_screen(button.point);
        self.driver.press(pt)?;
        std::thread::sleep(duration);
        self.driver.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ClientArea, ScreenPoint};

    fn area() -> ContentArea {
        ContentArea::compute(ClientArea {
            origin_x: 100,
            origin_y: 50,
            width: 1500,
            height: 1000,
        })
        .unwrap()
    }

    struct FixedShot(RgbImage);
    impl ScreenshotSource for FixedShot {
        fn capture(&self, _area: &ContentArea) -> PilotResult<RgbImage> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingMouse {
        clicks: std::sync::Arc<std::sync::Mutex<Vec<ScreenPoint>>>,
    }
    impl MouseInput for RecordingMouse {
        fn click(&mut self, pt: ScreenPoint) -> PilotResult<()> {
            self.clicks.lock().unwrap().push(pt);
            Ok(())
        }
        fn press(&mut self, pt: ScreenPoint) -> PilotResult<()> {
            self.clicks.lock().unwrap().push(pt);
            Ok(())
        }
        fn release(&mut self) -> PilotResult<()> {
            Ok(())
        }
    }

    fn ctx_with(img: RgbImage, clicks: std::sync::Arc<std::sync::Mutex<Vec<ScreenPoint>>>) -> AutomationCtx {
        let mut ctx = AutomationCtx::new(
            area(),
            Arc::new(FixedShot(img)),
            Arc::new(ButtonPalette::default()),
            ButtonPalette::DEFAULT_TOLERANCE,
            Box::new(RecordingMouse { clicks }),
        );
        ctx.retry_delay = Duration::from_millis(1);
        ctx
    }

    #[test]
    fn clicks_active_button_at_screen_coords() {
        let a = area();
        let button = Button::new("start", FramePercent::new(0.5, 0.85), ButtonColor::Green);
        let mut img = RgbImage::from_pixel(a.width, a.height, image::Rgb([0, 0, 0]));
        let px = a.percent_to_frame(button.point);
        img.put_pixel(px.x as u32, px.y as u32, image::Rgb([17, 162, 40]));

        let clicks = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut ctx = ctx_with(img, clicks.clone());
        ctx.click(&button).unwrap();

        let recorded = clicks.lock().unwrap();
        assert_eq!(recorded.as_slice(), &[a.percent_to_screen(button.point)]);
    }

    #[test]
    fn inactive_button_is_never_clicked() {
        let a = area();
        let button = Button::new("start", FramePercent::new(0.5, 0.85), ButtonColor::Green);
        let img = RgbImage::from_pixel(a.width, a.height, image::Rgb([0, 0, 0]));

        let clicks = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut ctx = ctx_with(img, clicks.clone());

        assert!(matches!(ctx.click(&button), Err(PilotError::Input(_))));
        assert!(clicks.lock().unwrap().is_empty());
    }

    #[test]
    fn unchecked_click_skips_validation() {
        let a = area();
        let button = Button::new("skip", FramePercent::new(0.2, 0.2), ButtonColor::Red);
        let img = RgbImage::from_pixel(a.width, a.height, image::Rgb([0, 0, 0]));

        let clicks = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut ctx = ctx_with(img, clicks.clone());
        ctx.click_unchecked(&button).unwrap();
        assert_eq!(clicks.lock().unwrap().len(), 1);
    }
}
