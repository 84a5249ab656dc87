//! Test utilities and mock matte providers
//!
//! Lets the pipeline be exercised without a real background-removal model.

use crate::{
    config::{MatteOptions, OutputFormat},
    error::{CompositeError, Result},
    matte::MatteProvider,
    services::{ImageIOService, OutputFormatHandler},
};
use image::{Rgba, RgbaImage};
use std::sync::{Arc, Mutex};

/// What the mock does when called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockBehavior {
    /// Soft circular matte centred on the image
    Circle,
    /// Keep the input's pixels with a fixed alpha
    UniformAlpha(u8),
    /// Fail as if the model crashed
    Fail,
    /// Return a matte one pixel wider than the input
    WrongDimensions,
    /// Return bytes that do not decode
    Garbage,
    /// Return a 3-channel image without transparency
    NoAlpha,
    /// Panic inside the provider call
    Panic,
}

/// Mock matte provider recording every call
#[derive(Debug, Clone)]
pub(crate) struct MockMatteProvider {
    behavior: MockBehavior,
    call_history: Arc<Mutex<Vec<MatteOptions>>>,
}

impl MockMatteProvider {
    pub(crate) fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Options received so far, in call order
    pub(crate) fn calls(&self) -> Vec<MatteOptions> {
        self.call_history.lock().unwrap().clone()
    }

    fn circle_alpha(x: u32, y: u32, width: u32, height: u32) -> u8 {
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let radius = (width.min(height) as f32 / 2.0).max(1.0);
        let dx = x as f32 + 0.5 - center_x;
        let dy = y as f32 + 0.5 - center_y;
        let distance = (dx * dx + dy * dy).sqrt();
        (((radius - distance) / radius).clamp(0.0, 1.0) * 255.0) as u8
    }
}

impl MatteProvider for MockMatteProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn extract_matte(&self, image: &[u8], options: &MatteOptions) -> Result<Vec<u8>> {
        self.call_history.lock().unwrap().push(*options);

        let input = ImageIOService::load_from_bytes(image)?.to_rgba8();
        let (width, height) = input.dimensions();

        let matte = match self.behavior {
            MockBehavior::Fail => {
                return Err(CompositeError::matte_provider("mock model crashed"));
            },
            MockBehavior::Garbage => return Ok(b"garbage".to_vec()),
            MockBehavior::Panic => panic!("mock model panicked"),
            MockBehavior::NoAlpha => {
                let rgb = image::DynamicImage::ImageRgba8(input).to_rgb8();
                return OutputFormatHandler::encode_rgb(&rgb, OutputFormat::Png, 100);
            },
            MockBehavior::WrongDimensions => RgbaImage::from_pixel(width + 1, height, Rgba([0, 0, 0, 255])),
            MockBehavior::UniformAlpha(alpha) => RgbaImage::from_fn(width, height, |x, y| {
                let p = input.get_pixel(x, y);
                Rgba([p[0], p[1], p[2], alpha])
            }),
            MockBehavior::Circle => RgbaImage::from_fn(width, height, |x, y| {
                let p = input.get_pixel(x, y);
                Rgba([p[0], p[1], p[2], Self::circle_alpha(x, y, width, height)])
            }),
        };

        OutputFormatHandler::encode_rgba(&matte, OutputFormat::Png, 100)
    }
}
