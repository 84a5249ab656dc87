//! End-to-end compositing workflows through the public API

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use matte_compositor::{
    BackgroundColor, CompositeConfig, CompositeError, CompositeProcessor, CompositeRequest,
    EmbeddedAlphaProvider, MatteOptions, MatteProvider, OutputFormat, OutputFormatHandler, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// 2x2 cut-out with alphas 255, 0, 128, 64 over color (200, 100, 50)
fn reference_cutout() -> RgbaImage {
    let alphas = [255u8, 0, 128, 64];
    RgbaImage::from_fn(2, 2, |x, y| Rgba([200, 100, 50, alphas[(y * 2 + x) as usize]]))
}

fn png(image: &RgbaImage) -> Vec<u8> {
    OutputFormatHandler::encode_rgba(image, OutputFormat::Png, 100).unwrap()
}

/// Provider that keeps the input colors and applies a left-to-right alpha ramp
struct RampProvider {
    calls: AtomicUsize,
}

impl MatteProvider for RampProvider {
    fn name(&self) -> &str {
        "ramp"
    }

    fn extract_matte(&self, image: &[u8], _options: &MatteOptions) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let input = image::load_from_memory(image)
            .map_err(|e| CompositeError::decode(e.to_string()))?
            .to_rgb8();
        let (width, height) = input.dimensions();
        let step = 255 / width.saturating_sub(1).max(1);

        let matte = RgbaImage::from_fn(width, height, |x, y| {
            let Rgb([r, g, b]) = *input.get_pixel(x, y);
            Rgba([r, g, b, (x * step).min(255) as u8])
        });
        OutputFormatHandler::encode_rgba(&matte, OutputFormat::Png, 100)
    }
}

#[test]
fn test_reference_scenario_over_black() -> Result<()> {
    let processor = CompositeProcessor::with_provider(EmbeddedAlphaProvider, CompositeConfig::default())?;
    let request = CompositeRequest::new(png(&reference_cutout())).with_background_hex("#000000")?;

    let result = processor.process(request)?;
    let pixels: Vec<[u8; 3]> = result.image.pixels().map(|p| p.0).collect();
    assert_eq!(
        pixels,
        vec![[200, 100, 50], [0, 0, 0], [100, 50, 25], [50, 25, 12]]
    );

    // The download decodes back to exactly the preview
    assert_eq!(result.download.file_name, "result.png");
    let decoded = image::load_from_memory(&result.download.bytes).unwrap();
    assert_eq!(decoded.to_rgb8(), result.image);
    Ok(())
}

#[test]
fn test_opaque_and_transparent_extremes() -> Result<()> {
    let processor = CompositeProcessor::with_provider(EmbeddedAlphaProvider, CompositeConfig::default())?;
    let pink = BackgroundColor::new(255, 110, 196);

    let opaque = RgbaImage::from_pixel(3, 3, Rgba([12, 34, 56, 255]));
    let result = processor.process(CompositeRequest::new(png(&opaque)).with_background(pink))?;
    assert!(result.image.pixels().all(|p| p.0 == [12, 34, 56]));

    let clear = RgbaImage::from_pixel(3, 3, Rgba([12, 34, 56, 0]));
    let result = processor.process(CompositeRequest::new(png(&clear)).with_background(pink))?;
    assert!(result.image.pixels().all(|p| p.0 == [255, 110, 196]));
    Ok(())
}

#[test]
fn test_custom_provider_with_shared_processor() -> Result<()> {
    let provider = Arc::new(RampProvider {
        calls: AtomicUsize::new(0),
    });
    let processor = CompositeProcessor::new(provider.clone(), CompositeConfig::default())?;
    assert_eq!(processor.provider_name(), "ramp");

    let photo = RgbImage::from_pixel(4, 2, Rgb([100, 200, 40]));
    let upload = OutputFormatHandler::encode_rgb(&photo, OutputFormat::Png, 100)?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let processor = processor.clone();
            let upload = upload.clone();
            std::thread::spawn(move || processor.process(processor.request(upload)))
        })
        .collect();

    for handle in handles {
        let result = handle.join().unwrap()?;
        assert_eq!(result.dimensions(), (4, 2));
        // Leftmost column fully transparent, rightmost fully opaque
        assert_eq!(result.image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(result.image.get_pixel(3, 1).0, [100, 200, 40]);
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    Ok(())
}

#[test]
fn test_jpeg_upload_and_tiff_download() -> Result<()> {
    let config = CompositeConfig::builder()
        .output_format(OutputFormat::Tiff)
        .background(BackgroundColor::white())
        .build()?;
    let processor = CompositeProcessor::with_provider(EmbeddedAlphaProvider, config)?;

    let photo = RgbImage::from_pixel(8, 8, Rgb([90, 90, 90]));
    let upload = OutputFormatHandler::encode_rgb(&photo, OutputFormat::Jpeg, 95)?;

    let result = processor.process(processor.request(upload))?;
    assert_eq!(result.download.file_name, "result.tiff");
    assert_eq!(result.download.mime_type, "image/tiff");
    assert_eq!(
        image::load_from_memory(&result.download.bytes).unwrap().to_rgb8(),
        result.image
    );
    Ok(())
}

#[test]
fn test_download_and_matte_saved_to_disk() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let processor = CompositeProcessor::with_provider(EmbeddedAlphaProvider, CompositeConfig::default())?;
    let result = processor.process(processor.request(png(&reference_cutout())))?;

    let written = result.download.save_to_dir(dir.path())?;
    assert_eq!(written, dir.path().join("result.png"));
    assert_eq!(std::fs::read(&written)?, result.download.bytes);

    let matte_path = dir.path().join("nested").join("matte.png");
    result.save_matte_png(&matte_path)?;
    let matte = image::open(&matte_path).unwrap().to_rgba8();
    assert_eq!(matte, reference_cutout());

    let stats = result.transparency().statistics();
    assert_eq!(stats.foreground_pixels, 1);
    assert_eq!(stats.background_pixels, 1);
    assert_eq!(stats.partial_pixels, 2);
    Ok(())
}

#[tokio::test]
async fn test_async_processing_matches_sync() -> Result<()> {
    let processor = CompositeProcessor::with_provider(EmbeddedAlphaProvider, CompositeConfig::default())?;
    let upload = png(&reference_cutout());

    let sync_result = processor.process(processor.request(upload.clone()))?;
    let async_result = processor.process_async(processor.request(upload)).await?;

    assert_eq!(sync_result.image, async_result.image);
    assert_eq!(sync_result.download.bytes, async_result.download.bytes);
    Ok(())
}
