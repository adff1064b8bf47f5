//! Single-pass, aggressive and batch resizing.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, info, instrument};

use super::{report, ImageFile, OutputFormat, ProgressObserver, ResizeOptions};
use crate::config::PipelineConfig;
use crate::error::{ResizeError, ResizeResult};

/// One rung of the aggressive resize ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeStep {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: f32,
}

impl ResizeStep {
    /// Forced JPEG resize options for this rung.
    pub fn options(&self) -> ResizeOptions {
        ResizeOptions {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: self.quality,
            format: OutputFormat::Jpeg,
            force_resize: true,
        }
    }
}

/// Presets tried in order until the output fits the byte budget.
pub const AGGRESSIVE_LADDER: [ResizeStep; 4] = [
    ResizeStep { max_width: 800, max_height: 800, quality: 0.7 },
    ResizeStep { max_width: 800, max_height: 800, quality: 0.5 },
    ResizeStep { max_width: 600, max_height: 600, quality: 0.5 },
    ResizeStep { max_width: 400, max_height: 400, quality: 0.4 },
];

/// Scale `width`x`height` down to fit inside the bounding box, keeping the
/// aspect ratio. Never upscales; never returns a zero dimension.
pub fn scale_to_fit(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let mut w = width as f64;
    let mut h = height as f64;

    if w > max_width as f64 {
        h = h * max_width as f64 / w;
        w = max_width as f64;
    }
    if h > max_height as f64 {
        w = w * max_height as f64 / h;
        h = max_height as f64;
    }

    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}

/// Resize/encode engine bound to a set of pipeline thresholds.
#[derive(Debug, Clone, Default)]
pub struct ImagePipeline {
    pub(super) config: PipelineConfig,
}

impl ImagePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether a file fits under the configured upload ceiling.
    pub fn is_within_upload_limit(&self, file: &ImageFile) -> bool {
        super::is_within_size_limit(file.len() as u64, self.config.max_upload_bytes)
    }

    /// Resize and re-encode one image.
    ///
    /// Non-image files, and images under the small-file threshold when
    /// `force_resize` is off, are returned unchanged. Decode failures are
    /// returned as [`ResizeError::Decode`].
    #[instrument(skip_all, fields(name = %file.name, size = file.len()))]
    pub async fn resize(
        &self,
        file: &ImageFile,
        options: &ResizeOptions,
        progress: Option<&dyn ProgressObserver>,
    ) -> ResizeResult<ImageFile> {
        if !file.is_image() {
            debug!(mime = %file.mime_type, "not an image, skipping resize");
            return Ok(file.clone());
        }
        if (file.len() as u64) < self.config.small_file_threshold_bytes() && !options.force_resize {
            debug!("below small-file threshold, skipping resize");
            return Ok(file.clone());
        }
        options.validate()?;

        report(progress, 0.1);
        let format = options.format.resolve(&file.mime_type);
        let quality = options.quality;
        let (max_width, max_height) = (options.max_width, options.max_height);

        let bytes = file.bytes.clone();
        report(progress, 0.3);
        let decoded = run_blocking(move || {
            image::load_from_memory(&bytes).map_err(ResizeError::Decode)
        })
        .await?;

        let (width, height) = scale_to_fit(decoded.width(), decoded.height(), max_width, max_height);
        debug!(
            from_width = decoded.width(),
            from_height = decoded.height(),
            width,
            height,
            "computed target dimensions"
        );
        report(progress, 0.5);

        let resized = run_blocking(move || {
            Ok(decoded.resize_exact(width, height, FilterType::Triangle))
        })
        .await?;
        report(progress, 0.8);

        let encoded = run_blocking(move || encode(&resized, format, quality)).await?;
        report(progress, 0.9);

        let output = ImageFile::new(file.name.clone(), format.mime_type(), encoded);
        debug!(output_size = output.len(), %format, "image re-encoded");
        report(progress, 1.0);

        Ok(output)
    }

    /// Walk the [`AGGRESSIVE_LADDER`] until the output is at most
    /// `max_size_kb` kilobytes. If even the last rung is too large, its
    /// result is returned anyway.
    pub async fn resize_aggressively(
        &self,
        file: &ImageFile,
        max_size_kb: u64,
    ) -> ResizeResult<ImageFile> {
        let budget = max_size_kb.saturating_mul(1024);
        let (last, earlier) = AGGRESSIVE_LADDER
            .split_last()
            .ok_or_else(|| ResizeError::InvalidOptions("empty resize ladder".to_string()))?;

        for (attempt, step) in earlier.iter().enumerate() {
            let resized = self.resize(file, &step.options(), None).await?;
            if resized.len() as u64 <= budget {
                return Ok(resized);
            }
            info!(
                attempt = attempt + 1,
                size = resized.len(),
                budget,
                "resize attempt still too large, trying smaller preset"
            );
        }

        let resized = self.resize(file, &last.options(), None).await?;
        if resized.len() as u64 > budget {
            info!(size = resized.len(), budget, "smallest preset still over budget, returning it");
        }
        Ok(resized)
    }

    /// Resize several files one after another. Overall progress is
    /// `(index + file_progress) / count`.
    pub async fn resize_batch(
        &self,
        files: &[ImageFile],
        options: &ResizeOptions,
        progress: Option<&dyn ProgressObserver>,
    ) -> ResizeResult<Vec<ImageFile>> {
        let count = files.len() as f32;
        let mut resized = Vec::with_capacity(files.len());

        for (i, file) in files.iter().enumerate() {
            let file_progress = |p: f32| report(progress, (i as f32 + p) / count);
            resized.push(self.resize(file, options, Some(&file_progress)).await?);
        }

        Ok(resized)
    }
}

/// Resize one image with the default thresholds.
pub async fn resize_image(
    file: &ImageFile,
    options: &ResizeOptions,
    progress: Option<&dyn ProgressObserver>,
) -> ResizeResult<ImageFile> {
    ImagePipeline::default().resize(file, options, progress).await
}

/// Aggressively resize one image with the default thresholds.
pub async fn resize_aggressively(file: &ImageFile, max_size_kb: u64) -> ResizeResult<ImageFile> {
    ImagePipeline::default().resize_aggressively(file, max_size_kb).await
}

/// Resize a batch of images with the default thresholds.
pub async fn resize_images(
    files: &[ImageFile],
    options: &ResizeOptions,
    progress: Option<&dyn ProgressObserver>,
) -> ResizeResult<Vec<ImageFile>> {
    ImagePipeline::default().resize_batch(files, options, progress).await
}

async fn run_blocking<T, F>(f: F) -> ResizeResult<T>
where
    F: FnOnce() -> ResizeResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ResizeError::Task(e.to_string()))?
}

fn encode(image: &DynamicImage, format: OutputFormat, quality: f32) -> ResizeResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => {
            image
                .write_with_encoder(PngEncoder::new(&mut buf))
                .map_err(ResizeError::Encode)?;
        }
        OutputFormat::Jpeg | OutputFormat::Auto => {
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
                .encode_image(&rgb)
                .map_err(ResizeError::Encode)?;
        }
    }
    Ok(buf)
}

/// Map 0.0-1.0 quality onto the JPEG encoder's 1-100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scale_to_fit_limits_width_first() {
        assert_eq!(scale_to_fit(1600, 1200, 800, 800), (800, 600));
        assert_eq!(scale_to_fit(1200, 1600, 800, 800), (600, 800));
        assert_eq!(scale_to_fit(3000, 1000, 1200, 400), (1200, 400));
    }

    #[test]
    fn scale_to_fit_never_upscales() {
        assert_eq!(scale_to_fit(300, 200, 800, 800), (300, 200));
    }

    #[test]
    fn scale_to_fit_keeps_at_least_one_pixel() {
        assert_eq!(scale_to_fit(10_000, 1, 100, 100), (100, 1));
    }

    #[test]
    fn ladder_shrinks_monotonically() {
        for pair in AGGRESSIVE_LADDER.windows(2) {
            assert!(pair[1].max_width <= pair[0].max_width);
            assert!(pair[1].quality <= pair[0].quality);
        }
        assert!(AGGRESSIVE_LADDER.iter().all(|s| s.options().force_resize));
    }

    proptest! {
        #[test]
        fn scale_to_fit_stays_in_bounds_and_keeps_aspect(
            width in 1u32..5000,
            height in 1u32..5000,
            max_width in 1u32..2000,
            max_height in 1u32..2000,
        ) {
            let (w, h) = scale_to_fit(width, height, max_width, max_height);
            prop_assert!(w <= max_width && h <= max_height, "{}x{} outside box", w, h);
            prop_assert!(w <= width && h <= height, "{}x{} upscaled", w, h);

            // Whichever side was derived from the other is within a pixel
            let ratio = width as f64 / height as f64;
            let w_err = (w as f64 - h as f64 * ratio).abs();
            let h_err = (h as f64 - w as f64 / ratio).abs();
            prop_assert!(w_err.min(h_err) <= 1.0, "{}x{} -> {}x{}", width, height, w, h);
        }
    }

    #[test]
    fn jpeg_quality_scale() {
        assert_eq!(jpeg_quality(0.7), 70);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(1.0), 100);
    }
}
