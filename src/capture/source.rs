use super::frame::{CaptureRegion, Frame};
use image::imageops::FilterType;
use image::RgbaImage;
use thiserror::Error;
use tokio::time::{sleep, Duration, Instant};
use xcap::Monitor;

pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to enumerate displays: {source}")]
    MonitorEnumerationFailed { source: xcap::XCapError },

    #[error("No primary display available for capture")]
    NoMonitorAvailable,

    #[error("Screen grab failed: {source}")]
    GrabFailed { source: xcap::XCapError },

    #[error(
        "Capture region [{left},{top} {width}x{height}] exceeds display bounds ({display_width}x{display_height})"
    )]
    RegionOutOfBounds {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
        display_width: u32,
        display_height: u32,
    },

    #[error("Captured buffer dimensions are inconsistent with its length")]
    InvalidFrameBuffer,

    #[error("Frame source is closed")]
    SourceClosed,
}

/// Source of rate-limited frames.
///
/// Implemented over the real display by [`ScreenSource`]; the automation loop
/// is generic over this trait so tests can drive it with synthetic frames.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    async fn capture(&mut self) -> CaptureResult<Frame>;
    /// Approximate captures completed over the last rolling second.
    fn current_rate(&self) -> u32;
    fn close(&mut self);
}

/// Rolling one-second throughput counter.
#[derive(Debug)]
struct RateWindow {
    window_start: Instant,
    frames: u32,
    rate: u32,
}

impl RateWindow {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            rate: 0,
        }
    }

    fn record(&mut self) {
        self.frames += 1;
        if self.window_start.elapsed() >= Duration::from_secs(1) {
            self.rate = self.frames;
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    fn rate(&self) -> u32 {
        self.rate
    }
}

/// Captures a region of the primary display through `xcap`.
pub struct ScreenSource {
    monitor: Option<Monitor>,
    region: Option<CaptureRegion>,
    output_size: Option<(u32, u32)>,
    min_interval: Duration,
    last_capture: Option<Instant>,
    window: RateWindow,
}

impl ScreenSource {
    /// Open the primary display. `region` defaults to the full display and
    /// `output_size` resizes every grab before it is returned, so downstream
    /// coordinates are expressed in output space.
    pub fn new(
        region: Option<CaptureRegion>,
        output_size: Option<(u32, u32)>,
        max_fps: u32,
    ) -> CaptureResult<Self> {
        let monitors = Monitor::all()
            .map_err(|source| CaptureError::MonitorEnumerationFailed { source })?;
        let monitor = monitors
            .iter()
            .find(|m| m.is_primary())
            .or_else(|| monitors.first())
            .cloned()
            .ok_or(CaptureError::NoMonitorAvailable)?;

        log::info!(
            "Screen source ready: display {}x{}, region {:?}, output {:?}, max {} fps",
            monitor.width(),
            monitor.height(),
            region,
            output_size,
            max_fps
        );

        Ok(Self {
            monitor: Some(monitor),
            region,
            output_size,
            min_interval: Duration::from_secs_f64(1.0 / f64::from(max_fps.max(1))),
            last_capture: None,
            window: RateWindow::new(),
        })
    }

    fn crop_to_region(&self, image: RgbaImage) -> CaptureResult<RgbaImage> {
        let Some(region) = self.region else {
            return Ok(image);
        };
        // Widen before adding; extreme config values must not overflow u32.
        if u64::from(region.left) + u64::from(region.width) > u64::from(image.width())
            || u64::from(region.top) + u64::from(region.height) > u64::from(image.height())
        {
            return Err(CaptureError::RegionOutOfBounds {
                left: region.left,
                top: region.top,
                width: region.width,
                height: region.height,
                display_width: image.width(),
                display_height: image.height(),
            });
        }
        Ok(
            image::imageops::crop_imm(&image, region.left, region.top, region.width, region.height)
                .to_image(),
        )
    }
}

impl FrameSource for ScreenSource {
    async fn capture(&mut self) -> CaptureResult<Frame> {
        let Some(monitor) = &self.monitor else {
            return Err(CaptureError::SourceClosed);
        };

        // Rate limit: never hand out two frames closer together than the
        // configured interval. The grab and resize cost is additive, so this
        // bounds the minimum spacing only, not the maximum.
        if let Some(last) = self.last_capture {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }

        let grabbed = monitor
            .capture_image()
            .map_err(|source| CaptureError::GrabFailed { source })?;
        // Rebuild through the raw buffer so the frame uses this crate's
        // `image` types regardless of the version xcap links against.
        let raw = RgbaImage::from_raw(grabbed.width(), grabbed.height(), grabbed.into_raw())
            .ok_or(CaptureError::InvalidFrameBuffer)?;

        let cropped = self.crop_to_region(raw)?;
        let rgb = match self.output_size {
            Some((w, h)) => image::imageops::resize(&cropped, w, h, FilterType::Nearest),
            None => cropped,
        };
        let rgb = image::DynamicImage::ImageRgba8(rgb).to_rgb8();

        self.last_capture = Some(Instant::now());
        self.window.record();
        log::debug!(
            "Captured frame {}x{} (rate ~{} fps)",
            rgb.width(),
            rgb.height(),
            self.window.rate()
        );
        Ok(Frame::new(rgb))
    }

    fn current_rate(&self) -> u32 {
        self.window.rate()
    }

    fn close(&mut self) {
        // Safe to call multiple times; later captures fail with SourceClosed.
        if self.monitor.take().is_some() {
            log::info!("Screen source closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source with no display handle, for exercising the pure parts.
    fn detached_source(region: Option<CaptureRegion>) -> ScreenSource {
        ScreenSource {
            monitor: None,
            region,
            output_size: None,
            min_interval: Duration::ZERO,
            last_capture: None,
            window: RateWindow::new(),
        }
    }

    #[test]
    fn oversized_region_is_rejected_without_overflow() {
        // left + width would wrap u32; must still report the region error.
        let source = detached_source(Some(CaptureRegion {
            left: u32::MAX,
            top: 0,
            width: 2,
            height: 2,
        }));
        let result = source.crop_to_region(RgbaImage::new(64, 64));
        assert!(matches!(result, Err(CaptureError::RegionOutOfBounds { .. })));
    }

    #[test]
    fn region_within_bounds_is_cropped() {
        let source = detached_source(Some(CaptureRegion {
            left: 10,
            top: 20,
            width: 30,
            height: 40,
        }));
        let cropped = source.crop_to_region(RgbaImage::new(64, 64)).unwrap();
        assert_eq!(cropped.dimensions(), (30, 40));
    }

    #[tokio::test]
    async fn capture_after_close_fails_cleanly() {
        let mut source = detached_source(None);
        source.close();
        source.close();
        assert!(matches!(source.capture().await, Err(CaptureError::SourceClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_window_reports_frames_per_second() {
        let mut window = RateWindow::new();
        for _ in 0..7 {
            window.record();
        }
        assert_eq!(window.rate(), 0, "window has not elapsed yet");

        sleep(Duration::from_millis(1100)).await;
        window.record();
        assert_eq!(window.rate(), 8);

        // A fresh window starts counting from zero again.
        sleep(Duration::from_millis(1100)).await;
        window.record();
        assert_eq!(window.rate(), 1);
    }
}
