//! The perception-action loop: capture, match, map, act.

use super::error::BotResult;
use super::types::{BotState, LoopOutcome};
use crate::capture::{Frame, FrameSource};
use crate::config::BotConfig;
use crate::device::{DeviceChannel, DeviceTransport};
use crate::mapping::{self, Point, Resolution};
use crate::vision::{self, Match, TemplateLibrary};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration, Instant};

/// Orchestrates the four components and owns all cross-cycle state.
///
/// Every call into capture, matching, mapping and the device channel is
/// strictly sequential; acting on a stale or overlapping frame would be
/// incorrect. Cancellation is honored only between complete steps, so an
/// action in flight always completes.
pub struct Bot<F: FrameSource, T: DeviceTransport> {
    source: F,
    library: TemplateLibrary,
    channel: DeviceChannel<T>,
    target: Resolution,
    threshold: f32,
    poll_interval: Duration,
    cooldown: Duration,
    default_timeout: Duration,
    state: BotState,
    cycles: u64,
    cancel: Arc<AtomicBool>,
    annotate_dir: Option<PathBuf>,
}

impl<F: FrameSource, T: DeviceTransport> Bot<F, T> {
    pub fn new(
        config: &BotConfig,
        source: F,
        library: TemplateLibrary,
        channel: DeviceChannel<T>,
    ) -> Self {
        Self {
            source,
            library,
            channel,
            target: config.target_resolution(),
            threshold: config.matching.threshold,
            poll_interval: config.poll_interval(),
            cooldown: config.cooldown(),
            default_timeout: config.default_timeout(),
            state: BotState::Idle,
            cycles: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            annotate_dir: None,
        }
    }

    /// Save an annotated copy of the frame on every hit into this directory.
    pub fn with_annotate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.annotate_dir = Some(dir.into());
        self
    }

    /// Clone of the cancellation flag, for a signal handler to set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    /// Completed capture-and-search cycles since construction.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut TemplateLibrary {
        &mut self.library
    }

    pub fn channel_mut(&mut self) -> &mut DeviceChannel<T> {
        &mut self.channel
    }

    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn set_state(&mut self, next: BotState) {
        if self.state != next {
            log::debug!("Automation state: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn save_annotated(&self, name: &str, frame: &Frame, m: &Match) {
        let Some(dir) = &self.annotate_dir else {
            return;
        };
        let Some(template) = self.library.get(name) else {
            return;
        };
        let annotated = vision::annotate_match(frame, template, m);
        let path = dir.join(format!("{name}-match.png"));
        match annotated.save(&path) {
            Ok(()) => log::info!("Annotated match saved to {:?}", path),
            Err(e) => log::warn!("Could not save annotated match to {:?}: {}", path, e),
        }
    }

    /// Search for the template and tap its mapped center once found.
    ///
    /// Polls until the deadline; an exhausted deadline reports
    /// [`LoopOutcome::NotFound`], not an error. On a hit, the frame point is
    /// mapped from the frame's resolution to the target resolution, the tap
    /// is issued, and the cooldown elapses before returning.
    pub async fn find_and_tap(&mut self, name: &str, timeout: Duration) -> BotResult<LoopOutcome> {
        self.set_state(BotState::Searching);
        let deadline = Instant::now() + timeout;

        loop {
            if self.cancelled() {
                log::info!("Search for '{name}' cancelled");
                self.set_state(BotState::Idle);
                return Ok(LoopOutcome::NotFound);
            }

            let frame = self.source.capture().await?;
            self.cycles += 1;

            match vision::best_match(&self.library, &frame, name, self.threshold)? {
                Some(m) => {
                    self.set_state(BotState::Found);
                    let frame_point = Point::new(m.x, m.y);
                    let source_res = Resolution::new(frame.width(), frame.height());
                    let device_point = mapping::map_point(frame_point, source_res, self.target);
                    log::info!(
                        "Found '{}' at frame ({}, {}) score {:.3}; tapping device ({}, {})",
                        name,
                        frame_point.x,
                        frame_point.y,
                        m.score,
                        device_point.x,
                        device_point.y
                    );

                    self.channel.tap(device_point.x, device_point.y).await?;
                    self.save_annotated(name, &frame, &m);

                    sleep(self.cooldown).await;
                    self.set_state(BotState::Idle);
                    return Ok(LoopOutcome::Found {
                        template: name.to_string(),
                        frame_point,
                        device_point,
                        score: m.score,
                    });
                }
                None => {
                    if Instant::now() >= deadline {
                        log::info!("'{name}' not found within {:?}", timeout);
                        self.set_state(BotState::Idle);
                        return Ok(LoopOutcome::NotFound);
                    }
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Wait until the template appears, without acting on it.
    pub async fn wait_for(&mut self, name: &str, timeout: Duration) -> BotResult<bool> {
        self.set_state(BotState::Searching);
        let deadline = Instant::now() + timeout;

        loop {
            if self.cancelled() {
                self.set_state(BotState::Idle);
                return Ok(false);
            }
            let frame = self.source.capture().await?;
            self.cycles += 1;

            if vision::best_match(&self.library, &frame, name, self.threshold)?.is_some() {
                log::info!("Template '{name}' appeared");
                self.set_state(BotState::Idle);
                return Ok(true);
            }
            if Instant::now() >= deadline {
                log::info!("Template '{name}' did not appear within {:?}", timeout);
                self.set_state(BotState::Idle);
                return Ok(false);
            }
            sleep(self.poll_interval).await;
        }
    }

    /// Continuous mode: cycle over the watch list until cancelled.
    ///
    /// A transport failure aborts the current iteration and moves on; it
    /// never takes the whole process down.
    pub async fn run(&mut self, names: &[String]) -> BotResult<()> {
        log::info!("Watching {} template(s): {:?}", names.len(), names);

        'outer: loop {
            if self.cancelled() {
                break;
            }
            for name in names {
                if self.cancelled() {
                    break 'outer;
                }
                match self.find_and_tap(name, self.default_timeout).await {
                    Ok(LoopOutcome::Found { device_point, .. }) => {
                        log::info!("Acted on '{}' at ({}, {})", name, device_point.x, device_point.y);
                    }
                    Ok(LoopOutcome::NotFound) => {
                        log::debug!("'{name}' not seen this iteration");
                    }
                    Err(super::BotError::Device(e)) => {
                        log::error!("Device action failed, skipping iteration: {e}");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        log::info!("Watch loop stopped after {} cycle(s)", self.cycles);
        self.set_state(BotState::Idle);
        Ok(())
    }

    /// Release the capture source and drop the device connection.
    pub async fn shutdown(&mut self) {
        self.source.close();
        if self.channel.is_connected() {
            self.channel.disconnect().await;
        }
    }
}
