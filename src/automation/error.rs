use crate::capture::CaptureError;
use crate::device::DeviceError;
use crate::vision::VisionError;
use thiserror::Error;

pub type BotResult<T> = Result<T, BotError>;

/// Errors surfaced by the automation loop, keeping the failing component
/// visible to the process boundary.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Matching failed: {0}")]
    Vision(#[from] VisionError),

    #[error("Device action failed: {0}")]
    Device(#[from] DeviceError),
}
