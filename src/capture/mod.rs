// Screen capture module - rate-limited frames of a display region.

pub mod frame;
pub mod source;

pub use frame::{CaptureRegion, Frame};
pub use source::{CaptureError, CaptureResult, FrameSource, ScreenSource};
