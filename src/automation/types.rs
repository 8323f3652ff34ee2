use crate::mapping::Point;

/// Logical states of the perception-action loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Searching,
    Found,
    Idle,
}

/// Result of one search, reported to the caller.
///
/// `NotFound` is the expected outcome of an exhausted deadline, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    Found {
        template: String,
        /// Match center in frame space.
        frame_point: Point,
        /// Mapped center in the device's native space, as tapped.
        device_point: Point,
        score: f32,
    },
    NotFound,
}

impl LoopOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LoopOutcome::Found { .. })
    }
}
