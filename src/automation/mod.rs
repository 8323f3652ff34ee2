// Automation module - the perception-action loop orchestrating capture,
// matching, coordinate mapping and device input.

pub mod error;
pub mod fsm;
pub mod types;


pub use error::{BotError, BotResult};
pub use fsm::Bot;
pub use types::{BotState, LoopOutcome};
