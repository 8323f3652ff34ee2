pub mod args;
pub mod automation;
pub mod capture;
pub mod config;
pub mod device;
pub mod mapping;
pub mod vision;

pub use automation::Bot;
pub use config::BotConfig;
