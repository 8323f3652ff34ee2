// Device module - logical connection to the target and primitive input
// actions over an adb transport, with reconnect-on-failure semantics.

pub mod channel;
pub mod error;
pub mod transport;
pub mod types;

#[cfg(test)]
mod tests;

pub use channel::DeviceChannel;
pub use error::{DeviceError, DeviceResult};
pub use transport::{AdbTransport, DeviceTransport};
pub use types::{ActionDelays, ConnectionState, DeviceEndpoint, KeyCode};
