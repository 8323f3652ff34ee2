use std::time::Duration;

/// Identity of the target emulator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The adb serial form, `host:port`.
    pub fn serial(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Post-action settle delays, modeling the latency before an input's effect
/// becomes observable on the next capture.
#[derive(Debug, Clone, Copy)]
pub struct ActionDelays {
    pub tap: Duration,
    pub swipe: Duration,
    pub text: Duration,
    pub key: Duration,
}

impl Default for ActionDelays {
    fn default() -> Self {
        Self {
            tap: Duration::from_millis(100),
            swipe: Duration::from_millis(300),
            text: Duration::from_millis(100),
            key: Duration::from_millis(100),
        }
    }
}

impl ActionDelays {
    /// No settle delays; used by tests.
    pub fn none() -> Self {
        Self {
            tap: Duration::ZERO,
            swipe: Duration::ZERO,
            text: Duration::ZERO,
            key: Duration::ZERO,
        }
    }
}

/// Android key event codes.
pub struct KeyCode;

impl KeyCode {
    pub const HOME: u32 = 3;
    pub const BACK: u32 = 4;
    pub const VOLUME_UP: u32 = 24;
    pub const VOLUME_DOWN: u32 = 25;
    pub const POWER: u32 = 26;
    pub const ENTER: u32 = 66;
    pub const DEL: u32 = 67;
    pub const MENU: u32 = 82;
}
