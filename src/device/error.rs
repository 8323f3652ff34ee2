use thiserror::Error;

/// A specialized `Result` type for device channel operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to invoke '{program}': {source}. Install Android Platform Tools or set device.adb_path.")]
    AdbUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to {serial}: {detail}")]
    ConnectFailed { serial: String, detail: String },

    #[error("Device {serial} is not connected and the implicit reconnect failed: {detail}")]
    NotConnected { serial: String, detail: String },

    #[error("Command '{command}' failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("Could not parse screen size from 'wm size' output")]
    ScreenSizeParseFailed,
}
