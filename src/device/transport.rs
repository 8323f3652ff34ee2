//! Raw command transports behind the device channel.
//!
//! The channel owns connection state and retry policy; a transport only
//! executes single commands against an endpoint.

use super::error::{DeviceError, DeviceResult};
use super::types::DeviceEndpoint;
use tokio::process::Command;

/// Transport seam for the adb process backend and for test fakes.
#[allow(async_fn_in_trait)]
pub trait DeviceTransport: Send + Sync {
    async fn connect(&self, endpoint: &DeviceEndpoint) -> DeviceResult<()>;
    async fn disconnect(&self, endpoint: &DeviceEndpoint) -> DeviceResult<()>;
    async fn send_tap(&self, endpoint: &DeviceEndpoint, x: u32, y: u32) -> DeviceResult<()>;
    #[allow(clippy::too_many_arguments)]
    async fn send_swipe(
        &self,
        endpoint: &DeviceEndpoint,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: Option<u32>,
    ) -> DeviceResult<()>;
    async fn send_text(&self, endpoint: &DeviceEndpoint, text: &str) -> DeviceResult<()>;
    async fn send_key(&self, endpoint: &DeviceEndpoint, code: u32) -> DeviceResult<()>;
    async fn query_screen_size(&self, endpoint: &DeviceEndpoint) -> DeviceResult<(u32, u32)>;
}

/// Spawns the `adb` binary for every command.
#[derive(Debug, Clone)]
pub struct AdbTransport {
    adb_path: String,
}

impl AdbTransport {
    pub fn new(adb_path: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    async fn run_adb(&self, args: &[&str]) -> DeviceResult<String> {
        let output = Command::new(&self.adb_path)
            .args(args)
            .output()
            .await
            .map_err(|source| DeviceError::AdbUnavailable {
                program: self.adb_path.clone(),
                source,
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                command: format!("{} {}", self.adb_path, args.join(" ")),
                detail: format!(
                    "{}{}",
                    stdout.trim(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(stdout)
    }

    async fn shell_input(&self, endpoint: &DeviceEndpoint, input_args: &[&str]) -> DeviceResult<()> {
        let serial = endpoint.serial();
        let mut args = vec!["-s", serial.as_str(), "shell", "input"];
        args.extend_from_slice(input_args);
        self.run_adb(&args).await?;
        Ok(())
    }
}

/// Spaces must be sent as `%s` for `input text`.
pub(crate) fn escape_text_for_input(text: &str) -> String {
    text.replace(' ', "%s")
}

/// Parse "Physical size: WxH" from `wm size` output.
pub(crate) fn parse_physical_size(stdout: &str) -> DeviceResult<(u32, u32)> {
    for line in stdout.lines() {
        if let Some(size_str) = line.trim().strip_prefix("Physical size: ") {
            let parts: Vec<&str> = size_str.trim().split('x').collect();
            if parts.len() == 2
                && let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>())
            {
                return Ok((w, h));
            }
        }
    }
    Err(DeviceError::ScreenSizeParseFailed)
}

impl DeviceTransport for AdbTransport {
    async fn connect(&self, endpoint: &DeviceEndpoint) -> DeviceResult<()> {
        let serial = endpoint.serial();
        let stdout = self.run_adb(&["connect", serial.as_str()]).await?;
        // adb prints "connected to ..." or "already connected to ..." on
        // success but still exits zero on refusal.
        if stdout.to_lowercase().contains("connected") && !stdout.contains("refused") {
            Ok(())
        } else {
            Err(DeviceError::ConnectFailed {
                serial,
                detail: stdout.trim().to_string(),
            })
        }
    }

    async fn disconnect(&self, endpoint: &DeviceEndpoint) -> DeviceResult<()> {
        let serial = endpoint.serial();
        self.run_adb(&["disconnect", serial.as_str()]).await?;
        Ok(())
    }

    async fn send_tap(&self, endpoint: &DeviceEndpoint, x: u32, y: u32) -> DeviceResult<()> {
        let (x, y) = (x.to_string(), y.to_string());
        self.shell_input(endpoint, &["tap", &x, &y]).await
    }

    async fn send_swipe(
        &self,
        endpoint: &DeviceEndpoint,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: Option<u32>,
    ) -> DeviceResult<()> {
        let coords = [x1.to_string(), y1.to_string(), x2.to_string(), y2.to_string()];
        let mut args: Vec<&str> = vec!["swipe"];
        args.extend(coords.iter().map(String::as_str));
        let duration;
        if let Some(d) = duration_ms {
            duration = d.to_string();
            args.push(&duration);
        }
        self.shell_input(endpoint, &args).await
    }

    async fn send_text(&self, endpoint: &DeviceEndpoint, text: &str) -> DeviceResult<()> {
        let escaped = escape_text_for_input(text);
        self.shell_input(endpoint, &["text", &escaped]).await
    }

    async fn send_key(&self, endpoint: &DeviceEndpoint, code: u32) -> DeviceResult<()> {
        let code = code.to_string();
        self.shell_input(endpoint, &["keyevent", &code]).await
    }

    async fn query_screen_size(&self, endpoint: &DeviceEndpoint) -> DeviceResult<(u32, u32)> {
        let serial = endpoint.serial();
        let stdout = self
            .run_adb(&["-s", serial.as_str(), "shell", "wm", "size"])
            .await?;
        parse_physical_size(&stdout)
    }
}
