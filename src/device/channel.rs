//! Logical connection to the target plus primitive input actions.

use super::error::{DeviceError, DeviceResult};
use super::transport::DeviceTransport;
use super::types::{ActionDelays, ConnectionState, DeviceEndpoint, KeyCode};
use std::time::Duration;
use tokio::time::sleep;

/// State machine over a raw transport.
///
/// Any action attempted while disconnected makes exactly one implicit
/// connect attempt; if that fails the action fails without side effects.
/// There are no internal retries beyond that - the caller owns retry policy.
pub struct DeviceChannel<T: DeviceTransport> {
    transport: T,
    endpoint: DeviceEndpoint,
    state: ConnectionState,
    delays: ActionDelays,
}

impl<T: DeviceTransport> DeviceChannel<T> {
    pub fn new(transport: T, endpoint: DeviceEndpoint, delays: ActionDelays) -> Self {
        Self {
            transport,
            endpoint,
            state: ConnectionState::Disconnected,
            delays,
        }
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub async fn connect(&mut self) -> DeviceResult<()> {
        self.transport.connect(&self.endpoint).await?;
        self.state = ConnectionState::Connected;
        log::info!("Connected to {}", self.endpoint.serial());
        Ok(())
    }

    pub async fn disconnect(&mut self) {
        if let Err(e) = self.transport.disconnect(&self.endpoint).await {
            log::warn!("Disconnect from {} reported: {}", self.endpoint.serial(), e);
        }
        self.state = ConnectionState::Disconnected;
        log::info!("Disconnected from {}", self.endpoint.serial());
    }

    /// The single ensure-connected path every action routes through.
    async fn ensure_connected(&mut self) -> DeviceResult<()> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }
        log::warn!(
            "Device {} not connected, attempting reconnect",
            self.endpoint.serial()
        );
        self.connect().await.map_err(|e| DeviceError::NotConnected {
            serial: self.endpoint.serial(),
            detail: e.to_string(),
        })
    }

    /// A failed command usually means the connection is gone; drop to
    /// Disconnected so the next action gets its single implicit reconnect.
    fn mark_disconnected(&mut self, err: DeviceError) -> DeviceError {
        self.state = ConnectionState::Disconnected;
        err
    }

    async fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    pub async fn tap(&mut self, x: u32, y: u32) -> DeviceResult<()> {
        self.ensure_connected().await?;
        match self.transport.send_tap(&self.endpoint, x, y).await {
            Ok(()) => {
                log::debug!("Tap at ({x}, {y})");
                self.settle(self.delays.tap).await;
                Ok(())
            }
            Err(e) => Err(self.mark_disconnected(e)),
        }
    }

    pub async fn swipe(
        &mut self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: Option<u32>,
    ) -> DeviceResult<()> {
        self.ensure_connected().await?;
        match self
            .transport
            .send_swipe(&self.endpoint, x1, y1, x2, y2, duration_ms)
            .await
        {
            Ok(()) => {
                log::debug!("Swipe ({x1}, {y1}) -> ({x2}, {y2})");
                self.settle(self.delays.swipe).await;
                Ok(())
            }
            Err(e) => Err(self.mark_disconnected(e)),
        }
    }

    pub async fn input_text(&mut self, text: &str) -> DeviceResult<()> {
        self.ensure_connected().await?;
        match self.transport.send_text(&self.endpoint, text).await {
            Ok(()) => {
                log::debug!("Input text ({} chars)", text.len());
                self.settle(self.delays.text).await;
                Ok(())
            }
            Err(e) => Err(self.mark_disconnected(e)),
        }
    }

    pub async fn press_key(&mut self, code: u32) -> DeviceResult<()> {
        self.ensure_connected().await?;
        match self.transport.send_key(&self.endpoint, code).await {
            Ok(()) => {
                log::debug!("Key event {code}");
                self.settle(self.delays.key).await;
                Ok(())
            }
            Err(e) => Err(self.mark_disconnected(e)),
        }
    }

    pub async fn home(&mut self) -> DeviceResult<()> {
        self.press_key(KeyCode::HOME).await
    }

    pub async fn back(&mut self) -> DeviceResult<()> {
        self.press_key(KeyCode::BACK).await
    }

    /// Native resolution of the connected device, from `wm size`.
    pub async fn screen_size(&mut self) -> DeviceResult<(u32, u32)> {
        self.ensure_connected().await?;
        match self.transport.query_screen_size(&self.endpoint).await {
            Ok(size) => Ok(size),
            Err(e) => Err(self.mark_disconnected(e)),
        }
    }
}
