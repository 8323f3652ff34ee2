//! Tests for the device channel state machine over a mock transport.

use super::channel::DeviceChannel;
use super::error::{DeviceError, DeviceResult};
use super::transport::{escape_text_for_input, parse_physical_size, DeviceTransport};
use super::types::{ActionDelays, DeviceEndpoint, KeyCode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct MockTransport {
    fail_connect: AtomicBool,
    fail_tap: AtomicBool,
    connect_attempts: AtomicUsize,
    taps: Mutex<Vec<(u32, u32)>>,
    keys: Mutex<Vec<u32>>,
    texts: Mutex<Vec<String>>,
}

impl MockTransport {
    fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }
}

impl DeviceTransport for &MockTransport {
    async fn connect(&self, endpoint: &DeviceEndpoint) -> DeviceResult<()> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect.load(Ordering::SeqCst) {
            Err(DeviceError::ConnectFailed {
                serial: endpoint.serial(),
                detail: "unable to connect".to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn disconnect(&self, _endpoint: &DeviceEndpoint) -> DeviceResult<()> {
        Ok(())
    }

    async fn send_tap(&self, _endpoint: &DeviceEndpoint, x: u32, y: u32) -> DeviceResult<()> {
        if self.fail_tap.load(Ordering::SeqCst) {
            return Err(DeviceError::CommandFailed {
                command: "input tap".to_string(),
                detail: "broken pipe".to_string(),
            });
        }
        self.taps.lock().unwrap().push((x, y));
        Ok(())
    }

    async fn send_swipe(
        &self,
        _endpoint: &DeviceEndpoint,
        _x1: u32,
        _y1: u32,
        _x2: u32,
        _y2: u32,
        _duration_ms: Option<u32>,
    ) -> DeviceResult<()> {
        Ok(())
    }

    async fn send_text(&self, _endpoint: &DeviceEndpoint, text: &str) -> DeviceResult<()> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_key(&self, _endpoint: &DeviceEndpoint, code: u32) -> DeviceResult<()> {
        self.keys.lock().unwrap().push(code);
        Ok(())
    }

    async fn query_screen_size(&self, _endpoint: &DeviceEndpoint) -> DeviceResult<(u32, u32)> {
        Ok((1280, 720))
    }
}

fn channel(transport: &MockTransport) -> DeviceChannel<&MockTransport> {
    DeviceChannel::new(
        transport,
        DeviceEndpoint::new("127.0.0.1", 5555),
        ActionDelays::none(),
    )
}

#[tokio::test]
async fn tap_while_disconnected_makes_one_implicit_connect() {
    let transport = MockTransport::default();
    let mut channel = channel(&transport);

    channel.tap(10, 20).await.unwrap();

    assert_eq!(transport.connect_attempts(), 1);
    assert!(channel.is_connected());
    assert_eq!(*transport.taps.lock().unwrap(), vec![(10, 20)]);
}

#[tokio::test]
async fn failed_implicit_connect_fails_action_without_side_effects() {
    let transport = MockTransport::default();
    transport.fail_connect.store(true, Ordering::SeqCst);
    let mut channel = channel(&transport);

    let err = channel.tap(10, 20).await.unwrap_err();

    assert!(matches!(err, DeviceError::NotConnected { .. }));
    assert!(!channel.is_connected());
    assert_eq!(transport.connect_attempts(), 1, "exactly one attempt");
    assert!(transport.taps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn connected_channel_does_not_reconnect_per_action() {
    let transport = MockTransport::default();
    let mut channel = channel(&transport);
    channel.connect().await.unwrap();

    channel.tap(1, 1).await.unwrap();
    channel.press_key(KeyCode::BACK).await.unwrap();
    channel.input_text("hello").await.unwrap();

    assert_eq!(transport.connect_attempts(), 1);
    assert_eq!(*transport.keys.lock().unwrap(), vec![KeyCode::BACK]);
}

#[tokio::test]
async fn command_failure_drops_to_disconnected() {
    let transport = MockTransport::default();
    let mut channel = channel(&transport);
    channel.connect().await.unwrap();

    transport.fail_tap.store(true, Ordering::SeqCst);
    let err = channel.tap(5, 5).await.unwrap_err();
    assert!(matches!(err, DeviceError::CommandFailed { .. }));
    assert!(!channel.is_connected());

    // Next action gets its single implicit reconnect.
    transport.fail_tap.store(false, Ordering::SeqCst);
    channel.tap(6, 6).await.unwrap();
    assert_eq!(transport.connect_attempts(), 2);
    assert!(channel.is_connected());
}

#[tokio::test]
async fn disconnect_resets_state() {
    let transport = MockTransport::default();
    let mut channel = channel(&transport);
    channel.connect().await.unwrap();
    assert!(channel.is_connected());

    channel.disconnect().await;
    assert!(!channel.is_connected());
}

#[test]
fn text_is_escaped_for_input() {
    assert_eq!(escape_text_for_input("hello world"), "hello%sworld");
    assert_eq!(escape_text_for_input("nospace"), "nospace");
    assert_eq!(escape_text_for_input("a b c"), "a%sb%sc");
}

#[test]
fn physical_size_parses_from_wm_size_output() {
    let out = "Physical size: 1280x720\n";
    assert_eq!(parse_physical_size(out).unwrap(), (1280, 720));

    let out = "Override size: 1080x2280\nPhysical size: 720x1280\n";
    assert_eq!(parse_physical_size(out).unwrap(), (720, 1280));

    assert!(matches!(
        parse_physical_size("no size here"),
        Err(DeviceError::ScreenSizeParseFailed)
    ));
}

#[test]
fn endpoint_serial_is_host_port() {
    assert_eq!(DeviceEndpoint::new("10.0.0.5", 5037).serial(), "10.0.0.5:5037");
}
