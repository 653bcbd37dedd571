use std::time::Duration;

use crate::{DeviceError, DriverError, ElementInfo, Selector};

/// Hardware and navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Home,
    Back,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Home => "home",
            Key::Back => "back",
        }
    }
}

/// Remote control of one Android device.
///
/// Lookups report absence as `false`/`None`; only transport and protocol
/// problems are errors.
#[async_trait::async_trait]
pub trait Device: Send + Sync {
    async fn app_stop(&self, package: &str) -> Result<(), DeviceError>;
    async fn app_start(&self, package: &str) -> Result<(), DeviceError>;
    /// Package of the focused window, if any.
    async fn app_current(&self) -> Result<Option<String>, DeviceError>;
    async fn screen_on(&self) -> Result<(), DeviceError>;
    async fn press(&self, key: Key) -> Result<(), DeviceError>;
    async fn exists(&self, selector: &Selector) -> Result<bool, DeviceError>;
    /// Returns whether an element was there to click.
    async fn click(&self, selector: &Selector) -> Result<bool, DeviceError>;
    async fn click_at(&self, x: i32, y: i32) -> Result<(), DeviceError>;
    /// Returns whether an element was there to type into.
    async fn set_text(&self, selector: &Selector, text: &str) -> Result<bool, DeviceError>;
    async fn element_info(&self, selector: &Selector) -> Result<Option<ElementInfo>, DeviceError>;
    async fn all_element_info(&self, selector: &Selector) -> Result<Vec<ElementInfo>, DeviceError>;
    async fn long_click_at(&self, x: i32, y: i32, hold: Duration) -> Result<(), DeviceError>;
    /// Display width and height in pixels.
    async fn window_size(&self) -> Result<(u32, u32), DeviceError>;
    /// Open `url` with an explicit VIEW intent aimed at `package`.
    async fn open_url(&self, url: &str, package: &str) -> Result<(), DeviceError>;
}

/// Hands out live device handles. Each call is a fresh session.
#[async_trait::async_trait]
pub trait DeviceConnector: Send + Sync {
    type Device: Device;

    async fn connect(&self) -> Result<Self::Device, DriverError>;
}
