//! An in-memory device for exercising the publish flow without hardware.
//!
//! The fake keeps a "screen" of selectors that currently match, records every
//! side-effecting call, and can reveal new elements when something is clicked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{Device, DeviceConnector, DeviceError, DriverError, ElementInfo, Key, Selector};

/// A side effect performed on the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    AppStop(String),
    AppStart(String),
    ScreenOn,
    Press(Key),
    Click(Selector),
    ClickAt(i32, i32),
    SetText(Selector, String),
    LongClickAt(i32, i32),
    OpenUrl(String, String),
}

#[derive(Debug)]
struct ScreenState {
    visible: Vec<(Selector, Vec<ElementInfo>)>,
    reveals: Vec<(Selector, Vec<Selector>)>,
    foreground: Option<String>,
    focus_on_start: bool,
    window: (u32, u32),
    calls: Vec<DeviceCall>,
}

#[derive(Debug, Clone)]
pub struct FakeDevice {
    state: Arc<Mutex<ScreenState>>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDevice {
    /// A 1080x2340 screen with nothing on it. Started apps take focus.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState {
                visible: Vec::new(),
                reveals: Vec::new(),
                foreground: None,
                focus_on_start: true,
                window: (1080, 2340),
                calls: Vec::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `selector` match one element with default info.
    pub fn show(&self, selector: Selector) -> &Self {
        self.show_elements(selector, vec![ElementInfo::default()])
    }

    /// Make `selector` match the given elements.
    pub fn show_elements(&self, selector: Selector, elements: Vec<ElementInfo>) -> &Self {
        let mut state = self.state();
        state.visible.retain(|(s, _)| *s != selector);
        state.visible.push((selector, elements));
        self
    }

    pub fn hide(&self, selector: &Selector) -> &Self {
        self.state().visible.retain(|(s, _)| s != selector);
        self
    }

    /// Clicking `clicked` makes each of `revealed` appear.
    pub fn reveal_on_click(&self, clicked: Selector, revealed: Vec<Selector>) -> &Self {
        self.state().reveals.push((clicked, revealed));
        self
    }

    /// Started apps never report focus.
    pub fn ignore_focus(&self) -> &Self {
        self.state().focus_on_start = false;
        self
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    pub fn click_count(&self, selector: &Selector) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::Click(s) if s == selector))
            .count()
    }

    fn record(&self, call: DeviceCall) {
        self.state().calls.push(call);
    }

    fn matches(&self, selector: &Selector) -> Option<Vec<ElementInfo>> {
        self.state()
            .visible
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, elements)| elements.clone())
    }
}

#[async_trait::async_trait]
impl Device for FakeDevice {
    async fn app_stop(&self, package: &str) -> Result<(), DeviceError> {
        self.record(DeviceCall::AppStop(package.to_string()));
        let mut state = self.state();
        if state.foreground.as_deref() == Some(package) {
            state.foreground = None;
        }
        Ok(())
    }

    async fn app_start(&self, package: &str) -> Result<(), DeviceError> {
        self.record(DeviceCall::AppStart(package.to_string()));
        let mut state = self.state();
        if state.focus_on_start {
            state.foreground = Some(package.to_string());
        }
        Ok(())
    }

    async fn app_current(&self) -> Result<Option<String>, DeviceError> {
        Ok(self.state().foreground.clone())
    }

    async fn screen_on(&self) -> Result<(), DeviceError> {
        self.record(DeviceCall::ScreenOn);
        Ok(())
    }

    async fn press(&self, key: Key) -> Result<(), DeviceError> {
        self.record(DeviceCall::Press(key));
        Ok(())
    }

    async fn exists(&self, selector: &Selector) -> Result<bool, DeviceError> {
        Ok(self.matches(selector).is_some_and(|found| !found.is_empty()))
    }

    async fn click(&self, selector: &Selector) -> Result<bool, DeviceError> {
        if !self.exists(selector).await? {
            return Ok(false);
        }
        self.record(DeviceCall::Click(selector.clone()));
        let revealed: Vec<Selector> = self
            .state()
            .reveals
            .iter()
            .filter(|(clicked, _)| clicked == selector)
            .flat_map(|(_, revealed)| revealed.iter().cloned())
            .collect();
        for selector in revealed {
            self.show(selector);
        }
        Ok(true)
    }

    async fn click_at(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        self.record(DeviceCall::ClickAt(x, y));
        Ok(())
    }

    async fn set_text(&self, selector: &Selector, text: &str) -> Result<bool, DeviceError> {
        if !self.exists(selector).await? {
            return Ok(false);
        }
        self.record(DeviceCall::SetText(selector.clone(), text.to_string()));
        Ok(true)
    }

    async fn element_info(&self, selector: &Selector) -> Result<Option<ElementInfo>, DeviceError> {
        Ok(self.matches(selector).and_then(|found| found.into_iter().next()))
    }

    async fn all_element_info(&self, selector: &Selector) -> Result<Vec<ElementInfo>, DeviceError> {
        Ok(self.matches(selector).unwrap_or_default())
    }

    async fn long_click_at(&self, x: i32, y: i32, _hold: Duration) -> Result<(), DeviceError> {
        self.record(DeviceCall::LongClickAt(x, y));
        Ok(())
    }

    async fn window_size(&self) -> Result<(u32, u32), DeviceError> {
        Ok(self.state().window)
    }

    async fn open_url(&self, url: &str, package: &str) -> Result<(), DeviceError> {
        self.record(DeviceCall::OpenUrl(url.to_string(), package.to_string()));
        Ok(())
    }
}

/// Hands out handles to one shared [`FakeDevice`] and counts connections.
#[derive(Debug, Clone)]
pub struct FakeConnector {
    device: Option<FakeDevice>,
    connects: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn new(device: FakeDevice) -> Self {
        Self {
            device: Some(device),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Behaves like a connector with no device address set.
    pub fn unconfigured() -> Self {
        Self {
            device: None,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Connection attempts so far, successful or not.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DeviceConnector for FakeConnector {
    type Device = FakeDevice;

    async fn connect(&self) -> Result<FakeDevice, DriverError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.device.clone().ok_or(DriverError::MissingDeviceConfig)
    }
}
