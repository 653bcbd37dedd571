use pipeline_logging::{pipeline_debug, pipeline_info, pipeline_warn};

use crate::apps::{BrowserApp, PublishTimings, TargetApp};
use crate::image::{attach_from_gallery, save_image_via_browser};
use crate::strategy::SelectorChain;
use crate::wait::{poll_until, settle};
use crate::{Device, DeviceConnector, DeviceError, DriverError, Key};

/// How far a publish got. Stages only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PublishStage {
    #[default]
    Disconnected,
    Connected,
    AppForeground,
    ComposerOpen,
    TextEntered,
    ImageAttached,
    Submitted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub stage: PublishStage,
    /// Whether the app reported the focused package before the timeout.
    pub foreground_confirmed: bool,
    /// Whether a text editor showed up before the readiness timeout.
    pub input_ready: bool,
    pub image_attached: bool,
}

impl PublishReport {
    fn advance(&mut self, stage: PublishStage) {
        pipeline_info!("Publish stage {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }
}

/// Drives the target app to post a piece of text, optionally with an image.
pub struct Publisher<C> {
    connector: C,
    app: TargetApp,
    browser: BrowserApp,
    timings: PublishTimings,
}

impl<C: DeviceConnector> Publisher<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            app: TargetApp::default(),
            browser: BrowserApp::default(),
            timings: PublishTimings::default(),
        }
    }

    pub fn with_target_app(mut self, app: TargetApp) -> Self {
        self.app = app;
        self
    }

    pub fn with_browser(mut self, browser: BrowserApp) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_timings(mut self, timings: PublishTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Post `text`. When `image_url` is set, the image is downloaded on the
    /// device through the browser (on its own connection) and attached
    /// before submitting.
    ///
    /// Any step that cannot find its control fails the whole publish; there
    /// is no retry here.
    pub async fn publish(&self, text: &str, image_url: Option<&str>) -> Result<PublishReport, DriverError> {
        let mut report = PublishReport::default();

        let device = self.connector.connect().await?;
        report.advance(PublishStage::Connected);

        self.reset(&device).await?;
        report.foreground_confirmed = self.launch(&device).await?;
        report.advance(PublishStage::AppForeground);

        self.open_composer(&device).await?;
        report.advance(PublishStage::ComposerOpen);

        report.input_ready = self.await_input(&device).await?;
        self.enter_text(&device, text, report.input_ready).await?;
        report.advance(PublishStage::TextEntered);

        if let Some(url) = image_url {
            self.attach_image(&device, url).await?;
            report.image_attached = true;
            report.advance(PublishStage::ImageAttached);
        }

        self.submit(&device).await?;
        report.advance(PublishStage::Submitted);
        pipeline_info!("Post submitted");
        Ok(report)
    }

    /// Force-stop the app, wake the screen, go home.
    pub async fn reset<D: Device + ?Sized>(&self, device: &D) -> Result<(), DeviceError> {
        pipeline_info!("Resetting {}", self.app.package);
        device.app_stop(&self.app.package).await?;
        settle(self.timings.after_stop).await;
        device.screen_on().await?;
        device.press(Key::Home).await
    }

    /// Start the app and wait for it to take focus. A timeout is logged and
    /// otherwise ignored; the next step will fail if the app never came up.
    pub async fn launch<D: Device + ?Sized>(&self, device: &D) -> Result<bool, DeviceError> {
        device.app_start(&self.app.package).await?;
        let focused = self.wait_foreground(device).await?;
        if !focused {
            pipeline_warn!("{} did not report focus in time", self.app.package);
        }
        Ok(focused)
    }

    async fn wait_foreground<D: Device + ?Sized>(&self, device: &D) -> Result<bool, DeviceError> {
        let package = self.app.package.as_str();
        poll_until(self.timings.foreground, move || async move {
            Ok(device.app_current().await?.as_deref() == Some(package))
        })
        .await
    }

    /// Tap compose. Some builds only unfold a menu on the first tap, so tap
    /// again unless an editor appears.
    pub async fn open_composer<D: Device + ?Sized>(&self, device: &D) -> Result<(), DriverError> {
        let compose = self.app.compose_button();
        let chain = SelectorChain::new("compose button", vec![compose.clone()]);
        let button = chain.require(device, self.timings.control).await?;
        device.click(button).await?;

        let input = self.app.any_text_input();
        let input = &input;
        let opened = poll_until(self.timings.compose_second_tap, move || device.exists(input)).await?;
        if !opened && device.click(&compose).await? {
            pipeline_debug!("second compose tap");
        }
        Ok(())
    }

    /// Whether any text editor shows up within the readiness window. Not
    /// seeing one is not fatal.
    pub async fn await_input<D: Device + ?Sized>(&self, device: &D) -> Result<bool, DeviceError> {
        let input = self.app.any_text_input();
        let input = &input;
        let ready = poll_until(self.timings.input_ready, move || device.exists(input)).await?;
        if !ready {
            pipeline_warn!("No text input appeared, trying known fields anyway");
        }
        Ok(ready)
    }

    pub async fn enter_text<D: Device + ?Sized>(
        &self,
        device: &D,
        text: &str,
        input_seen: bool,
    ) -> Result<(), DriverError> {
        let chain = self.app.compose_field_chain(input_seen);
        let field = chain
            .first_match(device)
            .await?
            .ok_or_else(|| DriverError::not_found(chain.element()))?;
        if !device.set_text(field, text).await? {
            return Err(DriverError::not_found(chain.element()));
        }
        pipeline_info!("Entered {} characters", text.chars().count());
        Ok(())
    }

    /// Download `image_url` via the browser on a fresh connection, come back
    /// to the composer, and pick the image.
    pub async fn attach_image<D: Device + ?Sized>(&self, device: &D, image_url: &str) -> Result<(), DriverError> {
        let browser_device = self.connector.connect().await?;
        save_image_via_browser(&browser_device, &self.browser, &self.timings, image_url).await?;

        device.app_start(&self.app.package).await?;
        if !self.wait_foreground(device).await? {
            pipeline_warn!("{} did not come back to the front in time", self.app.package);
        }
        attach_from_gallery(device, &self.app, &self.timings).await
    }

    pub async fn submit<D: Device + ?Sized>(&self, device: &D) -> Result<(), DriverError> {
        let chain = SelectorChain::new("submit button", vec![self.app.submit_button()]);
        let button = chain.require(device, self.timings.control).await?;
        if !device.click(button).await? {
            return Err(DriverError::not_found(chain.element()));
        }
        settle(self.timings.after_submit).await;
        Ok(())
    }
}
