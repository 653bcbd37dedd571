//! Publish driver: posts text (and optionally an image) through a social
//! app on a remote-controlled Android device.
mod apps;
mod atx;
mod device;
mod error;
mod flow;
mod image;
mod selector;
mod strategy;
mod wait;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use apps::{BrowserApp, PublishTimings, TargetApp, PHOTO_PICKER_PACKAGE, TEXT_INPUT_CLASS_PATTERN};
pub use atx::{AtxConnector, AtxDevice, DEFAULT_AGENT_PORT};
pub use device::{Device, DeviceConnector, Key};
pub use error::{DeviceError, DriverError};
pub use flow::{PublishReport, PublishStage, Publisher};
pub use image::{attach_from_gallery, pick_top_left, save_image_via_browser};
pub use selector::{Bounds, ElementInfo, Selector};
pub use strategy::SelectorChain;
pub use wait::{poll_for, poll_until, settle, Poll};
