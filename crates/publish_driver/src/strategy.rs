use pipeline_logging::pipeline_debug;

use crate::wait::{poll_for, Poll};
use crate::{Device, DeviceError, DriverError, Selector};

/// An ordered list of ways to find one on-screen control, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    element: String,
    candidates: Vec<Selector>,
}

impl SelectorChain {
    /// `element` names the control in logs and in `ElementNotFound`.
    pub fn new(element: impl Into<String>, candidates: Vec<Selector>) -> Self {
        Self {
            element: element.into(),
            candidates,
        }
    }

    /// Exact text matches for every label, then substring matches for every
    /// label.
    pub fn from_labels<S: AsRef<str>>(element: impl Into<String>, labels: &[S]) -> Self {
        let exact = labels.iter().map(|l| Selector::text(l.as_ref()));
        let partial = labels.iter().map(|l| Selector::text_contains(l.as_ref()));
        Self::new(element, exact.chain(partial).collect())
    }

    /// Resource ids tried in the given order.
    pub fn from_resource_ids<S: AsRef<str>>(element: impl Into<String>, ids: &[S]) -> Self {
        Self::new(
            element,
            ids.iter().map(|id| Selector::resource_id(id.as_ref())).collect(),
        )
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn candidates(&self) -> &[Selector] {
        &self.candidates
    }

    pub fn push(&mut self, selector: Selector) {
        self.candidates.push(selector);
    }

    /// The first candidate currently on screen.
    pub async fn first_match<D>(&self, device: &D) -> Result<Option<&Selector>, DeviceError>
    where
        D: Device + ?Sized,
    {
        for (rank, candidate) in self.candidates.iter().enumerate() {
            if device.exists(candidate).await? {
                pipeline_debug!("{}: matched candidate #{} ({})", self.element, rank, candidate);
                return Ok(Some(candidate));
            }
        }
        pipeline_debug!("{}: none of {} candidates on screen", self.element, self.candidates.len());
        Ok(None)
    }

    /// Re-run [`Self::first_match`] until something appears or `poll` runs out.
    pub async fn wait_for<D>(&self, device: &D, poll: Poll) -> Result<Option<&Selector>, DeviceError>
    where
        D: Device + ?Sized,
    {
        poll_for(poll, move || self.first_match(device)).await
    }

    /// Like [`Self::wait_for`], but absence is an `ElementNotFound` error.
    pub async fn require<D>(&self, device: &D, poll: Poll) -> Result<&Selector, DriverError>
    where
        D: Device + ?Sized,
    {
        self.wait_for(device, poll)
            .await?
            .ok_or_else(|| DriverError::not_found(&self.element))
    }
}
