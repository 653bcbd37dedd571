//! Wait-for-condition primitives. Every wait has an explicit ceiling; nothing
//! here sleeps longer than its ceiling.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::DeviceError;

/// A polling budget: check every `interval` until `ceiling` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    pub ceiling: Duration,
    pub interval: Duration,
}

impl Poll {
    pub const fn new(ceiling: Duration, interval: Duration) -> Self {
        Self { ceiling, interval }
    }

    /// Probe exactly once.
    pub const fn once() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

/// Run `probe` until it yields `Some`, or the ceiling passes.
///
/// The probe always runs at least once, and once more right at the
/// deadline, so a zero ceiling is a single check.
pub async fn poll_for<T, F, Fut>(poll: Poll, mut probe: F) -> Result<Option<T>, DeviceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, DeviceError>>,
{
    let deadline = Instant::now() + poll.ceiling;
    loop {
        if let Some(found) = probe().await? {
            return Ok(Some(found));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let step = poll.interval.max(Duration::from_millis(1));
        tokio::time::sleep(step.min(deadline - now)).await;
    }
}

/// [`poll_for`] for yes/no conditions. Returns whether the condition held.
pub async fn poll_until<F, Fut>(poll: Poll, mut probe: F) -> Result<bool, DeviceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, DeviceError>>,
{
    let found = poll_for(poll, || {
        let check = probe();
        async move { Ok(check.await?.then_some(())) }
    })
    .await?;
    Ok(found.is_some())
}

/// A fixed pause for steps with no observable completion signal.
pub async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn once_probes_a_single_time() {
        let calls = Cell::new(0);
        let held = poll_until(Poll::once(), || {
            calls.set(calls.get() + 1);
            async { Ok(false) }
        })
        .await
        .unwrap();
        assert!(!held);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn stops_as_soon_as_condition_holds() {
        let calls = Cell::new(0);
        let poll = Poll::new(Duration::from_secs(5), Duration::from_millis(1));
        let found = poll_for(poll, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok((n == 3).then_some(n)) }
        })
        .await
        .unwrap();
        assert_eq!(found, Some(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_ceiling() {
        let poll = Poll::new(Duration::from_millis(20), Duration::from_millis(5));
        let start = Instant::now();
        let held = poll_until(poll, || async { Ok(false) }).await.unwrap();
        assert!(!held);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn probe_errors_propagate() {
        let err = poll_until(Poll::once(), || async {
            Err(DeviceError::Transport("gone".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err, DeviceError::Transport("gone".into()));
    }
}
