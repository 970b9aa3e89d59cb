use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// The result of a bounded polling loop.
///
/// When the deadline elapses the loop hands back the last produced value rather than failing, so
/// the caller can inspect what the final attempt actually saw. A `last` of `None` means the
/// deadline elapsed before any attempt completed.
#[derive(Debug)]
pub struct PollOutcome<T> {
    /// The most recently produced value, satisfying or not.
    pub last: Option<T>,
    /// Whether the predicate accepted a produced value before the deadline.
    pub satisfied: bool,
    /// How many times the producer ran to completion.
    pub attempts: u32,
}

/// Repeatedly invoke `producer` until `predicate` accepts the produced value or the deadline
/// elapses.
///
/// Attempts are separated by a fixed `interval` sleep, with no jitter or backoff. The caller must
/// check [PollOutcome::satisfied]; a timeout is not an error here.
pub async fn poll_until<T, F, Fut, P>(
    mut producer: F,
    predicate: P,
    timeout: Duration,
    interval: Duration,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = T>,
    P: Fn(&T) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut last = None;
    let mut attempts = 0;

    while Instant::now() < deadline {
        let value = producer().await;
        attempts += 1;
        if predicate(&value) {
            return PollOutcome {
                last: Some(value),
                satisfied: true,
                attempts,
            };
        }
        log::trace!("Poll attempt {} unsatisfied", attempts);
        last = Some(value);
        tokio::time::sleep(interval).await;
    }

    PollOutcome {
        last,
        satisfied: false,
        attempts,
    }
}
