use crate::subscription::{SubscriptionId, SubscriptionSource};
use futures::stream::BoxStream;
use std::time::{Duration, Instant};
use tokio::time::{Interval, MissedTickBehavior};

/// A repeating timer that fires at a fixed interval.
///
/// Each tick emits the current [`Instant`]. `id` distinguishes timers of the
/// same type, so every dropdown instance can own its own spinner timer.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use sift_core::{subscribe, Every};
///
/// let sub = subscribe(Every::new(Duration::from_millis(80), instance_id))
///     .map(|_| Message::SpinnerTick);
/// ```
pub struct Every {
    /// The interval between ticks.
    pub interval: Duration,
    /// Discriminant separating this timer from others.
    pub id: u64,
}

impl Every {
    /// Create a new repeating timer with the given interval and identifier.
    pub fn new(interval: Duration, id: u64) -> Self {
        Self { interval, id }
    }
}

impl SubscriptionSource for Every {
    type Output = Instant;

    fn id(&self) -> SubscriptionId {
        SubscriptionId::new::<Self>(self.id)
    }

    fn stream(self) -> BoxStream<'static, Instant> {
        let period = self.interval;
        // The interval is built on first poll so declaring the subscription
        // does not need a running reactor.
        let stream = futures::stream::unfold(None, move |state: Option<Interval>| async move {
            let mut interval = state.unwrap_or_else(|| {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                interval
            });
            let tick = interval.tick().await;
            Some((tick.into_std(), Some(interval)))
        });
        Box::pin(stream)
    }
}
