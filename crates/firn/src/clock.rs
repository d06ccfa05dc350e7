use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Firn epoch: Wednesday, January 1, 2020 00:00:00 UTC
pub const FIRN_EPOCH: Duration = Duration::from_secs(1_577_836_800);

/// A source of wall-clock time with sub-second precision.
///
/// The reading is the time elapsed since the Unix epoch. Whole seconds
/// (`Duration::as_secs`) feed the time part of generated ids; the
/// sub-second remainder only participates in detecting backward clock
/// motion and the partial second a generator was constructed in.
///
/// Generators take their clock by value, so tests can substitute a
/// manually stepped implementation.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use firn::Clock;
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> Duration {
///         Duration::from_millis(1_234)
///     }
/// }
///
/// assert_eq!(FixedClock.now(), Duration::from_millis(1_234));
/// ```
pub trait Clock {
    /// Returns the current time since the Unix epoch.
    fn now(&self) -> Duration;
}

/// The real system clock.
///
/// A system time earlier than 1970 degrades to `Duration::ZERO` rather
/// than panicking; the generator then reports the condition as
/// [`Error::ClockBeforeEpoch`](crate::Error::ClockBeforeEpoch).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }
}
