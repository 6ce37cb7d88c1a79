//! Tick counter types and the wrap-aware ordering key.

use core::cmp::Ordering;
use core::fmt;

/// Raw value of the time source.
///
/// A fixed-width unsigned counter that increases monotonically and wraps back
/// through zero after [`Tick::MAX`]. The wrap is a normal event, not an error.
pub type Tick = u32;

/// Point in time at which a task becomes due.
///
/// Deadlines are ordered by `(overflow, at)`: every deadline computed across a
/// wraparound of the counter sorts after every deadline that was not, whatever
/// the raw tick values are. Plain integer comparison would put a task due at
/// `tick:3` of the next epoch ahead of one due at `tick:4294967290` of the
/// current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Deadline {
    overflow: bool,
    at: Tick,
}

impl Deadline {
    /// Deadline `delay` ticks after `now`.
    ///
    /// The overflow flag is set when the addition wraps the counter.
    pub const fn after(now: Tick, delay: Tick) -> Self {
        let (at, overflow) = now.overflowing_add(delay);
        Self { overflow, at }
    }

    /// Deadline for the tick `now` in the current epoch.
    pub const fn current(now: Tick) -> Self {
        Self {
            overflow: false,
            at: now,
        }
    }

    pub const fn new(at: Tick, overflow: bool) -> Self {
        Self { overflow, at }
    }

    /// Raw due tick.
    pub const fn at(self) -> Tick {
        self.at
    }

    /// Whether the due tick lies in the next epoch of the counter.
    pub const fn overflow(self) -> bool {
        self.overflow
    }

    /// Moves the deadline `interval` ticks further.
    ///
    /// The overflow flag reflects only this addition: a deadline is always
    /// advanced from the current epoch.
    #[must_use]
    pub const fn advance(self, interval: Tick) -> Self {
        Self::after(self.at, interval)
    }

    /// Same deadline, reassigned to the current epoch.
    #[must_use]
    pub const fn rebased(self) -> Self {
        Self::current(self.at)
    }

    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }

    /// Whether the deadline has been reached at tick `now`.
    pub fn is_due(&self, now: Tick) -> bool {
        !self.is_after(&Self::current(now))
    }

    /// Ticks left from `now` until the deadline, zero once it is due.
    ///
    /// Deadlines in the next epoch count across the wrap; the result saturates
    /// at [`Tick::MAX`].
    pub fn remaining(&self, now: Tick) -> Tick {
        if !self.overflow {
            return self.at.saturating_sub(now);
        }
        let to_wrap = Tick::MAX - now;
        to_wrap.saturating_add(self.at).saturating_add(1)
    }
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> Ordering {
        self.overflow
            .cmp(&other.overflow)
            .then_with(|| self.at.cmp(&other.at))
    }
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.overflow {
            write!(f, "tick:{}+wrap", self.at)
        } else {
            write!(f, "tick:{}", self.at)
        }
    }
}
