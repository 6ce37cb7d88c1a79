//! Time source and delay collaborators.
//!
//! A [`Scheduler`](crate::Scheduler) never reads a global clock. It is handed a
//! [`TimeSource`] probe and a [`Delay`] primitive at construction, so that a
//! millisecond domain, a microsecond domain and a simulated clock in tests all
//! share the same engine.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::tick::Tick;

/// Nullary probe returning the current tick.
///
/// Values must increase monotonically between calls except for the single
/// wraparound through zero after [`Tick::MAX`].
pub trait TimeSource {
    fn now(&mut self) -> Tick;
}

impl<F> TimeSource for F
where
    F: FnMut() -> Tick,
{
    fn now(&mut self) -> Tick {
        self()
    }
}

/// Best-effort suspension of the caller for roughly `ticks` ticks.
pub trait Delay {
    fn delay(&mut self, ticks: Tick);
}

impl<F> Delay for F
where
    F: FnMut(Tick),
{
    fn delay(&mut self, ticks: Tick) {
        self(ticks)
    }
}

/// Simulated tick counter.
///
/// Clones share the same counter. [`ManualClock::source`] reads it and
/// [`ManualClock::delay`] advances it instead of sleeping, which makes
/// [`Scheduler::run_loop`](crate::Scheduler::run_loop) fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Rc<Cell<Tick>>,
}

impl ManualClock {
    pub fn new(start: Tick) -> Self {
        Self {
            ticks: Rc::new(Cell::new(start)),
        }
    }

    pub fn now(&self) -> Tick {
        self.ticks.get()
    }

    pub fn set(&self, ticks: Tick) {
        self.ticks.set(ticks);
    }

    /// Moves the counter forward, wrapping like a hardware counter.
    pub fn advance(&self, ticks: Tick) {
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }

    pub fn source(&self) -> impl TimeSource + 'static {
        let ticks = Rc::clone(&self.ticks);
        move || ticks.get()
    }

    pub fn delay(&self) -> impl Delay + 'static {
        let clock = self.clone();
        move |ticks: Tick| clock.advance(ticks)
    }
}
