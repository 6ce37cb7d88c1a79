//! Clock sources and delays for hosted targets.
//!
//! Counters are measured from a process-wide origin taken the first time any
//! clock is read, and truncated to [`Tick`] so that they wrap exactly like the
//! free-running millisecond and microsecond counters of a microcontroller.

use std::thread;
use std::time::{Duration, Instant};

use coop_sched::{Delay, Tick, TimeSource};
use once_cell::sync::Lazy;

/// Waits shorter than this are spun rather than slept.
const SPIN_THRESHOLD_US: Tick = 2_000;

static ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// Milliseconds since the process origin, wrapping at `Tick::MAX`.
pub fn uptime_millis() -> Tick {
    ORIGIN.elapsed().as_millis() as Tick
}

/// Microseconds since the process origin, wrapping at `Tick::MAX`.
///
/// A 32-bit microsecond counter wraps roughly every 71.6 minutes.
pub fn uptime_micros() -> Tick {
    ORIGIN.elapsed().as_micros() as Tick
}

/// Millisecond time source.
///
/// The offset is added to every reading; starting close to `Tick::MAX` lets
/// a host run observe a wraparound within seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MillisClock {
    offset: Tick,
}

impl MillisClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset: Tick) -> Self {
        Self { offset }
    }
}

impl TimeSource for MillisClock {
    fn now(&mut self) -> Tick {
        uptime_millis().wrapping_add(self.offset)
    }
}

/// Microsecond time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrosClock {
    offset: Tick,
}

impl MicrosClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(offset: Tick) -> Self {
        Self { offset }
    }
}

impl TimeSource for MicrosClock {
    fn now(&mut self) -> Tick {
        uptime_micros().wrapping_add(self.offset)
    }
}

/// Coarse delay: sleeps the thread for `ticks` milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepDelay;

impl Delay for SleepDelay {
    fn delay(&mut self, ticks: Tick) {
        thread::sleep(Duration::from_millis(u64::from(ticks)));
    }
}

/// Fine delay for microsecond ticks.
///
/// Short waits busy-spin on the monotonic clock because the OS sleep
/// granularity is far coarser than a few microseconds; long waits sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn delay(&mut self, ticks: Tick) {
        let wait = Duration::from_micros(u64::from(ticks));
        if ticks >= SPIN_THRESHOLD_US {
            thread::sleep(wait);
            return;
        }
        let start = Instant::now();
        while start.elapsed() < wait {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clocks_advance() {
        let mut millis = MillisClock::new();
        let mut micros = MicrosClock::new();
        let (ms, us) = (millis.now(), micros.now());

        thread::sleep(Duration::from_millis(5));

        assert!(millis.now().wrapping_sub(ms) >= 5);
        assert!(micros.now().wrapping_sub(us) >= 5_000);
    }

    #[test]
    fn offset_shifts_readings() {
        let mut clock = MillisClock::with_offset(Tick::MAX);
        let plain = uptime_millis();
        let shifted = clock.now();
        // Adding MAX is subtracting one, modulo the counter width.
        assert!(shifted.wrapping_add(1).wrapping_sub(plain) < 1_000);
    }

    #[test]
    fn spin_delay_waits_at_least_the_requested_time() {
        let start = Instant::now();
        SpinDelay.delay(300);
        assert!(start.elapsed() >= Duration::from_micros(300));
    }

    #[test]
    fn sleep_delay_waits_at_least_the_requested_time() {
        let start = Instant::now();
        SleepDelay.delay(3);
        assert!(start.elapsed() >= Duration::from_millis(3));
    }
}
