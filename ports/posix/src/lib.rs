//! Hosted port of `coop-sched`.
//!
//! Supplies the collaborators a scheduler needs on a POSIX host: wrapping
//! millisecond and microsecond counters, a sleeping delay and a spinning
//! delay, plus the two ready-made timing domains.
//!
//! ```no_run
//! use coop_sched::Scheduler;
//! use coop_sched_posix::PosixPresets;
//!
//! let mut sched = Scheduler::millis();
//! sched.every(500, |_| println!("blink"));
//! sched.run_loop();
//! ```

pub mod time;

use coop_sched::{Scheduler, SchedulerConfig};

pub use time::{
    uptime_micros, uptime_millis, MicrosClock, MillisClock, SleepDelay, SpinDelay,
};

/// Scheduler bound to the millisecond counter, idling with `thread::sleep`.
pub fn millis() -> Scheduler {
    domain("millis", MillisClock::new(), SleepDelay)
}

/// Scheduler bound to the microsecond counter, idling with a spin/sleep delay.
pub fn micros() -> Scheduler {
    domain("micros", MicrosClock::new(), SpinDelay)
}

fn domain<T, D>(name: &'static str, time: T, delay: D) -> Scheduler
where
    T: coop_sched::TimeSource + 'static,
    D: coop_sched::Delay + 'static,
{
    log::debug!("posix: creating {name} scheduler");
    let config = SchedulerConfig::builder().name(name).build();
    Scheduler::from_collaborators(config, time, delay)
}

/// Construction presets as associated functions of [`Scheduler`].
pub trait PosixPresets {
    fn millis() -> Self;
    fn micros() -> Self;
}

impl PosixPresets for Scheduler {
    fn millis() -> Self {
        millis()
    }

    fn micros() -> Self {
        micros()
    }
}
