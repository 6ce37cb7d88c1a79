//! # coop-sched
//!
//! A cooperative, single-threaded callback scheduler for resource-constrained
//! devices. Client code registers one-shot, periodic or bounded-repeat
//! callbacks against a monotonically increasing (but wrapping) tick counter;
//! a drain step runs everything that is due and reports how long the caller
//! may idle before the next callback.
//!
//! ## Module Overview
//! - [`tick`]      – Tick type and the wrap-aware [`Deadline`] ordering key.
//! - [`clock`]     – Injected time source and delay collaborators.
//! - [`task`]      – Task kinds and their run-once contract.
//! - [`scheduler`] – Registration, dispatch, wraparound handling, drain loop.
//! - [`group`]     – Group handles for bulk cancellation.
//! - [`config`]    – Scheduler configuration and builders.
//! - [`diag`]      – Diagnostic snapshots of the pending set.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use coop_sched::{ManualClock, Scheduler};
//!
//! let clock = ManualClock::new(0);
//! let mut sched = Scheduler::new(clock.source(), clock.delay());
//!
//! let fired = Rc::new(Cell::new(0));
//! let probe = Rc::clone(&fired);
//! sched.repeat(3, 10, move |_| probe.set(probe.get() + 1));
//!
//! sched.run_loop();
//! assert_eq!(fired.get(), 3);
//! assert_eq!(clock.now(), 30);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod diag;
pub mod error;
pub mod group;
mod list;
pub mod scheduler;
pub mod task;
pub mod tick;

pub use clock::{Delay, ManualClock, TimeSource};
pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use diag::TaskInfo;
pub use error::BuildError;
pub use group::{Group, GroupId};
pub use scheduler::{Scheduler, SchedulerBuilder};
pub use task::{Callback, Kind};
pub use tick::{Deadline, Tick};

#[cfg(test)]
mod tests;
