//! Registration, dispatch and the drain loop.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::clock::{Delay, TimeSource};
use crate::config::SchedulerConfig;
use crate::error::BuildError;
use crate::group::{Group, GroupId};
use crate::list::TaskList;
use crate::task::{Callback, Completion, Kind, Task};
use crate::tick::{Deadline, Tick};

/// Record currently running its callback, detached from the pending set.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    group: Option<GroupId>,
    cancelled: bool,
}

/// Cooperative callback scheduler for one timing domain.
///
/// The scheduler owns every pending task. [`Scheduler::tick`] runs all tasks
/// that are due and returns a sleep hint; [`Scheduler::run_loop`] repeats that
/// until nothing is left.
///
/// Callbacks receive the scheduler and may register or cancel work while they
/// run. There is no locking: everything happens on the caller's thread, and
/// only [`Scheduler::run_loop`] ever suspends, between drain steps.
pub struct Scheduler {
    pub(crate) config: SchedulerConfig,
    time: Box<dyn TimeSource>,
    delay: Box<dyn Delay>,
    pub(crate) pending: TaskList,
    /// Tasks of the previous counter epoch awaiting dispatch during a wrap.
    pub(crate) overdue: TaskList,
    pub(crate) last_tick: Tick,
    pub(crate) next_group: GroupId,
    in_flight: Vec<InFlight>,
}

/// Builder assembling a [`Scheduler`] from its collaborators.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    time: Option<Box<dyn TimeSource>>,
    delay: Option<Box<dyn Delay>>,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            time: None,
            delay: None,
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn time_source<T>(mut self, time: T) -> Self
    where
        T: TimeSource + 'static,
    {
        self.time = Some(Box::new(time));
        self
    }

    pub fn delay<D>(mut self, delay: D) -> Self
    where
        D: Delay + 'static,
    {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn build(self) -> Result<Scheduler, BuildError> {
        let time = self
            .time
            .ok_or(BuildError::MissingTimeSource(self.config.name))?;
        let delay = self.delay.ok_or(BuildError::MissingDelay(self.config.name))?;
        Ok(Scheduler::from_parts(self.config, time, delay))
    }
}

impl Scheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new<T, D>(time: T, delay: D) -> Self
    where
        T: TimeSource + 'static,
        D: Delay + 'static,
    {
        Self::from_collaborators(SchedulerConfig::default(), time, delay)
    }

    /// Creates a scheduler with an explicit configuration.
    pub fn from_collaborators<T, D>(config: SchedulerConfig, time: T, delay: D) -> Self
    where
        T: TimeSource + 'static,
        D: Delay + 'static,
    {
        Self::from_parts(config, Box::new(time), Box::new(delay))
    }

    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(config)
    }

    fn from_parts(
        config: SchedulerConfig,
        mut time: Box<dyn TimeSource>,
        delay: Box<dyn Delay>,
    ) -> Self {
        let last_tick = time.now();
        log::debug!("{}: scheduler created at tick:{}", config.name, last_tick);
        Self {
            pending: TaskList::with_capacity(config.capacity),
            overdue: TaskList::new(),
            config,
            time,
            delay,
            last_tick,
            next_group: GroupId::FIRST,
            in_flight: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Tick observed by the most recent dispatch step.
    pub fn last_tick(&self) -> Tick {
        self.last_tick
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.len() + self.overdue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.overdue.is_empty()
    }

    /// Runs `callback` once, `delay` ticks from now.
    pub fn timeout<F>(&mut self, delay: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.register(None, delay, Kind::Once, Box::new(callback));
        self
    }

    /// Runs `callback` every `interval` ticks, first after one interval.
    ///
    /// A periodic task is only removed by [`Scheduler::clear`] or by clearing
    /// its group.
    pub fn every<F>(&mut self, interval: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.every_after(interval, interval, callback)
    }

    /// Runs `callback` after `first_delay` ticks, then every `interval` ticks.
    ///
    /// An interval of 0 is treated as 1 tick.
    pub fn every_after<F>(&mut self, first_delay: Tick, interval: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.register(None, first_delay, Kind::Every { interval }, Box::new(callback));
        self
    }

    /// Runs `callback` `times` times, `interval` ticks apart.
    ///
    /// `times == 0` registers nothing.
    pub fn repeat<F>(&mut self, times: u32, interval: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.repeat_after(times, interval, interval, callback)
    }

    /// Like [`Scheduler::repeat`], with a separate delay before the first run.
    pub fn repeat_after<F>(
        &mut self,
        times: u32,
        first_delay: Tick,
        interval: Tick,
        callback: F,
    ) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.register(
            None,
            first_delay,
            Kind::Repeat {
                remaining: times,
                interval,
            },
            Box::new(callback),
        );
        self
    }

    /// Allocates a new group id and returns a handle for it.
    pub fn group(&mut self) -> Group<'_> {
        let id = self.next_group;
        self.next_group = id.next();
        log::trace!("{}: allocated {}", self.config.name, id);
        Group::new(self, id)
    }

    /// Handle for a group allocated earlier by [`Scheduler::group`].
    pub fn in_group(&mut self, id: GroupId) -> Group<'_> {
        Group::new(self, id)
    }

    pub(crate) fn register(
        &mut self,
        group: Option<GroupId>,
        first_delay: Tick,
        kind: Kind,
        callback: Callback,
    ) {
        let kind = match kind {
            Kind::Repeat { remaining: 0, .. } => return,
            Kind::Every { interval: 0 } => {
                log::warn!(
                    "{}: periodic interval of 0 ticks raised to 1",
                    self.config.name
                );
                Kind::Every { interval: 1 }
            }
            kind => kind,
        };

        let now = self.time.now();
        let mut deadline = Deadline::after(now, first_delay);
        if now < self.last_tick {
            // The counter wrapped and no dispatch has seen it yet, so `now`
            // already belongs to the next epoch. A delay that wraps once more
            // cannot be expressed with a single flag and is held back to the
            // last tick of that epoch.
            deadline = if deadline.overflow() {
                Deadline::new(Tick::MAX, true)
            } else {
                Deadline::new(deadline.at(), true)
            };
        }

        log::trace!(
            "{}: registered {:?} due {} ({:?})",
            self.config.name,
            kind,
            deadline,
            group
        );
        self.add_task(Task::new(deadline, kind, callback).with_group(group));
    }

    pub(crate) fn add_task(&mut self, task: Task) {
        self.pending.insert(task);
    }

    /// Reads the time source and runs every task that is due.
    ///
    /// Returns the number of ticks until the next pending task, or 0 once
    /// nothing is pending.
    pub fn tick(&mut self) -> Tick {
        let now = self.time.now();
        self.tick_at(now)
    }

    /// Runs every task due at the explicitly supplied tick `now`.
    ///
    /// A `now` below the previously observed tick is taken as a wraparound
    /// of the counter: tasks scheduled for the next epoch move into the
    /// current one, and tasks still waiting from the previous epoch are all
    /// overdue and run immediately, in their pending order.
    pub fn tick_at(&mut self, now: Tick) -> Tick {
        if now < self.last_tick {
            log::debug!(
                "{}: tick counter wrapped (tick:{} -> tick:{}), {} pending",
                self.config.name,
                self.last_tick,
                now,
                self.len()
            );
            self.last_tick = now;
            self.reclassify(now);
        }
        self.last_tick = now;

        while self
            .pending
            .peek()
            .is_some_and(|task| task.deadline().is_due(now))
        {
            let Some(task) = self.pending.pop_front() else {
                break;
            };
            if let Some(task) = self.dispatch(task) {
                self.pending.insert(task);
            }
        }

        self.pending
            .peek()
            .map_or(0, |task| task.deadline().remaining(now))
    }

    /// Blocks, alternating dispatch steps and delays, until nothing is pending.
    ///
    /// This never returns while a periodic task remains registered: like a
    /// firmware main loop, it runs for as long as there is work.
    pub fn run_loop(&mut self) {
        while !self.is_empty() {
            let wait = self.tick();
            if wait != 0 {
                self.delay.delay(wait);
            }
        }
    }

    /// Drops every pending task, grouped or not. Returns how many were removed.
    ///
    /// Called from a callback, this also stops the running task from being
    /// rescheduled.
    pub fn clear(&mut self) -> usize {
        for running in &mut self.in_flight {
            running.cancelled = true;
        }
        let removed = self.pending.clear() + self.overdue.clear();
        log::debug!("{}: cleared {} tasks", self.config.name, removed);
        removed
    }

    /// Drops every pending task tagged with `id`. Returns how many were removed.
    pub fn clear_group(&mut self, id: GroupId) -> usize {
        for running in &mut self.in_flight {
            if running.group == Some(id) {
                running.cancelled = true;
            }
        }
        let keep = |task: &Task| task.group() != Some(id);
        let removed = self.pending.retain(keep) + self.overdue.retain(keep);
        log::debug!("{}: cleared {} tasks of {}", self.config.name, removed, id);
        removed
    }

    /// Runs one detached task. Returns it if it must go back into a pending set.
    fn dispatch(&mut self, mut task: Task) -> Option<Task> {
        log::trace!(
            "{}: running {:?} due {}",
            self.config.name,
            task.kind(),
            task.deadline()
        );

        self.in_flight.push(InFlight {
            group: task.group(),
            cancelled: false,
        });
        let completion = task.run_once(self);
        let cancelled = self.in_flight.pop().is_some_and(|running| running.cancelled);

        match completion {
            Completion::Reschedule if !cancelled => Some(task),
            _ => None,
        }
    }

    /// Handles a wraparound of the counter.
    ///
    /// Unflagged tasks belong to the epoch that just ended and are moved to
    /// the overdue set; flagged tasks are rebased into the new epoch. Each
    /// overdue task is then dispatched once, in order, and a rescheduled one
    /// rejoins the pending set in the current epoch.
    fn reclassify(&mut self, now: Tick) {
        let mut stale = self
            .pending
            .split_front_while(|task| !task.deadline().overflow());
        while let Some(task) = stale.pop_front() {
            self.overdue.insert(task);
        }
        self.pending.for_each_mut(Task::rebase);

        while let Some(task) = self.overdue.pop_front() {
            if let Some(mut task) = self.dispatch(task) {
                task.catch_up(now);
                self.pending.insert(task);
            }
        }
    }
}
