//! Task records and their run-once contract.

use alloc::boxed::Box;
use core::fmt;

use crate::group::GroupId;
use crate::scheduler::Scheduler;
use crate::tick::{Deadline, Tick};

/// Type-erased callback stored in a task.
///
/// The owning scheduler is passed in while the callback runs. The task has
/// already been detached from the pending set at that point, so the callback
/// may register new work, reschedule itself, or cancel groups.
pub type Callback = Box<dyn FnMut(&mut Scheduler) + 'static>;

/// Rescheduling behaviour of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kind {
    /// Runs once and is discarded.
    Once,
    /// Runs every `interval` ticks until cleared.
    Every { interval: Tick },
    /// Runs `remaining` more times, `interval` ticks apart.
    Repeat { remaining: u32, interval: Tick },
}

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// The task is finished and must be destroyed.
    Done,
    /// The task must go back into the pending set at its new deadline.
    Reschedule,
}

pub(crate) struct Task {
    deadline: Deadline,
    group: Option<GroupId>,
    kind: Kind,
    callback: Callback,
}

impl Task {
    pub(crate) fn new(deadline: Deadline, kind: Kind, callback: Callback) -> Self {
        Self {
            deadline,
            group: None,
            kind,
            callback,
        }
    }

    pub(crate) fn with_group(mut self, group: Option<GroupId>) -> Self {
        self.group = group;
        self
    }

    pub(crate) fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub(crate) fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }

    /// Moves a next-epoch deadline into the current epoch after a wrap.
    pub(crate) fn rebase(&mut self) {
        self.deadline = self.deadline.rebased();
    }

    /// Places a task that ran late during a wrap pass back into the current epoch.
    ///
    /// A deadline advanced across the wrap keeps its phase when it is still
    /// ahead of `now`; anything else restarts one interval after `now`.
    pub(crate) fn catch_up(&mut self, now: Tick) {
        let rebased = Some(self.deadline)
            .filter(|deadline| deadline.overflow())
            .map(Deadline::rebased)
            .filter(|deadline| !deadline.is_due(now));
        self.deadline = rebased.unwrap_or_else(|| Deadline::after(now, self.interval()));
    }

    fn interval(&self) -> Tick {
        match self.kind {
            Kind::Once => 0,
            Kind::Every { interval } | Kind::Repeat { interval, .. } => interval,
        }
    }

    /// Invokes the callback once and updates the rescheduling state.
    pub(crate) fn run_once(&mut self, scheduler: &mut Scheduler) -> Completion {
        match self.kind {
            Kind::Once => {
                (self.callback)(scheduler);
                Completion::Done
            }
            Kind::Every { interval } => {
                (self.callback)(scheduler);
                self.deadline = self.deadline.advance(interval);
                Completion::Reschedule
            }
            Kind::Repeat {
                remaining,
                interval,
            } => {
                let remaining = remaining.saturating_sub(1);
                self.kind = Kind::Repeat {
                    remaining,
                    interval,
                };
                (self.callback)(scheduler);
                self.deadline = self.deadline.advance(interval);
                if remaining == 0 {
                    Completion::Done
                } else {
                    Completion::Reschedule
                }
            }
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("deadline", &self.deadline)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
