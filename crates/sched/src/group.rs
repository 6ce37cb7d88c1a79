//! Task groups for bulk cancellation.

use alloc::boxed::Box;
use core::fmt;
use core::num::NonZeroU32;

use crate::scheduler::Scheduler;
use crate::task::Kind;
use crate::tick::Tick;

/// Tag shared by tasks registered through the same [`Group`].
///
/// Ids start at 1 and are handed out in increasing order by
/// [`Scheduler::group`]; they are never reused by a scheduler. Ungrouped tasks
/// carry no id at all, so no cancellation request can match them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupId(NonZeroU32);

impl GroupId {
    pub(crate) const FIRST: Self = Self(NonZeroU32::MIN);

    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The id allocated after this one. Saturates at `u32::MAX`.
    pub(crate) fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group:{}", self.0)
    }
}

/// Handle that stamps a group id on every task it registers.
///
/// The handle borrows its scheduler and owns none of the tasks. Keep the
/// [`GroupId`] to reach the group again later through
/// [`Scheduler::in_group`] or [`Scheduler::clear_group`].
pub struct Group<'s> {
    scheduler: &'s mut Scheduler,
    id: GroupId,
}

impl<'s> Group<'s> {
    pub(crate) fn new(scheduler: &'s mut Scheduler, id: GroupId) -> Self {
        Self { scheduler, id }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Runs `callback` once, `delay` ticks from now.
    pub fn timeout<F>(&mut self, delay: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.scheduler
            .register(Some(self.id), delay, Kind::Once, Box::new(callback));
        self
    }

    /// Runs `callback` every `interval` ticks, first after one interval.
    pub fn every<F>(&mut self, interval: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.every_after(interval, interval, callback)
    }

    /// Runs `callback` after `first_delay` ticks, then every `interval` ticks.
    pub fn every_after<F>(&mut self, first_delay: Tick, interval: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.scheduler.register(
            Some(self.id),
            first_delay,
            Kind::Every { interval },
            Box::new(callback),
        );
        self
    }

    /// Runs `callback` `times` times, `interval` ticks apart.
    pub fn repeat<F>(&mut self, times: u32, interval: Tick, callback: F) -> &mut Self
    where
        F: FnMut(&mut Scheduler) + 'static,
    {
        self.repeat_after(times, interval, interval, callback)
    }

    /// Like [`Group::repeat`], with a separate delay before the first run.
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
        self.scheduler.register(
            Some(self.id),
            first_delay,
            Kind::Repeat {
                remaining: times,
                interval,
            },
            Box::new(callback),
        );
        self
    }

    /// Cancels every pending task of this group. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        self.scheduler.clear_group(self.id)
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group").field("id", &self.id).finish()
    }
}
