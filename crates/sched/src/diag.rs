//! Diagnostic views of the pending set.
//!
//! Nothing here feeds back into scheduling; it only reports what is queued.

use alloc::vec::Vec;
use core::fmt;

use crate::group::GroupId;
use crate::scheduler::Scheduler;
use crate::task::{Kind, Task};
use crate::tick::Deadline;

/// Snapshot of one pending task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TaskInfo {
    pub deadline: Deadline,
    pub group: Option<GroupId>,
    pub kind: Kind,
}

impl TaskInfo {
    pub(crate) fn of(task: &Task) -> Self {
        Self {
            deadline: task.deadline(),
            group: task.group(),
            kind: task.kind(),
        }
    }
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.deadline)?;
        match self.group {
            Some(group) => write!(f, "{group} ")?,
            None => f.write_str("group:- ")?,
        }
        match self.kind {
            Kind::Once => f.write_str("once"),
            Kind::Every { interval } => write!(f, "every {interval}"),
            Kind::Repeat {
                remaining,
                interval,
            } => write!(f, "repeat {remaining}x every {interval}"),
        }
    }
}

impl Scheduler {
    /// Pending tasks in dispatch order.
    pub fn snapshot(&self) -> Vec<TaskInfo> {
        self.overdue
            .iter()
            .chain(self.pending.iter())
            .map(TaskInfo::of)
            .collect()
    }

    /// Writes one line per pending task, in dispatch order.
    pub fn dump<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(
            out,
            "{}: {} pending, last tick:{}",
            self.config.name,
            self.len(),
            self.last_tick
        )?;
        for info in self.snapshot() {
            writeln!(out, "  {info}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.config.name)
            .field("last_tick", &self.last_tick)
            .field("next_group", &self.next_group)
            .field("tasks", &self.snapshot())
            .finish_non_exhaustive()
    }
}
