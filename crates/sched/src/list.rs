//! Pending set: a sorted, singly-linked list of tasks stored in a slot array.
//!
//! ```text
//!   slots:  [0: task B, next=2] [1: free, next=3] [2: task C, next=-]
//!           [3: free, next=-]   [4: task A, next=0]
//!
//!   head ------> 4 -> 0 -> 2            (A <= B <= C by deadline)
//!   free_head -> 1 -> 3
//! ```
//!
//! Links are slot indices rather than pointers. A task is moved out of its
//! slot when it is popped or removed, and the slot goes back on the free list
//! for the next insertion.

use alloc::vec::Vec;

use crate::task::Task;

#[derive(Debug)]
struct Slot {
    task: Option<Task>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct TaskList {
    slots: Vec<Slot>,
    head: Option<usize>,
    free_head: Option<usize>,
    len: usize,
}

impl TaskList {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn peek(&self) -> Option<&Task> {
        self.head.and_then(|idx| self.slots[idx].task.as_ref())
    }

    /// Links `task` behind every task whose deadline is not after its own.
    ///
    /// Linear scan from the head: ascending order with FIFO among equal
    /// deadlines.
    pub(crate) fn insert(&mut self, task: Task) {
        let key = task.deadline();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            match &self.slots[idx].task {
                Some(queued) if !queued.deadline().is_after(&key) => {
                    prev = Some(idx);
                    cursor = self.slots[idx].next;
                }
                _ => break,
            }
        }

        let idx = self.alloc(task);
        self.slots[idx].next = cursor;
        match prev {
            Some(prev) => self.slots[prev].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.len += 1;
    }

    pub(crate) fn pop_front(&mut self) -> Option<Task> {
        let idx = self.head?;
        self.head = self.slots[idx].next;
        self.len -= 1;
        self.release(idx)
    }

    /// Unlinks and drops every task for which `keep` returns `false`.
    ///
    /// Returns the number of tasks removed.
    pub(crate) fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Task) -> bool,
    {
        let mut removed = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let next = self.slots[idx].next;
            let kept = self.slots[idx].task.as_ref().is_some_and(&mut keep);
            if kept {
                prev = Some(idx);
            } else {
                match prev {
                    Some(prev) => self.slots[prev].next = next,
                    None => self.head = next,
                }
                self.len -= 1;
                removed += 1;
                drop(self.release(idx));
            }
            cursor = next;
        }
        removed
    }

    /// Drops every task. Returns how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.len;
        self.slots.clear();
        self.head = None;
        self.free_head = None;
        self.len = 0;
        removed
    }

    pub(crate) fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Task),
    {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let slot = &mut self.slots[idx];
            if let Some(task) = slot.task.as_mut() {
                f(task);
            }
            cursor = slot.next;
        }
    }

    /// Detaches the leading run of tasks matching `pred` into a new list.
    pub(crate) fn split_front_while<F>(&mut self, mut pred: F) -> TaskList
    where
        F: FnMut(&Task) -> bool,
    {
        let mut front = TaskList::new();
        while self.peek().is_some_and(&mut pred) {
            if let Some(task) = self.pop_front() {
                front.insert(task);
            }
        }
        front
    }

    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn alloc(&mut self, task: Task) -> usize {
        let slot = Slot {
            task: Some(task),
            next: None,
        };
        match self.free_head {
            Some(idx) => {
                self.free_head = self.slots[idx].next;
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<Task> {
        let slot = &mut self.slots[idx];
        let task = slot.task.take();
        slot.next = self.free_head;
        self.free_head = Some(idx);
        task
    }

    /// Checks link integrity, ordering and free-list disjointness.
    #[cfg(test)]
    pub(crate) fn debug_validate(&self) {
        let mut seen = alloc::vec![false; self.slots.len()];
        let mut count = 0;
        let mut last = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            assert!(!seen[idx], "slot {idx} linked twice");
            seen[idx] = true;
            let task = self.slots[idx].task.as_ref();
            assert!(task.is_some(), "linked slot {idx} is empty");
            let deadline = task.map(Task::deadline);
            assert!(last <= deadline, "pending set out of order at slot {idx}");
            last = deadline;
            count += 1;
            cursor = self.slots[idx].next;
        }
        assert_eq!(count, self.len, "len disagrees with linked tasks");

        let mut cursor = self.free_head;
        while let Some(idx) = cursor {
            assert!(!seen[idx], "slot {idx} is both free and linked");
            assert!(self.slots[idx].task.is_none(), "free slot {idx} holds a task");
            seen[idx] = true;
            cursor = self.slots[idx].next;
        }
        assert!(seen.iter().all(|s| *s), "slot leaked from both lists");
    }
}

pub(crate) struct Iter<'a> {
    list: &'a TaskList,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let slot = &self.list.slots[idx];
        self.cursor = slot.next;
        slot.task.as_ref()
    }
}
