use std::cell::Cell;
use std::rc::Rc;

use crate::clock::ManualClock;
use crate::scheduler::Scheduler;

mod scheduler;

fn harness(start: u32) -> (ManualClock, Scheduler) {
    let clock = ManualClock::new(start);
    let sched = Scheduler::new(clock.source(), clock.delay());
    (clock, sched)
}

#[derive(Clone, Default)]
struct Counter(Rc<Cell<u32>>);

impl Counter {
    fn get(&self) -> u32 {
        self.0.get()
    }

    fn hook(&self) -> impl FnMut(&mut Scheduler) + 'static {
        let hits = Rc::clone(&self.0);
        move |_| hits.set(hits.get() + 1)
    }
}

fn assert_sorted(sched: &Scheduler) {
    sched.pending.debug_validate();
    sched.overdue.debug_validate();
}
