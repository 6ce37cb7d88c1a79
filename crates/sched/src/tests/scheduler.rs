use std::cell::RefCell;
use std::rc::Rc;

use super::{assert_sorted, harness, Counter};
use crate::tick::{Deadline, Tick};

#[test]
fn new_scheduler_is_empty() {
    let (_clock, mut sched) = harness(0);
    assert!(sched.is_empty());
    assert_eq!(sched.len(), 0);
    assert_eq!(sched.tick(), 0);
}

#[test]
fn tick_removes_tasks_as_they_fall_due() {
    let (clock, mut sched) = harness(0);
    for delay in 1..=4 {
        sched.timeout(delay, |_| {});
    }
    assert_eq!(sched.len(), 4);

    assert_eq!(sched.tick(), 1);
    assert_eq!(sched.len(), 4);

    for (now, left) in [(1, 3), (2, 2), (3, 1), (4, 0)] {
        clock.set(now);
        sched.tick();
        assert_eq!(sched.len(), left);
    }
}

#[test]
fn one_tick_drains_everything_due() {
    let (clock, mut sched) = harness(0);
    for delay in 1..=4 {
        sched.timeout(delay, |_| {});
    }

    clock.set(4);
    assert_eq!(sched.tick(), 0);
    assert!(sched.is_empty());
}

#[test]
fn timeout_fires_once_at_its_deadline() {
    let (clock, mut sched) = harness(0);
    let done = Counter::default();
    sched.timeout(5, done.hook());

    clock.set(4);
    assert_eq!(sched.tick(), 1);
    assert_eq!(done.get(), 0);
    assert_eq!(sched.len(), 1);

    clock.set(5);
    sched.tick();
    assert_eq!(done.get(), 1);
    assert!(sched.is_empty());

    clock.set(9);
    sched.tick();
    assert_eq!(done.get(), 1);
}

#[test]
fn every_fires_once_per_interval() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.every(2, counter.hook());
    assert_eq!(sched.len(), 1);

    for now in 0..10 {
        clock.set(now);
        sched.tick();
        assert_eq!(counter.get(), now / 2);
        assert_eq!(sched.len(), 1);
    }
}

#[test]
fn every_with_zero_first_delay_fires_immediately() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.every_after(0, 1, counter.hook());
    assert_eq!(sched.len(), 1);

    for now in 0..10 {
        clock.set(now);
        sched.tick();
        assert_eq!(counter.get(), now + 1);
    }
    assert_eq!(sched.len(), 1);
}

#[test]
fn every_catches_up_after_a_long_gap() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.every(3, counter.hook());

    clock.set(10);
    assert_eq!(sched.tick(), 2);
    assert_eq!(counter.get(), 3);
    assert_eq!(sched.snapshot()[0].deadline, Deadline::current(12));
}

#[test]
fn every_with_zero_interval_is_raised_to_one_tick() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.every(0, counter.hook());

    // First run at tick 0, then one per tick.
    clock.set(3);
    assert_eq!(sched.tick(), 1);
    assert_eq!(counter.get(), 4);
}

#[test]
fn repeat_runs_until_exhausted_under_run_loop() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.repeat(10, 1, counter.hook());
    assert_eq!(sched.len(), 1);

    sched.run_loop();

    assert!(sched.is_empty());
    assert_eq!(counter.get(), 10);
    assert_eq!(clock.now(), 10);
}

#[test]
fn repeat_with_zero_first_delay_steps_one_per_tick() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.repeat_after(10, 0, 1, counter.hook());
    assert_eq!(sched.len(), 1);

    for now in 0..10 {
        assert_eq!(counter.get(), now);
        clock.set(now);
        sched.tick();
    }
    assert!(sched.is_empty());
    assert_eq!(counter.get(), 10);
}

#[test]
fn repeat_zero_times_registers_nothing() {
    let (_clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched
        .repeat(0, 1, counter.hook())
        .repeat_after(0, 0, 1, counter.hook());

    assert!(sched.is_empty());
    sched.run_loop();
    assert_eq!(counter.get(), 0);
}

#[test]
fn repeat_with_zero_interval_fires_all_runs_in_one_tick() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.repeat_after(4, 2, 0, counter.hook());

    clock.set(2);
    assert_eq!(sched.tick(), 0);
    assert_eq!(counter.get(), 4);
}

#[test]
fn run_loop_sleeps_for_the_hint() {
    let (clock, mut sched) = harness(0);
    let seen = Rc::new(RefCell::new(Vec::new()));
    for delay in [30, 10, 20] {
        let seen = Rc::clone(&seen);
        let clock = clock.clone();
        sched.timeout(delay, move |_| seen.borrow_mut().push(clock.now()));
    }

    sched.run_loop();

    assert_eq!(*seen.borrow(), [10, 20, 30]);
}

#[test]
fn equal_deadlines_run_in_registration_order() {
    let (clock, mut sched) = harness(0);
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in 0..5u32 {
        let order = Rc::clone(&order);
        sched.timeout(7, move |_| order.borrow_mut().push(tag));
    }
    let early = Rc::clone(&order);
    sched.timeout(3, move |_| early.borrow_mut().push(99));
    assert_sorted(&sched);

    clock.set(7);
    sched.tick();
    assert_eq!(*order.borrow(), [99, 0, 1, 2, 3, 4]);
}

#[test]
fn insertions_stay_sorted() {
    let (clock, mut sched) = harness(Tick::MAX - 20);
    for delay in [40, 3, 17, 25, 3, 0, 21, 100, 19] {
        sched.timeout(delay, |_| {});
        assert_sorted(&sched);
    }

    let snapshot = sched.snapshot();
    assert!(snapshot.windows(2).all(|w| w[0].deadline <= w[1].deadline));
    // The four deadlines past the end of the counter come last.
    assert!(snapshot[5..].iter().all(|info| info.deadline.overflow()));

    clock.set(Tick::MAX);
    sched.tick();
    assert_eq!(sched.len(), 4);
    assert_sorted(&sched);
}

#[test]
fn tick_at_uses_the_supplied_tick() {
    let (_clock, mut sched) = harness(0);
    let counter = Counter::default();
    sched.timeout(5, counter.hook());

    assert_eq!(sched.tick_at(3), 2);
    assert_eq!(counter.get(), 0);
    assert_eq!(sched.tick_at(5), 0);
    assert_eq!(counter.get(), 1);
    assert_eq!(sched.last_tick(), 5);
}

#[test]
fn callback_can_reschedule_itself() {
    fn chain(sched: &mut crate::Scheduler, hits: Rc<RefCell<Vec<u32>>>, left: u32) {
        sched.timeout(2, move |sched| {
            hits.borrow_mut().push(left);
            if left > 1 {
                chain(sched, Rc::clone(&hits), left - 1);
            }
        });
    }

    let (clock, mut sched) = harness(0);
    let hits = Rc::new(RefCell::new(Vec::new()));
    chain(&mut sched, Rc::clone(&hits), 3);

    sched.run_loop();
    assert_eq!(*hits.borrow(), [3, 2, 1]);
    assert_eq!(clock.now(), 6);
}

#[test]
fn task_registered_from_callback_runs_in_same_drain_when_due() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    let inner = counter.clone();
    sched.timeout(1, move |sched| {
        sched.timeout(0, inner.hook());
    });

    clock.set(1);
    assert_eq!(sched.tick(), 0);
    assert_eq!(counter.get(), 1);
}

#[test]
fn clear_empties_everything() {
    let (_clock, mut sched) = harness(0);
    sched
        .timeout(1, |_| {})
        .every(2, |_| {})
        .repeat(3, 4, |_| {});
    sched.group().timeout(5, |_| {});
    assert_eq!(sched.len(), 4);

    assert_eq!(sched.clear(), 4);
    assert!(sched.is_empty());
    assert_eq!(sched.clear(), 0);
}

#[test]
fn clear_from_a_periodic_callback_stops_it() {
    let (clock, mut sched) = harness(0);
    let counter = Counter::default();
    let mut hook = counter.hook();
    sched.every(1, move |sched| {
        hook(sched);
        sched.clear();
    });
    sched.timeout(10, |_| {});

    clock.set(1);
    sched.tick();
    assert!(sched.is_empty());

    clock.set(2);
    sched.tick();
    assert_eq!(counter.get(), 1);
}

#[test]
fn dropping_the_scheduler_drops_pending_callbacks() {
    let (_clock, mut sched) = harness(0);
    let token = Rc::new(());
    let held = Rc::clone(&token);
    sched.every(1, move |_| {
        let _ = &held;
    });
    assert_eq!(Rc::strong_count(&token), 2);

    drop(sched);
    assert_eq!(Rc::strong_count(&token), 1);
}
