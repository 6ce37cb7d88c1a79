//! Blinks a pretend LED on the millisecond scheduler.
//!
//! A heartbeat toggles every 250 ms, a burst group flashes three times, and a
//! watchdog clears everything after two seconds so that `run_loop` returns.

use std::cell::Cell;
use std::rc::Rc;

use coop_sched::Scheduler;
use coop_sched_posix::PosixPresets;

fn main() {
    let mut sched = Scheduler::millis();
    let led = Rc::new(Cell::new(false));

    let heartbeat = Rc::clone(&led);
    sched.every(250, move |sched| {
        heartbeat.set(!heartbeat.get());
        println!(
            "[{:>5} ms] led {}",
            sched.last_tick(),
            if heartbeat.get() { "on" } else { "off" }
        );
    });

    let burst = sched
        .group()
        .repeat_after(3, 100, 50, |sched| {
            println!("[{:>5} ms] burst", sched.last_tick());
        })
        .id();

    sched.timeout(1_000, move |sched| {
        let cancelled = sched.clear_group(burst);
        println!("[{:>5} ms] burst group done ({cancelled} left)", sched.last_tick());
    });

    sched.timeout(2_000, |sched| {
        let mut report = String::new();
        let _ = sched.dump(&mut report);
        print!("{report}");
        sched.clear();
    });

    sched.run_loop();
    println!("scheduler drained");
}
