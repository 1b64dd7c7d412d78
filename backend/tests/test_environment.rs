//! Scheduling environment tests
//!
//! Covers timer ordering, the same-day tie-break, cancellation of timers and
//! processes, and staff queueing.

use rebuild_funding_core::sim::{race, Race, StaffPool};
use rebuild_funding_core::Simulation;
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Timers
// ============================================================================

#[test]
fn test_timers_fire_in_time_order() {
    let mut sim = Simulation::new();
    let fired = Rc::new(RefCell::new(Vec::new()));

    for delay in [5, 1, 3] {
        let env = sim.env().clone();
        let fired = Rc::clone(&fired);
        sim.spawn(async move {
            let at = env.timeout(delay).await;
            fired.borrow_mut().push(at);
        })
        .unwrap();
    }

    assert_eq!(sim.run(), 5);
    assert_eq!(*fired.borrow(), vec![1, 3, 5]);
}

#[test]
fn test_same_day_timers_fire_in_scheduling_order() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let mut process = sim
        .spawn(async move {
            let early = env.timeout(5);
            let late = env.timeout(5);
            // `late` is polled first, but `early` was scheduled first
            match race(late, early).await {
                Race::First(..) => "late",
                Race::Second(..) => "early",
            }
        })
        .unwrap();

    sim.run();
    assert_eq!(process.try_result(), Some("early"));
}

#[test]
fn test_race_loser_can_be_cancelled() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let mut process = sim
        .spawn(async move {
            match race(env.timeout(10), env.timeout(3)).await {
                Race::First(..) => None,
                Race::Second(at, slow) => {
                    slow.cancel();
                    Some(at)
                }
            }
        })
        .unwrap();

    assert_eq!(sim.run(), 3, "cancelled timer must not extend the run");
    assert_eq!(process.try_result(), Some(Some(3)));
}

#[test]
fn test_timer_created_before_time_advances_is_relative_to_creation() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let mut process = sim
        .spawn(async move {
            let deadline = env.timeout(8);
            env.timeout(3).await;
            deadline.await
        })
        .unwrap();

    assert_eq!(sim.run(), 8);
    assert_eq!(process.try_result(), Some(8));
}

// ============================================================================
// Processes
// ============================================================================

#[test]
fn test_awaiting_process_returns_its_result() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let mut outer = sim
        .spawn(async move {
            let inner_env = env.clone();
            let inner = env
                .process(async move {
                    inner_env.timeout(4).await;
                    42
                })
                .unwrap();
            let value = inner.await;
            (value, env.now())
        })
        .unwrap();

    sim.run();
    assert_eq!(outer.try_result(), Some((42, 4)));
}

#[test]
fn test_interrupted_process_never_resumes() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();
    let resumed = Rc::new(RefCell::new(false));

    let flag = Rc::clone(&resumed);
    sim.spawn(async move {
        let inner_env = env.clone();
        let inner = env
            .process(async move {
                inner_env.timeout(10).await;
                *flag.borrow_mut() = true;
            })
            .unwrap();
        env.timeout(2).await;
        inner.interrupt().await;
    })
    .unwrap();

    assert_eq!(sim.run(), 2, "interrupted process's timer must be dropped");
    assert!(!*resumed.borrow());
}

#[test]
fn test_interrupt_returns_after_process_is_dropped() {
    struct SetOnDrop(Rc<RefCell<Vec<&'static str>>>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.borrow_mut().push("inner dropped");
        }
    }

    let mut sim = Simulation::new();
    let env = sim.env().clone();
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    sim.spawn(async move {
        let inner_env = env.clone();
        let guard = SetOnDrop(Rc::clone(&log));
        let inner = env
            .process(async move {
                let _guard = guard;
                inner_env.timeout(10).await;
            })
            .unwrap();
        env.timeout(2).await;
        inner.interrupt().await;
        log.borrow_mut().push("interrupt returned");
        assert_eq!(env.now(), 2);
    })
    .unwrap();

    assert_eq!(sim.run(), 2);
    assert_eq!(*order.borrow(), vec!["inner dropped", "interrupt returned"]);
}

#[test]
fn test_interrupting_finished_process_returns_at_once() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let mut outer = sim
        .spawn(async move {
            let inner = env.process(async { 7 }).unwrap();
            env.timeout(1).await;
            inner.interrupt().await;
            env.now()
        })
        .unwrap();

    sim.run();
    assert_eq!(outer.try_result(), Some(1));
}

#[test]
fn test_run_until_leaves_later_timers_pending() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let mut process = sim
        .spawn(async move {
            env.timeout(3).await;
            env.timeout(30).await
        })
        .unwrap();

    assert_eq!(sim.run_until(10), 3);
    assert_eq!(sim.env().pending_timers(), 1);
    assert!(process.try_result().is_none());

    assert_eq!(sim.run(), 33);
    assert_eq!(process.try_result(), Some(33));
}

// ============================================================================
// Staff
// ============================================================================

#[test]
fn test_cancelled_staff_request_leaves_queue() {
    let mut sim = Simulation::new();
    let staff = StaffPool::new(Some(1));
    let started = Rc::new(RefCell::new(Vec::new()));

    let env = sim.env().clone();
    let (pool, log) = (staff.clone(), Rc::clone(&started));
    sim.spawn(async move {
        let spawn_worker = |name: &'static str, pool: StaffPool| {
            let env = env.clone();
            let log = Rc::clone(&log);
            env.clone()
                .process(async move {
                    let _guard = pool.request().await;
                    log.borrow_mut().push((name, env.now()));
                    env.timeout(10).await;
                })
                .unwrap()
        };

        let _a = spawn_worker("a", pool.clone());
        let b = spawn_worker("b", pool.clone());
        let _c = spawn_worker("c", pool.clone());

        env.timeout(2).await;
        b.interrupt().await;
        env.timeout(100).await;
    })
    .unwrap();

    sim.run();
    assert_eq!(*started.borrow(), vec![("a", 0), ("c", 10)]);
    assert_eq!(staff.in_use(), 0);
    assert_eq!(staff.queue_len(), 0);
}

#[test]
fn test_interrupting_holder_releases_staff() {
    let mut sim = Simulation::new();
    let staff = StaffPool::new(Some(1));
    let started = Rc::new(RefCell::new(Vec::new()));

    let env = sim.env().clone();
    let (pool, log) = (staff.clone(), Rc::clone(&started));
    sim.spawn(async move {
        let spawn_worker = |name: &'static str, pool: StaffPool| {
            let env = env.clone();
            let log = Rc::clone(&log);
            env.clone()
                .process(async move {
                    let _guard = pool.request().await;
                    log.borrow_mut().push((name, env.now()));
                    env.timeout(10).await;
                })
                .unwrap()
        };

        let holder = spawn_worker("holder", pool.clone());
        let _waiter = spawn_worker("waiter", pool.clone());

        env.timeout(2).await;
        holder.interrupt().await;
        env.timeout(100).await;
    })
    .unwrap();

    sim.run();
    assert_eq!(*started.borrow(), vec![("holder", 0), ("waiter", 2)]);
    assert_eq!(staff.in_use(), 0);
}
