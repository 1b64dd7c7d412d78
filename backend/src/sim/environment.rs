//! Scheduling environment - deterministic discrete-event executor
//!
//! Logical processes are ordinary `async` blocks running on a single-threaded
//! [`LocalPool`]. Time is simulated: the pool runs every ready process until
//! all of them are suspended, then the earliest pending timer fires and the
//! clock jumps to its due day.
//!
//! # Critical Invariants
//!
//! 1. **Monotonic time**: the clock never moves backwards
//! 2. **One timer per step**: timers due on the same day fire one at a time,
//!    in scheduling order, with all ready processes run to a stall in
//!    between. This is the tie-break rule for races.
//! 3. **Cancellation is removal**: a cancelled timer never fires and an
//!    interrupted process is dropped before it can resume
//!
//! # Example
//!
//! ```rust
//! use rebuild_funding_core::Simulation;
//!
//! let mut sim = Simulation::new();
//! let env = sim.env().clone();
//!
//! let mut process = sim
//!     .spawn(async move {
//!         env.timeout(10).await;
//!         env.now()
//!     })
//!     .unwrap();
//!
//! assert_eq!(sim.run(), 10);
//! assert_eq!(process.try_result(), Some(10));
//! ```

use crate::core::time::{SimClock, SimTime};
use crate::models::event::{Event, EventLog};
use crate::orchestrator::SimulationError;
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::RemoteHandle;
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{ready, Context, Poll, Waker};

/// Identifier of a scheduled timer; also its scheduling sequence number
type TimerId = u64;

#[derive(Debug, Default)]
struct TimerSlot {
    fired: bool,
    waker: Option<Waker>,
}

struct EnvState {
    clock: RefCell<SimClock>,
    next_timer: Cell<TimerId>,
    /// (due day, sequence) min-heap; cancelled entries are skipped lazily
    queue: RefCell<BinaryHeap<Reverse<(SimTime, TimerId)>>>,
    /// Live timers; a timer absent from this map has been cancelled or consumed
    timers: RefCell<HashMap<TimerId, TimerSlot>>,
    events: RefCell<EventLog>,
    spawner: LocalSpawner,
}

/// Handle to the scheduling environment
///
/// Cheap to clone; every process holds one.
#[derive(Clone)]
pub struct Environment {
    inner: Rc<EnvState>,
}

impl Environment {
    fn new(spawner: LocalSpawner) -> Self {
        Self {
            inner: Rc::new(EnvState {
                clock: RefCell::new(SimClock::new()),
                next_timer: Cell::new(0),
                queue: RefCell::new(BinaryHeap::new()),
                timers: RefCell::new(HashMap::new()),
                events: RefCell::new(EventLog::new()),
                spawner,
            }),
        }
    }

    /// Current simulation day
    pub fn now(&self) -> SimTime {
        self.inner.clock.borrow().now()
    }

    /// Schedule a timer `delay` days from now
    ///
    /// The timer is placed in the event queue immediately, so its position in
    /// the tie-break order is fixed at creation, not at first poll. A due day
    /// past the end of time saturates at `SimTime::MAX`.
    pub fn timeout(&self, delay: SimTime) -> Timeout {
        let id = self.inner.next_timer.get();
        self.inner.next_timer.set(id + 1);

        let at = self.now().saturating_add(delay);
        self.inner.timers.borrow_mut().insert(id, TimerSlot::default());
        self.inner.queue.borrow_mut().push(Reverse((at, id)));

        Timeout {
            env: self.clone(),
            id,
            at,
        }
    }

    /// Spawn a logical process
    ///
    /// Awaiting the returned [`Process`] suspends the caller until the process
    /// finishes; [`Process::interrupt`] cancels it.
    ///
    /// The spawned task carries a drop signal so an interrupter can wait until
    /// the process has really been torn down.
    ///
    /// # Errors
    /// [`SimulationError::Spawn`] if the executor has shut down.
    pub fn process<F, T>(&self, future: F) -> Result<Process<T>, SimulationError>
    where
        F: Future<Output = T> + 'static,
        T: 'static,
    {
        let (dropped_tx, dropped_rx) = oneshot::channel::<()>();
        let handle = self
            .inner
            .spawner
            .spawn_local_with_handle(async move {
                let _dropped = dropped_tx;
                future.await
            })
            .map_err(|e| SimulationError::Spawn(e.to_string()))?;
        Ok(Process {
            handle: Some(handle),
            dropped: Some(dropped_rx),
        })
    }

    /// Append to the structured event log
    pub fn log(&self, event: Event) {
        self.inner.events.borrow_mut().log(event);
    }

    /// Snapshot of the event log
    pub fn event_log(&self) -> EventLog {
        self.inner.events.borrow().clone()
    }

    /// Number of timers still scheduled
    pub fn pending_timers(&self) -> usize {
        self.inner
            .timers
            .borrow()
            .values()
            .filter(|slot| !slot.fired)
            .count()
    }

    /// Due day of the next live timer, discarding cancelled entries
    fn next_due(&self) -> Option<SimTime> {
        let timers = self.inner.timers.borrow();
        let mut queue = self.inner.queue.borrow_mut();
        while let Some(Reverse((at, id))) = queue.peek().copied() {
            match timers.get(&id) {
                Some(slot) if !slot.fired => return Some(at),
                _ => {
                    queue.pop();
                }
            }
        }
        None
    }

    /// Fire the earliest live timer, advancing the clock to its due day
    fn fire_next(&self) -> Option<SimTime> {
        let at = self.next_due()?;
        let Some(Reverse((_, id))) = self.inner.queue.borrow_mut().pop() else {
            return None;
        };

        self.inner.clock.borrow_mut().advance_to(at);

        let waker = {
            let mut timers = self.inner.timers.borrow_mut();
            timers.get_mut(&id).and_then(|slot| {
                slot.fired = true;
                slot.waker.take()
            })
        };
        if let Some(waker) = waker {
            waker.wake();
        }
        Some(at)
    }
}

/// Cancellable simulated-time timer
///
/// Resolves to the day it fired. Dropping the timer, or calling
/// [`Timeout::cancel`], removes it from the event queue.
pub struct Timeout {
    env: Environment,
    id: TimerId,
    at: SimTime,
}

impl Timeout {
    /// Day the timer is due
    pub fn due(&self) -> SimTime {
        self.at
    }

    /// Whether the timer is still waiting to fire
    pub fn is_pending(&self) -> bool {
        matches!(
            self.env.inner.timers.borrow().get(&self.id),
            Some(slot) if !slot.fired
        )
    }

    /// Cancel the timer so it never fires
    pub fn cancel(self) {}
}

impl Future for Timeout {
    type Output = SimTime;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<SimTime> {
        let mut timers = self.env.inner.timers.borrow_mut();
        let Some(slot) = timers.get_mut(&self.id) else {
            return Poll::Ready(self.at);
        };
        if !slot.fired {
            match &slot.waker {
                Some(waker) if waker.will_wake(cx.waker()) => {}
                _ => slot.waker = Some(cx.waker().clone()),
            }
            return Poll::Pending;
        }
        timers.remove(&self.id);
        Poll::Ready(self.at)
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.env.inner.timers.borrow_mut().remove(&self.id);
    }
}

/// Handle to a spawned logical process
///
/// Dropping the handle detaches the process: it keeps running to completion.
/// Only [`Process::interrupt`] cancels it.
pub struct Process<T> {
    /// `None` once the result was taken or the process was interrupted
    handle: Option<RemoteHandle<T>>,

    /// Resolves once the spawned task has been dropped
    dropped: Option<oneshot::Receiver<()>>,
}

impl<T: 'static> Process<T> {
    /// Cancel the process and wait until it has been torn down
    ///
    /// The process never resumes. When this resolves, everything the process
    /// owned has been dropped (staff returned, open claims recorded as
    /// interrupted), still on the current day.
    pub async fn interrupt(mut self) {
        drop(self.handle.take());
        if let Some(dropped) = self.dropped.take() {
            // Err(Canceled) is the signal: the sender went away with the task
            let _ = dropped.await;
        }
    }

    /// Take the result if the process has finished
    ///
    /// Returns `None` while it is still running, and after the result has
    /// already been taken.
    pub fn try_result(&mut self) -> Option<T> {
        let output = self.handle.as_mut()?.now_or_never()?;
        self.handle = None;
        Some(output)
    }
}

impl<T: 'static> Future for Process<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let Some(handle) = self.handle.as_mut() else {
            return Poll::Pending;
        };
        let output = ready!(Pin::new(handle).poll(cx));
        self.handle = None;
        Poll::Ready(output)
    }
}

impl<T> Drop for Process<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.forget();
        }
    }
}

/// Owner of the executor and the environment
///
/// Drives the simulation: runs ready processes, then fires timers in order.
pub struct Simulation {
    pool: LocalPool,
    env: Environment,
}

impl Simulation {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let env = Environment::new(pool.spawner());
        Self { pool, env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn now(&self) -> SimTime {
        self.env.now()
    }

    /// Spawn a top-level process (see [`Environment::process`])
    pub fn spawn<F, T>(&self, future: F) -> Result<Process<T>, SimulationError>
    where
        F: Future<Output = T> + 'static,
        T: 'static,
    {
        self.env.process(future)
    }

    /// Run ready processes to a stall, then fire one timer
    ///
    /// Returns `false` once no timer is left to fire.
    pub fn step(&mut self) -> bool {
        self.pool.run_until_stalled();
        self.env.fire_next().is_some()
    }

    /// Run until no process can make progress and no timer is pending
    ///
    /// Returns the final simulation day.
    pub fn run(&mut self) -> SimTime {
        while self.step() {}
        self.env.now()
    }

    /// Run, but never fire a timer due after `horizon`
    pub fn run_until(&mut self, horizon: SimTime) -> SimTime {
        loop {
            self.pool.run_until_stalled();
            match self.env.next_due() {
                Some(at) if at <= horizon => {
                    self.env.fire_next();
                }
                _ => break,
            }
        }
        self.env.now()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
