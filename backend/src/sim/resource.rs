//! Shared program resources: staff pools and budgets
//!
//! A [`StaffPool`] models the adjusters, reviewers or loan officers that a
//! program has. Requests queue FIFO when every staff member is busy. A
//! [`Budget`] is the money a program can still hand out.
//!
//! CRITICAL: All money values are i64 (whole currency units)

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Debug)]
struct Waiter {
    ticket: u64,
    granted: bool,
    waker: Option<Waker>,
}

#[derive(Debug)]
struct PoolState {
    capacity: Option<usize>,
    in_use: usize,
    next_ticket: u64,
    queue: VecDeque<Waiter>,
}

impl PoolState {
    fn has_room(&self) -> bool {
        self.capacity.map_or(true, |cap| self.in_use < cap)
    }

    /// Hand free staff to queued requests in arrival order
    fn grant_waiting(&mut self) -> Vec<Waker> {
        let mut wakers = Vec::new();
        for i in 0..self.queue.len() {
            if !self.has_room() {
                break;
            }
            if !self.queue[i].granted {
                self.in_use += 1;
                self.queue[i].granted = true;
                if let Some(waker) = self.queue[i].waker.take() {
                    wakers.push(waker);
                }
            }
        }
        wakers
    }

    fn release_one(&mut self) -> Vec<Waker> {
        self.in_use = self.in_use.saturating_sub(1);
        self.grant_waiting()
    }
}

/// Capacity-limited pool of program staff
///
/// `None` capacity means unlimited staff: requests never wait.
///
/// # Example
///
/// ```rust
/// use rebuild_funding_core::sim::StaffPool;
///
/// let staff = StaffPool::new(Some(2));
/// assert_eq!(staff.capacity(), Some(2));
/// assert_eq!(staff.available(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct StaffPool {
    inner: Rc<RefCell<PoolState>>,
}

impl StaffPool {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PoolState {
                capacity,
                in_use: 0,
                next_ticket: 0,
                queue: VecDeque::new(),
            })),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.inner.borrow().capacity
    }

    /// Staff currently assigned (including grants not yet picked up)
    pub fn in_use(&self) -> usize {
        self.inner.borrow().in_use
    }

    /// Free staff, or `None` when unlimited
    pub fn available(&self) -> Option<usize> {
        let state = self.inner.borrow();
        state.capacity.map(|cap| cap.saturating_sub(state.in_use))
    }

    /// Requests waiting for a staff member
    pub fn queue_len(&self) -> usize {
        self.inner
            .borrow()
            .queue
            .iter()
            .filter(|w| !w.granted)
            .count()
    }

    /// Ask for one staff member
    ///
    /// Resolves to a [`StaffGuard`] that returns the staff member when
    /// dropped. Dropping the pending request leaves the queue.
    pub fn request(&self) -> StaffRequest {
        StaffRequest {
            pool: self.clone(),
            ticket: None,
            done: false,
        }
    }
}

fn wake_all(wakers: Vec<Waker>) {
    for waker in wakers {
        waker.wake();
    }
}

/// Pending request for a staff member
pub struct StaffRequest {
    pool: StaffPool,
    ticket: Option<u64>,
    done: bool,
}

impl Future for StaffRequest {
    type Output = StaffGuard;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<StaffGuard> {
        let this = self.get_mut();
        let mut state = this.pool.inner.borrow_mut();

        match this.ticket {
            None => {
                if state.queue.is_empty() && state.has_room() {
                    state.in_use += 1;
                    drop(state);
                    this.done = true;
                    return Poll::Ready(StaffGuard {
                        pool: this.pool.clone(),
                    });
                }
                let ticket = state.next_ticket;
                state.next_ticket += 1;
                state.queue.push_back(Waiter {
                    ticket,
                    granted: false,
                    waker: Some(cx.waker().clone()),
                });
                this.ticket = Some(ticket);
                Poll::Pending
            }
            Some(ticket) => {
                let Some(pos) = state.queue.iter().position(|w| w.ticket == ticket) else {
                    return Poll::Pending;
                };
                if state.queue[pos].granted {
                    let _ = state.queue.remove(pos);
                    drop(state);
                    this.done = true;
                    Poll::Ready(StaffGuard {
                        pool: this.pool.clone(),
                    })
                } else {
                    state.queue[pos].waker = Some(cx.waker().clone());
                    Poll::Pending
                }
            }
        }
    }
}

impl Drop for StaffRequest {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let Some(ticket) = self.ticket else {
            return;
        };

        let wakers = {
            let mut state = self.pool.inner.borrow_mut();
            match state.queue.iter().position(|w| w.ticket == ticket) {
                Some(pos) => {
                    let waiter = state.queue.remove(pos);
                    // A grant that was never picked up goes to the next in line
                    if waiter.is_some_and(|w| w.granted) {
                        state.release_one()
                    } else {
                        Vec::new()
                    }
                }
                None => Vec::new(),
            }
        };
        wake_all(wakers);
    }
}

/// A staff member held by a program; released on drop
#[derive(Debug)]
pub struct StaffGuard {
    pool: StaffPool,
}

impl Drop for StaffGuard {
    fn drop(&mut self) {
        let wakers = self.pool.inner.borrow_mut().release_one();
        wake_all(wakers);
    }
}

/// Money a program can still pay out
///
/// `None` level means an unlimited budget.
#[derive(Debug)]
pub struct Budget {
    level: Cell<i64>,
    unlimited: bool,
}

impl Budget {
    /// # Panics
    /// Panics on a negative initial level.
    pub fn new(initial: Option<i64>) -> Self {
        match initial {
            Some(level) => {
                assert!(level >= 0, "budget must be non-negative");
                Self {
                    level: Cell::new(level),
                    unlimited: false,
                }
            }
            None => Self::unlimited(),
        }
    }

    pub fn unlimited() -> Self {
        Self {
            level: Cell::new(0),
            unlimited: true,
        }
    }

    /// Remaining money, or `None` when unlimited
    pub fn level(&self) -> Option<i64> {
        (!self.unlimited).then(|| self.level.get())
    }

    pub fn is_exhausted(&self) -> bool {
        !self.unlimited && self.level.get() <= 0
    }

    /// Take up to `amount`; returns what was actually drawn
    ///
    /// # Example
    /// ```
    /// use rebuild_funding_core::sim::Budget;
    ///
    /// let budget = Budget::new(Some(100));
    /// assert_eq!(budget.draw(60), 60);
    /// assert_eq!(budget.draw(60), 40); // capped by what is left
    /// assert_eq!(budget.draw(60), 0);
    /// ```
    pub fn draw(&self, amount: i64) -> i64 {
        let amount = amount.max(0);
        if self.unlimited {
            return amount;
        }
        let drawn = amount.min(self.level.get());
        self.level.set(self.level.get() - drawn);
        drawn
    }
}
