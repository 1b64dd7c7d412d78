//! First-to-finish race between two pending futures
//!
//! Unlike a plain select, the loser is handed back to the caller instead of
//! being dropped silently, so cancelling it is an explicit step.

use futures::future::{select, Either};
use std::future::Future;

/// Result of [`race`]: the winner's output plus the still-pending loser
pub enum Race<A: Future, B: Future> {
    /// `a` finished first
    First(A::Output, B),

    /// `b` finished first
    Second(B::Output, A),
}

/// Wait for whichever of `a` or `b` completes first
///
/// When both are ready on the same poll, `a` wins.
///
/// # Example
///
/// ```rust
/// use rebuild_funding_core::sim::{race, Race};
/// use rebuild_funding_core::Simulation;
///
/// let mut sim = Simulation::new();
/// let env = sim.env().clone();
///
/// let mut process = sim
///     .spawn(async move {
///         match race(env.timeout(3), env.timeout(7)).await {
///             Race::First(at, slow) => {
///                 slow.cancel();
///                 at
///             }
///             Race::Second(..) => unreachable!(),
///         }
///     })
///     .unwrap();
///
/// assert_eq!(sim.run(), 3);
/// assert_eq!(process.try_result(), Some(3));
/// ```
pub async fn race<A, B>(a: A, b: B) -> Race<A, B>
where
    A: Future + Unpin,
    B: Future + Unpin,
{
    match select(a, b).await {
        Either::Left((out, b)) => Race::First(out, b),
        Either::Right((out, a)) => Race::Second(out, a),
    }
}
