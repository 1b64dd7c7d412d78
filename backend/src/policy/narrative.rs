//! Story text for search outcomes
//!
//! Rendering is kept apart from the search logic: searches classify, this
//! module words the result.

use super::SearchOutcome;
use crate::core::money::format_amount;

/// Render the story entry for a finished search
///
/// `insured` only changes the wording of the already-sufficient entry.
///
/// # Example
/// ```
/// use rebuild_funding_core::policy::{narrative, SearchOutcome};
///
/// let entry = narrative::render(&SearchOutcome::Sufficient { duration: 12, funds: 250 }, "Asha", false);
/// assert_eq!(
///     entry,
///     "It took Asha 12 days to receive enough financial assistance and now has $250 to rebuild. "
/// );
/// ```
pub fn render(outcome: &SearchOutcome, name: &str, insured: bool) -> String {
    match outcome {
        SearchOutcome::AlreadySufficient { .. } if insured => format!(
            "{} already had enough money to rebuild (including insurance) and did not need to search for funding. ",
            name
        ),
        SearchOutcome::AlreadySufficient { .. } => format!(
            "{} already had enough money to rebuild and did not need to search for funding. ",
            name
        ),
        SearchOutcome::Sufficient { duration, funds } => format!(
            "It took {} {} days to receive enough financial assistance and now has ${} to rebuild. ",
            name,
            duration,
            format_amount(*funds)
        ),
        SearchOutcome::StillShort {
            stage: Some(stage),
            duration,
            shortfall,
            ..
        } => format!(
            "It took {} {} days to exhaust financial assistance options but still does not have enough money to cover {} costs (short by ${}). ",
            name,
            duration,
            stage,
            format_amount(*shortfall)
        ),
        SearchOutcome::StillShort {
            stage: None,
            duration,
            shortfall,
            ..
        } => format!(
            "It took {} {} days to exhaust financial assistance options but still does not have enough money to cover repairs (short by ${}). ",
            name,
            duration,
            format_amount(*shortfall)
        ),
        SearchOutcome::GaveUp { at, duration, pending } => format!(
            "{} gave up searching for money {} days after the event, after waiting {} days ({} still pending). ",
            name,
            at,
            duration,
            pending
        ),
    }
}
