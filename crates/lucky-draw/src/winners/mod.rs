//! Winner resolution: who matches a sign-in, and what they won.

pub mod composer;
pub mod resolver;

pub use composer::{
    compose, record_prize, OutcomeKind, PrizeOutcome, ADD_ON_MARKER, PRIZE_SEPARATOR,
    VOUCHER_PLACEHOLDER,
};
pub use resolver::resolve;

use crate::roster::RosterRecord;

/// Resolves the search against the roster and composes the matched prizes.
pub fn lookup(records: &[RosterRecord], name: &str, company: Option<&str>) -> PrizeOutcome {
    compose(&resolve(records, name, company))
}
