//! Generic finite-state validation.
//!
//! Nothing in this module knows about order types, actors or amounts. A
//! [`TransitionTable`] is plain data and the functions below are the only
//! place an edge is ever judged legal.

use crate::error::{LifecycleError, Result};
use std::fmt::{Debug, Display};

/// A member of a finite state set.
pub trait LifecycleState: Copy + Eq + Debug + Display + 'static {
    /// Every state of the set, in declaration order.
    const ALL: &'static [Self];

    /// Canonical upper-case name, e.g. `PENDING_AUDIT`.
    fn as_str(&self) -> &'static str;

    /// Case-insensitive lookup by canonical name.
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str().eq_ignore_ascii_case(input))
    }
}

/// Static mapping from a state to the states reachable from it in one step.
///
/// States absent from the table, and states mapped to an empty slice, are
/// terminal.
#[derive(Debug)]
pub struct TransitionTable<S: 'static> {
    edges: &'static [(S, &'static [S])],
}

impl<S: LifecycleState> TransitionTable<S> {
    pub const fn new(edges: &'static [(S, &'static [S])]) -> Self {
        Self { edges }
    }

    pub fn allowed_next(&self, state: S) -> &'static [S] {
        self.edges
            .iter()
            .find(|(from, _)| *from == state)
            .map(|(_, next)| *next)
            .unwrap_or(&[])
    }

    pub fn is_terminal(&self, state: S) -> bool {
        self.allowed_next(state).is_empty()
    }

    /// Every `(from, to)` pair in the table.
    pub fn edges(&self) -> impl Iterator<Item = (S, S)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, next)| next.iter().map(move |to| (*from, *to)))
    }
}

pub fn can_transition<S: LifecycleState>(table: &TransitionTable<S>, from: S, to: S) -> bool {
    table.allowed_next(from).contains(&to)
}

pub fn valid_transitions<S: LifecycleState>(table: &TransitionTable<S>, from: S) -> Vec<S> {
    table.allowed_next(from).to_vec()
}

/// Fails with [`LifecycleError::InvalidTransition`] unless `from -> to` is in the table.
pub fn validate_transition<S: LifecycleState>(
    table: &TransitionTable<S>,
    from: S,
    to: S,
) -> Result<()> {
    if can_transition(table, from, to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
