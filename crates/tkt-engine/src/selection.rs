//! # Candidate Selection
//!
//! Pure functions that pick one assignee out of a candidate pool. The pool
//! is whatever the store returned for one role; these functions never touch
//! the store and do not depend on the order of their input.

use tkt_core::User;

/// How one user is chosen from a role's candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Pick the most recently created user. Never ambiguous.
    MostRecent,
    /// Require exactly one user; more than one is ambiguous.
    ExactlyOne,
}

/// Outcome of applying a [`Selection`] to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate<'a> {
    /// A single user was chosen.
    Selected(&'a User),
    /// The pool was empty.
    Empty,
    /// The pool held this many users and the rule requires one.
    Ambiguous(usize),
}

/// Apply `selection` to `pool`.
pub fn select_candidate(pool: &[User], selection: Selection) -> Candidate<'_> {
    match (selection, pool) {
        (_, []) => Candidate::Empty,
        (Selection::ExactlyOne, [only]) => Candidate::Selected(only),
        (Selection::ExactlyOne, many) => Candidate::Ambiguous(many.len()),
        (Selection::MostRecent, _) => match most_recent(pool) {
            Some(user) => Candidate::Selected(user),
            None => Candidate::Empty,
        },
    }
}

/// The user with the latest `created_at`; equal timestamps go to the higher id.
pub fn most_recent(pool: &[User]) -> Option<&User> {
    pool.iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
}
