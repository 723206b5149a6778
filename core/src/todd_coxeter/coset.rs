//! Coset identity and bookkeeping state (`spec.md` §4.D "Coset table"):
//! cosets are positive integers with `0` reserved for the identity coset,
//! realized here the way `ElementId` realizes Froidure-Pin element indices.

smgrp_util::typed_index_struct! {
    /// Index of a coset discovered during Todd-Coxeter enumeration.
    pub struct CosetId(u32);
}

/// A coset's place in the doubly-linked active list, or its forwarding
/// address once it has been identified away by a coincidence.
///
/// The source keeps a single `forwd`/`bckwd` pair per coset and reuses the
/// same storage for both the active list and a freed coset's forwarding
/// address (`bckwd[c]` holds the negated target once `c` is dead). An enum
/// says the same thing without the sign trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CosetState {
    Active { prev: Option<CosetId>, next: Option<CosetId> },
    /// `c` was identified with (and merged into) `to`; querying `c` should
    /// follow `to`, which may itself have been forwarded again.
    Forwarded(CosetId),
}
