//! Todd-Coxeter coset enumeration (`spec.md` §4.D): builds a coset table for
//! a congruence, either from a presentation or by prefilling from a
//! concrete semigroup's Cayley graph, then answers class-membership
//! queries against it.

mod coset;
mod tc;

pub use coset::CosetId;
pub use tc::ToddCoxeter;
