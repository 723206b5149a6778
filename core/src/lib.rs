//! Computes the structure of a finitely generated semigroup or monoid:
//! element enumeration, Cayley graphs, defining relations, idempotents, and
//! congruences.
//!
//! Three algorithms carry the weight of the crate and are composed by
//! [`congruence::Congruence`]:
//!
//! - [`froidure_pin`] — Froidure-Pin enumeration of a concrete semigroup.
//! - [`todd_coxeter`] — Todd-Coxeter coset enumeration over a presentation.
//! - [`rewriting`] — Knuth-Bendix completion of a string rewriting system.

pub mod cancel;
pub mod config;
pub mod congruence;
pub mod element;
pub mod error;
pub mod froidure_pin;
pub mod report;
pub mod rewriting;
mod stopwatch;
pub mod todd_coxeter;
pub mod word;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{Error, Result};

/// Structs and traits re-exported for convenient `use smgrp::prelude::*;`.
pub mod prelude {
    pub use crate::congruence::{Congruence, CongruenceKind, Presentation};
    pub use crate::element::Element;
    pub use crate::error::{Error, Result};
    pub use crate::froidure_pin::FroidurePin;
    pub use crate::rewriting::RewritingSystem;
    pub use crate::todd_coxeter::ToddCoxeter;
    pub use crate::word::{Letter, Relation, Word};
}
