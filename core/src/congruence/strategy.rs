//! The strategies a [`super::Congruence`] races against each other
//! (`spec.md` §4.E): Todd-Coxeter (plain or prefilled — both just a
//! [`ToddCoxeter`]), the pair-orbit closure (backing both the concrete `P`
//! strategy and the presentation-path `KBP`, which only differ in which
//! semigroup they close pairs over), and `KBFP` (a [`FroidurePin`] over
//! rewriting-system elements, whose positions already *are* the quotient's
//! classes).

use smgrp_util::ti::TypedIndex;

use crate::cancel::KillSwitch;
use crate::config::Config;
use crate::froidure_pin::FroidurePin;
use crate::word::Word;

use super::kb_element::KbElement;
use super::pair_orbit::PairOrbit;

/// A single racing strategy, in whatever stage of completion it has
/// reached.
pub(super) enum StrategyHandle {
    /// Todd-Coxeter, built either from a bare presentation or prefilled
    /// from a concrete semigroup's Cayley graph — the two are
    /// indistinguishable once constructed.
    Tc(Box<crate::todd_coxeter::ToddCoxeter>),
    /// Orbit-of-pairs, over either the caller's concrete semigroup (`P`) or
    /// a synthetic one built from a completed rewriting system (`KBP`).
    P(Box<PairOrbit>),
    /// A Froidure-Pin enumeration of the quotient monoid presented by a
    /// completed rewriting system; element positions are class indices
    /// directly.
    Kbfp(Box<FroidurePin<KbElement>>),
}

impl StrategyHandle {
    pub(super) fn name(&self) -> &'static str {
        match self {
            StrategyHandle::Tc(_) => "TC",
            StrategyHandle::P(_) => "P",
            StrategyHandle::Kbfp(_) => "KBFP",
        }
    }

    /// Applies `config`'s wall-clock cap and reporting/packing cadence to
    /// the underlying engine (`spec.md` §5 "Timeouts", §6).
    pub(super) fn configure(&mut self, config: &Config) {
        match self {
            StrategyHandle::Tc(tc) => tc.configure(config),
            StrategyHandle::P(p) => p.configure(config),
            StrategyHandle::Kbfp(fp) => fp.configure(config),
        }
    }

    /// Advances the strategy by roughly `budget` units of internal work,
    /// polling `killed` at the strategy's own suspension points (`spec.md`
    /// §5): coset sweeps for TC, pair dequeues for P, length buckets for
    /// KBFP's underlying Froidure-Pin enumeration.
    pub(super) fn run_with_budget(&mut self, budget: usize, killed: &KillSwitch) {
        match self {
            StrategyHandle::Tc(tc) => tc.run_steps(Some(killed), Some(budget)),
            StrategyHandle::P(p) => p.run_with_budget(budget, killed),
            StrategyHandle::Kbfp(fp) => {
                let mut remaining = budget;
                fp.run_until(Some(killed), |_| {
                    remaining = remaining.saturating_sub(1);
                    remaining == 0
                });
            }
        }
    }

    pub(super) fn is_done(&self) -> bool {
        match self {
            StrategyHandle::Tc(tc) => tc.is_done(),
            StrategyHandle::P(p) => p.is_done(),
            StrategyHandle::Kbfp(fp) => fp.is_enumerated(),
        }
    }

    pub(super) fn word_to_class_index(&mut self, word: &Word) -> Option<usize> {
        match self {
            StrategyHandle::Tc(tc) => tc.word_to_class_index(word),
            StrategyHandle::P(p) => p.word_to_class_index(word),
            StrategyHandle::Kbfp(fp) => fp.word_to_pos(word).ok().map(TypedIndex::to_index),
        }
    }

    pub(super) fn nr_classes(&mut self, killed: &KillSwitch) -> usize {
        match self {
            StrategyHandle::Tc(tc) => {
                tc.run(Some(killed));
                tc.nr_classes()
            }
            StrategyHandle::P(p) => p.nr_classes(killed),
            StrategyHandle::Kbfp(fp) => {
                fp.run_until(Some(killed), |_| false);
                fp.current_size()
            }
        }
    }
}

/// A predicate the dispatcher polls against each racing strategy: the
/// first strategy for which it returns a definite answer wins the race,
/// even if none have finished (`spec.md` §4.E "equal"/"less").
pub(super) enum Goal {
    /// No goal: only full completion ends the race.
    None,
    /// `word_to_class_index(u) == word_to_class_index(v)`? Per `spec.md`
    /// §4.D "Equality": a definite "no" is accepted as soon as both sides
    /// resolve to distinct, currently-defined classes, even before the
    /// strategy is done; a definite "yes" requires the same class, which
    /// (once reached) is permanent since classes only ever merge.
    Equal(Word, Word),
    /// An approximation of `less`: once both sides resolve to a class, the
    /// classes' indices are compared. Class indices are assigned in
    /// discovery order, not by any presentation-independent word order, so
    /// this is a defensible but not literal reading of `spec.md` §4.E
    /// "less" — see `DESIGN.md`.
    Less(Word, Word),
}

impl Goal {
    pub(super) fn evaluate(&self, s: &mut StrategyHandle) -> Option<bool> {
        match self {
            Goal::None => None,
            Goal::Equal(u, v) => {
                let a = s.word_to_class_index(u);
                let b = s.word_to_class_index(v);
                match (a, b) {
                    (Some(x), Some(y)) => Some(x == y),
                    _ => None,
                }
            }
            Goal::Less(u, v) => {
                let a = s.word_to_class_index(u);
                let b = s.word_to_class_index(v);
                match (a, b) {
                    (Some(x), Some(y)) => Some(x < y),
                    _ => None,
                }
            }
        }
    }
}
