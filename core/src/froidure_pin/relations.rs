//! Streaming access to the defining relations discovered during enumeration
//! (`spec.md` §4.C "next_relation"): duplicate-generator identifications
//! first, then one rule per `(element, generator)` pair whose product did
//! not extend the minimal word.

use smgrp_util::ti::TypedIndex;

use crate::element::Element;
use crate::word::Letter;

use super::fp::FroidurePin;
use super::graph::ElementId;

/// One defining relation, in raw (unfactorised) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextRelation {
    /// Generator `letter` was found, at construction time, to already equal
    /// an earlier generator `first`.
    DuplicateGenerator {
        /// The later (redundant) generator letter.
        letter: Letter,
        /// The earlier generator letter it duplicates.
        first: Letter,
    },
    /// Appending generator `g` to the element at `i` does not produce a new
    /// element: it equals the element already at `k`.
    Rule {
        /// The element the rule starts from.
        i: ElementId,
        /// The generator appended on the right.
        g: Letter,
        /// The element the product equals.
        k: ElementId,
    },
}

/// Iterator over a [`FroidurePin`]'s defining relations. Requires that
/// enumeration has already completed; see [`FroidurePin::next_relation`].
pub struct RelationsIter<'a, T: Element> {
    fp: &'a FroidurePin<T>,
    dup_pos: usize,
    element: usize,
    generator: usize,
}

impl<'a, T: Element> RelationsIter<'a, T> {
    pub(super) fn new(fp: &'a FroidurePin<T>) -> Self {
        Self {
            fp,
            dup_pos: 0,
            element: 0,
            generator: 0,
        }
    }
}

impl<'a, T: Element> Iterator for RelationsIter<'a, T> {
    type Item = NextRelation;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(&(letter, first)) = self.fp.duplicate_gens.get(self.dup_pos) {
            self.dup_pos += 1;
            return Some(NextRelation::DuplicateGenerator { letter, first });
        }

        let ngens = self.fp.generators.len();
        loop {
            if self.element >= self.fp.elements.len() {
                return None;
            }
            if self.generator >= ngens {
                self.element += 1;
                self.generator = 0;
                continue;
            }
            let i = ElementId::try_from_index(self.element).expect("element id overflow");
            let g = self.generator;
            self.generator += 1;

            if *self.fp.reduced.get(i, g) {
                continue;
            }
            // `i` itself is a generator (no suffix), or the suffix's row at
            // `g` was already reduced — `spec.md` §4.C's defining-relation
            // condition, both conjuncts (`froidure-pin-impl.hpp:699-702`).
            let is_relation = match self.fp.suffix[i] {
                None => true,
                Some(s) => *self.fp.reduced.get(s, g),
            };
            if !is_relation {
                continue;
            }
            let k = (*self.fp.right.get(i, g)).expect("right entry must be known once enumeration is complete");
            return Some(NextRelation::Rule { i, g: g as Letter, k });
        }
    }
}
