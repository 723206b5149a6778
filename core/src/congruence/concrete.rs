//! A type-erased view of a concrete [`FroidurePin`] (`spec.md` §4.E
//! "Construction from a concrete semigroup"): the handful of operations the
//! congruence dispatcher needs from a caller's semigroup, behind a trait
//! object so [`crate::congruence::Congruence`] doesn't need to carry the
//! caller's element type as a parameter.

use crate::element::Element;
use crate::froidure_pin::graph::{ElementId, Table};
use crate::froidure_pin::FroidurePin;
use crate::word::{Letter, Relation, Word};

/// The capability set a concrete semigroup must expose to back a
/// [`crate::congruence::Congruence`]'s TC-prefilled and P strategies.
pub trait ConcreteSemigroup: Send + Sync {
    fn nr_generators(&self) -> usize;
    fn size(&mut self) -> usize;
    fn word_to_pos(&mut self, word: &[Letter]) -> Option<ElementId>;
    fn left(&mut self, pos: ElementId, letter: Letter) -> ElementId;
    fn right(&mut self, pos: ElementId, letter: Letter) -> ElementId;
    fn factorisation(&mut self, pos: ElementId) -> Word;
    fn relations(&mut self) -> Vec<Relation>;
    fn right_cayley_graph(&mut self) -> Table<Option<ElementId>>;
    fn left_cayley_graph(&mut self) -> Table<Option<ElementId>>;
}

impl<T: Element> ConcreteSemigroup for FroidurePin<T> {
    fn nr_generators(&self) -> usize {
        FroidurePin::nr_generators(self)
    }
    fn size(&mut self) -> usize {
        FroidurePin::size(self)
    }
    fn word_to_pos(&mut self, word: &[Letter]) -> Option<ElementId> {
        FroidurePin::word_to_pos(self, word).ok()
    }
    fn left(&mut self, pos: ElementId, letter: Letter) -> ElementId {
        FroidurePin::left(self, pos, letter)
    }
    fn right(&mut self, pos: ElementId, letter: Letter) -> ElementId {
        FroidurePin::right(self, pos, letter)
    }
    fn factorisation(&mut self, pos: ElementId) -> Word {
        FroidurePin::minimal_factorisation(self, pos)
    }
    fn relations(&mut self) -> Vec<Relation> {
        FroidurePin::relations(self)
    }
    fn right_cayley_graph(&mut self) -> Table<Option<ElementId>> {
        FroidurePin::right_cayley_graph(self).clone()
    }
    fn left_cayley_graph(&mut self) -> Table<Option<ElementId>> {
        FroidurePin::left_cayley_graph(self).clone()
    }
}
