//! The synthetic element type behind the KBFP/KBP strategies (`spec.md`
//! §4.E): an element of the monoid presented by a completed rewriting
//! system is just its normal-form word, with multiplication as
//! concatenate-then-rewrite. Wrapping the (shared, already-completed)
//! [`RewritingSystem`] in an `Arc` lets every element carry a reference to
//! it cheaply and lets [`crate::froidure_pin::FroidurePin`] enumerate over
//! it like any other [`Element`] type.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::element::Element;
use crate::rewriting::{RewritingSystem, ShortLex};
use crate::word::Word;

#[derive(Debug, Clone)]
pub(super) struct KbElement {
    system: Arc<RewritingSystem<ShortLex>>,
    word: Word,
}

impl KbElement {
    /// Constructs the element for `word`, rewriting it to normal form
    /// first so `Eq`/`Hash` agree with the quotient's equality.
    pub(super) fn new(system: Arc<RewritingSystem<ShortLex>>, word: Word) -> Self {
        let word = system.rewrite_word(&word);
        Self { system, word }
    }

    /// The element's normal-form word.
    pub(super) fn word(&self) -> &Word {
        &self.word
    }
}

impl PartialEq for KbElement {
    fn eq(&self, other: &Self) -> bool {
        self.word == other.word
    }
}
impl Eq for KbElement {}
impl Hash for KbElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.word.hash(state);
    }
}

impl Element for KbElement {
    fn degree(&self) -> usize {
        0
    }
    fn one(&self) -> Self {
        Self { system: self.system.clone(), word: Word::new() }
    }
    fn product(out: &mut Self, a: &Self, b: &Self, _tid: usize) {
        let mut w = a.word.clone();
        w.extend_from_slice(&b.word);
        out.word = a.system.rewrite_word(&w);
    }
    fn complexity(&self) -> usize {
        self.word.len().max(1)
    }
    fn less(&self, other: &Self) -> std::cmp::Ordering {
        if self.word == other.word {
            std::cmp::Ordering::Equal
        } else if self.system.less(&self.word, &other.word) {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    }
}
