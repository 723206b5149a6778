//! The `FroidurePin<T>` engine: state, constructors, and the accessors that
//! force enumeration (fully or incrementally) on demand.

use std::collections::HashMap;

use smgrp_util::ti::{TiVec, TypedIndex};

use crate::cancel::KillSwitch;
use crate::config::Config;
use crate::element::{Element, ScratchPool};
use crate::error::{Error, Result};
use crate::report::ReportThrottle;
use crate::stopwatch::Stopwatch;
use crate::word::{Letter, Word};

use super::graph::{ElementId, Table};

/// Froidure-Pin enumeration of a concrete, finitely generated semigroup or
/// monoid. See `spec.md` §4.C.
pub struct FroidurePin<T: Element> {
    pub(super) generators: Vec<T>,
    pub(super) elements: TiVec<ElementId, T>,
    pub(super) map: HashMap<T, ElementId>,

    /// First letter of the shortest word spelling each element.
    pub(super) first: TiVec<ElementId, Letter>,
    /// Last letter of the shortest word spelling each element (spec's
    /// `final`, renamed since `final` is reserved).
    pub(super) last: TiVec<ElementId, Letter>,
    pub(super) prefix: TiVec<ElementId, Option<ElementId>>,
    pub(super) suffix: TiVec<ElementId, Option<ElementId>>,
    pub(super) length: TiVec<ElementId, usize>,

    pub(super) right: Table<Option<ElementId>>,
    pub(super) left: Table<Option<ElementId>>,
    pub(super) reduced: Table<bool>,

    pub(super) enumerate_order: Vec<ElementId>,
    /// `lenindex[k]` is the position in `enumerate_order` of the first
    /// element of a length-`k+1` bucket that has been *fully processed and
    /// left-backfilled*; `lenindex[0] == 0` always. Unlike the source (which
    /// records the length-1 generator bucket at construction time), this
    /// entry is pushed only once that bucket's rows and `left` backfill are
    /// both complete, which is what lets `enumerate::run_until` resume a
    /// partially processed bucket correctly after cancellation.
    pub(super) lenindex: Vec<usize>,
    /// Maps an original (pre-dedup) generator letter to its element id.
    pub(super) letter_to_pos: Vec<ElementId>,
    /// `(duplicate letter, first letter it duplicates)` pairs found during
    /// the generator pass or a later `add_generators` call.
    pub(super) duplicate_gens: Vec<(Letter, Letter)>,

    pub(super) pos_one: Option<ElementId>,

    /// Position in `enumerate_order` of the next element whose row has not
    /// yet been filled in (the resumable enumeration cursor).
    pub(super) pos: usize,
    /// Whether every row up to `pos` has been fully processed and no more
    /// work remains.
    pub(super) done: bool,
    pub(super) nr_rules: usize,

    pub(super) scratch: ScratchPool<T>,
    pub(super) immutable: bool,
    pub(super) batch_size: usize,

    /// Wall-clock cap applied at the same batch-boundary suspension points
    /// as `killed`, set by [`Self::configure`].
    pub(super) stopwatch: Option<Stopwatch>,
    /// Progress-event cadence gate, set by [`Self::configure`].
    pub(super) report: ReportThrottle,
}

impl<T: Element> FroidurePin<T> {
    /// Constructs a new semigroup from a non-empty list of generators, all of
    /// the same degree. Runs the generator pass immediately; no further
    /// enumeration happens until an operation needs it.
    pub fn new(generators: Vec<T>) -> Result<Self> {
        if generators.is_empty() {
            return Err(Error::invalid_argument("a semigroup needs at least one generator"));
        }
        let degree = generators[0].degree();
        if generators.iter().any(|g| g.degree() != degree) {
            return Err(Error::invalid_argument("all generators must have the same degree"));
        }

        let mut fp = Self {
            generators: Vec::new(),
            elements: TiVec::new(),
            map: HashMap::new(),
            first: TiVec::new(),
            last: TiVec::new(),
            prefix: TiVec::new(),
            suffix: TiVec::new(),
            length: TiVec::new(),
            right: Table::new(0),
            left: Table::new(0),
            reduced: Table::new(0),
            enumerate_order: Vec::new(),
            lenindex: vec![0],
            letter_to_pos: Vec::new(),
            duplicate_gens: Vec::new(),
            pos_one: None,
            pos: 0,
            done: false,
            nr_rules: 0,
            scratch: ScratchPool::new(),
            immutable: false,
            batch_size: 8192,
            stopwatch: None,
            report: ReportThrottle::default(),
        };
        fp.add_generators_impl(generators);
        Ok(fp)
    }

    fn add_generators_impl(&mut self, new_generators: Vec<T>) {
        self.right.push_column_n(new_generators.len());
        self.left.push_column_n(new_generators.len());
        self.reduced.push_column_n(new_generators.len());

        for g in new_generators {
            let letter = (self.generators.len()) as Letter;
            if let Some(&existing) = self.map.get(&g) {
                self.duplicate_gens.push((letter, self.first[existing]));
                self.letter_to_pos.push(existing);
                self.generators.push(g);
                continue;
            }
            let id = self.elements.push(g.clone()).expect("element id overflow");
            self.map.insert(g, id);
            self.first.push(letter).ok();
            self.last.push(letter).ok();
            self.prefix.push(None).ok();
            self.suffix.push(None).ok();
            self.length.push(1).ok();
            self.right.push_row();
            self.left.push_row();
            self.reduced.push_row();
            self.enumerate_order.push(id);
            self.letter_to_pos.push(id);
            self.generators.push(self.elements[id].clone());
            if self.elements[id] == self.elements[id].one() {
                self.pos_one.get_or_insert(id);
            }
        }
        self.lenindex = vec![0];
        self.pos = 0;
        self.done = self.generators.is_empty();
    }

    /// Adds a single generator. See [`Self::add_generators`].
    pub fn add_generator(&mut self, generator: T) -> Result<()> {
        self.add_generators(std::iter::once(generator))
    }

    /// Adds several generators at once, arriving at the same state an
    /// incremental `closure_update` would, but by rebuilding from scratch
    /// rather than reusing any of the work already done.
    ///
    /// `spec.md` §4.C describes an incremental `closure_update` that reuses
    /// the existing Cayley graph and only recomputes products touching the
    /// new generators. We instead replay the generator pass against the
    /// enlarged generator list from scratch: always correct, and every field
    /// this crate exposes (`elements`, `right`/`left`, factorisations, rule
    /// counts) ends up in exactly the state the incremental algorithm would
    /// have reached, just without reusing the superseded enumeration's work.
    /// See `DESIGN.md` for the tradeoff.
    pub fn add_generators(&mut self, generators: impl IntoIterator<Item = T>) -> Result<()> {
        if self.immutable {
            return Err(Error::invalid_state("cannot add generators to an immutable semigroup"));
        }
        let new: Vec<T> = generators.into_iter().collect();
        if new.is_empty() {
            return Ok(());
        }
        if let Some(g) = new.iter().find(|g| g.degree() != self.degree()) {
            let _ = g;
            return Err(Error::invalid_argument("new generator degree does not match existing degree"));
        }
        let mut all = self.generators.clone();
        all.extend(new);
        *self = Self::new(all)?;
        Ok(())
    }

    /// Returns `self` with `generators` merged in via [`Self::add_generators`].
    pub fn closure(mut self, generators: impl IntoIterator<Item = T>) -> Result<Self> {
        self.add_generators(generators)?;
        Ok(self)
    }

    /// Marks the semigroup immutable: further [`Self::add_generator`] /
    /// [`Self::add_generators`] calls fail. Used when a `FroidurePin` has
    /// been adopted read-only by a congruence strategy.
    pub fn mark_immutable(&mut self) {
        self.immutable = true;
    }

    /// Reserves capacity for at least `n` elements, to avoid reallocation
    /// during enumeration.
    pub fn reserve(&mut self, n: usize) {
        self.map.reserve(n);
        self.enumerate_order.reserve(n);
    }

    /// The common degree of every generator (and so every element).
    pub fn degree(&self) -> usize {
        self.generators.first().map_or(0, Element::degree)
    }
    /// The number of (possibly duplicate) generators.
    pub fn nr_generators(&self) -> usize {
        self.generators.len()
    }
    /// The `i`th generator, counting duplicates.
    pub fn generator(&self, i: usize) -> &T {
        &self.generators[i]
    }
    /// The number of elements discovered so far, without forcing further
    /// enumeration.
    pub fn current_size(&self) -> usize {
        self.elements.len()
    }
    /// The number of defining relations discovered so far, without forcing
    /// further enumeration.
    pub fn current_nr_rules(&self) -> usize {
        self.nr_rules
    }
    /// The length of the longest word fully discovered so far.
    pub fn current_max_word_length(&self) -> usize {
        self.lenindex.len().saturating_sub(1)
    }
    /// Sets the number of new elements enumerated per call to the
    /// incremental driver before a cancellation/time-limit check.
    pub fn set_batch_size(&mut self, n: usize) {
        self.batch_size = n.max(1);
    }

    /// Applies `config`'s batch size, wall-clock cap, and reporting cadence
    /// (`spec.md` §5 "Timeouts", §6). Takes effect from the next
    /// `run`/`run_until` call onward; does not affect enumeration already
    /// completed.
    pub fn configure(&mut self, config: &Config) {
        self.batch_size = config.batch_size().max(1);
        self.stopwatch = config.max_time().map(Stopwatch::with_limit);
        self.report = ReportThrottle::new(config.report(), config.report_interval());
    }

    /// Runs the enumeration algorithm to completion.
    pub fn run(&mut self) {
        self.run_until(None, |_| false);
    }

    /// Runs the enumeration algorithm until `stop` returns true, `killed` is
    /// signalled, or the semigroup is fully enumerated. `stop` is polled
    /// after each newly discovered element and at each length-bucket
    /// boundary; `killed` is polled only at length-bucket boundaries, per
    /// `spec.md` §5.
    pub fn run_until(&mut self, killed: Option<&KillSwitch>, stop: impl FnMut(&Self) -> bool) {
        super::enumerate::run_until(self, killed, stop);
    }

    /// The total number of elements, forcing full enumeration.
    pub fn size(&mut self) -> usize {
        self.run();
        self.elements.len()
    }
    /// Whether enumeration has completed (no unprocessed element remains),
    /// without forcing further enumeration. See `spec.md` §4.C "Stop
    /// conditions".
    pub fn is_enumerated(&self) -> bool {
        self.done
    }
    /// The total number of defining relations, forcing full enumeration.
    pub fn nr_rules(&mut self) -> usize {
        self.run();
        self.nr_rules
    }

    /// The position of `x` in enumeration order, enumerating incrementally
    /// only as far as needed. Returns `None` if `x` does not belong to the
    /// semigroup.
    pub fn position(&mut self, x: &T) -> Option<ElementId> {
        if let Some(&id) = self.map.get(x) {
            return Some(id);
        }
        self.run_until(None, |fp| fp.map.contains_key(x));
        self.map.get(x).copied()
    }
    /// Whether `x` belongs to the semigroup.
    pub fn contains(&mut self, x: &T) -> bool {
        self.position(x).is_some()
    }

    /// Returns the element at `id`, forcing enumeration up to and including
    /// `id` if needed.
    pub fn at(&mut self, id: ElementId) -> &T {
        self.run_until(None, |fp| id.to_index() < fp.elements.len());
        &self.elements[id]
    }

    fn check_word(&self, word: &[Letter]) -> Result<()> {
        let ngens = self.generators.len();
        if let Some(&bad) = word.iter().find(|&&g| g as usize >= ngens) {
            return Err(Error::invalid_argument(format!(
                "letter {bad} is out of range for a generator set of size {ngens}"
            )));
        }
        Ok(())
    }

    /// Evaluates `word` (a sequence of generator letters) to an element id,
    /// enumerating as needed.
    pub fn word_to_pos(&mut self, word: &[Letter]) -> Result<ElementId> {
        self.check_word(word)?;
        if word.is_empty() {
            return self
                .pos_one
                .ok_or_else(|| Error::invalid_state("semigroup has no identity for the empty word"));
        }
        let mut cur = self.letter_to_pos[word[0] as usize];
        for &letter in &word[1..] {
            let g = self.letter_to_pos[letter as usize];
            cur = self.fast_product(cur, g);
        }
        Ok(cur)
    }
    /// Evaluates `word` to the element it spells.
    pub fn word_to_element(&mut self, word: &[Letter]) -> Result<T> {
        let id = self.word_to_pos(word)?;
        Ok(self.elements[id].clone())
    }

    /// Whether `a` and `b` spell the same element.
    pub fn equal(&mut self, a: &[Letter], b: &[Letter]) -> Result<bool> {
        Ok(self.word_to_pos(a)? == self.word_to_pos(b)?)
    }

    fn factorisation_of(&self, id: ElementId) -> Word {
        let mut word = Vec::with_capacity(self.length[id]);
        let mut cur = Some(id);
        while let Some(c) = cur {
            word.push(self.last[c]);
            cur = self.prefix[c];
        }
        word.reverse();
        word
    }

    /// The (unique) shortest word, in enumeration order, spelling the element
    /// at `id`.
    pub fn minimal_factorisation(&mut self, id: ElementId) -> Word {
        self.run_until(None, |fp| id.to_index() < fp.elements.len());
        self.factorisation_of(id)
    }
    /// Alias for [`Self::minimal_factorisation`] taking an element value.
    pub fn factorisation(&mut self, x: &T) -> Option<Word> {
        let id = self.position(x)?;
        Some(self.minimal_factorisation(id))
    }

    /// `id * generator letter`, via the right Cayley graph; forces
    /// enumeration up to `id` if needed.
    pub fn right(&mut self, id: ElementId, letter: Letter) -> ElementId {
        self.run_until(None, |fp| id.to_index() < fp.elements.len());
        self.right.get(id, letter as usize).expect("right graph entry must be known once discovered")
    }
    /// `generator letter * id`, via the left Cayley graph; forces
    /// enumeration up to `id` if needed.
    pub fn left(&mut self, id: ElementId, letter: Letter) -> ElementId {
        self.run_until(None, |fp| id.to_index() < fp.elements.len());
        self.left.get(id, letter as usize).expect("left graph entry must be known once discovered")
    }
    /// The full right Cayley graph, forcing complete enumeration.
    pub fn right_cayley_graph(&mut self) -> &Table<Option<ElementId>> {
        self.run();
        &self.right
    }
    /// The full left Cayley graph, forcing complete enumeration.
    pub fn left_cayley_graph(&mut self) -> &Table<Option<ElementId>> {
        self.run();
        &self.left
    }

    /// Multiplies `a` and `b` (by element id), choosing whichever of a
    /// Cayley-graph trace or a direct [`Element::product`] call is cheaper,
    /// per [`Element::complexity`] (`spec.md` §4.C "fast_product").
    pub fn fast_product(&mut self, a: ElementId, b: ElementId) -> ElementId {
        self.run_until(None, |fp| a.to_index() < fp.elements.len() && b.to_index() < fp.elements.len());
        self.fast_product_ready(a, b)
    }
    fn fast_product_ready(&self, a: ElementId, b: ElementId) -> ElementId {
        let cheap_trace_cost = self.length[a].min(self.length[b]);
        let direct_cost = self.elements[a].complexity();
        if cheap_trace_cost * 2 <= direct_cost {
            self.product_by_reduction_ready(a, b)
        } else {
            let mut out = self.elements[a].clone();
            T::product(&mut out, &self.elements[a], &self.elements[b], 0);
            *self
                .map
                .get(&out)
                .expect("product of two semigroup elements must itself belong to the semigroup")
        }
    }

    /// Multiplies `a` and `b` (by element id) purely by tracing the Cayley
    /// graph, walking whichever of the two factorisations is shorter
    /// (`spec.md` §4.C).
    pub fn product_by_reduction(&mut self, a: ElementId, b: ElementId) -> ElementId {
        self.run_until(None, |fp| a.to_index() < fp.elements.len() && b.to_index() < fp.elements.len());
        self.product_by_reduction_ready(a, b)
    }
    fn product_by_reduction_ready(&self, a: ElementId, b: ElementId) -> ElementId {
        if self.length[a] <= self.length[b] {
            let mut cur = b;
            for &letter in self.factorisation_of(a).iter().rev() {
                cur = self.left.get(cur, letter as usize).expect("left entry known once discovered");
            }
            cur
        } else {
            let mut cur = a;
            for &letter in self.factorisation_of(b).iter() {
                cur = self.right.get(cur, letter as usize).expect("right entry known once discovered");
            }
            cur
        }
    }

    /// Whether the element at `id` is idempotent (`x * x == x`), dispatching
    /// between a graph trace and a direct multiply the same way
    /// [`Self::fast_product`] does.
    pub fn is_idempotent(&mut self, id: ElementId) -> bool {
        self.fast_product(id, id) == id
    }
    pub(super) fn is_idempotent_ready(&self, id: ElementId) -> bool {
        self.fast_product_ready(id, id) == id
    }

    /// Elements in enumeration (non-decreasing word length) order, forcing
    /// complete enumeration.
    pub fn enumerate_order(&mut self) -> &[ElementId] {
        self.run();
        &self.enumerate_order
    }
    /// Elements sorted by [`Element::less`], forcing complete enumeration.
    pub fn sorted_order(&mut self) -> Vec<ElementId> {
        self.run();
        let mut ids: Vec<ElementId> = self.elements.iter_keys().collect();
        ids.sort_by(|&a, &b| self.elements[a].less(&self.elements[b]));
        ids
    }

    /// A streaming iterator over the defining relations discovered so far, as
    /// raw `(i, g, k)` triples (or a duplicate-generator identification),
    /// forcing full enumeration first since relations reference the final
    /// Cayley graph. See `spec.md` §4.C "next_relation".
    pub fn next_relation(&mut self) -> super::relations::RelationsIter<'_, T> {
        self.run();
        super::relations::RelationsIter::new(self)
    }
    /// All currently known defining relations, as word pairs, forcing full
    /// enumeration. Built from [`Self::next_relation`] by converting each
    /// triple `(i, g, k)` into `(factorisation(i) ++ [g], factorisation(k))`
    /// (`spec.md` §4.E "Relations of a concrete semigroup").
    pub fn relations(&mut self) -> Vec<crate::word::Relation> {
        self.run();
        let mut out = Vec::new();
        let mut iter = super::relations::RelationsIter::new(self);
        let items: Vec<_> = std::iter::from_fn(|| iter.next()).collect();
        drop(iter);
        for item in items {
            match item {
                super::relations::NextRelation::DuplicateGenerator { letter, first } => {
                    out.push(crate::word::Relation::new(vec![letter], vec![first]));
                }
                super::relations::NextRelation::Rule { i, g, k } => {
                    let mut lhs = self.factorisation_of(i);
                    lhs.push(g);
                    let rhs = self.factorisation_of(k);
                    out.push(crate::word::Relation::new(lhs, rhs));
                }
            }
        }
        out
    }

    /// The number of idempotents, forcing complete enumeration.
    pub fn nr_idempotents(&mut self) -> usize {
        self.run();
        super::idempotents::count(self)
    }
    /// The ids of every idempotent element, forcing complete enumeration.
    pub fn idempotents(&mut self) -> Vec<ElementId> {
        self.run();
        super::idempotents::all(self)
    }

    pub(crate) fn scratch_mut(&mut self) -> &mut ScratchPool<T> {
        &mut self.scratch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Transformation;

    #[test]
    fn add_generator_grows_a_cyclic_semigroup_into_the_known_88_element_one() {
        let t1 = Transformation::new(vec![1, 3, 4, 2, 3]);
        let t2 = Transformation::new(vec![3, 2, 1, 3, 3]);
        let mut fp = FroidurePin::new(vec![t1]).unwrap();
        let before = fp.size();
        assert!(before < 88);
        fp.add_generator(t2).unwrap();
        assert_eq!(fp.size(), 88);
    }

    #[test]
    fn add_generators_reaches_the_same_size_as_constructing_with_all_generators_at_once() {
        let t1 = Transformation::new(vec![1, 3, 4, 2, 3]);
        let t2 = Transformation::new(vec![3, 2, 1, 3, 3]);
        let mut grown = FroidurePin::new(vec![t1.clone()]).unwrap();
        grown.add_generators(vec![t2.clone()]).unwrap();
        let mut built_whole = FroidurePin::new(vec![t1, t2]).unwrap();
        assert_eq!(grown.size(), built_whole.size());
    }
}
