//! The "P" strategy (`spec.md` §4.E "P — orbit of pairs"): starting from
//! the image, in some concrete semigroup, of each of the congruence's
//! generating pairs, closes a union-find over element positions under
//! left/right multiplication by every generator, as the congruence kind
//! dictates. Backs both the concrete-path `P` strategy and the
//! presentation-path `KBP` strategy, which differ only in which
//! [`ConcreteSemigroup`] they close pairs over.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use smgrp_util::ti::TypedIndex;

use crate::cancel::KillSwitch;
use crate::config::Config;
use crate::froidure_pin::ElementId;
use crate::stopwatch::Stopwatch;
use crate::word::{Relation, Word};

use super::concrete::ConcreteSemigroup;
use super::kind::CongruenceKind;

/// A union-find over `0..n`, path-halving on `find` and union-by-index
/// (always keeping the lower-numbered root), so that results are stable
/// regardless of merge order.
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Unions the classes of `a` and `b`, returning whether they were
    /// previously distinct.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (keep, drop) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[drop] = keep;
        true
    }
}

/// Orbit-of-pairs congruence enumeration over a boxed [`ConcreteSemigroup`].
///
/// The union-find spans the whole of `0..source.size()` from the start
/// (rather than the source's sparse `class_lookup` map plus a "every unseen
/// element is a singleton" correction — see `DESIGN.md`'s note on the §9
/// open question about `nr_classes`'s formula), so every element already
/// has a well-defined class, touched by the orbit closure or not.
pub(super) struct PairOrbit {
    kind: CongruenceKind,
    source: Arc<Mutex<Box<dyn ConcreteSemigroup>>>,
    nr_generators: usize,
    size: usize,
    uf: UnionFind,
    queue: VecDeque<(usize, usize)>,
    class_index: Vec<Option<usize>>,
    next_class: usize,
    done: bool,

    /// Wall-clock cap applied at the same dequeue-boundary suspension
    /// points as `killed`, set by [`Self::configure`].
    stopwatch: Option<Stopwatch>,
}

impl PairOrbit {
    pub(super) fn new(kind: CongruenceKind, source: Arc<Mutex<Box<dyn ConcreteSemigroup>>>, extra: &[Relation]) -> Self {
        let (nr_generators, size) = {
            let mut s = source.lock();
            let size = s.size();
            (s.nr_generators(), size)
        };
        let mut po = Self {
            kind,
            source,
            nr_generators,
            size,
            uf: UnionFind::new(size),
            queue: VecDeque::new(),
            class_index: vec![None; size],
            next_class: 0,
            done: false,
            stopwatch: None,
        };
        {
            let mut s = po.source.lock();
            for rel in extra {
                if let (Some(a), Some(b)) = (s.word_to_pos(&rel.lhs), s.word_to_pos(&rel.rhs)) {
                    po.queue.push_back((a.to_index(), b.to_index()));
                }
            }
        }
        po.done = po.queue.is_empty();
        po
    }

    fn close_one(&mut self, a: usize, b: usize, s: &mut dyn ConcreteSemigroup) {
        if !self.uf.union(a, b) {
            return;
        }
        let ai = ElementId::try_from_index(a).expect("position within bounds");
        let bi = ElementId::try_from_index(b).expect("position within bounds");
        for g in 0..self.nr_generators {
            let letter = g as u32;
            if matches!(self.kind, CongruenceKind::Left | CongruenceKind::TwoSided) {
                let na = s.left(ai, letter).to_index();
                let nb = s.left(bi, letter).to_index();
                self.queue.push_back((na, nb));
            }
            if matches!(self.kind, CongruenceKind::Right | CongruenceKind::TwoSided) {
                let na = s.right(ai, letter).to_index();
                let nb = s.right(bi, letter).to_index();
                self.queue.push_back((na, nb));
            }
        }
    }

    /// Applies `config`'s wall-clock cap (`spec.md` §5 "Timeouts").
    pub(super) fn configure(&mut self, config: &Config) {
        self.stopwatch = config.max_time().map(Stopwatch::with_limit);
    }

    /// Dequeues and closes up to `budget` pairs, polling `killed` between
    /// dequeues (`spec.md` §5 "between pair dequeues in P").
    pub(super) fn run_with_budget(&mut self, budget: usize, killed: &KillSwitch) {
        if self.done {
            return;
        }
        let mut s = self.source.lock();
        let mut processed = 0usize;
        while let Some((a, b)) = self.queue.pop_front() {
            self.close_one(a, b, s.as_mut());
            processed += 1;
            if processed >= budget || killed.is_killed() || self.stopwatch.is_some_and(|sw| sw.expired()) {
                return;
            }
        }
        self.done = true;
    }

    pub(super) fn is_done(&self) -> bool {
        self.done
    }

    fn run_to_completion(&mut self, killed: &KillSwitch) {
        while !self.done {
            self.run_with_budget(usize::MAX, killed);
            if killed.is_killed() {
                return;
            }
        }
    }

    fn class_of(&mut self, root: usize) -> usize {
        *self.class_index[root].get_or_insert_with(|| {
            let c = self.next_class;
            self.next_class += 1;
            c
        })
    }

    pub(super) fn word_to_class_index(&mut self, word: &Word) -> Option<usize> {
        let pos = self.source.lock().word_to_pos(word)?;
        let root = self.uf.find(pos.to_index());
        Some(self.class_of(root))
    }

    pub(super) fn nr_classes(&mut self, killed: &KillSwitch) -> usize {
        self.run_to_completion(killed);
        let mut roots: Vec<usize> = (0..self.size).map(|i| self.uf.find(i)).collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    /// Groups every element position by class, discarding singletons, and
    /// converts the survivors to their minimal factorisations (`spec.md`
    /// §4.E "P and KBP report nontrivial classes directly").
    pub(super) fn nontrivial_classes(&mut self, killed: &KillSwitch) -> Vec<Vec<Word>> {
        self.run_to_completion(killed);
        let mut groups: HashMap<usize, Vec<ElementId>> = HashMap::new();
        for i in 0..self.size {
            let root = self.uf.find(i);
            groups.entry(root).or_default().push(ElementId::try_from_index(i).expect("position within bounds"));
        }
        let mut s = self.source.lock();
        groups
            .into_values()
            .filter(|members| members.len() >= 2)
            .map(|members| members.into_iter().map(|id| s.factorisation(id)).collect())
            .collect()
    }

    /// The underlying semigroup's elements, for callers (e.g.
    /// `Congruence::nontrivial_classes` on the presentation path) that need
    /// to enumerate representatives of a congruence with no user-supplied
    /// concrete semigroup of its own.
    pub(super) fn source(&self) -> &Arc<Mutex<Box<dyn ConcreteSemigroup>>> {
        &self.source
    }
}
