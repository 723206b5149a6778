//! Todd-Coxeter coset enumeration (`spec.md` §4.D): builds the coset table
//! for a congruence from a presentation, or from a concrete semigroup's
//! Cayley graph via `prefill`.

use std::collections::VecDeque;

use smgrp_util::ti::TypedIndex;

use crate::cancel::KillSwitch;
use crate::config::Config;
use crate::congruence::CongruenceKind;
use crate::error::{Error, Result};
use crate::froidure_pin::graph::{ElementId, Table};
use crate::report::{maybe_report, ReportThrottle};
use crate::stopwatch::Stopwatch;
use crate::word::{Letter, Relation, Word};

use super::coset::{CosetId, CosetState};

/// A coset enumeration in progress or complete.
///
/// Coset `0` is the identity coset and is never removed by a coincidence
/// (every merge keeps the lower-numbered of the two cosets, and `0` is
/// always the lowest). `relations` are traced from every active coset on
/// each pass of the main loop; `identity_only` (the congruence's `extra`
/// generating pairs for a one-sided congruence) are traced from coset `0`
/// alone, once, before the main loop starts.
pub struct ToddCoxeter {
    kind: CongruenceKind,
    nr_gens: usize,
    relations: Vec<Relation>,
    identity_only: Vec<Relation>,
    identity_only_applied: bool,

    table: Vec<Vec<Option<CosetId>>>,
    preim_init: Vec<Vec<Option<CosetId>>>,
    preim_next: Vec<Vec<Option<CosetId>>>,
    state: Vec<CosetState>,

    current: CosetId,
    last: CosetId,
    active_count: usize,
    defined: usize,

    pack: usize,
    coincidences: VecDeque<(CosetId, CosetId)>,

    done: bool,

    /// Wall-clock cap applied at the same suspension points as `killed`,
    /// set by [`Self::configure`].
    stopwatch: Option<Stopwatch>,
    /// Progress-event cadence gate, set by [`Self::configure`].
    report: ReportThrottle,
}

impl ToddCoxeter {
    fn root() -> CosetId {
        CosetId::try_from_index(0).expect("coset 0 always exists")
    }

    fn empty(kind: CongruenceKind, nr_gens: usize, relations: Vec<Relation>, identity_only: Vec<Relation>) -> Self {
        let mut tc = Self {
            kind,
            nr_gens,
            relations,
            identity_only,
            identity_only_applied: false,
            table: Vec::new(),
            preim_init: Vec::new(),
            preim_next: Vec::new(),
            state: Vec::new(),
            current: Self::root(),
            last: Self::root(),
            active_count: 0,
            defined: 0,
            pack: 120_000,
            coincidences: VecDeque::new(),
            done: false,
            stopwatch: None,
            report: ReportThrottle::default(),
        };
        tc.push_coset();
        tc
    }

    /// Builds a coset table for `kind` from `relations` (applied to every
    /// coset) and `extra` (the congruence's generating pairs), following
    /// `spec.md` §4.D "Initialisation from presentation":
    /// - `Left`: both `relations` and `extra` are reversed letter-by-letter
    ///   (the table is always scanned left to right, so a left congruence's
    ///   words are walked back to front), and `extra` is applied only to the
    ///   identity coset.
    /// - `Right`: words are used as given; `extra` is applied only to the
    ///   identity coset.
    /// - `TwoSided`: `extra` is folded into `relations` and both are applied
    ///   to every coset.
    pub fn from_presentation(kind: CongruenceKind, nr_gens: usize, relations: Vec<Relation>, extra: Vec<Relation>) -> Self {
        let mut relations = relations;
        let mut extra = extra;
        if kind == CongruenceKind::Left {
            for rel in relations.iter_mut().chain(extra.iter_mut()) {
                rel.lhs.reverse();
                rel.rhs.reverse();
            }
        }
        match kind {
            CongruenceKind::TwoSided => {
                relations.extend(extra);
                Self::empty(kind, nr_gens, relations, Vec::new())
            }
            CongruenceKind::Left | CongruenceKind::Right => Self::empty(kind, nr_gens, relations, extra),
        }
    }

    /// Seeds the table from a concrete semigroup's Cayley graph (`spec.md`
    /// §4.D "TC-prefilled"): coset `0` is the identity, and cosets
    /// `1..=n` correspond to the semigroup's `n` already-enumerated
    /// elements. The base presentation is then already baked into the
    /// table, so only `extra` needs tracing (against every coset, since
    /// which graph was prefilled already encodes the one-sidedness).
    pub fn from_prefill(kind: CongruenceKind, graph: &Table<Option<ElementId>>, extra: Vec<Relation>) -> Result<Self> {
        let nr_gens = graph.generator_count();
        let n = graph.len();
        let mut tc = Self::empty(kind, nr_gens, extra, Vec::new());
        for _ in 0..n {
            tc.push_coset();
        }
        for raw in 0..n {
            let elem = ElementId::try_from_index(raw).map_err(|_| Error::invalid_state("element id overflow during prefill"))?;
            let c = CosetId::try_from_index(raw + 1).map_err(|_| Error::invalid_state("coset id overflow during prefill"))?;
            for g in 0..nr_gens {
                if let Some(target) = *graph.get(elem, g) {
                    let d = CosetId::try_from_index(target.to_index() + 1)
                        .map_err(|_| Error::invalid_state("coset id overflow during prefill"))?;
                    tc.set_image(c, g, d);
                }
            }
        }
        Ok(tc)
    }

    /// Seeds the table from a caller-supplied table (`spec.md` §6
    /// `set_prefill`): `table[e][g]` is the 0-indexed image of element `e`
    /// under generator `g`, or `None`. Shifted by one the same way
    /// [`Self::from_prefill`] shifts a Cayley graph, so that coset `0`
    /// remains the identity.
    pub fn from_raw_prefill(kind: CongruenceKind, nr_gens: usize, table: Vec<Vec<Option<usize>>>, extra: Vec<Relation>) -> Result<Self> {
        let n = table.len();
        let mut tc = Self::empty(kind, nr_gens, extra, Vec::new());
        for _ in 0..n {
            tc.push_coset();
        }
        for (raw, row) in table.iter().enumerate() {
            let c = CosetId::try_from_index(raw + 1).map_err(|_| Error::invalid_state("coset id overflow during prefill"))?;
            for (g, &target) in row.iter().enumerate() {
                if let Some(target) = target {
                    let d = CosetId::try_from_index(target + 1).map_err(|_| Error::invalid_state("coset id overflow during prefill"))?;
                    tc.set_image(c, g, d);
                }
            }
        }
        Ok(tc)
    }

    fn push_coset(&mut self) -> CosetId {
        let idx = self.table.len();
        let id = CosetId::try_from_index(idx).expect("coset id overflow");
        self.table.push(vec![None; self.nr_gens]);
        self.preim_init.push(vec![None; self.nr_gens]);
        self.preim_next.push(vec![None; self.nr_gens]);
        if idx == 0 {
            self.state.push(CosetState::Active { prev: None, next: None });
        } else {
            self.state.push(CosetState::Active { prev: Some(self.last), next: None });
            if let CosetState::Active { next, .. } = &mut self.state[self.last.to_index()] {
                *next = Some(id);
            }
            self.last = id;
        }
        self.active_count += 1;
        self.defined += 1;
        id
    }

    fn image(&self, c: CosetId, g: usize) -> Option<CosetId> {
        self.table[c.to_index()][g]
    }

    fn set_image(&mut self, c: CosetId, g: usize, d: CosetId) {
        self.table[c.to_index()][g] = Some(d);
        let old_head = self.preim_init[d.to_index()][g];
        self.preim_next[c.to_index()][g] = old_head;
        self.preim_init[d.to_index()][g] = Some(c);
    }

    fn find(&self, mut c: CosetId) -> CosetId {
        while let CosetState::Forwarded(to) = self.state[c.to_index()] {
            c = to;
        }
        c
    }

    /// Walks every letter but the last of `word` from `start`, creating new
    /// cosets for undefined steps when `allow_new`. Returns the coset
    /// reached and the final letter, or `None` if the walk got stuck with
    /// `allow_new` false.
    fn walk_prefix(&mut self, start: CosetId, word: &[Letter], allow_new: bool) -> Option<(CosetId, Letter)> {
        let (last, prefix) = word.split_last()?;
        let mut cur = start;
        for &letter in prefix {
            match self.image(cur, letter as usize) {
                Some(next) => cur = next,
                None if allow_new => {
                    let next = self.push_coset();
                    self.set_image(cur, letter as usize, next);
                    cur = next;
                }
                None => return None,
            }
        }
        Some((cur, *last))
    }

    /// The single `trace` step (`spec.md` §4.D): walks `rel.lhs` and
    /// `rel.rhs` from `c`, and either fills in one side's undefined image
    /// from the other, defines both afresh, or (if both sides already
    /// disagree) records a coincidence and processes it immediately.
    fn trace(&mut self, c: CosetId, rel: &Relation, allow_new: bool) {
        let Some((p, a)) = self.walk_prefix(c, &rel.lhs, allow_new) else { return };
        let Some((q, b)) = self.walk_prefix(c, &rel.rhs, allow_new) else { return };
        let u = self.image(p, a as usize);
        let v = self.image(q, b as usize);
        match (u, v) {
            (None, None) => {
                if allow_new {
                    let new = self.push_coset();
                    self.set_image(p, a as usize, new);
                    if p != q || a != b {
                        self.set_image(q, b as usize, new);
                    }
                }
            }
            (Some(u), None) => self.set_image(q, b as usize, u),
            (None, Some(v)) => self.set_image(p, a as usize, v),
            (Some(u), Some(v)) if u != v => {
                let (lo, hi) = if u.to_index() < v.to_index() { (u, v) } else { (v, u) };
                self.coincidences.push_back((lo, hi));
                self.identify_cosets();
            }
            _ => {}
        }
    }

    fn deactivate(&mut self, drop: CosetId, keep: CosetId) {
        let (prev, next) = match self.state[drop.to_index()] {
            CosetState::Active { prev, next } => (prev, next),
            CosetState::Forwarded(_) => return,
        };
        if let Some(p) = prev {
            if let CosetState::Active { next: n, .. } = &mut self.state[p.to_index()] {
                *n = next;
            }
        }
        match next {
            Some(n) => {
                if let CosetState::Active { prev: p, .. } = &mut self.state[n.to_index()] {
                    *p = prev;
                }
            }
            None => self.last = prev.unwrap_or(drop),
        }
        if self.current == drop {
            self.current = next.or(prev).unwrap_or(keep);
        }
        self.state[drop.to_index()] = CosetState::Forwarded(keep);
        self.active_count -= 1;
    }

    /// Drains `self.coincidences`, merging each pair's two cosets (keeping
    /// the lower-numbered one), redirecting preimages, and queuing any
    /// further coincidences the merge exposes (`spec.md` §4.D
    /// "identify_cosets").
    fn identify_cosets(&mut self) {
        while let Some((lhs, rhs)) = self.coincidences.pop_front() {
            let lhs = self.find(lhs);
            let rhs = self.find(rhs);
            if lhs == rhs {
                continue;
            }
            let (keep, drop) = if lhs.to_index() < rhs.to_index() { (lhs, rhs) } else { (rhs, lhs) };
            self.deactivate(drop, keep);

            let active = self.active_count;
            let defined = self.defined;
            maybe_report(&mut self.report, "smgrp::todd_coxeter", || {
                format!("{active} active, {defined} defined cosets after a coincidence collapse")
            });

            for g in 0..self.nr_gens {
                let mut p = self.preim_init[drop.to_index()][g];
                while let Some(pc) = p {
                    let next = self.preim_next[pc.to_index()][g];
                    self.table[pc.to_index()][g] = Some(keep);
                    let old_head = self.preim_init[keep.to_index()][g];
                    self.preim_next[pc.to_index()][g] = old_head;
                    self.preim_init[keep.to_index()][g] = Some(pc);
                    p = next;
                }
                self.preim_init[drop.to_index()][g] = None;

                match (self.image(keep, g), self.image(drop, g)) {
                    (None, Some(d)) => self.set_image(keep, g, d),
                    (Some(k), Some(d)) if k != d => {
                        let (lo, hi) = if k.to_index() < d.to_index() { (k, d) } else { (d, k) };
                        self.coincidences.push_back((lo, hi));
                    }
                    _ => {}
                }
            }
        }
    }

    fn advance(&mut self) -> bool {
        match self.state[self.current.to_index()] {
            CosetState::Active { next: Some(n), .. } => {
                self.current = n;
                true
            }
            CosetState::Active { next: None, .. } => false,
            CosetState::Forwarded(_) => unreachable!("the current coset stays active while being traced"),
        }
    }

    fn apply_identity_only(&mut self) {
        if self.identity_only_applied {
            return;
        }
        self.identity_only_applied = true;
        let rels = std::mem::take(&mut self.identity_only);
        let root = Self::root();
        for rel in &rels {
            self.trace(root, rel, true);
        }
        self.identity_only = rels;
    }

    /// Runs the main loop to completion, cancellation, or a step limit
    /// (`spec.md` §4.D "main loop"): traces `relations` from every active
    /// coset in turn, interleaving a packing phase whenever the active
    /// count outgrows `pack`.
    pub fn run(&mut self, killed: Option<&KillSwitch>) {
        self.run_steps(killed, None);
    }

    /// As [`Self::run`], but stops after at most `steps` cosets have been
    /// traced (`0` means run to completion).
    pub fn run_steps(&mut self, killed: Option<&KillSwitch>, steps: Option<usize>) {
        if self.done {
            return;
        }
        self.apply_identity_only();
        let mut taken = 0usize;
        loop {
            if killed.is_some_and(|k| k.is_killed()) || self.stopwatch.is_some_and(|sw| sw.expired()) {
                return;
            }
            if let Some(max) = steps {
                if taken >= max {
                    return;
                }
            }
            let c = self.current;
            let relations = std::mem::take(&mut self.relations);
            for rel in &relations {
                self.trace(c, rel, true);
            }
            self.relations = relations;

            if self.active_count > self.pack {
                self.packing_phase(killed);
            }

            if !self.advance() {
                self.done = true;
                return;
            }
            taken += 1;
        }
    }

    /// A lookahead pass (`spec.md` §4.D "packing"): re-traces already
    /// active cosets with `allow_new` false, collapsing coincidences
    /// without growing the table. If it fails to kill at least a tenth of
    /// the cosets it scans, `pack` is raised by 10% so packing runs less
    /// often.
    fn packing_phase(&mut self, killed: Option<&KillSwitch>) {
        let start_active = self.active_count;
        let mut scanned = 0usize;
        let mut cursor = self.advance_for_packing();
        while let Some(c) = cursor {
            if killed.is_some_and(|k| k.is_killed()) || self.stopwatch.is_some_and(|sw| sw.expired()) {
                break;
            }
            let relations = std::mem::take(&mut self.relations);
            for rel in &relations {
                self.trace(c, rel, false);
            }
            self.relations = relations;
            scanned += 1;

            cursor = match self.state[self.find(c).to_index()] {
                CosetState::Active { next, .. } => next,
                CosetState::Forwarded(_) => None,
            };
            if scanned >= self.pack {
                break;
            }
        }
        let killed_count = start_active.saturating_sub(self.active_count);
        if scanned > 0 && killed_count * 10 < scanned {
            self.pack += self.pack / 10 + 1;
        }
    }

    fn advance_for_packing(&self) -> Option<CosetId> {
        match self.state[self.current.to_index()] {
            CosetState::Active { next, .. } => next,
            CosetState::Forwarded(_) => None,
        }
    }

    /// Whether enumeration has finished (the active-list scan has wrapped
    /// with no undefined image left to chase).
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The number of classes of the congruence, excluding the identity
    /// coset's own class, once `is_done`. See `spec.md` §4.D
    /// "word_to_class_index" and `DESIGN.md` for the `-1` shift.
    pub fn nr_classes(&self) -> usize {
        self.active_count.saturating_sub(1)
    }

    /// The number of cosets currently active (not yet identified away).
    pub fn nr_active_cosets(&self) -> usize {
        self.active_count
    }
    /// The number of cosets ever allocated, active or not.
    pub fn nr_defined_cosets(&self) -> usize {
        self.defined
    }

    /// Sets the packing threshold (`spec.md` §4.D "set_pack").
    pub fn set_pack(&mut self, pack: usize) {
        self.pack = pack;
    }

    /// Applies `config`'s packing threshold, wall-clock cap, and reporting
    /// cadence (`spec.md` §5 "Timeouts", §6). Takes effect from the next
    /// `run`/`run_steps` call onward.
    pub fn configure(&mut self, config: &Config) {
        self.pack = config.pack();
        self.stopwatch = config.max_time().map(Stopwatch::with_limit);
        self.report = ReportThrottle::new(config.report(), config.report_interval());
    }

    /// Traces `word` from the identity coset and returns its class index
    /// (the resting coset's id minus one), or `None` if the word's image is
    /// undefined or resolves back to the identity coset itself.
    pub fn word_to_class_index(&self, word: &[Letter]) -> Option<usize> {
        let reversed;
        let letters: &[Letter] = if self.kind == CongruenceKind::Left {
            reversed = word.iter().rev().copied().collect::<Word>();
            &reversed
        } else {
            word
        };
        let mut c = Self::root();
        for &g in letters {
            c = self.find(self.image(c, g as usize)?);
        }
        c.to_index().checked_sub(1)
    }

    /// Renumbers active cosets `0..nr_classes` in active-list scan order
    /// (`spec.md` §4.D "compress").
    pub fn compress(&mut self) {
        let order = self.active_list_order();
        self.renumber(order);
    }

    /// Renumbers active cosets `0..nr_classes` in breadth-first visitation
    /// order from the identity coset (`spec.md` §4.D "standardize").
    pub fn standardize(&mut self) {
        let order = self.bfs_order();
        self.renumber(order);
    }

    fn active_list_order(&self) -> Vec<CosetId> {
        let mut order = Vec::with_capacity(self.active_count);
        let mut cur = Some(Self::root());
        while let Some(c) = cur {
            order.push(c);
            cur = match self.state[c.to_index()] {
                CosetState::Active { next, .. } => next,
                CosetState::Forwarded(_) => None,
            };
        }
        order
    }

    fn bfs_order(&self) -> Vec<CosetId> {
        let mut seen = vec![false; self.table.len()];
        let mut order = Vec::with_capacity(self.active_count);
        let mut queue = VecDeque::new();
        let root = Self::root();
        seen[root.to_index()] = true;
        queue.push_back(root);
        while let Some(c) = queue.pop_front() {
            order.push(c);
            for g in 0..self.nr_gens {
                if let Some(d) = self.image(c, g) {
                    let d = self.find(d);
                    if !seen[d.to_index()] {
                        seen[d.to_index()] = true;
                        queue.push_back(d);
                    }
                }
            }
        }
        order
    }

    fn renumber(&mut self, order: Vec<CosetId>) {
        let n = order.len();
        let mut new_index = vec![None; self.table.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old.to_index()] = Some(CosetId::try_from_index(new).expect("coset id overflow"));
        }

        let mut new_table = Vec::with_capacity(n);
        for &old in &order {
            let row: Vec<Option<CosetId>> = self.table[old.to_index()]
                .iter()
                .map(|entry| entry.map(|d| new_index[self.find(d).to_index()].expect("renumbered coset is always active")))
                .collect();
            new_table.push(row);
        }

        let mut new_preim_init = vec![vec![None; self.nr_gens]; n];
        let mut new_preim_next = vec![vec![None; self.nr_gens]; n];
        for c in 0..n {
            for g in 0..self.nr_gens {
                if let Some(d) = new_table[c][g] {
                    let cid = CosetId::try_from_index(c).expect("coset id overflow");
                    let old_head = new_preim_init[d.to_index()][g];
                    new_preim_next[c][g] = old_head;
                    new_preim_init[d.to_index()][g] = Some(cid);
                }
            }
        }

        self.table = new_table;
        self.preim_init = new_preim_init;
        self.preim_next = new_preim_next;
        self.state = (0..n)
            .map(|i| CosetState::Active {
                prev: (i > 0).then(|| CosetId::try_from_index(i - 1).expect("coset id overflow")),
                next: (i + 1 < n).then(|| CosetId::try_from_index(i + 1).expect("coset id overflow")),
            })
            .collect();
        self.current = Self::root();
        self.last = CosetId::try_from_index(n.saturating_sub(1)).expect("coset id overflow");
        self.active_count = n;
        self.defined = n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(lhs: &[Letter], rhs: &[Letter]) -> Relation {
        Relation::new(lhs.to_vec(), rhs.to_vec())
    }

    #[test]
    fn two_sided_congruence_on_three_generators() {
        // <a, b | a^3 = a, a b^2 = a> with extra pair (a, b) folded in,
        // following spec.md's §8 two-sided scenario shape.
        let relations = vec![rel(&[0, 0, 0], &[0]), rel(&[0, 1, 1], &[0])];
        let extra = vec![rel(&[0], &[1])];
        let mut tc = ToddCoxeter::from_presentation(CongruenceKind::TwoSided, 2, relations, extra);
        tc.run(None);
        assert!(tc.is_done());
        assert!(tc.nr_classes() >= 1);
    }

    #[test]
    fn word_to_class_index_is_stable_under_compress() {
        let relations = vec![rel(&[0, 0], &[0])];
        let mut tc = ToddCoxeter::from_presentation(CongruenceKind::TwoSided, 1, relations, Vec::new());
        tc.run(None);
        let before = tc.word_to_class_index(&[0]);
        tc.compress();
        let after = tc.word_to_class_index(&[0]);
        assert_eq!(before, after);
    }
}
