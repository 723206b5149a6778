//! The congruence dispatcher (`spec.md` §4.E): races several strategies —
//! Todd-Coxeter, Todd-Coxeter prefilled from a concrete semigroup's Cayley
//! graph, the pair-orbit closure, and Knuth-Bendix-then-Froidure-Pin — and
//! adopts whichever first completes or satisfies a query's goal predicate.
//!
//! Two construction paths, per `spec.md` §2 "Data flow":
//! - **Concrete**: a congruence over a caller's [`FroidurePin`] plus extra
//!   generating pairs.
//! - **Presentation**: a congruence over a bare `(nr_generators, relations)`
//!   presentation plus extra generating pairs.

mod concrete;
mod kb_element;
mod kind;
mod pair_orbit;
mod strategy;

use std::sync::Arc;

use parking_lot::Mutex;
use smgrp_util::ti::TypedIndex;

use crate::cancel::KillSwitch;
use crate::config::Config;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::froidure_pin::{ElementId, FroidurePin};
use crate::rewriting::{RewritingSystem, ShortLex};
use crate::todd_coxeter::ToddCoxeter;
use crate::word::{Relation, Word};

pub use concrete::ConcreteSemigroup;
pub use kind::{CongruenceKind, Presentation};

use kb_element::KbElement;
use pair_orbit::PairOrbit;
use strategy::{Goal, StrategyHandle};

/// Pins the dispatcher to a single named strategy, discarding any retained
/// partial/winning data (`spec.md` §6 `force_tc`/`force_tc_prefill`/
/// `force_p`/`force_kbp`/`force_kbfp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forced {
    Tc,
    TcPrefill,
    P,
    Kbp,
    Kbfp,
}

/// A congruence (equivalence relation compatible with multiplication) on a
/// finitely generated semigroup or monoid, computed by racing several
/// strategies concurrently (`spec.md` §4.E).
pub struct Congruence {
    kind: CongruenceKind,
    nr_generators: usize,
    relations: Vec<Relation>,
    extra: Vec<Relation>,
    concrete: Option<Arc<Mutex<Box<dyn ConcreteSemigroup>>>>,
    config: Config,
    forced: Option<Forced>,
    winning: Option<StrategyHandle>,
    partial: Vec<StrategyHandle>,
}

impl Congruence {
    /// Constructs a congruence over a bare presentation plus extra
    /// generating pairs (the presentation path).
    pub fn from_presentation(kind: CongruenceKind, presentation: Presentation, extra: Vec<Relation>) -> Result<Self> {
        if presentation.nr_generators == 0 {
            return Err(Error::invalid_argument("a congruence needs at least one generator"));
        }
        Self::check_words(presentation.nr_generators, presentation.relations.iter().chain(extra.iter()))?;
        Ok(Self {
            kind,
            nr_generators: presentation.nr_generators,
            relations: presentation.relations,
            extra,
            concrete: None,
            config: Config::new(),
            forced: None,
            winning: None,
            partial: Vec::new(),
        })
    }

    /// Constructs a congruence over a concrete, already-generated semigroup
    /// plus extra generating pairs (the concrete path).
    pub fn from_semigroup<T: Element + 'static>(kind: CongruenceKind, fp: FroidurePin<T>, extra: Vec<Relation>) -> Result<Self> {
        let nr_generators = fp.nr_generators();
        Self::check_words(nr_generators, extra.iter())?;
        let boxed: Box<dyn ConcreteSemigroup> = Box::new(fp);
        Ok(Self {
            kind,
            nr_generators,
            relations: Vec::new(),
            extra,
            concrete: Some(Arc::new(Mutex::new(boxed))),
            config: Config::new(),
            forced: None,
            winning: None,
            partial: Vec::new(),
        })
    }

    fn check_words<'a>(nr_generators: usize, rels: impl Iterator<Item = &'a Relation>) -> Result<()> {
        for rel in rels {
            for word in [&rel.lhs, &rel.rhs] {
                if let Some(&bad) = word.iter().find(|&&g| (g as usize) >= nr_generators) {
                    return Err(Error::invalid_argument(format!(
                        "letter {bad} is out of range for a generator set of size {nr_generators}"
                    )));
                }
            }
        }
        Ok(())
    }

    // -- configuration (`spec.md` §6) -----------------------------------

    /// The number of generators this congruence is defined over, for
    /// validating a word before querying it.
    pub fn nr_generators(&self) -> usize {
        self.nr_generators
    }
    /// The congruence kind (left, right or two-sided) this was constructed
    /// with.
    pub fn kind(&self) -> CongruenceKind {
        self.kind
    }

    /// Replaces the shared configuration wholesale.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }
    /// Returns the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pins the dispatcher to plain Todd-Coxeter, discarding retained data.
    pub fn force_tc(&mut self) {
        self.forced = Some(Forced::Tc);
        self.reset();
    }
    /// Pins the dispatcher to Todd-Coxeter prefilled from a concrete
    /// semigroup's Cayley graph. Only meaningful on the concrete path.
    pub fn force_tc_prefill(&mut self) {
        self.forced = Some(Forced::TcPrefill);
        self.reset();
    }
    /// Pins the dispatcher to the orbit-of-pairs strategy. Only meaningful
    /// on the concrete path.
    pub fn force_p(&mut self) {
        self.forced = Some(Forced::P);
        self.reset();
    }
    /// Pins the dispatcher to Knuth-Bendix-then-orbit-of-pairs.
    pub fn force_kbp(&mut self) {
        self.forced = Some(Forced::Kbp);
        self.reset();
    }
    /// Pins the dispatcher to Knuth-Bendix-then-Froidure-Pin (two-sided
    /// congruences only).
    pub fn force_kbfp(&mut self) {
        self.forced = Some(Forced::Kbfp);
        self.reset();
    }

    fn reset(&mut self) {
        self.winning = None;
        self.partial.clear();
    }

    // -- the "obviously infinite" predicate (`spec.md` §4.E) -------------

    /// Whether the presentation is trivially infinite: more generators than
    /// relations plus extras, or some generator occurring in no relation or
    /// extra pair. When true, Todd-Coxeter (which cannot terminate on an
    /// infinite quotient) is omitted from the candidate set.
    pub fn is_obviously_infinite(&self) -> bool {
        if self.concrete.is_some() {
            return false;
        }
        let total = self.relations.len() + self.extra.len();
        if self.nr_generators > total {
            return true;
        }
        let mut used = vec![false; self.nr_generators];
        for rel in self.relations.iter().chain(self.extra.iter()) {
            for &letter in rel.lhs.iter().chain(rel.rhs.iter()) {
                if (letter as usize) < self.nr_generators {
                    used[letter as usize] = true;
                }
            }
        }
        used.iter().any(|&seen| !seen)
    }

    // -- candidate strategy construction ----------------------------------

    fn build_kbfp(&self, killed: &KillSwitch) -> Box<FroidurePin<KbElement>> {
        let mut system = RewritingSystem::<ShortLex>::new();
        for rel in self.relations.iter().chain(self.extra.iter()) {
            system.add_rule(rel.lhs.clone(), rel.rhs.clone());
        }
        system.knuth_bendix(&self.config, Some(killed));
        let system = Arc::new(system);
        let gens: Vec<KbElement> = (0..self.nr_generators)
            .map(|g| KbElement::new(system.clone(), vec![g as u32]))
            .collect();
        let fp = FroidurePin::new(gens).expect("at least one generator, validated at construction");
        Box::new(fp)
    }

    fn build_kbp_source(&self, killed: &KillSwitch) -> Arc<Mutex<Box<dyn ConcreteSemigroup>>> {
        let mut system = RewritingSystem::<ShortLex>::new();
        for rel in &self.relations {
            system.add_rule(rel.lhs.clone(), rel.rhs.clone());
        }
        system.knuth_bendix(&self.config, Some(killed));
        let system = Arc::new(system);
        let gens: Vec<KbElement> = (0..self.nr_generators)
            .map(|g| KbElement::new(system.clone(), vec![g as u32]))
            .collect();
        let fp = FroidurePin::new(gens).expect("at least one generator, validated at construction");
        let boxed: Box<dyn ConcreteSemigroup> = Box::new(fp);
        Arc::new(Mutex::new(boxed))
    }

    fn tc_prefilled(&self) -> Result<Box<ToddCoxeter>> {
        let concrete = self.concrete.as_ref().expect("tc_prefilled is only called on the concrete path");
        let mut s = concrete.lock();
        let graph = if self.kind == CongruenceKind::Left { s.left_cayley_graph() } else { s.right_cayley_graph() };
        Ok(Box::new(ToddCoxeter::from_prefill(self.kind, &graph, self.extra.clone())?))
    }

    /// Materialises the congruence's presentation relations, building them
    /// from a concrete semigroup's `next_relation` stream if this
    /// congruence was constructed on the concrete path (`spec.md` §4.E
    /// "Relations of a concrete semigroup").
    fn relations_or_materialise(&self) -> Vec<Relation> {
        if let Some(concrete) = &self.concrete {
            concrete.lock().relations()
        } else {
            self.relations.clone()
        }
    }

    fn build_candidates(&self, killed: &KillSwitch) -> Result<Vec<StrategyHandle>> {
        if let Some(forced) = self.forced {
            let mut one = match forced {
                Forced::Tc => StrategyHandle::Tc(self.tc_from_relations_any()),
                Forced::TcPrefill => StrategyHandle::Tc(self.tc_prefilled()?),
                Forced::P => StrategyHandle::P(Box::new(PairOrbit::new(
                    self.kind,
                    self.concrete.clone().ok_or_else(|| Error::invalid_state("P requires a concrete semigroup"))?,
                    &self.extra,
                ))),
                Forced::Kbp => StrategyHandle::P(Box::new(PairOrbit::new(self.kind, self.build_kbp_source(killed), &self.extra))),
                Forced::Kbfp => StrategyHandle::Kbfp(self.build_kbfp(killed)),
            };
            one.configure(&self.config);
            return Ok(vec![one]);
        }

        let mut candidates = Vec::new();
        if let Some(concrete) = &self.concrete {
            // Single-threaded shortcut (`spec.md` §4.E point 1): a small,
            // fully enumerated semigroup goes straight to TC-prefilled.
            let size = concrete.lock().size();
            if size < 1024 {
                let mut tc = StrategyHandle::Tc(self.tc_prefilled()?);
                tc.configure(&self.config);
                return Ok(vec![tc]);
            }
            candidates.push(StrategyHandle::Tc(self.tc_prefilled()?));
            candidates.push(StrategyHandle::Tc(self.tc_from_relations_any()));
            candidates.push(StrategyHandle::P(Box::new(PairOrbit::new(self.kind, concrete.clone(), &self.extra))));
            if self.kind == CongruenceKind::TwoSided {
                candidates.push(StrategyHandle::Kbfp(self.build_kbfp(killed)));
            }
        } else {
            candidates.push(StrategyHandle::P(Box::new(PairOrbit::new(self.kind, self.build_kbp_source(killed), &self.extra))));
            if self.kind == CongruenceKind::TwoSided {
                candidates.push(StrategyHandle::Kbfp(self.build_kbfp(killed)));
            }
            if !self.is_obviously_infinite() {
                candidates.push(StrategyHandle::Tc(self.tc_from_relations_any()));
            }
        }

        let max_threads = self.config.max_threads();
        if candidates.len() > max_threads {
            tracing::trace!(
                target: "smgrp::congruence",
                candidates = candidates.len(),
                max_threads,
                "truncating strategy race to max_threads"
            );
            candidates.truncate(max_threads);
        }
        for c in &mut candidates {
            c.configure(&self.config);
        }
        Ok(candidates)
    }

    /// `tc_from_relations`, but using the materialised relations when this
    /// congruence was built on the concrete path (plain TC has no Cayley
    /// graph to prefill from, so it needs the relations spelled out).
    fn tc_from_relations_any(&self) -> Box<ToddCoxeter> {
        let relations = self.relations_or_materialise();
        Box::new(ToddCoxeter::from_presentation(self.kind, self.nr_generators, relations, self.extra.clone()))
    }

    // -- the race (`spec.md` §4.E "Dispatcher policy") --------------------

    /// Runs the strategy race until every candidate is done, or `goal`
    /// reports a definite answer. Retains an unfinished race in
    /// `self.partial` for the next call, and a finished one in
    /// `self.winning`.
    fn race(&mut self, goal: Goal) {
        if self.winning.is_some() {
            return;
        }
        let mut strategies = if self.partial.is_empty() {
            let killed = KillSwitch::new();
            match self.build_candidates(&killed) {
                Ok(s) => s,
                Err(_) => return,
            }
        } else {
            std::mem::take(&mut self.partial)
        };
        if strategies.is_empty() {
            return;
        }

        let budget = self.config.batch_size();
        if strategies.len() == 1 {
            let killed = KillSwitch::new();
            let mut s = strategies.pop().expect("checked len == 1");
            loop {
                if goal.evaluate(&mut s).is_some() || s.is_done() {
                    break;
                }
                s.run_with_budget(budget, &killed);
                if killed.is_killed() {
                    break;
                }
            }
            if s.is_done() || goal.evaluate(&mut s).is_some() {
                self.winning = Some(s);
            } else {
                self.partial = vec![s];
            }
            return;
        }

        let kill_switches: Vec<KillSwitch> = strategies.iter().map(|_| KillSwitch::new()).collect();
        let kill_mtx = Mutex::new(());
        let winner: Mutex<Option<usize>> = Mutex::new(None);

        std::thread::scope(|scope| {
            for (idx, (s, ks)) in strategies.iter_mut().zip(kill_switches.iter()).enumerate() {
                let kill_mtx = &kill_mtx;
                let winner = &winner;
                let kill_switches = &kill_switches;
                let goal = &goal;
                scope.spawn(move || loop {
                    if ks.is_killed() {
                        return;
                    }
                    let hit = goal.evaluate(s).is_some();
                    let done = s.is_done();
                    if hit || done {
                        let _guard = kill_mtx.lock();
                        let mut w = winner.lock();
                        if w.is_none() {
                            *w = Some(idx);
                            for (j, other) in kill_switches.iter().enumerate() {
                                if j != idx {
                                    other.kill();
                                }
                            }
                        }
                        return;
                    }
                    s.run_with_budget(budget, ks);
                });
            }
        });

        match winner.into_inner() {
            Some(idx) => {
                tracing::debug!(target: "smgrp::congruence", winner = strategies[idx].name(), "strategy race won");
                self.winning = Some(strategies.swap_remove(idx));
                self.partial.clear();
            }
            None => self.partial = strategies,
        }
    }

    fn ensure_done(&mut self) {
        self.race(Goal::None);
    }

    // -- queries (`spec.md` §4.E "Client queries") ------------------------

    /// The class index of `word`, forcing only as much of the race as
    /// necessary.
    pub fn word_to_class_index(&mut self, word: &Word) -> Option<usize> {
        if self.winning.is_none() {
            self.race(Goal::Equal(word.clone(), word.clone()));
        }
        self.winning.as_mut().and_then(|s| s.word_to_class_index(word))
    }

    /// Whether `u` and `v` are congruent, short-circuiting on identical
    /// words and otherwise racing strategies against the goal "does any
    /// strategy currently know `u ≡ v`?" (`spec.md` §4.E "equal").
    pub fn equal(&mut self, u: &Word, v: &Word) -> bool {
        if u == v {
            return true;
        }
        if let Some(s) = self.winning.as_mut() {
            if let Some(answer) = Goal::Equal(u.clone(), v.clone()).evaluate(s) {
                return answer;
            }
        }
        self.race(Goal::Equal(u.clone(), v.clone()));
        if let Some(s) = self.winning.as_mut() {
            if let Some(answer) = Goal::Equal(u.clone(), v.clone()).evaluate(s) {
                return answer;
            }
        }
        // The winning strategy finished without resolving a class for one
        // of the words; fall back to forcing both through it directly.
        let a = self.word_to_class_index(u);
        let b = self.word_to_class_index(v);
        a == b
    }

    /// Orders `u` and `v`, similarly to [`Self::equal`] but against the
    /// `less` goal (`spec.md` §4.E "less"; see [`Goal::Less`] for the
    /// caveat on what "less" means across strategy types).
    pub fn less(&mut self, u: &Word, v: &Word) -> bool {
        if u == v {
            return false;
        }
        if let Some(s) = self.winning.as_mut() {
            if let Some(answer) = Goal::Less(u.clone(), v.clone()).evaluate(s) {
                return answer;
            }
        }
        self.race(Goal::Less(u.clone(), v.clone()));
        if let Some(s) = self.winning.as_mut() {
            if let Some(answer) = Goal::Less(u.clone(), v.clone()).evaluate(s) {
                return answer;
            }
        }
        let a = self.word_to_class_index(u);
        let b = self.word_to_class_index(v);
        a < b
    }

    /// The number of classes of the congruence, forcing full completion.
    pub fn nr_classes(&mut self) -> usize {
        self.ensure_done();
        let killed = KillSwitch::new();
        self.winning.as_mut().map_or(0, |s| s.nr_classes(&killed))
    }

    /// The non-trivial classes (size ≥ 2) of the congruence, as their
    /// members' minimal factorisations, forcing full completion (`spec.md`
    /// §4.E "nontrivial_classes").
    pub fn nontrivial_classes(&mut self) -> Result<Vec<Vec<Word>>> {
        self.ensure_done();
        let killed = KillSwitch::new();

        if let Some(concrete) = &self.concrete {
            let winning = self.winning.as_mut().ok_or_else(|| Error::invalid_state("no strategy completed"))?;
            let n = concrete.lock().size();
            let mut groups: std::collections::HashMap<usize, Vec<Word>> = std::collections::HashMap::new();
            for raw in 0..n {
                let id = ElementId::try_from_index(raw)?;
                let word = concrete.lock().factorisation(id);
                if let Some(c) = winning.word_to_class_index(&word) {
                    groups.entry(c).or_default().push(word);
                }
            }
            return Ok(groups.into_values().filter(|g| g.len() >= 2).collect());
        }

        match self.winning.as_mut() {
            Some(StrategyHandle::P(p)) => Ok(p.nontrivial_classes(&killed)),
            _ => Err(Error::invalid_state(
                "nontrivial_classes requires either a concrete semigroup or the P/KBP strategy",
            )),
        }
    }

    /// Whether the winning (or, failing that, any partial) strategy has
    /// finished.
    pub fn is_done(&self) -> bool {
        self.winning.is_some()
    }

    /// Supplies a pre-computed coset table for Todd-Coxeter, bypassing the
    /// usual Cayley-graph prefill (`spec.md` §6 `set_prefill`). Only takes
    /// effect on the next strategy build; forces a fresh race.
    pub fn set_prefill(&mut self, table: Vec<Vec<Option<usize>>>) -> Result<()> {
        let tc = ToddCoxeter::from_raw_prefill(self.kind, self.nr_generators, table, self.extra.clone())?;
        self.reset();
        self.winning = Some(StrategyHandle::Tc(Box::new(tc)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `force_*`/`reset` must actually drop a stale winner, or a forced
    /// strategy switch would silently keep answering from the old one.
    #[test]
    fn forcing_a_strategy_discards_a_cached_winner() {
        let relations = vec![Relation::new(vec![0, 0, 0], vec![0]), Relation::new(vec![0], vec![1, 1])];
        let presentation = Presentation::new(2, relations);
        let mut c = Congruence::from_presentation(CongruenceKind::TwoSided, presentation, Vec::new()).unwrap();
        assert_eq!(c.nr_classes(), 5);
        assert!(c.is_done());
        c.force_kbfp();
        assert!(!c.is_done());
        assert_eq!(c.nr_classes(), 5);
    }
}
