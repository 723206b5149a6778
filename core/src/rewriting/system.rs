//! Knuth-Bendix completion of a string rewriting system (`spec.md` §4.B).
//!
//! Grounded on `original_source/src/rws.h`/`rws.cc`: the active-rules
//! container is a `slab::Slab<Rule>` rather than the source's intrusive
//! linked list — `Slab::remove` already returns a slot to an internal free
//! list that `Slab::insert` reuses, which is exactly the "inactive rules
//! form a free pool" invariant `spec.md` §3 describes, so no separate
//! active/inactive flag is needed: presence in the slab *is* activeness.

use std::collections::VecDeque;

use slab::Slab;

use crate::cancel::KillSwitch;
use crate::config::{Config, OverlapMeasure};
use crate::report::{maybe_report, ReportThrottle};
use crate::stopwatch::Stopwatch;
use crate::word::{Letter, Relation, Word};

use super::ordering::{ReductionOrdering, ShortLex};
use super::rule::{contains_subword, Rule};

/// Result of a [`RewritingSystem::knuth_bendix`] run: the "completed |
/// cancelled | failed" discriminant `spec.md` §9 asks every long-running
/// call to return instead of throwing on cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Completion ran to confluence.
    Confluent,
    /// A configured cap (`max_rules`, `max_overlap`'s effect on every
    /// overlap, or `max_time`) was reached before confluence.
    LimitReached,
    /// The external kill switch was observed set.
    Cancelled,
}

/// A string rewriting system over words of [`Letter`]s, completed (or
/// partially completed) by Knuth-Bendix.
#[derive(Debug, Clone)]
pub struct RewritingSystem<O: ReductionOrdering = ShortLex> {
    ordering: O,
    rules: Slab<Rule>,
    stack: Vec<Rule>,
    identity: Option<Word>,
    confluence_known: bool,
    is_confluent: bool,
}

impl RewritingSystem<ShortLex> {
    /// Constructs an empty system under the default shortlex ordering.
    pub fn new() -> Self {
        Self::with_ordering(ShortLex)
    }
}

impl Default for RewritingSystem<ShortLex> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ReductionOrdering> RewritingSystem<O> {
    /// Constructs an empty system under a caller-supplied ordering.
    pub fn with_ordering(ordering: O) -> Self {
        Self {
            ordering,
            rules: Slab::new(),
            stack: Vec::new(),
            identity: None,
            confluence_known: true,
            is_confluent: true,
        }
    }

    /// Constructs a system from an initial set of relations, normalising
    /// each through [`Self::add_rule`].
    pub fn from_relations(ordering: O, relations: impl IntoIterator<Item = Relation>) -> Self {
        let mut rs = Self::with_ordering(ordering);
        for r in relations {
            rs.add_rule(r.lhs, r.rhs);
        }
        rs
    }

    /// Declares `word` to behave as the monoid identity, seeding a
    /// length-reducing rule `word -> ε`. `spec.md` §4.B "(added)"; grounded
    /// on `original_source/src/rws.h`'s `set_id`, used by presentations of
    /// monoids (e.g. the dihedral and bicyclic scenarios in `spec.md` §8)
    /// whose relations alone would otherwise leave the identity word
    /// unreduced.
    pub fn set_identity(&mut self, word: Word) {
        self.identity = Some(word.clone());
        if !word.is_empty() {
            self.add_rule(word, Word::new());
        }
    }
    /// Returns the identity word set by [`Self::set_identity`], if any.
    pub fn identity(&self) -> Option<&Word> {
        self.identity.as_ref()
    }

    /// Adds a new rule. No-op if `l == r`. Otherwise normalises so the
    /// greater side (under the ordering) is the left-hand side, pushes it
    /// onto the pending stack, and drains the stack immediately.
    pub fn add_rule(&mut self, l: Word, r: Word) {
        if l == r {
            return;
        }
        let (lhs, rhs) = if self.ordering.less(&l, &r) { (r, l) } else { (l, r) };
        self.stack.push(Rule { lhs, rhs });
        self.clear_stack();
    }

    /// Drains the pending-rule stack: each rule is re-reduced under the
    /// current active rules, and if its reduction is still non-trivial, any
    /// active rule whose lhs or rhs contains the new rule's lhs as a
    /// substring is pulled back out and re-pushed for reprocessing before
    /// the new rule is inserted (`spec.md` §4.B point 1, and the invariant
    /// in §3: "after `clear_stack` completes, every active rule is
    /// reduced").
    fn clear_stack(&mut self) {
        while let Some(mut rule) = self.stack.pop() {
            rule.lhs = self.rewrite_word(&rule.lhs);
            rule.rhs = self.rewrite_word(&rule.rhs);
            if rule.lhs == rule.rhs {
                continue;
            }
            if self.ordering.less(&rule.lhs, &rule.rhs) {
                std::mem::swap(&mut rule.lhs, &mut rule.rhs);
            }

            let affected: Vec<usize> = self
                .rules
                .iter()
                .filter(|(_, r)| contains_subword(&r.lhs, &rule.lhs) || contains_subword(&r.rhs, &rule.lhs))
                .map(|(key, _)| key)
                .collect();
            for key in affected {
                self.stack.push(self.rules.remove(key));
            }

            self.rules.insert(rule);
            self.confluence_known = false;
        }
    }

    /// Reduces `word` to its normal form under the current active rules,
    /// using the two-sliding-window algorithm of `spec.md` §4.B: `v` holds
    /// the fully reduced prefix, `w` the unprocessed suffix. One symbol is
    /// advanced from `w` into `v` at a time; after each advance every active
    /// rule is checked against the tail of `v`, and a hit rewinds `v` and
    /// prepends the rule's rhs back onto `w`.
    pub fn rewrite_word(&self, word: &[Letter]) -> Word {
        let mut v: Word = Vec::with_capacity(word.len());
        let mut w: VecDeque<Letter> = word.iter().copied().collect();

        while let Some(next) = w.pop_front() {
            v.push(next);
            loop {
                let hit = self
                    .rules
                    .iter()
                    .find(|(_, rule)| v.len() >= rule.lhs.len() && v.ends_with(&rule.lhs))
                    .map(|(_, rule)| rule.clone());
                match hit {
                    Some(rule) => {
                        v.truncate(v.len() - rule.lhs.len());
                        for &letter in rule.rhs.iter().rev() {
                            w.push_front(letter);
                        }
                    }
                    None => break,
                }
            }
        }
        v
    }
    /// In-place form of [`Self::rewrite_word`].
    pub fn rewrite(&self, word: &mut Word) {
        *word = self.rewrite_word(word);
    }

    /// Whether `u` and `v` rewrite to the same normal form.
    pub fn equal(&self, u: &[Letter], v: &[Letter]) -> bool {
        self.rewrite_word(u) == self.rewrite_word(v)
    }
    /// Orders `u` and `v` by the reduction ordering applied to their normal
    /// forms.
    pub fn less(&self, u: &[Letter], v: &[Letter]) -> bool {
        self.ordering.less(&self.rewrite_word(u), &self.rewrite_word(v))
    }

    /// The active rules, in a stable (insertion-ish) order.
    pub fn rules(&self) -> Vec<Relation> {
        self.rules.iter().map(|(_, r)| Relation::new(r.lhs.clone(), r.rhs.clone())).collect()
    }
    /// The number of currently active rules.
    pub fn nr_active_rules(&self) -> usize {
        self.rules.len()
    }
    /// The number of slots in the inactive-rule free pool (slab capacity
    /// not currently occupied by an active rule).
    pub fn nr_inactive_rules(&self) -> usize {
        self.rules.capacity() - self.rules.len()
    }

    /// Runs completion until confluent, cancelled, or a configured cap is
    /// reached. See `spec.md` §4.B "Completion algorithm".
    pub fn knuth_bendix(&mut self, config: &Config, killed: Option<&KillSwitch>) -> Outcome {
        let stopwatch = config.max_time().map(Stopwatch::with_limit);
        let mut report = ReportThrottle::new(config.report(), config.report_interval());

        let initial: Vec<Rule> = self.rules.iter().map(|(_, r)| r.clone()).collect();
        self.stack.extend(initial);
        self.clear_stack();

        if killed.is_some_and(|k| k.is_killed()) {
            return Outcome::Cancelled;
        }

        let mut rules_since_check = 0usize;
        loop {
            if killed.is_some_and(|k| k.is_killed()) {
                return Outcome::Cancelled;
            }
            if stopwatch.is_some_and(|sw| sw.expired()) {
                return Outcome::LimitReached;
            }
            if self.rules.len() > config.max_rules() {
                return Outcome::LimitReached;
            }

            let snapshot: Vec<Rule> = self.rules.iter().map(|(_, r)| r.clone()).collect();
            let before = snapshot.len();
            let mut found_overlap = false;

            for (primary_idx, primary) in snapshot.iter().enumerate() {
                for secondary in &snapshot[..=primary_idx] {
                    if self.overlap(primary, secondary, config) {
                        found_overlap = true;
                    }
                    if !std::ptr::eq(primary, secondary) && self.overlap(secondary, primary, config) {
                        found_overlap = true;
                    }
                    if killed.is_some_and(|k| k.is_killed()) {
                        self.clear_stack();
                        return Outcome::Cancelled;
                    }
                }
                if self.stack.len() >= 256 {
                    self.clear_stack();
                }
            }
            self.clear_stack();

            rules_since_check += 1;
            let active = self.rules.len();
            maybe_report(&mut report, "smgrp::rewriting", || format!("{active} active rules after an overlap pass"));
            if let Some(interval) = config.check_confluence_interval() {
                if interval > 0 && rules_since_check % interval == 0 && self.confluent_with_cancel(killed) {
                    return Outcome::Confluent;
                }
            }

            if !found_overlap && self.rules.len() == before {
                self.is_confluent = true;
                self.confluence_known = true;
                return Outcome::Confluent;
            }
        }
    }

    /// Pushes every non-trivial critical-pair rule arising from overlapping
    /// `primary`'s lhs against `secondary`'s lhs (a non-empty suffix of
    /// `primary.lhs` equal to a prefix of `secondary.lhs`) onto the stack,
    /// subject to `config`'s overlap measure/cap. Returns whether any rule
    /// was pushed.
    fn overlap(&mut self, primary: &Rule, secondary: &Rule, config: &Config) -> bool {
        let mut found = false;
        let max_suffix = primary.lhs.len().min(secondary.lhs.len());
        for suffix_len in 1..=max_suffix {
            if primary.lhs[primary.lhs.len() - suffix_len..] != secondary.lhs[..suffix_len] {
                continue;
            }
            let measure = overlap_measure(
                config.overlap_measure(),
                primary.lhs.len(),
                secondary.lhs.len(),
                suffix_len,
            );
            if measure > config.max_overlap() {
                continue;
            }

            let mut word1 = primary.rhs.clone();
            word1.extend_from_slice(&secondary.lhs[suffix_len..]);

            let mut word2 = primary.lhs[..primary.lhs.len() - suffix_len].to_vec();
            word2.extend_from_slice(&secondary.rhs);

            if word1 != word2 {
                self.stack.push(Rule { lhs: word1, rhs: word2 });
                found = true;
            }
        }
        found
    }

    /// Tests confluence, caching the verdict until rules change again.
    pub fn confluent(&mut self) -> bool {
        self.confluent_with_cancel(None)
    }
    /// [`Self::confluent`], additionally polling `killed` between pairs; an
    /// observed cancellation leaves confluence unresolved (returns the
    /// previously cached verdict, or `false` if none is cached yet).
    pub fn confluent_with_cancel(&mut self, killed: Option<&KillSwitch>) -> bool {
        if self.confluence_known {
            return self.is_confluent;
        }
        let snapshot: Vec<Rule> = self.rules.iter().map(|(_, r)| r.clone()).collect();
        for primary in &snapshot {
            for secondary in &snapshot {
                if killed.is_some_and(|k| k.is_killed()) {
                    return self.is_confluent;
                }
                if !self.critical_pair_agrees(primary, secondary) {
                    self.is_confluent = false;
                    self.confluence_known = true;
                    return false;
                }
            }
        }
        self.is_confluent = true;
        self.confluence_known = true;
        true
    }

    fn critical_pair_agrees(&self, primary: &Rule, secondary: &Rule) -> bool {
        let max_suffix = primary.lhs.len().min(secondary.lhs.len());
        for suffix_len in 1..=max_suffix {
            if primary.lhs[primary.lhs.len() - suffix_len..] != secondary.lhs[..suffix_len] {
                continue;
            }
            let mut word1 = primary.rhs.clone();
            word1.extend_from_slice(&secondary.lhs[suffix_len..]);

            let mut word2 = primary.lhs[..primary.lhs.len() - suffix_len].to_vec();
            word2.extend_from_slice(&secondary.rhs);

            if self.rewrite_word(&word1) != self.rewrite_word(&word2) {
                return false;
            }
        }
        true
    }
}

fn overlap_measure(measure: OverlapMeasure, primary_len: usize, secondary_len: usize, suffix_len: usize) -> usize {
    match measure {
        OverlapMeasure::Ab => primary_len,
        OverlapMeasure::MaxAbBc => primary_len.max(secondary_len),
        OverlapMeasure::AbBc => primary_len + secondary_len - suffix_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_from(relations: &[(&[Letter], &[Letter])]) -> RewritingSystem<ShortLex> {
        let mut rs = RewritingSystem::new();
        for &(l, r) in relations {
            rs.add_rule(l.to_vec(), r.to_vec());
        }
        rs
    }

    #[test]
    fn rewrite_is_idempotent() {
        let rs = system_from(&[(&[0, 0, 0], &[]), (&[1, 1], &[1])]);
        let w = vec![0, 0, 0, 1, 1, 1, 0, 0, 0];
        let once = rs.rewrite_word(&w);
        let twice = rs.rewrite_word(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn equal_matches_rewrite() {
        let rs = system_from(&[(&[0, 0], &[])]);
        assert!(rs.equal(&[0, 0, 0, 0], &[]));
        assert!(!rs.equal(&[0], &[]));
    }

    #[test]
    fn three_rule_system_completes_confluent() {
        let mut rs = system_from(&[
            (&[0, 0, 0], &[]),
            (&[1, 1, 1], &[]),
            (&[0, 1, 0, 1, 0, 1], &[]),
        ]);
        let config = Config::new();
        let outcome = rs.knuth_bendix(&config, None);
        assert_eq!(outcome, Outcome::Confluent);
        assert!(rs.confluent());
        assert_eq!(rs.nr_active_rules(), 4);
    }
}
