//! The Froidure-Pin enumeration driver: fills in one length-bucket of rows at
//! a time, backfilling the left Cayley graph once a bucket's right rows are
//! complete, and stopping at whichever of a predicate, a [`KillSwitch`], or
//! full enumeration comes first (`spec.md` §4.C, §5).

use smgrp_util::ti::TypedIndex;

use crate::cancel::KillSwitch;
use crate::element::Element;
use crate::report::maybe_report;
use crate::word::Letter;

use super::fp::FroidurePin;
use super::graph::ElementId;

/// Drives enumeration forward from wherever it last stopped.
///
/// Processing advances bucket by bucket (elements grouped by minimal word
/// length): every row in a bucket is filled before the left Cayley graph is
/// backfilled for that whole bucket and the next one begins. `stop` is
/// polled after every row; `killed` only at bucket boundaries, so a
/// cancellation request never interrupts a bucket's `left` backfill
/// part-way through.
pub(super) fn run_until<T: Element>(
    fp: &mut FroidurePin<T>,
    killed: Option<&KillSwitch>,
    mut stop: impl FnMut(&FroidurePin<T>) -> bool,
) {
    if fp.done {
        return;
    }
    loop {
        if killed.is_some_and(|k| k.is_killed()) || fp.stopwatch.is_some_and(|sw| sw.expired()) {
            return;
        }

        let bucket_start = *fp.lenindex.last().expect("lenindex always has at least one entry");
        let bucket_end = fp.enumerate_order.len();
        if fp.pos < bucket_start {
            fp.pos = bucket_start;
        }
        if bucket_end == bucket_start {
            fp.done = true;
            return;
        }

        while fp.pos < bucket_end {
            let id = ElementId::try_from_index(fp.pos).expect("element id overflow");
            process_row(fp, id);
            fp.pos += 1;

            if stop(fp) {
                return;
            }
            if fp.pos % fp.batch_size == 0 {
                if killed.is_some_and(|k| k.is_killed()) || fp.stopwatch.is_some_and(|sw| sw.expired()) {
                    return;
                }
                let elements = fp.elements.len();
                let rules = fp.nr_rules;
                maybe_report(&mut fp.report, "smgrp::froidure_pin", || {
                    format!("{elements} elements, {rules} rules discovered")
                });
            }
        }

        backfill_left(fp, bucket_start, bucket_end);
        fp.lenindex.push(bucket_end);

        if fp.enumerate_order.len() == bucket_end {
            fp.done = true;
            return;
        }
    }
}

/// Fills in `right[i][*]` (and `reduced[i][*]`), discovering new elements and
/// defining relations as needed, for the single element `i`.
///
/// For `i` of length > 1, `right[i][a]` is derived from `right[suffix[i]][a]`
/// by a pure graph trace whenever `reduced[suffix[i]][a]` is false, with no
/// call to `T::product` at all — this is the "hard core" FP optimization
/// `spec.md` §1/§2 names (38% of budget); see
/// `froidure-pin-impl.hpp:801-845`. `T::product` is only ever invoked when
/// that shortcut doesn't apply, i.e. for every generator row (`suffix[i] ==
/// None`) and for the rows where `reduced[suffix[i]][a]` is true.
fn process_row<T: Element>(fp: &mut FroidurePin<T>, i: ElementId) {
    let ngens = fp.generators.len();
    let b = fp.first[i];
    let suffix_of_i = fp.suffix[i];

    for a in 0..ngens {
        let letter = a as Letter;

        if let Some(s) = suffix_of_i {
            if !*fp.reduced.get(s, a) {
                let r = (*fp.right.get(s, a)).expect("right entry of suffix is known before its successors are processed");
                let target = if fp.pos_one == Some(r) {
                    fp.letter_to_pos[b as usize]
                } else if let Some(p) = fp.prefix[r] {
                    let base =
                        (*fp.left.get(p, b as usize)).expect("left entry known for every already-enumerated element");
                    (*fp.right.get(base, fp.last[r] as usize)).expect("right entry known for every already-enumerated element")
                } else {
                    (*fp.right.get(fp.letter_to_pos[b as usize], fp.last[r] as usize))
                        .expect("right entry known for every already-enumerated element")
                };
                fp.right.set(i, a, Some(target));
                continue;
            }
        }

        let mut out = fp.elements[i].clone();
        T::product(&mut out, &fp.elements[i], &fp.generators[a], 0);

        if let Some(&existing) = fp.map.get(&out) {
            fp.right.set(i, a, Some(existing));
            fp.reduced.set(i, a, false);
            fp.nr_rules += 1;
            continue;
        }

        let is_identity = out == out.one();
        let new_len = fp.length[i] + 1;
        let first = fp.first[i];
        let suffix: ElementId = match fp.suffix[i] {
            Some(s) => (*fp.right.get(s, a))
                .expect("right entry of a shorter element is always known once it is processed"),
            None => fp.letter_to_pos[a],
        };

        let new_id = fp.elements.push(out.clone()).expect("element id overflow");
        fp.map.insert(out, new_id);
        fp.first.push(first).ok();
        fp.last.push(letter).ok();
        fp.prefix.push(Some(i)).ok();
        fp.suffix.push(Some(suffix)).ok();
        fp.length.push(new_len).ok();
        fp.right.push_row();
        fp.left.push_row();
        fp.reduced.push_row();
        fp.enumerate_order.push(new_id);
        if is_identity {
            fp.pos_one.get_or_insert(new_id);
        }

        fp.right.set(i, a, Some(new_id));
        fp.reduced.set(i, a, true);
    }
}

/// Computes `left[i][*]` for every `i` in the half-open range
/// `[start, end)`, which must be a single, already right-filled length
/// bucket.
fn backfill_left<T: Element>(fp: &mut FroidurePin<T>, start: usize, end: usize) {
    let ngens = fp.generators.len();
    for idx in start..end {
        let i = ElementId::try_from_index(idx).expect("element id overflow");
        let last = fp.last[i];
        for g in 0..ngens {
            let base: ElementId = match fp.prefix[i] {
                Some(p) => (*fp.left.get(p, g))
                    .expect("left entry of a shorter element is always known by its bucket's backfill"),
                None => fp.letter_to_pos[g],
            };
            let val: ElementId = (*fp.right.get(base, last as usize))
                .expect("right entry must be known for every already-enumerated element");
            fp.left.set(i, g, Some(val));
        }
    }
}
