//! Idempotent-finding: elements `x` with `x * x == x`. A read-only sweep
//! over an already-enumerated semigroup, parallelized with `rayon` the way
//! the congruence dispatcher parallelizes its strategy race (`spec.md` §4.C
//! "nr_idempotents").

use rayon::prelude::*;
use smgrp_util::ti::TypedIndex;

use crate::element::Element;

use super::fp::FroidurePin;
use super::graph::ElementId;

/// Whether the element at `id` is idempotent. `fp` must already have
/// enumerated at least up to `id`.
pub(super) fn is_idempotent<T: Element>(fp: &FroidurePin<T>, id: ElementId) -> bool {
    fp.is_idempotent_ready(id)
}

/// The ids of every idempotent element. `fp` must be fully enumerated.
pub(super) fn all<T: Element>(fp: &FroidurePin<T>) -> Vec<ElementId> {
    (0..fp.current_size())
        .into_par_iter()
        .filter_map(|idx| {
            let id = ElementId::try_from_index(idx).expect("element id overflow");
            is_idempotent(fp, id).then_some(id)
        })
        .collect()
}

/// The number of idempotent elements. `fp` must be fully enumerated.
pub(super) fn count<T: Element>(fp: &FroidurePin<T>) -> usize {
    (0..fp.current_size())
        .into_par_iter()
        .filter(|&idx| {
            let id = ElementId::try_from_index(idx).expect("element id overflow");
            is_idempotent(fp, id)
        })
        .count()
}
