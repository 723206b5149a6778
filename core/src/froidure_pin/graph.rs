//! The Froidure-Pin Cayley-graph core: the per-element bookkeeping fields
//! from `spec.md` §3 "Cayley-graph core (FP internal)", realized as
//! typed-index collections the way the teacher's `EggTable`
//! (`hypershape::group::common`) realizes a group's element/generator
//! table — generalized here to grow in both dimensions, since FP discovers
//! new elements continuously and `add_generators` can grow the generator
//! count after the fact.

use smgrp_util::ti::TiVec;

smgrp_util::typed_index_struct! {
    /// Index of an element discovered during Froidure-Pin enumeration, in
    /// enumeration (non-decreasing word length) order.
    pub struct ElementId(u32);
}

/// Dense element-by-generator table, row-major, growable in both
/// dimensions. Used for `right`, `left` and `reduced` (§3).
#[derive(Debug, Clone)]
pub struct Table<T> {
    generator_count: usize,
    rows: TiVec<ElementId, Vec<T>>,
}

impl<T: Clone + Default> Table<T> {
    /// Constructs an empty table with the given number of generator
    /// columns.
    pub fn new(generator_count: usize) -> Self {
        Self {
            generator_count,
            rows: TiVec::new(),
        }
    }

    /// Appends a new element row, filled with the default value.
    pub fn push_row(&mut self) {
        self.rows
            .push(vec![T::default(); self.generator_count])
            .expect("element id overflow");
    }

    /// Appends a new generator column to every existing row, filled with the
    /// default value.
    pub fn push_column(&mut self) {
        self.generator_count += 1;
        for row in self.rows.iter_values_mut() {
            row.push(T::default());
        }
    }
    /// Appends `n` new generator columns.
    pub fn push_column_n(&mut self, n: usize) {
        for _ in 0..n {
            self.push_column();
        }
    }

    /// Returns the number of generator columns.
    pub fn generator_count(&self) -> usize {
        self.generator_count
    }
    /// Returns the number of element rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the entry for `(element, generator)`.
    pub fn get(&self, element: ElementId, generator: usize) -> &T {
        &self.rows[element][generator]
    }
    /// Returns a mutable reference to the entry for `(element, generator)`.
    pub fn get_mut(&mut self, element: ElementId, generator: usize) -> &mut T {
        &mut self.rows[element][generator]
    }
    /// Sets the entry for `(element, generator)`.
    pub fn set(&mut self, element: ElementId, generator: usize, value: T) {
        self.rows[element][generator] = value;
    }
    /// Returns the row for `element`.
    pub fn row(&self, element: ElementId) -> &[T] {
        &self.rows[element]
    }
}
