//! Bitmask subset of a typed-index collection.

use std::marker::PhantomData;

use bitvec::bitbox;
use bitvec::boxed::BitBox;

use super::TypedIndex;

/// Dense subset of the elements `0..len` of some [`TypedIndex`] space.
///
/// Used to track "already seen" positions (e.g. the active-coset list in
/// Todd-Coxeter, or the set of element positions assigned to a congruence
/// class) without paying for a `HashSet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TiMask<I> {
    bits: BitBox,
    _phantom: PhantomData<I>,
}

impl<I: TypedIndex> TiMask<I> {
    /// Constructs an empty mask over `0..len`.
    pub fn new_empty(len: usize) -> Self {
        Self {
            bits: bitbox![0; len],
            _phantom: PhantomData,
        }
    }
    /// Constructs a full mask over `0..len`.
    pub fn new_full(len: usize) -> Self {
        Self {
            bits: bitbox![1; len],
            _phantom: PhantomData,
        }
    }
    /// Constructs a mask over `0..len` containing exactly the given indices.
    pub fn from_iter(len: usize, indices: impl IntoIterator<Item = I>) -> Self {
        let mut ret = Self::new_empty(len);
        for i in indices {
            ret.insert(i);
        }
        ret
    }

    /// Returns the number of indices the mask can hold.
    pub fn max_len(&self) -> usize {
        self.bits.len()
    }
    /// Returns the number of indices in the mask.
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }
    /// Returns whether the mask is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Returns whether `index` is in the mask.
    pub fn contains(&self, index: I) -> bool {
        self.bits.get(index.to_index()).is_some_and(|b| *b)
    }
    /// Inserts `index` into the mask, growing it if necessary.
    pub fn insert(&mut self, index: I) {
        let i = index.to_index();
        if i >= self.bits.len() {
            self.bits.resize(i + 1, false);
        }
        self.bits.set(i, true);
    }
    /// Removes `index` from the mask.
    pub fn remove(&mut self, index: I) {
        if let Some(mut bit) = self.bits.get_mut(index.to_index()) {
            *bit = false;
        }
    }

    /// Removes and returns the smallest index in the mask, if any.
    pub fn pop_first(&mut self) -> Option<I> {
        let i = self.bits.first_one()?;
        self.bits.set(i, false);
        Some(unwrap_index(i))
    }

    /// Returns an iterator over the indices in the mask, in increasing order.
    pub fn iter(&self) -> impl '_ + Iterator<Item = I> {
        self.bits.iter_ones().map(unwrap_index)
    }
}

impl<'a, I: TypedIndex> IntoIterator for &'a TiMask<I> {
    type Item = I;
    type IntoIter = Box<dyn 'a + Iterator<Item = I>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

fn unwrap_index<I: TypedIndex>(index: usize) -> I {
    I::try_from_index(index).expect("error constructing typed index from usize")
}
