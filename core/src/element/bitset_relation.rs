//! Partitioned binary relations over a finite set, represented as a dense
//! boolean matrix and composed by relational (boolean) matrix product.
//! Grounded in `original_source/tests/p.test.cc`, which builds its
//! congruence examples from exactly this kind of element.

use std::cmp::Ordering;

use bitvec::bitbox;
use bitvec::boxed::BitBox;

use super::Element;

/// A binary relation on `{0, .., degree-1}`, stored as a flattened
/// `degree * degree` bit matrix: bit `i * degree + j` is set iff `(i, j)` is
/// in the relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryRelation {
    degree: usize,
    bits: BitBox,
}

impl BinaryRelation {
    /// Constructs a relation from an explicit set of pairs.
    pub fn new(degree: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut bits = bitbox![0; degree * degree];
        for (i, j) in pairs {
            bits.set(i * degree + j, true);
        }
        Self { degree, bits }
    }
    /// Returns whether `(i, j)` is in the relation.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.bits[i * self.degree + j]
    }
}

impl Element for BinaryRelation {
    fn degree(&self) -> usize {
        self.degree
    }

    fn one(&self) -> Self {
        Self::new(self.degree, (0..self.degree).map(|i| (i, i)))
    }

    fn product(out: &mut Self, a: &Self, b: &Self, _tid: usize) {
        debug_assert_eq!(a.degree, b.degree);
        let n = a.degree;
        if out.degree != n {
            *out = Self::new(n, std::iter::empty());
        } else {
            out.bits.fill(false);
        }
        for i in 0..n {
            for j in 0..n {
                if a.contains(i, j) {
                    // row j of b, OR'd into row i of out
                    for k in 0..n {
                        if b.contains(j, k) {
                            out.bits.set(i * n + k, true);
                        }
                    }
                }
            }
        }
    }

    fn complexity(&self) -> usize {
        self.degree * self.degree * self.degree
    }

    fn less(&self, other: &Self) -> Ordering {
        self.bits.iter().cmp(other.bits.iter())
    }
}
