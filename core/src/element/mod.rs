//! The element capability set (§3/§4.A): the abstract algebraic interface
//! every element type implements. The engines in this crate never inspect
//! element internals; they call only the methods below.

pub mod bitset_relation;
pub mod transformation;

pub use bitset_relation::BinaryRelation;
pub use transformation::Transformation;

/// An element of some algebraic type supporting the operations the
/// Froidure-Pin, Todd-Coxeter and Knuth-Bendix engines need. Implementations
/// must guarantee:
///
/// - `product` is associative wherever its result is defined.
/// - `equal`/`hash` are consistent (`a == b` implies `hash(a) == hash(b)`).
/// - `less` is a strict total order.
/// - `degree` is preserved by `product` on composable elements.
/// - `product` is safe to call concurrently for distinct `out` values and
///   distinct `tid` values (it may use `tid` to index scratch space it
///   privately owns, but must not share mutable state across `tid`s).
pub trait Element: Clone + Eq + std::hash::Hash + Send + Sync {
    /// A dimensional invariant shared by composable elements (e.g. the size
    /// of the ground set for a transformation).
    fn degree(&self) -> usize;

    /// The multiplicative identity at `self`'s degree.
    fn one(&self) -> Self;

    /// Writes `a * b` into `out`. `tid` is a worker id the implementation
    /// may use to select private scratch space; distinct `tid`s never alias.
    fn product(out: &mut Self, a: &Self, b: &Self, tid: usize);

    /// An upper bound on the cost of one call to [`Element::product`],
    /// used to decide when tracing a Cayley-graph path beats a direct
    /// multiply (see [`crate::froidure_pin::FroidurePin::fast_product`]).
    fn complexity(&self) -> usize;

    /// A strict total order on elements, consistent with [`Eq`].
    fn less(&self, other: &Self) -> std::cmp::Ordering;

    /// Called when embedding an element of lower degree into a higher one.
    /// The default implementation panics; types whose elements can only ever
    /// be compared/multiplied at a single fixed degree may leave it
    /// unimplemented.
    fn increase_degree(&mut self, new_degree: usize) {
        let _ = new_degree;
        unimplemented!("{} elements have a fixed degree", std::any::type_name::<Self>());
    }
}

/// Per-worker scratch space for [`Element::product`], grounded on
/// `original_source/include/libsemigroups/pool.hpp`'s object pool: since
/// scratch buffers are now owned `T` values behind a `tid` index rather
/// than raw pointers acquired/released from an intrusive free list, a plain
/// `Vec` indexed by worker id gives the same guarantee (each worker gets a
/// private, reusable buffer) without manual lifetime management.
#[derive(Debug, Default, Clone)]
pub struct ScratchPool<T> {
    slots: Vec<Option<T>>,
}
impl<T: Clone> ScratchPool<T> {
    /// Constructs an empty pool.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }
    /// Returns the scratch value for worker `tid`, initializing it with
    /// `init` on first use.
    pub fn get_mut(&mut self, tid: usize, init: impl FnOnce() -> T) -> &mut T {
        if tid >= self.slots.len() {
            self.slots.resize(tid + 1, None);
        }
        self.slots[tid].get_or_insert_with(init)
    }
}
