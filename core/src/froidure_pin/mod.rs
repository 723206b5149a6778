//! Froidure-Pin enumeration (`spec.md` §4.C): generic, element-type-agnostic
//! enumeration that simultaneously produces the element set, left/right
//! Cayley graphs, and a confluent presentation.

mod enumerate;
mod fp;
pub mod graph;
mod idempotents;
mod relations;

pub use fp::FroidurePin;
pub use graph::ElementId;
pub use relations::{NextRelation, RelationsIter};
