//! Small, dependency-light utilities shared by the `smgrp` crate: typed
//! (newtype) indices, vectors and bitmasks indexed by them, and the error
//! types those collections raise.

#[macro_use]
mod macros;
pub mod error;
pub mod ti;
