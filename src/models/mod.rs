//! 4-parameter logistic (4PL) model implementation.
//!
//! The model is implemented as small, pure functions so that fitting and
//! plotting code can stay generic over plain `(x, y)` data.

pub mod model;

pub use model::*;
