//! Mathematical utilities: least squares for the linear parameter pair.

pub mod ols;

pub use ols::*;
