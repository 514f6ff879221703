//! Data sources for reference standards.

pub mod sample;

pub use sample::*;
