//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate seed grids for the nonlinear parameters (slope, EC50)
//! - evaluate each grid candidate (parallel) with the linear pair solved
//!   exactly by least squares
//! - refine the best seed with Levenberg-Marquardt
//! - compute goodness-of-fit diagnostics

pub mod fitter;
pub mod quality;
pub mod seed_grid;

pub use fitter::*;
pub use quality::*;
pub use seed_grid::*;
