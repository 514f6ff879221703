//! Plot rendering: terminal ASCII plot and SVG chart.

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
