//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (CSV) (`export`)
//! - curve JSON read/write (`curve`)
//! - HTML report generation (`report`)

pub mod curve;
pub mod export;
pub mod ingest;
pub mod report;

pub use curve::*;
pub use export::*;
pub use ingest::*;
pub use report::*;
