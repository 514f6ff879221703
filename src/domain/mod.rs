//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calibration inputs (`StandardPoint`, `DatasetStats`)
//! - fit outputs (`FitParams`, `FitQuality`, `FitResult`, `StandardResidual`)
//! - prediction outputs (`Prediction`)
//! - the saved curve schema (`CurveFile`, `CurveGrid`)

pub mod types;

pub use types::*;
