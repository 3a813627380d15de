//! # Report Module
//!
//! Aggregation over graded term reports.
//!
//! Everything here is a pure fold over [`crate::AssessmentReport`] values;
//! loading the reports and rendering the result are left to the caller.

mod class;

pub use class::*;
