//! School report-card grading: band classification, tier summaries, narrative remarks, and
//! report card assembly.

pub mod config;
pub mod error;
pub mod grading;
pub mod reports;
pub mod telemetry;
