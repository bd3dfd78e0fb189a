//! Pipeline Scenario Tests
//!
//! End-to-end tests through the `morphline` facade, organized by concern:
//! - Scenarios: the reference pipelines (produce/consume, missing input,
//!   last write wins, modify in place)
//! - Branching: shared prefixes and interior handles
//! - Execution: ordering, failure propagation, seeded stores
//! - Views: minted handles match the declared contracts exactly
//! - Properties: chain accumulation over generated stage sequences
//! - Export: the image stages writing real PNG files

#[path = "../common/mod.rs"]
mod common;

mod branching;
mod execution;
mod export;
mod properties;
mod scenarios;
mod views;
