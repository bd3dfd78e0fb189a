//! Contract-checked stage pipelines for Morphline
//!
//! This crate assembles [`Stage`]s into immutable, shareable chains and runs
//! them against a [`morph_core::Store`]:
//! - Stage: name + InContract + OutContract, with an [`AccessPlan`]
//! - Input / Output / InOut: capability handles minted by declaring a field
//! - StageView: the only way an action reaches the store, opened by handles
//! - Pipeline: tip of a backward-linked chain; appending returns a new handle
//! - Analysis: printable compatibility report
//! - RunReport: what a run executed and how long it took
//!
//! Compatibility is decided while the chain is assembled. A pipeline that
//! cannot run reports the first breaking stage, and running it is refused
//! before any action is invoked.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod analysis;
pub mod chain;
pub mod handle;
pub mod pipeline;
pub mod report;
pub mod stage;
pub mod view;

pub use access::{AccessKind, AccessPlan};
pub use analysis::{Analysis, Verdict};
pub use chain::{ChainNode, ROOT_NAME};
pub use handle::{Capability, InOut, Input, Output, Readable, Writable};
pub use pipeline::Pipeline;
pub use report::{RunId, RunReport, StageTiming};
pub use stage::{Action, Operation, Stage, StageBuilder};
pub use view::StageView;
