//! Pipeline handles and execution
//!
//! A [`Pipeline`] is a cheap, cloneable handle to the tip of a chain.
//! Appending never mutates: `then` returns a new handle and the old one keeps
//! denoting the shorter pipeline, so a shared prefix can be extended in
//! several directions.
//!
//! ## Execution
//!
//! | Method | Store | Result |
//! |--------|-------|--------|
//! | `run()` | fresh, sized to the available contract | the filled `Store` |
//! | `run_with(&mut store)` | caller-provided, seeded fields already set | a `RunReport` |
//!
//! Both refuse to start when the chain is incompatible, and both run every
//! stage from the root to the tip exactly once, in order.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use morph_core::{AvailableContract, Contract, Error, Result, Store};
use tracing::{debug, info, warn};

use crate::analysis::Analysis;
use crate::chain::ChainNode;
use crate::report::{RunId, RunReport, StageTiming};
use crate::stage::{bind_operation, Action, Operation, Stage};
use crate::view::StageView;

/// Handle to one position of a pipeline chain
#[derive(Clone)]
pub struct Pipeline {
    tip: Arc<ChainNode>,
}

impl Pipeline {
    /// Pipeline with no stages and nothing available
    pub fn new() -> Self {
        Self::seeded(Contract::empty())
    }

    /// Pipeline whose root already provides `seed`
    ///
    /// The caller must set the seeded fields before [`Pipeline::run_with`].
    pub fn seeded(seed: Contract) -> Self {
        Self {
            tip: ChainNode::root(seed),
        }
    }

    /// Pipeline consisting of a single stage placed after an empty root
    pub fn first<F>(stage: Stage, action: F) -> Self
    where
        F: Fn(&mut StageView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self::new().then(stage, action)
    }

    /// Pipeline consisting of a single operation
    ///
    /// # Errors
    ///
    /// Returns the operation's definition error.
    pub fn first_op<O: Operation>(op: O) -> Result<Self> {
        Self::new().then_op(op)
    }

    /// Append a stage
    ///
    /// Always succeeds. If the stage's input is not satisfied, or its output
    /// redefines an available field with another type, the returned pipeline
    /// is incompatible and so is everything appended after it.
    pub fn then<F>(&self, stage: Stage, action: F) -> Self
    where
        F: Fn(&mut StageView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.append(stage, Arc::new(action))
    }

    /// Append a stage, failing fast if the result is incompatible
    ///
    /// # Errors
    ///
    /// The diagnosis of the first breaking stage, as from
    /// [`Pipeline::validate`].
    pub fn try_then<F>(&self, stage: Stage, action: F) -> Result<Self>
    where
        F: Fn(&mut StageView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let next = self.then(stage, action);
        next.validate()?;
        Ok(next)
    }

    /// Append an operation
    ///
    /// # Errors
    ///
    /// Only the operation's definition error. Incompatibility is recorded in
    /// the returned pipeline, as with [`Pipeline::then`].
    pub fn then_op<O: Operation>(&self, op: O) -> Result<Self> {
        let (stage, action) = bind_operation(op)?;
        Ok(self.append(stage, action))
    }

    fn append(&self, stage: Stage, action: Action) -> Self {
        Self {
            tip: ChainNode::append(&self.tip, stage, action),
        }
    }

    /// Whether every stage's input is satisfied by its ancestor
    pub fn is_compatible(&self) -> bool {
        self.tip.is_compatible()
    }

    /// Check the pipeline can run
    ///
    /// # Errors
    ///
    /// - [`Error::ContractViolation`] naming the first stage whose input is
    ///   not satisfied, its ancestor, and the missing fields
    /// - [`Error::ConflictingField`] if the first breaking stage redefined a
    ///   field with another type
    pub fn validate(&self) -> Result<()> {
        if self.tip.is_compatible() {
            return Ok(());
        }
        self.tip.diagnose()?;
        Err(Error::IncompatiblePipeline {
            stage: self.name().to_string(),
        })
    }

    /// Human-readable compatibility report
    pub fn analyze(&self) -> Analysis {
        Analysis::of(&self.tip)
    }

    /// Cumulative contract available at the tip
    pub fn available(&self) -> &AvailableContract {
        self.tip.available()
    }

    /// Fields the caller must provide before running
    pub fn seed(&self) -> &Contract {
        self.tip.seed()
    }

    /// Name of the last stage, or the root name for an empty pipeline
    pub fn name(&self) -> &str {
        self.tip.name()
    }

    /// Number of stages, excluding the root
    pub fn len(&self) -> usize {
        self.tip.depth()
    }

    /// Whether no stage has been appended
    pub fn is_empty(&self) -> bool {
        self.tip.depth() == 0
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.tip
            .path()
            .into_iter()
            .filter(|node| node.stage().is_some())
            .map(|node| node.name())
            .collect()
    }

    /// Store with a slot for every field available at the tip
    ///
    /// # Errors
    ///
    /// The validation error if the pipeline is incompatible.
    pub fn create_store(&self) -> Result<Store> {
        self.validate()?;
        let available = self.available_contract()?;
        Ok(Store::for_contract(available))
    }

    /// Run every stage against a fresh store and return it
    ///
    /// # Errors
    ///
    /// - The validation error if the pipeline is incompatible; no stage runs
    /// - [`Error::UnsetField`] if the pipeline is seeded, since a fresh store
    ///   cannot hold the seeded values
    /// - The first failing action's error, unchanged
    pub fn run(&self) -> Result<Store> {
        let mut store = self.create_store()?;
        self.run_with(&mut store)?;
        Ok(store)
    }

    /// Run every stage against `store`
    ///
    /// The store is first extended with slots for the available contract;
    /// values already present are kept. Stages then run root first, each
    /// exactly once. Execution stops at the first failing action and its
    /// error is returned unchanged; writes made before the failure stay in
    /// the store.
    ///
    /// # Errors
    ///
    /// - The validation error if the pipeline is incompatible; no stage runs
    /// - [`Error::UnsetField`] if a seeded field is not set in `store`
    /// - The first failing action's error
    pub fn run_with(&self, store: &mut Store) -> Result<RunReport> {
        self.validate()?;
        let available = self.available_contract()?;

        if let Some(unset) = self.seed().iter().find(|d| !store.is_descriptor_set(d)) {
            return Err(Error::UnsetField {
                name: unset.name().to_string(),
                value_type: unset.value_type().name(),
            });
        }
        store.allocate(available);

        let run_id = RunId::new();
        let started = Instant::now();
        let mut stages = Vec::with_capacity(self.len());
        debug!(run = %run_id, stages = self.len(), "pipeline run starting");

        for node in self.tip.path() {
            let (Some(stage), Some(action)) = (node.stage(), node.action()) else {
                continue;
            };

            let stage_started = Instant::now();
            let mut view = stage.view(store);
            if let Err(e) = action(&mut view) {
                warn!(run = %run_id, stage = stage.name(), error = %e, "stage action failed");
                return Err(e);
            }
            let elapsed = stage_started.elapsed();
            debug!(
                run = %run_id,
                stage = stage.name(),
                elapsed_us = elapsed.as_micros() as u64,
                "stage complete"
            );
            stages.push(StageTiming {
                name: stage.name().to_string(),
                elapsed,
            });
        }

        let elapsed = started.elapsed();
        info!(
            run = %run_id,
            stages = stages.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "pipeline run complete"
        );
        Ok(RunReport {
            run_id,
            stages,
            elapsed,
        })
    }

    fn available_contract(&self) -> Result<&Contract> {
        self.tip
            .available()
            .contract()
            .ok_or_else(|| Error::IncompatiblePipeline {
                stage: self.name().to_string(),
            })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("compatible", &self.is_compatible())
            .finish()
    }
}
