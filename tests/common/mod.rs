//! Shared test utilities for the pipeline scenario suites.

#![allow(dead_code)]

use std::sync::Arc;

use morphline::{Contract, Field, Pipeline, Result, Stage, StageView};
use parking_lot::Mutex;

pub const X: Field<i32> = Field::new("X");
pub const Y: Field<i32> = Field::new("Y");
pub const Z: Field<i32> = Field::new("Z");
pub const LABEL: Field<String> = Field::new("Label");

/// Execution log shared between stage actions
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Stage declaring contracts only; its action can reach no field
pub fn declared(name: &str, reads: &[&Field<i32>], writes: &[&Field<i32>]) -> Stage {
    let input = Contract::from_descriptors(reads.iter().map(|f| f.descriptor())).unwrap();
    let output = Contract::from_descriptors(writes.iter().map(|f| f.descriptor())).unwrap();
    Stage::new(name, input, output).unwrap()
}

/// Action that records `name` and does nothing else
pub fn record(
    log: &Log,
    name: &'static str,
) -> impl Fn(&mut StageView<'_>) -> Result<()> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |_view: &mut StageView<'_>| -> Result<()> {
        log.lock().push(name.to_string());
        Ok(())
    }
}

/// Stage A (Out={X}) setting X to `value`
pub fn producer(name: &str, value: i32) -> Pipeline {
    let (stage, x) = Stage::define(name, |s| s.writes(&X)).unwrap();
    Pipeline::first(stage, move |view| view.set(&x, value))
}
