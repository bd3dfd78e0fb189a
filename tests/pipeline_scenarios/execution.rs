//! Ordering, failure propagation, seeded stores

use crate::common::*;
use morphline::{Contract, Error, Pipeline, Stage, Store};

#[derive(Debug, thiserror::Error)]
#[error("sensor offline")]
struct SensorOffline;

#[test]
fn test_each_stage_runs_once_in_order() {
    let log = new_log();
    let mut pipeline = Pipeline::new();
    for name in ["S0", "S1", "S2", "S3", "S4"] {
        pipeline = pipeline.then(declared(name, &[], &[]), record(&log, name));
    }

    let report = pipeline.run_with(&mut Store::new()).unwrap();
    assert_eq!(*log.lock(), vec!["S0", "S1", "S2", "S3", "S4"]);
    assert_eq!(report.stage_names(), vec!["S0", "S1", "S2", "S3", "S4"]);
}

#[test]
fn test_failing_action_stops_run() {
    let log = new_log();
    let pipeline = producer("A", 1)
        .then(declared("Fail", &[], &[]), |_| Err(Error::action(SensorOffline)))
        .then(declared("After", &[], &[]), record(&log, "After"));

    let mut store = Store::new();
    let err = pipeline.run_with(&mut store).unwrap_err();

    match err {
        Error::Action(source) => assert!(source.downcast_ref::<SensorOffline>().is_some()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(log.lock().is_empty());
    assert_eq!(*store.field(&X).unwrap(), 1);
}

#[test]
fn test_reading_unwritten_output_fails() {
    let (reader, x) = Stage::define("Reader", |s| s.reads(&X)).unwrap();
    let pipeline = Pipeline::first(declared("Lazy", &[], &[&X]), |_| Ok(()))
        .then(reader, move |view| view.get(&x).map(|_| ()));

    assert!(matches!(pipeline.run(), Err(Error::UnsetField { .. })));
}

#[test]
fn test_seeded_pipeline() {
    let seed = Contract::builder().field(&X).field(&LABEL).build().unwrap();
    let (describe, (x, label, y)) =
        Stage::define("Describe", |s| (s.reads(&X), s.reads(&LABEL), s.writes(&Y))).unwrap();
    let pipeline = Pipeline::seeded(seed).then(describe, move |view| {
        let len = view.get(&label)?.len() as i32;
        let v = *view.get(&x)?;
        view.set(&y, v + len)
    });
    assert!(pipeline.is_compatible());

    let mut missing_label = Store::new();
    missing_label.set("X", 1);
    assert!(matches!(
        pipeline.run_with(&mut missing_label),
        Err(Error::UnsetField { ref name, .. }) if name == "Label"
    ));

    let mut store = Store::new();
    store.set("X", 1);
    store.set("Label", "four".to_string());
    pipeline.run_with(&mut store).unwrap();
    assert_eq!(*store.field(&Y).unwrap(), 5);
}

#[test]
fn test_rerun_reuses_store_values() {
    let (inc, x) = Stage::define("Inc", |s| s.updates(&X)).unwrap();
    let pipeline = Pipeline::seeded(Contract::single(&X)).then(inc, move |view| {
        *view.modify(&x)? += 10;
        Ok(())
    });

    let mut store = Store::new();
    store.set("X", 0);
    pipeline.run_with(&mut store).unwrap();
    pipeline.run_with(&mut store).unwrap();
    assert_eq!(*store.field(&X).unwrap(), 20);
}

#[test]
fn test_incompatible_pipeline_touches_nothing() {
    let log = new_log();
    let pipeline = Pipeline::first(declared("A", &[], &[]), record(&log, "A"))
        .then(declared("NeedsZ", &[&Z], &[]), record(&log, "NeedsZ"));

    let mut store = Store::new();
    assert!(pipeline.run_with(&mut store).is_err());
    assert!(pipeline.create_store().is_err());
    assert!(log.lock().is_empty());
    assert_eq!(store.slot_count(), 0);
}
