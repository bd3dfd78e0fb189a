//! Reference scenarios

use crate::common::*;
use morphline::{Contract, Error, Pipeline, Stage, Store, Verdict};

#[test]
fn test_produce_then_consume() {
    let (b, (x, y)) = Stage::define("B", |s| (s.reads(&X), s.writes(&Y))).unwrap();
    let pipeline = producer("A", 5).then(b, move |view| {
        let v = *view.get(&x)?;
        view.set(&y, v * 2)
    });

    let store = pipeline.run().unwrap();
    assert_eq!(*store.field(&X).unwrap(), 5);
    assert_eq!(*store.field(&Y).unwrap(), 10);
}

#[test]
fn test_missing_input_names_stage_and_field() {
    let pipeline = producer("A", 5).then(declared("C", &[&Z], &[]), |_| Ok(()));

    assert!(!pipeline.is_compatible());
    match pipeline.validate() {
        Err(Error::ContractViolation {
            stage,
            ancestor,
            missing,
        }) => {
            assert_eq!(stage, "C");
            assert_eq!(ancestor, "A");
            assert_eq!(missing, vec!["Z".to_string()]);
        }
        other => panic!("unexpected validation result: {other:?}"),
    }

    let analysis = pipeline.analyze();
    assert_eq!(
        analysis.to_string(),
        "Pipeline operation C is not compatible with contract from ancestor A\n  \
         - Z is required, but is not supported by the ancestor's contract.\n"
    );
}

#[test]
fn test_missing_input_as_first_stage() {
    let pipeline = Pipeline::first(declared("C", &[&Z], &[]), |_| Ok(()));
    assert!(matches!(
        pipeline.analyze().verdict,
        Verdict::MissingFields { ref ancestor, .. } if ancestor == morphline::ROOT_NAME
    ));
    assert!(pipeline.run().is_err());
}

#[test]
fn test_last_write_wins() {
    let (d2, x) = Stage::define("D2", |s| s.writes(&X)).unwrap();
    let pipeline = producer("D1", 1).then(d2, move |view| view.set(&x, 2));

    assert!(pipeline.is_compatible());
    let store = pipeline.run().unwrap();
    assert_eq!(*store.field(&X).unwrap(), 2);
}

#[test]
fn test_modify_sees_previous_stage() {
    let (increment, x) = Stage::define("E", |s| s.updates(&X)).unwrap();
    let pipeline = Pipeline::seeded(Contract::single(&X))
        .then(increment.clone(), move |view| {
            *view.modify(&x)? += 1;
            Ok(())
        })
        .then(increment, move |view| {
            let value = view.modify(&x)?;
            assert_eq!(*value, 1);
            *value += 1;
            Ok(())
        });

    let mut store = Store::new();
    store.set("X", 0);
    pipeline.run_with(&mut store).unwrap();
    assert_eq!(*store.field(&X).unwrap(), 2);
}

#[test]
fn test_compatible_analysis_text() {
    let pipeline = producer("A", 1);
    assert_eq!(
        pipeline.analyze().to_string(),
        "All pipeline operations compatible.\n"
    );
    assert_eq!(
        Pipeline::new().analyze().to_string(),
        "Pipeline is empty; nothing to be incompatible with.\n"
    );
}
