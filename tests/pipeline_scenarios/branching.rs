//! Shared prefixes and interior handles

use crate::common::*;
use morphline::{Pipeline, Stage};

#[test]
fn test_two_branches_share_prefix() {
    let log = new_log();
    let log_a = log.clone();
    let (a, x_out) = Stage::define("A", |s| s.writes(&X)).unwrap();
    let base = Pipeline::first(a, move |view| {
        log_a.lock().push("A".to_string());
        view.set(&x_out, 3)
    });

    let (double, (x, y)) = Stage::define("Double", |s| (s.reads(&X), s.writes(&Y))).unwrap();
    let double = base.then(double, move |view| {
        let v = *view.get(&x)?;
        view.set(&y, v * 2)
    });
    let (square, (x, y)) = Stage::define("Square", |s| (s.reads(&X), s.writes(&Y))).unwrap();
    let square = base.then(square, move |view| {
        let v = *view.get(&x)?;
        view.set(&y, v * v)
    });

    assert_eq!(*double.run().unwrap().field(&Y).unwrap(), 6);
    assert_eq!(*square.run().unwrap().field(&Y).unwrap(), 9);
    assert_eq!(*log.lock(), vec!["A", "A"]);
}

#[test]
fn test_broken_branch_leaves_sibling_intact() {
    let base = producer("A", 1);
    let broken = base.then(declared("NeedsZ", &[&Z], &[]), |_| Ok(()));
    let (uses_x, (x, y)) = Stage::define("UsesX", |s| (s.reads(&X), s.writes(&Y))).unwrap();
    let fine = base.then(uses_x, move |view| {
        let v = *view.get(&x)?;
        view.set(&y, v)
    });

    assert!(!broken.is_compatible());
    assert!(fine.is_compatible());
    assert!(base.is_compatible());
}

#[test]
fn test_interior_handle_runs_only_its_prefix() {
    let log = new_log();
    let a = Pipeline::first(declared("A", &[], &[]), record(&log, "A"));
    let b = a.then(declared("B", &[], &[]), record(&log, "B"));
    let c = b.then(declared("C", &[], &[]), record(&log, "C"));

    b.run().unwrap();
    assert_eq!(*log.lock(), vec!["A", "B"]);
    assert_eq!(c.len(), 3);
    assert_eq!(b.stage_names(), vec!["A", "B"]);
}

#[test]
fn test_dropping_tip_keeps_prefix_usable() {
    let a = producer("A", 4);
    let (stage, (x, y)) = Stage::define("B", |s| (s.reads(&X), s.writes(&Y))).unwrap();
    let b = a.then(stage, move |view| {
        let v = *view.get(&x)?;
        view.set(&y, v + 1)
    });
    drop(b);
    assert_eq!(*a.run().unwrap().field(&X).unwrap(), 4);
}

#[test]
fn test_incompatibility_is_inherited() {
    let broken = producer("A", 1).then(declared("NeedsZ", &[&Z], &[]), |_| Ok(()));
    let (provides_z, z) = Stage::define("ProvidesZ", |s| s.writes(&Z)).unwrap();
    let after = broken.then(provides_z, move |view| view.set(&z, 0));
    assert!(!after.is_compatible());
    let err = after.validate().unwrap_err();
    assert_eq!(err.missing_fields(), ["Z".to_string()]);
}

#[test]
fn test_handles_cross_threads() {
    let pipeline = producer("A", 11);
    let handle = {
        let pipeline = pipeline.clone();
        std::thread::spawn(move || *pipeline.run().unwrap().field(&X).unwrap())
    };
    assert_eq!(handle.join().unwrap(), 11);
}
