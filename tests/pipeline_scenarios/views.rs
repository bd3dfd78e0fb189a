//! Handles minted for stage views
//!
//! For every field in the universe below and every stage shape, the handles
//! a stage mints open `get` exactly for the InContract, `set` exactly for
//! the OutContract, and `modify` exactly for their intersection. A field
//! outside both contracts gets no handle at all.

use std::sync::Arc;

use crate::common::*;
use morphline::{
    Contract, Field, FieldDescriptor, FieldValue, Pipeline, Result, Stage, StageBuilder,
    StageView, Store,
};
use parking_lot::Mutex;

const A: Field<i32> = Field::new("A");
const B: Field<i32> = Field::new("B");
const C: Field<String> = Field::new("C");

type Exercise = Box<dyn Fn(&mut StageView<'_>) -> Result<()>>;

/// Handles minted while declaring one stage, by what they open
#[derive(Default)]
struct Minted {
    readable: Vec<FieldDescriptor>,
    writable: Vec<FieldDescriptor>,
    modifiable: Vec<FieldDescriptor>,
    exercises: Vec<Exercise>,
}

fn mint<T: FieldValue + Clone>(
    builder: &mut StageBuilder,
    minted: &mut Minted,
    field: &Field<T>,
    (is_in, is_out): (bool, bool),
    value: T,
) {
    match (is_in, is_out) {
        (true, true) => {
            let handle = builder.updates(field);
            minted.readable.push(handle.descriptor());
            minted.writable.push(handle.descriptor());
            minted.modifiable.push(handle.descriptor());
            minted.exercises.push(Box::new(move |view: &mut StageView<'_>| -> Result<()> {
                view.get(&handle)?;
                view.modify(&handle)?;
                view.set(&handle, value.clone())
            }));
        }
        (true, false) => {
            let handle = builder.reads(field);
            minted.readable.push(handle.descriptor());
            minted.exercises.push(Box::new(move |view: &mut StageView<'_>| -> Result<()> {
                view.get(&handle).map(|_| ())
            }));
        }
        (false, true) => {
            let handle = builder.writes(field);
            minted.writable.push(handle.descriptor());
            minted.exercises.push(Box::new(move |view: &mut StageView<'_>| -> Result<()> {
                view.set(&handle, value.clone())
            }));
        }
        (false, false) => {}
    }
}

fn universe_store() -> Store {
    let mut store = Store::new();
    store.set("A", 1);
    store.set("B", 2);
    store.set("C", "c".to_string());
    store
}

fn names(descriptors: &[FieldDescriptor]) -> Vec<&str> {
    descriptors.iter().map(|d| d.name()).collect()
}

#[test]
fn test_minted_handles_match_contracts_exhaustively() {
    let bit = |mask: u8, i: u8| mask & (1 << i) != 0;

    // Every (InContract, OutContract) pair of subsets of {A, B, C}
    for in_mask in 0..8u8 {
        for out_mask in 0..8u8 {
            let mut builder = Stage::builder("Shape");
            let mut minted = Minted::default();
            mint(&mut builder, &mut minted, &A, (bit(in_mask, 0), bit(out_mask, 0)), 10);
            mint(&mut builder, &mut minted, &B, (bit(in_mask, 1), bit(out_mask, 1)), 20);
            mint(
                &mut builder,
                &mut minted,
                &C,
                (bit(in_mask, 2), bit(out_mask, 2)),
                "cc".to_string(),
            );
            let stage = builder.build().unwrap();
            let shape = format!("{in_mask:03b} -> {out_mask:03b}");

            let contract_names = |c: &Contract| c.names().map(str::to_string).collect::<Vec<_>>();
            assert_eq!(names(&minted.readable), contract_names(stage.input()), "{shape}");
            assert_eq!(names(&minted.writable), contract_names(stage.output()), "{shape}");
            assert_eq!(
                names(&minted.modifiable),
                contract_names(stage.access().modifiers()),
                "{shape}"
            );

            let mut store = universe_store();
            let mut view = stage.view(&mut store);
            let listed: Vec<FieldDescriptor> = view.readable().cloned().collect();
            assert_eq!(listed, minted.readable, "{shape}");
            for exercise in &minted.exercises {
                exercise(&mut view).unwrap();
            }
        }
    }
}

#[test]
fn test_writes_through_handles_stay_on_their_field() {
    let (stage, a) = Stage::define("WriteA", |s| s.writes(&A)).unwrap();
    let mut store = universe_store();
    {
        let mut view = stage.view(&mut store);
        view.set(&a, 99).unwrap();
    }
    assert_eq!(*store.field(&A).unwrap(), 99);
    assert_eq!(*store.field(&B).unwrap(), 2);
    assert_eq!(store.field(&C).unwrap(), "c");
}

#[test]
fn test_view_enumerates_declared_fields_inside_pipeline() {
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let (inspect, _) =
        Stage::define("Inspect", |s| (s.reads(&X), s.writes(&Y), s.updates(&Z))).unwrap();
    let pipeline = Pipeline::seeded(Contract::single(&Z))
        .then(declared("A", &[], &[&X]), |_| Ok(()))
        .then(inspect, move |view| {
            let mut seen = sink.lock();
            seen.push(view.readable().map(|d| d.to_string()).collect());
            seen.push(view.writable().map(|d| d.to_string()).collect());
            seen.push(view.modifiable().map(|d| d.to_string()).collect());
            Ok(())
        });

    let mut store = Store::new();
    store.set("Z", 0);
    pipeline.run_with(&mut store).unwrap();

    let seen = seen.lock();
    assert_eq!(seen[0], vec!["X: i32", "Z: i32"]);
    assert_eq!(seen[1], vec!["Y: i32", "Z: i32"]);
    assert_eq!(seen[2], vec!["Z: i32"]);
}
