//! Chain accumulation over generated stage sequences

use std::collections::BTreeSet;

use morphline::{Field, Input, Output, Pipeline, Stage};
use proptest::prelude::*;

const FIELDS: [Field<u32>; 4] = [
    Field::new("F0"),
    Field::new("F1"),
    Field::new("F2"),
    Field::new("F3"),
];

#[derive(Debug, Clone)]
struct Shape {
    reads: Vec<usize>,
    writes: Vec<usize>,
}

fn shape() -> impl Strategy<Value = Shape> {
    (
        prop::collection::btree_set(0..FIELDS.len(), 0..3),
        prop::collection::btree_set(0..FIELDS.len(), 0..3),
    )
        .prop_map(|(reads, writes)| Shape {
            reads: reads.into_iter().collect(),
            writes: writes.into_iter().collect(),
        })
}

fn build(shapes: &[Shape]) -> Pipeline {
    let mut pipeline = Pipeline::new();
    for (n, shape) in shapes.iter().enumerate() {
        let mut builder = Stage::builder(format!("S{n}"));
        let reads: Vec<Input<u32>> = shape.reads.iter().map(|&i| builder.reads(&FIELDS[i])).collect();
        let writes: Vec<(u32, Output<u32>)> = shape
            .writes
            .iter()
            .map(|&i| (i as u32, builder.writes(&FIELDS[i])))
            .collect();
        pipeline = pipeline.then(builder.build().unwrap(), move |view| {
            let mut sum = 0;
            for input in &reads {
                sum += *view.get(input)?;
            }
            for (offset, output) in &writes {
                view.set(output, sum + offset)?;
            }
            Ok(())
        });
    }
    pipeline
}

/// Index of the first stage reading a field no earlier stage wrote
fn first_unsatisfied(shapes: &[Shape]) -> Option<usize> {
    let mut available = BTreeSet::new();
    for (n, shape) in shapes.iter().enumerate() {
        if !shape.reads.iter().all(|i| available.contains(i)) {
            return Some(n);
        }
        available.extend(shape.writes.iter().copied());
    }
    None
}

proptest! {
    #[test]
    fn compatibility_matches_reference_model(shapes in prop::collection::vec(shape(), 0..6)) {
        let pipeline = build(&shapes);
        match first_unsatisfied(&shapes) {
            None => {
                prop_assert!(pipeline.is_compatible());
                let available = pipeline.available().contract().unwrap();
                let produced: BTreeSet<usize> =
                    shapes.iter().flat_map(|s| s.writes.iter().copied()).collect();
                prop_assert_eq!(available.len(), produced.len());
                for i in produced {
                    prop_assert!(available.contains_field(&FIELDS[i]));
                }
            }
            Some(n) => {
                prop_assert!(!pipeline.is_compatible());
                let err = pipeline.validate().unwrap_err();
                let expected_stage = format!("S{n}");
                match err {
                    morphline::Error::ContractViolation { stage, .. } => {
                        prop_assert_eq!(stage, expected_stage)
                    }
                    other => prop_assert!(false, "unexpected error: {:?}", other),
                }
            }
        }
    }

    #[test]
    fn compatible_pipelines_run_every_stage(shapes in prop::collection::vec(shape(), 0..6)) {
        let pipeline = build(&shapes);
        if first_unsatisfied(&shapes).is_none() {
            let report = pipeline.run_with(&mut morphline::Store::new()).unwrap();
            prop_assert_eq!(report.stages.len(), shapes.len());
        } else {
            prop_assert!(pipeline.run().is_err());
        }
    }
}
