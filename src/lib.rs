//! Morphline - contract-checked stage pipelines
//!
//! A pipeline is a chain of stages. Each stage declares the fields it reads
//! (its InContract) and the fields it writes (its OutContract). While the
//! chain is assembled, every stage's input is checked against what its
//! ancestors make available, so an impossible pipeline is reported before
//! any stage runs.
//!
//! # Quick Start
//!
//! ```
//! use morphline::{Field, Pipeline, Stage};
//!
//! const X: Field<i32> = Field::new("X");
//! const Y: Field<i32> = Field::new("Y");
//!
//! // Declaring a field mints the handle the action opens it with
//! let (a, x_out) = Stage::define("A", |s| s.writes(&X))?;
//! let (b, (x_in, y)) = Stage::define("B", |s| (s.reads(&X), s.writes(&Y)))?;
//!
//! let pipeline = Pipeline::first(a, move |view| view.set(&x_out, 20)).then(b, move |view| {
//!     let x = *view.get(&x_in)?;
//!     view.set(&y, x + 1)
//! });
//!
//! assert_eq!(pipeline.analyze().to_string(), "All pipeline operations compatible.\n");
//! let store = pipeline.run()?;
//! assert_eq!(*store.field(&Y)?, 21);
//! # Ok::<(), morphline::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `morph-core`: fields, contracts and the typed store
//! - `morph-pipeline`: stages, restricted views, chains and execution
//!
//! Ready-made image stages live in the separate `morph-stages` crate.

pub use morph_core::*;
pub use morph_pipeline::*;
