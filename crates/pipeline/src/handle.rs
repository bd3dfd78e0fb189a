//! Field capability handles
//!
//! Declaring a field on a [`StageBuilder`](crate::StageBuilder) mints a
//! handle for it, and the handle is the only thing a [`StageView`] accepts:
//!
//! | Declaration | Handle | View operations |
//! |-------------|--------|-----------------|
//! | `reads` | [`Input<T>`] | `get` |
//! | `writes` | [`Output<T>`] | `set` |
//! | `updates` | [`InOut<T>`] | `get`, `set`, `modify` |
//!
//! Handles have no public constructor and the traits below are sealed, so a
//! bare [`Field`] opens nothing:
//!
//! ```compile_fail
//! use morph_core::{Field, Store};
//! use morph_pipeline::Stage;
//!
//! const DECLARED: Field<i32> = Field::new("Declared");
//! const UNDECLARED: Field<i32> = Field::new("Undeclared");
//!
//! let (stage, _declared) = Stage::define("S", |s| s.reads(&DECLARED)).unwrap();
//! let mut store = Store::new();
//! let view = stage.view(&mut store);
//! let _ = view.get(&UNDECLARED);
//! ```
//!
//! An `Input` cannot be written:
//!
//! ```compile_fail
//! use morph_core::{Field, Store};
//! use morph_pipeline::Stage;
//!
//! const X: Field<i32> = Field::new("X");
//!
//! let (stage, x) = Stage::define("S", |s| s.reads(&X)).unwrap();
//! let mut store = Store::new();
//! let mut view = stage.view(&mut store);
//! let _ = view.set(&x, 1);
//! ```
//!
//! and only an `InOut` can be modified:
//!
//! ```compile_fail
//! use morph_core::{Field, Store};
//! use morph_pipeline::Stage;
//!
//! const X: Field<i32> = Field::new("X");
//!
//! let (stage, x) = Stage::define("S", |s| s.writes(&X)).unwrap();
//! let mut store = Store::new();
//! let mut view = stage.view(&mut store);
//! let _ = view.modify(&x);
//! ```
//!
//! [`StageView`]: crate::StageView

use std::fmt;

use morph_core::{Field, FieldDescriptor, FieldValue};

mod private {
    pub trait Sealed {}
}

/// A minted handle naming one typed field
pub trait Capability: private::Sealed {
    /// Value type of the field
    type Value: FieldValue;

    /// The field this handle opens
    fn field(&self) -> &Field<Self::Value>;
}

/// Handles accepted by [`StageView::get`](crate::StageView::get)
pub trait Readable: Capability {}

/// Handles accepted by [`StageView::set`](crate::StageView::set)
pub trait Writable: Capability {}

macro_rules! capability_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name<T> {
            field: Field<T>,
        }

        impl<T: FieldValue> $name<T> {
            pub(crate) const fn new(field: Field<T>) -> Self {
                Self { field }
            }

            /// Field name
            pub fn name(&self) -> &'static str {
                self.field.name()
            }

            /// Untyped descriptor of the field
            pub fn descriptor(&self) -> FieldDescriptor {
                self.field.descriptor()
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.field)
            }
        }

        impl<T> private::Sealed for $name<T> {}

        impl<T: FieldValue> Capability for $name<T> {
            type Value = T;

            fn field(&self) -> &Field<T> {
                &self.field
            }
        }
    };
}

capability_handle!(
    /// Read access to an InContract field, minted by `reads`
    Input
);

capability_handle!(
    /// Write access to an OutContract field, minted by `writes`
    Output
);

capability_handle!(
    /// Read, write and in-place access to a field in both contracts,
    /// minted by `updates`
    InOut
);

impl<T: FieldValue> Readable for Input<T> {}
impl<T: FieldValue> Readable for InOut<T> {}
impl<T: FieldValue> Writable for Output<T> {}
impl<T: FieldValue> Writable for InOut<T> {}
