//! Stage definitions
//!
//! A [`Stage`] names a unit of work and declares its contracts. Every field
//! declared through a [`StageBuilder`] mints a capability handle; the action
//! bound to the stage receives a [`StageView`] that opens only those
//! handles.
//!
//! Reusable stages implement [`Operation`], which pairs the declaration with
//! the action body.

use std::fmt;
use std::mem;
use std::sync::Arc;

use morph_core::{Contract, ContractBuilder, Field, FieldValue, Result, Store};

use crate::access::AccessPlan;
use crate::handle::{InOut, Input, Output};
use crate::view::StageView;

/// Action bound to a stage in a pipeline
pub type Action = Arc<dyn Fn(&mut StageView<'_>) -> Result<()> + Send + Sync>;

/// Named unit of work with an input and an output contract
#[derive(Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    input: Contract,
    output: Contract,
    access: AccessPlan,
}

impl Stage {
    /// Define a stage from its contracts
    ///
    /// # Errors
    ///
    /// Returns [`morph_core::Error::ConflictingField`] if `input` and
    /// `output` bind one name to two value types.
    pub fn new(name: impl Into<String>, input: Contract, output: Contract) -> Result<Self> {
        let access = AccessPlan::new(&input, &output)?;
        Ok(Self {
            name: name.into(),
            input,
            output,
            access,
        })
    }

    /// Start defining a stage field by field
    ///
    /// Each declaration returns the handle the action uses for that field.
    ///
    /// ```
    /// use morph_core::Field;
    /// use morph_pipeline::Stage;
    ///
    /// const X: Field<i32> = Field::new("X");
    /// const Y: Field<i32> = Field::new("Y");
    ///
    /// let mut builder = Stage::builder("Double");
    /// let _x = builder.reads(&X);
    /// let _y = builder.writes(&Y);
    /// let double = builder.build()?;
    /// assert_eq!(double.input().len(), 1);
    /// # Ok::<(), morph_core::Error>(())
    /// ```
    pub fn builder(name: impl Into<String>) -> StageBuilder {
        StageBuilder {
            name: name.into(),
            input: Contract::builder(),
            output: Contract::builder(),
        }
    }

    /// Define a stage and mint its handles in one step
    ///
    /// `declare` receives the builder and returns whatever handles the
    /// action needs.
    ///
    /// ```
    /// use morph_core::Field;
    /// use morph_pipeline::{Pipeline, Stage};
    ///
    /// const X: Field<i32> = Field::new("X");
    ///
    /// let (stage, x) = Stage::define("Seven", |s| s.writes(&X))?;
    /// let store = Pipeline::first(stage, move |view| view.set(&x, 7)).run()?;
    /// assert_eq!(*store.field(&X)?, 7);
    /// # Ok::<(), morph_core::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`morph_core::Error::ConflictingField`] if a name was declared
    /// with two value types.
    pub fn define<H>(
        name: impl Into<String>,
        declare: impl FnOnce(&mut StageBuilder) -> H,
    ) -> Result<(Self, H)> {
        let mut builder = Self::builder(name);
        let handles = declare(&mut builder);
        Ok((builder.build()?, handles))
    }

    /// Stage name, used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields the stage requires
    pub fn input(&self) -> &Contract {
        &self.input
    }

    /// Fields the stage promises to produce
    pub fn output(&self) -> &Contract {
        &self.output
    }

    /// Accessor sets derived from the contracts
    pub fn access(&self) -> &AccessPlan {
        &self.access
    }

    /// Restricted view of `store` for this stage
    ///
    /// Pipelines build this for every run; it is public so an action can be
    /// exercised against a hand-filled store.
    pub fn view<'a>(&'a self, store: &'a mut Store) -> StageView<'a> {
        StageView::new(&self.name, &self.access, store)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("input", &self.input.to_string())
            .field("output", &self.output.to_string())
            .finish()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.name, self.input, self.output)
    }
}

/// Builder returned by [`Stage::builder`]
#[derive(Debug, Clone)]
pub struct StageBuilder {
    name: String,
    input: ContractBuilder,
    output: ContractBuilder,
}

impl StageBuilder {
    /// Require `field` (InContract)
    pub fn reads<T: FieldValue>(&mut self, field: &Field<T>) -> Input<T> {
        self.input = mem::take(&mut self.input).field(field);
        Input::new(*field)
    }

    /// Produce `field` (OutContract)
    pub fn writes<T: FieldValue>(&mut self, field: &Field<T>) -> Output<T> {
        self.output = mem::take(&mut self.output).field(field);
        Output::new(*field)
    }

    /// Require and produce `field`, enabling `modify`
    pub fn updates<T: FieldValue>(&mut self, field: &Field<T>) -> InOut<T> {
        self.reads(field);
        self.writes(field);
        InOut::new(*field)
    }

    /// Validate both contracts and build the stage
    ///
    /// # Errors
    ///
    /// Returns [`morph_core::Error::ConflictingField`] if a name was declared
    /// with two value types.
    pub fn build(self) -> Result<Stage> {
        Stage::new(self.name, self.input.build()?, self.output.build()?)
    }
}

/// A reusable stage: definition plus action body
///
/// `declare` runs once, when the operation is placed in a pipeline; the
/// handles it returns are passed back to every `run`.
///
/// ```
/// use morph_core::{Field, Result};
/// use morph_pipeline::{Operation, Output, Pipeline, StageBuilder, StageView};
///
/// const X: Field<i32> = Field::new("X");
///
/// struct SetX(i32);
///
/// impl Operation for SetX {
///     type Handles = Output<i32>;
///
///     fn name(&self) -> &str {
///         "SetX"
///     }
///
///     fn declare(&self, stage: &mut StageBuilder) -> Output<i32> {
///         stage.writes(&X)
///     }
///
///     fn run(&self, x: &Output<i32>, view: &mut StageView<'_>) -> Result<()> {
///         view.set(x, self.0)
///     }
/// }
///
/// let store = Pipeline::first_op(SetX(5))?.run()?;
/// assert_eq!(*store.field(&X)?, 5);
/// # Ok::<(), morph_core::Error>(())
/// ```
pub trait Operation: Send + Sync + 'static {
    /// Handles minted by [`Operation::declare`]
    type Handles: Send + Sync + 'static;

    /// Stage name, used in diagnostics
    fn name(&self) -> &str;

    /// Declare the operation's fields
    fn declare(&self, stage: &mut StageBuilder) -> Self::Handles;

    /// Action body
    ///
    /// # Errors
    ///
    /// View errors, or any failure of the operation itself wrapped with
    /// [`morph_core::Error::action`].
    fn run(&self, handles: &Self::Handles, view: &mut StageView<'_>) -> Result<()>;
}

/// Define `op`'s stage and bind its action
pub(crate) fn bind_operation<O: Operation>(op: O) -> Result<(Stage, Action)> {
    let (stage, handles) = Stage::define(op.name(), |s| op.declare(s))?;
    let action: Action = Arc::new(move |view: &mut StageView<'_>| op.run(&handles, view));
    Ok((stage, action))
}
