//! Restricted stage view
//!
//! A [`StageView`] is what a stage action receives. It closes over the live
//! store and offers exactly:
//! - `get(h)` for an `Input` or `InOut` handle
//! - `set(h, v)` for an `Output` or `InOut` handle
//! - `modify(h)` for an `InOut` handle
//!
//! Handles are minted only by declaring the field on the stage, so a field
//! outside the stage's contracts has no operation at all. The view does no
//! permission lookup when it is called.

use morph_core::{FieldDescriptor, FieldValue, Result, Store};

use crate::access::AccessPlan;
use crate::handle::{Capability, InOut, Readable, Writable};

/// Capability-restricted access to the store for one stage
pub struct StageView<'a> {
    stage: &'a str,
    plan: &'a AccessPlan,
    store: &'a mut Store,
}

impl<'a> StageView<'a> {
    pub(crate) fn new(stage: &'a str, plan: &'a AccessPlan, store: &'a mut Store) -> Self {
        Self { stage, plan, store }
    }

    /// Name of the stage this view belongs to
    pub fn stage_name(&self) -> &str {
        self.stage
    }

    /// Read an input field
    ///
    /// # Errors
    ///
    /// [`morph_core::Error::UnsetField`] if no earlier stage wrote it.
    pub fn get<H: Readable>(&self, handle: &H) -> Result<&H::Value> {
        self.store.get(handle.field().name())
    }

    /// Write an output field; last write wins
    ///
    /// Never fails. It returns `Result` so an action can end with it.
    pub fn set<H: Writable>(&mut self, handle: &H, value: H::Value) -> Result<()> {
        self.store.set(handle.field().name(), value);
        Ok(())
    }

    /// Mutable reference to a field that is both input and output
    ///
    /// # Errors
    ///
    /// [`morph_core::Error::UnsetField`] if no earlier stage wrote it.
    pub fn modify<T: FieldValue>(&mut self, handle: &InOut<T>) -> Result<&mut T> {
        self.store.modify(handle.name())
    }

    /// Fields declared for `get`
    pub fn readable(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.plan.readers().iter()
    }

    /// Fields declared for `set`
    pub fn writable(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.plan.writers().iter()
    }

    /// Fields declared for `modify`
    pub fn modifiable(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.plan.modifiers().iter()
    }
}
