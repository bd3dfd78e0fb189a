//! Heterogeneous store
//!
//! The store holds every field value of one pipeline run. Values of unrelated
//! types share no supertype, so the store is partitioned by value type:
//!
//! ```text
//! Store
//!  ├── TypeId(usize)      → { "PixelsWidth": Some(256), "PixelsHeight": Some(256) }
//!  ├── TypeId(Vec<Pixel>) → { "PixelsData": None }
//!  └── TypeId(PathBuf)    → { "FileName": Some("out.png") }
//! ```
//!
//! Each access names its partition through the generic parameter `T`, which
//! is the type witness; the partition is then a plain name → slot map.
//!
//! ## Slots
//!
//! A slot exists once allocated and holds no value until something sets it.
//! Reading an allocated but unset slot is [`Error::UnsetField`]; reading a
//! slot that was never allocated is [`Error::UnknownField`].
//!
//! The store performs no contract checking. Permission is the business of
//! the per-stage view that wraps it.

use std::any::{type_name, Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::contract::Contract;
use crate::error::{Error, Result};
use crate::field::{Field, FieldDescriptor, FieldValue, ValueType};

/// Type-erased partition holding the slots of one value type
pub(crate) trait Partition: Send + Sync {
    fn value_type(&self) -> ValueType;
    fn allocate(&mut self, name: &str);
    fn contains_slot(&self, name: &str) -> bool;
    fn is_set(&self, name: &str) -> bool;
    fn slot_count(&self) -> usize;
    fn set_count(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Slots of one value type, by field name
pub(crate) struct TypedPartition<T> {
    slots: BTreeMap<String, Option<T>>,
}

impl<T: FieldValue> TypedPartition<T> {
    pub(crate) fn boxed() -> Box<dyn Partition> {
        Box::new(Self {
            slots: BTreeMap::new(),
        })
    }
}

impl<T: FieldValue> Partition for TypedPartition<T> {
    fn value_type(&self) -> ValueType {
        ValueType::of::<T>()
    }

    fn allocate(&mut self, name: &str) {
        if !self.slots.contains_key(name) {
            self.slots.insert(name.to_string(), None);
        }
    }

    fn contains_slot(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    fn is_set(&self, name: &str) -> bool {
        matches!(self.slots.get(name), Some(Some(_)))
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn set_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_some()).count()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Container of named values of many unrelated types
///
/// # Examples
///
/// ```
/// use morph_core::{Contract, Field, Store};
///
/// const X: Field<i32> = Field::new("X");
///
/// let mut store = Store::for_contract(&Contract::single(&X));
/// assert!(store.get::<i32>("X").is_err()); // allocated, never written
///
/// store.set("X", 5_i32);
/// *store.modify::<i32>("X")? += 1;
/// assert_eq!(*store.get::<i32>("X")?, 6);
/// # Ok::<(), morph_core::Error>(())
/// ```
#[derive(Default)]
pub struct Store {
    partitions: FxHashMap<TypeId, Box<dyn Partition>>,
}

impl Store {
    /// Create an empty store with no partitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a slot for every field of `contract`
    pub fn for_contract(contract: &Contract) -> Self {
        let mut store = Self::new();
        store.allocate(contract);
        store
    }

    /// Allocate partitions and empty slots for every field of `contract`
    ///
    /// Slots that already exist keep their values.
    pub fn allocate(&mut self, contract: &Contract) {
        for descriptor in contract {
            let ty = descriptor.value_type();
            self.partitions
                .entry(ty.id())
                .or_insert_with(|| ty.new_partition())
                .allocate(descriptor.name());
        }
        debug!(
            partitions = self.partitions.len(),
            slots = self.slot_count(),
            "store allocated"
        );
    }

    /// Current value of a field
    ///
    /// # Errors
    ///
    /// [`Error::UnknownField`] if no slot exists, [`Error::UnsetField`] if
    /// the slot was never written.
    pub fn get<T: FieldValue>(&self, name: &str) -> Result<&T> {
        match self.partition::<T>().and_then(|p| p.slots.get(name)) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(unset::<T>(name)),
            None => Err(unknown::<T>(name)),
        }
    }

    /// Insert or overwrite a field value; last write wins
    ///
    /// Creates the partition and slot if needed. Returns the previous value.
    pub fn set<T: FieldValue>(&mut self, name: &str, value: T) -> Option<T> {
        let partition = self.partition_mut_or_insert::<T>();
        match partition.slots.get_mut(name) {
            Some(slot) => slot.replace(value),
            None => {
                partition.slots.insert(name.to_string(), Some(value));
                None
            }
        }
    }

    /// Mutable handle to an existing value
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get): the value must have been set before.
    pub fn modify<T: FieldValue>(&mut self, name: &str) -> Result<&mut T> {
        match self.partition_mut::<T>().and_then(|p| p.slots.get_mut(name)) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(unset::<T>(name)),
            None => Err(unknown::<T>(name)),
        }
    }

    /// Move a value out of the store, leaving its slot unset
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn take<T: FieldValue>(&mut self, name: &str) -> Result<T> {
        match self.partition_mut::<T>().and_then(|p| p.slots.get_mut(name)) {
            Some(slot) => slot.take().ok_or_else(|| unset::<T>(name)),
            None => Err(unknown::<T>(name)),
        }
    }

    /// Whether a value of type `T` is set under `name`
    pub fn is_set<T: FieldValue>(&self, name: &str) -> bool {
        matches!(
            self.partition::<T>().and_then(|p| p.slots.get(name)),
            Some(Some(_))
        )
    }

    /// Typed shorthand for [`get`](Self::get)
    pub fn field<T: FieldValue>(&self, field: &Field<T>) -> Result<&T> {
        self.get(field.name())
    }

    /// Whether a slot is allocated for `descriptor`
    pub fn contains_slot(&self, descriptor: &FieldDescriptor) -> bool {
        self.partitions
            .get(&descriptor.value_type().id())
            .map_or(false, |p| p.contains_slot(descriptor.name()))
    }

    /// Whether the slot for `descriptor` holds a value
    pub fn is_descriptor_set(&self, descriptor: &FieldDescriptor) -> bool {
        self.partitions
            .get(&descriptor.value_type().id())
            .map_or(false, |p| p.is_set(descriptor.name()))
    }

    /// Number of value-type partitions
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Number of allocated slots across all partitions
    pub fn slot_count(&self) -> usize {
        self.partitions.values().map(|p| p.slot_count()).sum()
    }

    /// Number of slots holding a value
    pub fn set_count(&self) -> usize {
        self.partitions.values().map(|p| p.set_count()).sum()
    }

    fn partition<T: FieldValue>(&self) -> Option<&TypedPartition<T>> {
        self.partitions
            .get(&TypeId::of::<T>())
            .and_then(|p| p.as_any().downcast_ref::<TypedPartition<T>>())
    }

    fn partition_mut<T: FieldValue>(&mut self) -> Option<&mut TypedPartition<T>> {
        self.partitions
            .get_mut(&TypeId::of::<T>())
            .and_then(|p| p.as_any_mut().downcast_mut::<TypedPartition<T>>())
    }

    fn partition_mut_or_insert<T: FieldValue>(&mut self) -> &mut TypedPartition<T> {
        let partition = self
            .partitions
            .entry(TypeId::of::<T>())
            .or_insert_with(TypedPartition::<T>::boxed);
        // Keyed by TypeId::of::<T>(), so the partition is always a TypedPartition<T>
        match partition.as_any_mut().downcast_mut::<TypedPartition<T>>() {
            Some(typed) => typed,
            None => unreachable!("partition keyed by {} holds another type", type_name::<T>()),
        }
    }
}

fn unset<T>(name: &str) -> Error {
    Error::UnsetField {
        name: name.to_string(),
        value_type: type_name::<T>(),
    }
}

fn unknown<T>(name: &str) -> Error {
    Error::UnknownField {
        name: name.to_string(),
        value_type: type_name::<T>(),
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut partitions: Vec<(&'static str, usize, usize)> = self
            .partitions
            .values()
            .map(|p| (p.value_type().name(), p.slot_count(), p.set_count()))
            .collect();
        partitions.sort();
        f.debug_struct("Store")
            .field("partitions", &partitions)
            .finish()
    }
}
