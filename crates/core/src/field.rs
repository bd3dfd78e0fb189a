//! Field descriptors
//!
//! A field is one named, typed slot that stages exchange through the store:
//! - [`ValueType`]: runtime witness of a Rust value type (`TypeId` + name)
//! - [`FieldDescriptor`]: untyped (name, value type) pair used by the contract algebra
//! - [`Field<T>`]: typed, `const`-constructible handle used by stages and views
//!
//! ## Identity
//!
//! Two descriptors are the same field iff both the name and the value type
//! match. A shared name with different value types is a conflict, never a match.

use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::store::{Partition, TypedPartition};

/// Values that can live in the store.
///
/// Implemented for every `'static` type that is `Send + Sync`.
pub trait FieldValue: Any + Send + Sync {}

impl<T: Any + Send + Sync> FieldValue for T {}

/// Runtime witness of a field's value type
///
/// Equality, hashing and ordering use the `TypeId` only; the type name is
/// carried for diagnostics. The witness also knows how to allocate an empty
/// store partition for its type, which is what lets a store be sized from a
/// contract alone.
#[derive(Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
    new_partition: fn() -> Box<dyn Partition>,
}

impl ValueType {
    /// Witness for `T`
    pub fn of<T: FieldValue>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            new_partition: TypedPartition::<T>::boxed,
        }
    }

    /// The underlying `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Rust type name, for diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this witnesses `T`
    pub fn is<T: FieldValue>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub(crate) fn new_partition(&self) -> Box<dyn Partition> {
        (self.new_partition)()
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Name first so diagnostics list types in a stable, readable order
impl Ord for ValueType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name).then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for ValueType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueType").field(&self.name).finish()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One named, typed slot
///
/// # Examples
///
/// ```
/// use morph_core::{FieldDescriptor, ValueType};
///
/// let width = FieldDescriptor::new::<usize>("Width");
/// assert_eq!(width.name(), "Width");
/// assert_eq!(width.value_type(), ValueType::of::<usize>());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    ty: ValueType,
}

impl FieldDescriptor {
    /// Descriptor for a field named `name` holding `T`
    pub fn new<T: FieldValue>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ty: ValueType::of::<T>(),
        }
    }

    /// Descriptor from an explicit value type witness
    pub fn with_type(name: impl Into<Cow<'static, str>>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value type
    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    /// Same name, different value type
    pub fn conflicts_with(&self, other: &FieldDescriptor) -> bool {
        self.name == other.name && self.ty != other.ty
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// Typed handle to a field
///
/// `Field` values are plain constants: declare them once next to the stages
/// that produce them and share them with every consumer.
///
/// ```
/// use morph_core::Field;
///
/// const PIXELS_WIDTH: Field<usize> = Field::new("PixelsWidth");
/// assert_eq!(PIXELS_WIDTH.name(), "PixelsWidth");
/// ```
pub struct Field<T> {
    name: &'static str,
    // fn() -> T keeps Field Send + Sync + Copy whatever T is
    _marker: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    /// Declare a field
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Field name
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: FieldValue> Field<T> {
    /// Untyped descriptor for this field
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: Cow::Borrowed(self.name),
            ty: ValueType::of::<T>(),
        }
    }

    /// Value type witness for this field
    pub fn value_type(&self) -> ValueType {
        ValueType::of::<T>()
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field<{}>({})", type_name::<T>(), self.name)
    }
}

impl<T: FieldValue> From<&Field<T>> for FieldDescriptor {
    fn from(field: &Field<T>) -> Self {
        field.descriptor()
    }
}

impl<T: FieldValue> From<Field<T>> for FieldDescriptor {
    fn from(field: Field<T>) -> Self {
        field.descriptor()
    }
}
