//! Contract algebra
//!
//! A [`Contract`] is an immutable set of field descriptors. Stages declare
//! an input contract (fields they require) and an output contract (fields
//! they promise to produce); the pipeline chain evaluates the algebra below
//! when stages are appended.
//!
//! ## Operations
//!
//! | Operation | Meaning |
//! |-----------|---------|
//! | `contains` | a descriptor with the same name *and* type is present |
//! | `union` | all descriptors of both sides, name+type duplicates collapsed |
//! | `is_compatible_with` | every descriptor of `self` is contained in `available` |
//! | `missing_from` | the descriptors of `self` that `available` lacks |
//!
//! ## Conflicts
//!
//! A name may appear at most once per contract. Reusing a name with a
//! different value type is never coalesced: construction and `union` fail
//! with [`Error::ConflictingField`].
//!
//! ## Usage
//!
//! ```
//! use morph_core::{Contract, Field};
//!
//! const X: Field<i32> = Field::new("X");
//! const Y: Field<i32> = Field::new("Y");
//!
//! let produced = Contract::builder().field(&X).build()?;
//! let required = Contract::builder().field(&X).field(&Y).build()?;
//! assert!(!required.is_compatible_with(&produced));
//!
//! let more = produced.union(&Contract::builder().field(&Y).build()?)?;
//! assert!(required.is_compatible_with(&more));
//! # Ok::<(), morph_core::Error>(())
//! ```

pub mod available;

pub use available::AvailableContract;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::field::{Field, FieldDescriptor, FieldValue, ValueType};

/// Immutable set of field descriptors, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Contract {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl Contract {
    /// The empty contract
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a contract from typed fields
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Build a contract from descriptors
    ///
    /// Exact duplicates collapse to one entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingField`] if two descriptors share a name
    /// but not a value type.
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let mut fields = BTreeMap::new();
        for descriptor in descriptors {
            insert_unique(&mut fields, descriptor)?;
        }
        Ok(Self { fields })
    }

    /// Contract holding exactly one field
    pub fn single<T: FieldValue>(field: &Field<T>) -> Self {
        let descriptor = field.descriptor();
        let mut fields = BTreeMap::new();
        fields.insert(descriptor.name().to_string(), descriptor);
        Self { fields }
    }

    /// Whether a descriptor with the same name and value type is present
    pub fn contains(&self, descriptor: &FieldDescriptor) -> bool {
        self.fields
            .get(descriptor.name())
            .map_or(false, |present| present == descriptor)
    }

    /// Typed form of [`contains`](Self::contains)
    pub fn contains_field<T: FieldValue>(&self, field: &Field<T>) -> bool {
        self.fields
            .get(field.name())
            .map_or(false, |present| present.value_type().is::<T>())
    }

    /// Descriptor registered under `name`, if any
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Union of two contracts
    ///
    /// Returns a new contract; neither operand changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingField`] if a name appears on both sides
    /// with different value types.
    pub fn union(&self, other: &Contract) -> Result<Contract> {
        let mut fields = self.fields.clone();
        for descriptor in other.fields.values() {
            insert_unique(&mut fields, descriptor.clone())?;
        }
        Ok(Contract { fields })
    }

    /// Descriptors present in both contracts by name and type
    pub fn intersection(&self, other: &Contract) -> Contract {
        let fields = self
            .fields
            .iter()
            .filter(|(_, descriptor)| other.contains(descriptor))
            .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
            .collect();
        Contract { fields }
    }

    /// Whether every descriptor of `self` is contained in `available`
    ///
    /// The empty contract is compatible with everything.
    pub fn is_compatible_with(&self, available: &Contract) -> bool {
        self.fields.values().all(|d| available.contains(d))
    }

    /// Descriptors of `self` not contained in `available`, in name order
    pub fn missing_from(&self, available: &Contract) -> Vec<FieldDescriptor> {
        self.fields
            .values()
            .filter(|d| !available.contains(d))
            .cloned()
            .collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the contract has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Descriptors in name order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Field names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Distinct value types referenced by the contract
    pub fn value_types(&self) -> Vec<ValueType> {
        let mut types: Vec<ValueType> = self.fields.values().map(|d| d.value_type()).collect();
        types.sort();
        types.dedup();
        types
    }
}

fn insert_unique(
    fields: &mut BTreeMap<String, FieldDescriptor>,
    descriptor: FieldDescriptor,
) -> Result<()> {
    if let Some(existing) = fields.get(descriptor.name()) {
        if existing.conflicts_with(&descriptor) {
            return Err(Error::ConflictingField {
                name: descriptor.name().to_string(),
                existing: existing.value_type().name(),
                incoming: descriptor.value_type().name(),
            });
        }
        return Ok(());
    }
    fields.insert(descriptor.name().to_string(), descriptor);
    Ok(())
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, descriptor) in self.fields.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", descriptor)?;
        }
        write!(f, "}}")
    }
}

impl<'a> IntoIterator for &'a Contract {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::collections::btree_map::Values<'a, String, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.values()
    }
}

/// Collects fields and validates them into a [`Contract`]
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    descriptors: Vec<FieldDescriptor>,
}

impl ContractBuilder {
    /// Add a typed field
    pub fn field<T: FieldValue>(mut self, field: &Field<T>) -> Self {
        self.descriptors.push(field.descriptor());
        self
    }

    /// Add an untyped descriptor
    pub fn descriptor(mut self, descriptor: FieldDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingField`] if a name was added with two types.
    pub fn build(self) -> Result<Contract> {
        Contract::from_descriptors(self.descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Field<i32> = Field::new("X");
    const X_FLOAT: Field<f64> = Field::new("X");
    const Y: Field<i32> = Field::new("Y");
    const NAME: Field<String> = Field::new("Name");

    fn contract(fields: &[FieldDescriptor]) -> Contract {
        Contract::from_descriptors(fields.iter().cloned()).unwrap()
    }

    #[test]
    fn test_empty_contract() {
        let empty = Contract::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.to_string(), "{}");
    }

    #[test]
    fn test_duplicates_collapse() {
        let c = contract(&[X.descriptor(), X.descriptor(), Y.descriptor()]);
        assert_eq!(c.len(), 2);
        assert!(c.contains(&X.descriptor()));
        assert!(c.contains_field(&Y));
    }

    #[test]
    fn test_construction_rejects_conflict() {
        let err = Contract::builder().field(&X).field(&X_FLOAT).build().unwrap_err();
        match err {
            Error::ConflictingField {
                name,
                existing,
                incoming,
            } => {
                assert_eq!(name, "X");
                assert_eq!(existing, "i32");
                assert_eq!(incoming, "f64");
            }
            other => panic!("Wrong error variant: {other:?}"),
        }
    }

    #[test]
    fn test_contains_requires_matching_type() {
        let c = Contract::single(&X);
        assert!(c.contains(&X.descriptor()));
        assert!(!c.contains(&X_FLOAT.descriptor()));
        assert!(!c.contains_field(&X_FLOAT));
        assert!(c.get("X").is_some());
        assert!(c.get("Y").is_none());
    }

    #[test]
    fn test_union_collapses_and_keeps_operands() {
        let a = contract(&[X.descriptor(), NAME.descriptor()]);
        let b = contract(&[X.descriptor(), Y.descriptor()]);
        let u = a.union(&b).unwrap();

        assert_eq!(u.len(), 3);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert_eq!(u.names().collect::<Vec<_>>(), vec!["Name", "X", "Y"]);
    }

    #[test]
    fn test_union_conflict_fails_loudly() {
        let a = Contract::single(&X);
        let b = Contract::single(&X_FLOAT);
        assert!(matches!(a.union(&b), Err(Error::ConflictingField { .. })));
        assert!(matches!(b.union(&a), Err(Error::ConflictingField { .. })));
    }

    #[test]
    fn test_compatibility() {
        let available = contract(&[X.descriptor(), Y.descriptor()]);
        assert!(Contract::empty().is_compatible_with(&available));
        assert!(Contract::empty().is_compatible_with(&Contract::empty()));
        assert!(Contract::single(&X).is_compatible_with(&available));
        assert!(!Contract::single(&NAME).is_compatible_with(&available));
        assert!(!Contract::single(&X_FLOAT).is_compatible_with(&available));
    }

    #[test]
    fn test_missing_from_lists_unsatisfied_fields() {
        let required = contract(&[X.descriptor(), Y.descriptor(), NAME.descriptor()]);
        let available = Contract::single(&Y);
        let missing: Vec<String> = required
            .missing_from(&available)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(missing, vec!["Name", "X"]);
    }

    #[test]
    fn test_intersection() {
        let a = contract(&[X.descriptor(), Y.descriptor()]);
        let b = contract(&[Y.descriptor(), NAME.descriptor()]);
        let i = a.intersection(&b);
        assert_eq!(i.len(), 1);
        assert!(i.contains_field(&Y));
    }

    #[test]
    fn test_value_types_are_distinct() {
        let c = contract(&[X.descriptor(), Y.descriptor(), NAME.descriptor()]);
        let types = c.value_types();
        assert_eq!(types.len(), 2);
        assert!(types.contains(&ValueType::of::<i32>()));
        assert!(types.contains(&ValueType::of::<String>()));
    }

    #[test]
    fn test_display_lists_descriptors() {
        let c = contract(&[Y.descriptor(), X.descriptor()]);
        assert_eq!(c.to_string(), "{X: i32, Y: i32}");
    }
}
