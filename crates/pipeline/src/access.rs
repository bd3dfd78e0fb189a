//! Per-stage access plan
//!
//! The access plan is computed once, when a stage is defined, from its two
//! contracts:
//!
//! | Accessor set | Fields | View operation | Handle |
//! |--------------|--------|----------------|--------|
//! | readers | InContract | `get` | `Input`, `InOut` |
//! | writers | OutContract | `set` | `Output`, `InOut` |
//! | modifiers | InContract ∩ OutContract | `modify` | `InOut` |
//!
//! The handles carry the permission; the plan only describes it, for
//! enumeration and diagnostics.

use std::fmt;

use morph_core::{Contract, FieldDescriptor, Result};

/// A kind of access a stage can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// `get`: read-only access to an input field
    Get,
    /// `set`: write access to an output field
    Set,
    /// `modify`: read-modify-write access to a field that is both input and output
    Modify,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Get => write!(f, "get"),
            AccessKind::Set => write!(f, "set"),
            AccessKind::Modify => write!(f, "modify"),
        }
    }
}

/// Accessor sets of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPlan {
    readers: Contract,
    writers: Contract,
    modifiers: Contract,
}

impl AccessPlan {
    /// Derive the accessor sets from a stage's contracts
    ///
    /// # Errors
    ///
    /// Returns [`morph_core::Error::ConflictingField`] if the two contracts
    /// disagree on the type of a shared name.
    pub fn new(input: &Contract, output: &Contract) -> Result<Self> {
        // Rejects In/Out pairs that bind one name to two types
        input.union(output)?;
        Ok(Self {
            readers: input.clone(),
            writers: output.clone(),
            modifiers: input.intersection(output),
        })
    }

    /// Fields reachable through `get`
    pub fn readers(&self) -> &Contract {
        &self.readers
    }

    /// Fields reachable through `set`
    pub fn writers(&self) -> &Contract {
        &self.writers
    }

    /// Fields reachable through `modify`
    pub fn modifiers(&self) -> &Contract {
        &self.modifiers
    }

    /// Whether the plan has an accessor of `kind` for `descriptor`
    pub fn grants(&self, kind: AccessKind, descriptor: &FieldDescriptor) -> bool {
        self.set_for(kind).contains(descriptor)
    }

    /// Every field reachable through any accessor
    pub fn reachable(&self) -> impl Iterator<Item = &FieldDescriptor> {
        // modifiers ⊆ readers, so readers ∪ writers covers everything
        self.readers.iter().chain(
            self.writers
                .iter()
                .filter(move |d| !self.readers.contains(d)),
        )
    }

    fn set_for(&self, kind: AccessKind) -> &Contract {
        match kind {
            AccessKind::Get => &self.readers,
            AccessKind::Set => &self.writers,
            AccessKind::Modify => &self.modifiers,
        }
    }
}
