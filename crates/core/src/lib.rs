//! Core types for Morphline
//!
//! This crate defines the data model that pipelines are checked against:
//! - Field: named, typed slot (`Field<T>`, `FieldDescriptor`, `ValueType`)
//! - Contract: immutable set of field descriptors with union/compatibility algebra
//! - AvailableContract: cumulative contract of a chain position, or the invalid marker
//! - Store: heterogeneous container partitioned by value type
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod field;
pub mod store;

pub use contract::{AvailableContract, Contract, ContractBuilder};
pub use error::{BoxError, Error, Result};
pub use field::{Field, FieldDescriptor, FieldValue, ValueType};
pub use store::Store;
