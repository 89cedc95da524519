//! Case-insensitive naming store for configuration substitution.
//!
//! This crate accumulates configuration values from heterogeneous sources
//! (property bags, string-keyed maps, other stores, parsed JSON) into a
//! single table of names to string values. The table is what a substitution
//! step later reads tokens from; substitution itself is out of scope.
//!
//! # Merge policies
//!
//! - **Overwrite** (`insert*`): the incoming value always replaces an
//!   existing one.
//! - **Preserve** (`try_add*`): an existing value is kept and the call
//!   reports `false`. A batch reports `true` only if every entry was new.
//!
//! Empty names and null values are skipped silently under both policies.
//!
//! # Modules
//!
//! - [`error`] — [`NamingError`] and the crate `Result`
//! - [`value`] — [`RawValue`] input model and the flattening algorithm
//! - [`store`] — [`NamingStore`] and the merge policies
//! - [`codec`] — JSON encode/decode of a store
//! - [`shared`] — [`SharedNamingStore`], a lock-guarded handle

pub mod codec;
pub mod error;
pub mod shared;
pub mod store;
pub mod value;

pub use codec::{decode, decode_slice, encode};
pub use error::{NamingError, Result};
pub use shared::SharedNamingStore;
pub use store::{AddOutcome, MergePolicy, NamingStore};
pub use value::{PropertyBag, RawValue, Scalar, ARRAY_SEPARATOR, SEQUENCE_SEPARATOR};
