//! # feature-util
//!
//! Typed access to `Example` and `SequenceExample` feature records.
//!
//! A feature stores one of three value lists (`int64_list`, `float_list`,
//! `bytes_list`) and setting one discards the others. Reaching a value
//! through the raw record means picking the right list by hand:
//!
//! ```ignore
//! let id = example.features.as_ref().unwrap().feature["tag"].int64_list().unwrap().value[0];
//! ```
//!
//! With this crate the list is picked from the value type instead:
//!
//! ```
//! use feature_util::prelude::*;
//!
//! let mut example = Example::new();
//! append_feature_values([1, 2, 3], "tag", &mut example)?;
//! get_feature_values_mut::<i64>("tag", &mut example)?.push(4);
//! set_feature_values(["lorem ipsum"], "text", &mut example);
//!
//! assert_eq!(get_feature_values::<i64>("tag", &example)?[0], 1);
//! assert!(has_feature_of::<String>("text", &example));
//! # Ok::<(), feature_util::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`util`] - Feature kinds, the value type mapping, errors
//! - [`access`] - Record and sequence accessors
//!
//! The record types themselves come from the `example-proto` crate and are
//! re-exported as [`proto`].

pub mod util;
pub mod access;

pub use example_proto as proto;

// Re-export commonly used types
pub use util::{Error, FeatureKind, FeatureType, FeatureValue, Result, StoredType};
pub use access::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, FeatureKind, FeatureType, FeatureValue, Result};
    pub use crate::access::*;
    pub use crate::proto::{Example, Feature, FeatureList, FeatureLists, Features, SequenceExample};
}
