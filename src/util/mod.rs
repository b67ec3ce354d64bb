//! Basic types shared by the accessors.
//!
//! - [`FeatureKind`] - The three feature list kinds
//! - [`FeatureType`] / [`FeatureValue`] - Compile-time mapping from value types to kinds
//! - [`Error`] / [`Result`] - Error handling

mod kind;
mod error;

pub use kind::*;
pub use error::*;
