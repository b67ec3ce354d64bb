//! Keyed accessors over `Example`, `Features` and `SequenceExample` records.
//!
//! - [`features`] - Lookup, typed reads and bulk writes on a features map
//! - [`sequence`] - Context and per-step feature lists of a sequence record

pub mod features;
pub mod sequence;

pub use features::*;
pub use sequence::*;
