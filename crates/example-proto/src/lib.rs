//! In-memory record model for `Example` and `SequenceExample`.
//!
//! The types mirror the field layout of the protobuf messages they stand in
//! for: a `Feature` is a oneof over three value lists, `Features` maps string
//! keys to features, and a `SequenceExample` adds named lists of features on
//! top of a context map. Wire encoding is not handled here.
//!
//! Like generated protobuf code, the mutable list accessors on [`Feature`]
//! switch the active oneof case. Asking for a mutable float list on a feature
//! that currently holds integers drops the integers.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// List of 64-bit signed integers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Int64List {
    pub value: Vec<i64>,
}

/// List of single precision floats.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FloatList {
    pub value: Vec<f32>,
}

/// List of byte strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BytesList {
    pub value: Vec<Vec<u8>>,
}

pub mod feature {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    /// The oneof case stored in a [`Feature`](super::Feature).
    #[derive(Clone, Debug, PartialEq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
    pub enum Kind {
        BytesList(super::BytesList),
        FloatList(super::FloatList),
        Int64List(super::Int64List),
    }
}

/// A single named value list. `kind` is `None` until a list is set.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Feature {
    pub kind: Option<feature::Kind>,
}

macro_rules! oneof_accessors {
    ($get:ident, $get_mut:ident, $variant:ident, $list:ty) => {
        /// Returns the list if this case is active.
        #[inline]
        pub fn $get(&self) -> Option<&$list> {
            match &self.kind {
                Some(feature::Kind::$variant(list)) => Some(list),
                _ => None,
            }
        }

        /// Returns the list for this case, making it the active case.
        ///
        /// A list stored under any other case is dropped.
        pub fn $get_mut(&mut self) -> &mut $list {
            if !matches!(self.kind, Some(feature::Kind::$variant(_))) {
                self.kind = Some(feature::Kind::$variant(<$list>::default()));
            }
            match &mut self.kind {
                Some(feature::Kind::$variant(list)) => list,
                _ => unreachable!("oneof case was just set"),
            }
        }
    };
}

impl Feature {
    /// Create a feature holding an integer list.
    pub fn from_int64s(value: Vec<i64>) -> Self {
        Self { kind: Some(feature::Kind::Int64List(Int64List { value })) }
    }

    /// Create a feature holding a float list.
    pub fn from_floats(value: Vec<f32>) -> Self {
        Self { kind: Some(feature::Kind::FloatList(FloatList { value })) }
    }

    /// Create a feature holding a bytes list.
    pub fn from_bytes(value: Vec<Vec<u8>>) -> Self {
        Self { kind: Some(feature::Kind::BytesList(BytesList { value })) }
    }

    oneof_accessors!(int64_list, mutable_int64_list, Int64List, Int64List);
    oneof_accessors!(float_list, mutable_float_list, FloatList, FloatList);
    oneof_accessors!(bytes_list, mutable_bytes_list, BytesList, BytesList);
}

/// Map from feature key to feature.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Features {
    pub feature: HashMap<String, Feature>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.feature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature.is_empty()
    }
}

/// A flat record: one optional `Features` map.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Example {
    pub features: Option<Features>,
}

impl Example {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> Option<&Features> {
        self.features.as_ref()
    }

    /// Returns the features map, creating it if unset.
    pub fn features_mut(&mut self) -> &mut Features {
        self.features.get_or_insert_with(Features::default)
    }
}

/// Ordered list of features, one per step.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeatureList {
    pub feature: Vec<Feature>,
}

/// Map from key to feature list.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeatureLists {
    pub feature_list: HashMap<String, FeatureList>,
}

/// A record with shared context features and named per-step feature lists.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequenceExample {
    pub context: Option<Features>,
    pub feature_lists: Option<FeatureLists>,
}

impl SequenceExample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> Option<&Features> {
        self.context.as_ref()
    }

    /// Returns the context map, creating it if unset.
    pub fn context_mut(&mut self) -> &mut Features {
        self.context.get_or_insert_with(Features::default)
    }

    pub fn feature_lists(&self) -> Option<&FeatureLists> {
        self.feature_lists.as_ref()
    }

    /// Returns the feature list map, creating it if unset.
    pub fn feature_lists_mut(&mut self) -> &mut FeatureLists {
        self.feature_lists.get_or_insert_with(FeatureLists::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_feature_has_no_case() {
        let f = Feature::default();
        assert!(f.kind.is_none());
        assert!(f.int64_list().is_none());
        assert!(f.float_list().is_none());
        assert!(f.bytes_list().is_none());
    }

    #[test]
    fn test_mutable_accessor_switches_case() {
        let mut f = Feature::from_int64s(vec![1, 2, 3]);
        assert_eq!(f.int64_list().map(|l| l.value.len()), Some(3));

        f.mutable_float_list().value.push(0.5);
        assert!(f.int64_list().is_none());
        assert_eq!(f.float_list().map(|l| l.value.clone()), Some(vec![0.5]));

        // Same case keeps existing values.
        f.mutable_float_list().value.push(1.5);
        assert_eq!(f.float_list().map(|l| l.value.len()), Some(2));
    }

    #[test]
    fn test_lazy_submessages() {
        let mut ex = Example::new();
        assert!(ex.features().is_none());
        ex.features_mut();
        assert!(ex.features().is_some_and(Features::is_empty));

        let mut se = SequenceExample::new();
        assert!(se.context().is_none());
        assert!(se.feature_lists().is_none());
        se.context_mut();
        se.feature_lists_mut();
        assert!(se.context().is_some());
        assert!(se.feature_lists().is_some());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_json_shape() {
        let mut ex = Example::new();
        ex.features_mut()
            .feature
            .insert("tag".to_string(), Feature::from_int64s(vec![7]));

        let json = serde_json::to_value(&ex).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "features": { "feature": { "tag": { "kind": { "int64_list": { "value": [7] } } } } }
            })
        );

        let back: Example = serde_json::from_value(json).unwrap();
        assert_eq!(back, ex);
    }
}
