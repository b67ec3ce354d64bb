//! Keyed access to the features of an `Example` or `Features` record.
//!
//! Reads fail with [`Error::KeyNotFound`] for absent keys; writes create the
//! feature on first use. A feature that already holds a different kind than
//! the requested value type yields [`Error::WrongVariant`] on typed reads and
//! in-place writes. Only [`set_values`] / [`clear_values`] switch kinds.

use std::collections::hash_map::Entry;

use example_proto::{Example, Feature, Features};

use crate::util::{kind_of, Error, FeatureKind, FeatureType, FeatureValue, Result, StoredType};

// ============================================================================
// Record containers
// ============================================================================

/// A record type that carries a `Features` map.
pub trait HasFeatures {
    /// Returns the features map, `None` if the record has none yet.
    fn features(&self) -> Option<&Features>;

    /// Returns the features map, creating an empty one if needed.
    fn features_mut(&mut self) -> &mut Features;
}

impl HasFeatures for Features {
    #[inline]
    fn features(&self) -> Option<&Features> {
        Some(self)
    }

    #[inline]
    fn features_mut(&mut self) -> &mut Features {
        self
    }
}

impl HasFeatures for Example {
    #[inline]
    fn features(&self) -> Option<&Features> {
        self.features.as_ref()
    }

    #[inline]
    fn features_mut(&mut self) -> &mut Features {
        self.features.get_or_insert_with(Features::default)
    }
}

/// Returns the `Features` map of a record.
#[inline]
pub fn get_features(proto: &impl HasFeatures) -> Option<&Features> {
    proto.features()
}

/// Returns the mutable `Features` map of a record, creating it if needed.
#[inline]
pub fn get_features_mut(proto: &mut impl HasFeatures) -> &mut Features {
    proto.features_mut()
}

// ============================================================================
// Lookup
// ============================================================================

/// Returns true if the record has a feature under `key`, of any kind.
pub fn has_feature(key: &str, proto: &impl HasFeatures) -> bool {
    proto
        .features()
        .is_some_and(|features| features.feature.contains_key(key))
}

/// Returns true if the record has a feature under `key` whose active kind is
/// the one `T` maps to.
///
/// A feature holding another kind, or no list at all, yields false.
pub fn has_feature_of<T: FeatureValue>(key: &str, proto: &impl HasFeatures) -> bool {
    proto
        .features()
        .and_then(|features| features.feature.get(key))
        .is_some_and(|feature| FeatureKind::of(feature) == Some(kind_of::<T>()))
}

/// Returns the feature stored under `key`.
pub fn get_feature<'a>(key: &str, proto: &'a impl HasFeatures) -> Result<&'a Feature> {
    proto
        .features()
        .and_then(|features| features.feature.get(key))
        .ok_or_else(|| Error::not_found(key))
}

/// Returns the feature stored under `key`, inserting an empty one if absent.
pub fn get_feature_mut<'a>(key: &str, proto: &'a mut impl HasFeatures) -> &'a mut Feature {
    match proto.features_mut().feature.entry(key.to_owned()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            tracing::trace!(key, "creating feature");
            entry.insert(Feature::default())
        }
    }
}

/// Number of values in whichever list is active.
pub fn num_values(feature: &Feature) -> usize {
    if let Some(list) = feature.int64_list() {
        list.value.len()
    } else if let Some(list) = feature.float_list() {
        list.value.len()
    } else if let Some(list) = feature.bytes_list() {
        list.value.len()
    } else {
        0
    }
}

// ============================================================================
// Feature-level values
// ============================================================================

fn wrong_variant(expected: FeatureKind, actual: FeatureKind) -> Error {
    Error::WrongVariant {
        key: String::new(),
        expected,
        actual,
    }
}

/// Returns the values of a feature for value type `T`.
///
/// A feature with no active list reads as empty.
pub fn feature_values<T: FeatureValue>(feature: &Feature) -> Result<&[StoredType<T>]> {
    if let Some(list) = <StoredType<T>>::list(feature) {
        return Ok(list.as_slice());
    }
    match FeatureKind::of(feature) {
        Some(actual) => Err(wrong_variant(kind_of::<T>(), actual)),
        None => Ok(&[]),
    }
}

/// Returns the mutable list of a feature for value type `T`.
///
/// An unset feature is bound to `T`'s kind. A feature holding another kind
/// is left untouched and an error is returned.
pub fn feature_values_mut<T: FeatureValue>(feature: &mut Feature) -> Result<&mut Vec<StoredType<T>>> {
    let expected = kind_of::<T>();
    match FeatureKind::of(feature) {
        Some(actual) if actual != expected => Err(wrong_variant(expected, actual)),
        _ => Ok(<StoredType<T>>::list_mut(feature)),
    }
}

/// Empties the list for `T`'s kind and makes it the active kind.
///
/// Values stored under another kind are dropped.
pub fn clear_values<T: FeatureValue>(feature: &mut Feature) {
    let expected = kind_of::<T>();
    if let Some(previous) = FeatureKind::of(feature).filter(|kind| *kind != expected) {
        tracing::debug!(from = %previous, to = %expected, "switching feature kind");
    }
    <StoredType<T>>::list_mut(feature).clear();
}

fn extend_list<I>(list: &mut Vec<StoredType<I::Item>>, iter: I)
where
    I: Iterator,
    I::Item: FeatureValue,
{
    list.reserve(iter.size_hint().0);
    list.extend(iter.map(FeatureValue::into_feature_type));
}

/// Appends `values` to a feature, in order.
pub fn append_values<I>(values: I, feature: &mut Feature) -> Result<()>
where
    I: IntoIterator,
    I::Item: FeatureValue,
{
    let list = feature_values_mut::<I::Item>(feature)?;
    extend_list(list, values.into_iter());
    Ok(())
}

/// Replaces the contents of a feature with `values`.
///
/// The feature afterwards holds exactly `values` under their kind, whatever
/// it held before.
pub fn set_values<I>(values: I, feature: &mut Feature)
where
    I: IntoIterator,
    I::Item: FeatureValue,
{
    clear_values::<I::Item>(feature);
    extend_list(<StoredType<I::Item>>::list_mut(feature), values.into_iter());
}

// ============================================================================
// Keyed values
// ============================================================================

/// Returns the values stored under `key` for value type `T`.
pub fn get_feature_values<'a, T: FeatureValue>(
    key: &str,
    proto: &'a impl HasFeatures,
) -> Result<&'a [StoredType<T>]> {
    let feature = get_feature(key, proto)?;
    feature_values::<T>(feature).map_err(|e| e.with_key(key))
}

/// Returns the mutable list under `key` for value type `T`, creating the
/// feature if absent.
pub fn get_feature_values_mut<'a, T: FeatureValue>(
    key: &str,
    proto: &'a mut impl HasFeatures,
) -> Result<&'a mut Vec<StoredType<T>>> {
    let feature = get_feature_mut(key, proto);
    feature_values_mut::<T>(feature).map_err(|e| e.with_key(key))
}

/// Appends `values` to the feature under `key`, creating it if absent.
///
/// # Example
/// ```
/// use feature_util::prelude::*;
///
/// let mut example = Example::new();
/// append_feature_values([1, 2, 3], "tag", &mut example)?;
/// append_feature_values(vec![4u8], "tag", &mut example)?;
/// assert_eq!(get_feature_values::<i64>("tag", &example)?, &[1, 2, 3, 4]);
/// # Ok::<(), feature_util::Error>(())
/// ```
///
/// Value types outside the integer, float and string families do not
/// compile:
/// ```compile_fail
/// use feature_util::prelude::*;
///
/// let mut example = Example::new();
/// append_feature_values([()], "unit", &mut example);
/// ```
pub fn append_feature_values<I>(values: I, key: &str, proto: &mut impl HasFeatures) -> Result<()>
where
    I: IntoIterator,
    I::Item: FeatureValue,
{
    append_values(values, get_feature_mut(key, proto)).map_err(|e| e.with_key(key))
}

/// Replaces the feature under `key` with `values`, creating it if absent.
///
/// # Example
/// ```
/// use feature_util::prelude::*;
///
/// let mut example = Example::new();
/// set_feature_values([1, 2], "tag", &mut example);
/// set_feature_values(["x"], "tag", &mut example);
/// assert!(!has_feature_of::<i64>("tag", &example));
/// assert_eq!(get_feature_values::<String>("tag", &example)?, &[b"x".to_vec()]);
/// # Ok::<(), feature_util::Error>(())
/// ```
pub fn set_feature_values<I>(values: I, key: &str, proto: &mut impl HasFeatures)
where
    I: IntoIterator,
    I::Item: FeatureValue,
{
    set_values(values, get_feature_mut(key, proto));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_feature_on_empty_records() {
        let example = Example::new();
        assert!(!has_feature("tag", &example));
        assert!(!has_feature_of::<i64>("tag", &example));
        assert!(get_features(&example).is_none());

        let features = Features::new();
        assert!(!has_feature("tag", &features));
    }

    #[test]
    fn test_get_feature_mut_creates_once() {
        let mut example = Example::new();
        get_feature_mut("tag", &mut example).mutable_int64_list().value.push(5);
        get_feature_mut("tag", &mut example).mutable_int64_list().value.push(6);

        let features = get_features(&example).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(get_feature_values::<i64>("tag", &example).unwrap(), &[5, 6]);
    }

    #[test]
    fn test_created_feature_has_no_kind() {
        let mut features = Features::new();
        get_feature_mut("empty", &mut features);
        assert!(has_feature("empty", &features));
        for kind_present in [
            has_feature_of::<i64>("empty", &features),
            has_feature_of::<f32>("empty", &features),
            has_feature_of::<String>("empty", &features),
        ] {
            assert!(!kind_present);
        }
        assert!(get_feature_values::<f32>("empty", &features).unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_key() {
        let example = Example::new();
        assert_eq!(get_feature("nope", &example), Err(Error::not_found("nope")));
        assert_eq!(
            get_feature_values::<f32>("nope", &example),
            Err(Error::not_found("nope"))
        );
    }

    #[test]
    fn test_wrong_variant_read() {
        let mut features = Features::new();
        set_feature_values([1.5f32], "score", &mut features);

        let err = get_feature_values::<i64>("score", &features).unwrap_err();
        assert_eq!(
            err,
            Error::WrongVariant {
                key: "score".into(),
                expected: FeatureKind::Int64,
                actual: FeatureKind::Float,
            }
        );
        assert!(has_feature("score", &features));
        assert!(!has_feature_of::<i64>("score", &features));
        assert!(has_feature_of::<f64>("score", &features));
    }

    #[test]
    fn test_wrong_variant_write_keeps_values() {
        let mut example = Example::new();
        set_feature_values(["a", "b"], "label", &mut example);

        let err = append_feature_values([1], "label", &mut example).unwrap_err();
        assert!(matches!(err, Error::WrongVariant { ref key, .. } if key == "label"));
        assert!(get_feature_values_mut::<f32>("label", &mut example).is_err());

        assert_eq!(
            get_feature_values::<&str>("label", &example).unwrap(),
            &[b"a".to_vec(), b"b".to_vec()]
        );
    }

    #[test]
    fn test_get_feature_values_mut_creates() {
        let mut example = Example::new();
        let values = get_feature_values_mut::<i64>("ids", &mut example).unwrap();
        assert!(values.is_empty());
        values.push(10);
        values.push(20);

        assert!(has_feature_of::<u32>("ids", &example));
        assert_eq!(get_feature_values::<i64>("ids", &example).unwrap(), &[10, 20]);
    }

    #[test]
    fn test_feature_level_helpers() {
        let mut feature = Feature::default();
        append_values([1.0f64, 2.0], &mut feature).unwrap();
        append_values(&[3.0f32], &mut feature).unwrap();
        assert_eq!(feature_values::<f32>(&feature).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(num_values(&feature), 3);

        clear_values::<f32>(&mut feature);
        assert_eq!(FeatureKind::of(&feature), Some(FeatureKind::Float));
        assert_eq!(num_values(&feature), 0);

        clear_values::<String>(&mut feature);
        assert_eq!(FeatureKind::of(&feature), Some(FeatureKind::Bytes));
        let err = feature_values::<f32>(&feature).unwrap_err();
        assert_eq!(err.to_string(), "Wrong feature kind: expected float_list, got bytes_list");
    }

    #[test]
    fn test_set_values_switches_kind() {
        let mut feature = Feature::from_int64s(vec![1, 2, 3]);
        set_values(vec![String::from("only")], &mut feature);
        assert!(feature.int64_list().is_none());
        assert_eq!(feature_values::<String>(&feature).unwrap(), &[b"only".to_vec()]);
    }

    #[test]
    fn test_set_empty_is_present() {
        let mut example = Example::new();
        set_feature_values(Vec::<i64>::new(), "empty", &mut example);

        assert!(has_feature("empty", &example));
        assert!(has_feature_of::<i64>("empty", &example));
        assert!(get_feature_values::<i64>("empty", &example).unwrap().is_empty());
    }

    #[test]
    fn test_bytes_are_copied() {
        let mut example = Example::new();
        let owned = String::from("borrowed");
        let views: Vec<&str> = vec![owned.as_str(), &owned[..3]];
        set_feature_values(&views, "text", &mut example);
        drop(views);
        drop(owned);

        assert_eq!(
            get_feature_values::<String>("text", &example).unwrap(),
            &[b"borrowed".to_vec(), b"bor".to_vec()]
        );
    }

    #[test]
    fn test_features_and_example_agree() {
        let mut example = Example::new();
        set_feature_values([7i32], "x", &mut example);
        let features = get_features(&example).unwrap();
        assert_eq!(get_feature_values::<i64>("x", features).unwrap(), &[7]);

        let features = get_features_mut(&mut example);
        append_feature_values([8i32], "x", features).unwrap();
        assert_eq!(get_feature_values::<i64>("x", &example).unwrap(), &[7, 8]);
    }
}
