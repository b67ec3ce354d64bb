//! Access to the context and feature lists of a `SequenceExample`.
//!
//! A feature list is an ordered run of features, one per step. Steps are
//! plain [`Feature`]s, so the feature-level helpers in
//! [`features`](super::features) apply to each of them:
//!
//! ```
//! use feature_util::prelude::*;
//!
//! let mut seq = SequenceExample::new();
//! set_values([4.0], add_step("images", &mut seq));
//! set_values([5.0, 3.0], add_step("images", &mut seq));
//!
//! let steps = get_feature_list("images", &seq)?;
//! assert_eq!(steps.len(), 2);
//! assert_eq!(feature_values::<f32>(&steps[1])?, &[5.0, 3.0]);
//! # Ok::<(), feature_util::Error>(())
//! ```

use std::collections::hash_map::Entry;

use example_proto::{Feature, FeatureList, Features, SequenceExample};

use crate::util::{Error, Result};

/// Returns the shared context features.
#[inline]
pub fn context(seq: &SequenceExample) -> Option<&Features> {
    seq.context.as_ref()
}

/// Returns the shared context features, creating the map if needed.
#[inline]
pub fn context_mut(seq: &mut SequenceExample) -> &mut Features {
    seq.context_mut()
}

/// Returns true if the sequence has a feature list under `key`, even an
/// empty one.
pub fn has_feature_list(key: &str, seq: &SequenceExample) -> bool {
    seq.feature_lists
        .as_ref()
        .is_some_and(|lists| lists.feature_list.contains_key(key))
}

/// Returns the steps of the feature list under `key`.
pub fn get_feature_list<'a>(key: &str, seq: &'a SequenceExample) -> Result<&'a [Feature]> {
    seq.feature_lists
        .as_ref()
        .and_then(|lists| lists.feature_list.get(key))
        .map(|list| list.feature.as_slice())
        .ok_or_else(|| Error::not_found(key))
}

/// Returns the steps of the feature list under `key`, inserting an empty
/// list if absent.
pub fn get_feature_list_mut<'a>(key: &str, seq: &'a mut SequenceExample) -> &'a mut Vec<Feature> {
    let list = match seq.feature_lists_mut().feature_list.entry(key.to_owned()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            tracing::trace!(key, "creating feature list");
            entry.insert(FeatureList::default())
        }
    };
    &mut list.feature
}

/// Appends an empty step to the feature list under `key` and returns it.
pub fn add_step<'a>(key: &str, seq: &'a mut SequenceExample) -> &'a mut Feature {
    let steps = get_feature_list_mut(key, seq);
    steps.push(Feature::default());
    let last = steps.len() - 1;
    &mut steps[last]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::features::{
        append_values, feature_values, get_feature_values, has_feature, set_feature_values,
        set_values,
    };

    #[test]
    fn test_missing_feature_list() {
        let seq = SequenceExample::new();
        assert!(!has_feature_list("frames", &seq));
        assert_eq!(get_feature_list("frames", &seq), Err(Error::not_found("frames")));
        assert!(context(&seq).is_none());
    }

    #[test]
    fn test_empty_feature_list_is_present() {
        let mut seq = SequenceExample::new();
        assert!(get_feature_list_mut("frames", &mut seq).is_empty());
        assert!(has_feature_list("frames", &seq));
        assert!(get_feature_list("frames", &seq).unwrap().is_empty());
    }

    #[test]
    fn test_steps_keep_creation_order() {
        let mut seq = SequenceExample::new();
        for i in 0..5i64 {
            set_values([i, i * 10], add_step("ticks", &mut seq));
        }

        let steps = get_feature_list("ticks", &seq).unwrap();
        assert_eq!(steps.len(), 5);
        for (i, step) in steps.iter().enumerate() {
            let i = i as i64;
            assert_eq!(feature_values::<i64>(step).unwrap(), &[i, i * 10]);
        }
    }

    #[test]
    fn test_steps_are_independent() {
        let mut seq = SequenceExample::new();
        set_values(["a"], add_step("mixed", &mut seq));
        set_values([1.5f32], add_step("mixed", &mut seq));
        add_step("mixed", &mut seq);

        let steps = get_feature_list_mut("mixed", &mut seq);
        append_values(["b"], &mut steps[0]).unwrap();
        assert!(append_values([2], &mut steps[1]).is_err());
        append_values([3], &mut steps[2]).unwrap();

        let steps = get_feature_list("mixed", &seq).unwrap();
        assert_eq!(feature_values::<&str>(&steps[0]).unwrap(), &[b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(feature_values::<f32>(&steps[1]).unwrap(), &[1.5]);
        assert_eq!(feature_values::<i64>(&steps[2]).unwrap(), &[3]);
    }

    #[test]
    fn test_context_uses_record_accessors() {
        let mut seq = SequenceExample::new();
        set_feature_values(["clip-7"], "id", context_mut(&mut seq));

        let ctx = context(&seq).unwrap();
        assert!(has_feature("id", ctx));
        assert_eq!(get_feature_values::<String>("id", ctx).unwrap(), &[b"clip-7".to_vec()]);
        assert!(!has_feature_list("id", &seq));
    }
}
