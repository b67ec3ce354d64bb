//! Feature kinds and the compile-time mapping from Rust value types to them.
//!
//! A `Feature` stores exactly one of three lists. Which one a caller reads or
//! writes is decided by the element type at the call site:
//!
//! | value type                                          | kind      | stored as |
//! |-----------------------------------------------------|-----------|-----------|
//! | `i8`..`i128`, `u8`..`u128`, `isize`, `usize`, `bool` | `Int64`   | `i64`     |
//! | `f32`, `f64`, `half::f16`                           | `Float`   | `f32`     |
//! | `String`, `&str`, `Box<str>`, `Cow<str>`, `Vec<u8>`, `&[u8]`, `Cow<[u8]>` | `Bytes` | `Vec<u8>` |
//!
//! Shared references to these types map the same way. Any other type does not
//! implement [`FeatureValue`] and is rejected by the compiler.

use std::borrow::Cow;
use std::fmt;

use example_proto::{feature::Kind, Feature};
use half::f16;

/// The active list of a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FeatureKind {
    /// 64-bit signed integers
    Int64 = 0,
    /// 32-bit floats
    Float = 1,
    /// Byte strings
    Bytes = 2,
}

impl FeatureKind {
    /// Number of feature kinds.
    pub const COUNT: usize = 3;

    /// All kinds, in tag order.
    pub const ALL: [Self; Self::COUNT] = [Self::Int64, Self::Float, Self::Bytes];

    /// Returns the field name of this kind's list.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int64 => "int64_list",
            Self::Float => "float_list",
            Self::Bytes => "bytes_list",
        }
    }

    /// Parse a kind from its list field name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int64_list" => Some(Self::Int64),
            "float_list" => Some(Self::Float),
            "bytes_list" => Some(Self::Bytes),
            _ => None,
        }
    }

    /// Returns the active kind of a feature, `None` for an unset feature.
    #[inline]
    pub fn of(feature: &Feature) -> Option<Self> {
        match &feature.kind {
            Some(Kind::Int64List(_)) => Some(Self::Int64),
            Some(Kind::FloatList(_)) => Some(Self::Float),
            Some(Kind::BytesList(_)) => Some(Self::Bytes),
            None => None,
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for Vec<u8> {}
}

// === Stored element types ===

/// Element type of one of the three feature lists: `i64`, `f32` or `Vec<u8>`.
///
/// Sealed: the set of feature kinds is closed.
pub trait FeatureType: sealed::Sealed + Clone + fmt::Debug + 'static {
    /// The kind whose list holds this type.
    const KIND: FeatureKind;

    /// Returns the list if this kind is active.
    fn list(feature: &Feature) -> Option<&Vec<Self>>;

    /// Returns the list for this kind, making it the active kind.
    ///
    /// Values held under any other kind are dropped.
    fn list_mut(feature: &mut Feature) -> &mut Vec<Self>;
}

impl FeatureType for i64 {
    const KIND: FeatureKind = FeatureKind::Int64;

    #[inline]
    fn list(feature: &Feature) -> Option<&Vec<Self>> {
        feature.int64_list().map(|l| &l.value)
    }

    #[inline]
    fn list_mut(feature: &mut Feature) -> &mut Vec<Self> {
        &mut feature.mutable_int64_list().value
    }
}

impl FeatureType for f32 {
    const KIND: FeatureKind = FeatureKind::Float;

    #[inline]
    fn list(feature: &Feature) -> Option<&Vec<Self>> {
        feature.float_list().map(|l| &l.value)
    }

    #[inline]
    fn list_mut(feature: &mut Feature) -> &mut Vec<Self> {
        &mut feature.mutable_float_list().value
    }
}

impl FeatureType for Vec<u8> {
    const KIND: FeatureKind = FeatureKind::Bytes;

    #[inline]
    fn list(feature: &Feature) -> Option<&Vec<Self>> {
        feature.bytes_list().map(|l| &l.value)
    }

    #[inline]
    fn list_mut(feature: &mut Feature) -> &mut Vec<Self> {
        &mut feature.mutable_bytes_list().value
    }
}

// === Caller value types ===

/// A value that can be stored in a feature list.
///
/// `Type` selects the list; `into_feature_type` converts (and for borrowed
/// strings, copies) the value into that list's element type.
pub trait FeatureValue {
    /// Stored element type, which fixes the feature kind.
    type Type: FeatureType;

    /// Convert into the stored element type.
    fn into_feature_type(self) -> Self::Type;
}

/// Stored element type for value type `T`.
pub type StoredType<T> = <T as FeatureValue>::Type;

/// Returns the feature kind value type `T` maps to.
#[inline]
pub fn kind_of<T: FeatureValue>() -> FeatureKind {
    <T::Type as FeatureType>::KIND
}

macro_rules! impl_int_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FeatureValue for $t {
                type Type = i64;
                #[inline]
                fn into_feature_type(self) -> i64 {
                    self as i64
                }
            }

            impl FeatureValue for &$t {
                type Type = i64;
                #[inline]
                fn into_feature_type(self) -> i64 {
                    *self as i64
                }
            }
        )*
    };
}

impl_int_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool);

macro_rules! impl_float_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FeatureValue for $t {
                type Type = f32;
                #[inline]
                fn into_feature_type(self) -> f32 {
                    self as f32
                }
            }

            impl FeatureValue for &$t {
                type Type = f32;
                #[inline]
                fn into_feature_type(self) -> f32 {
                    *self as f32
                }
            }
        )*
    };
}

impl_float_value!(f32, f64);

impl FeatureValue for f16 {
    type Type = f32;
    #[inline]
    fn into_feature_type(self) -> f32 {
        self.to_f32()
    }
}

impl FeatureValue for &f16 {
    type Type = f32;
    #[inline]
    fn into_feature_type(self) -> f32 {
        self.to_f32()
    }
}

macro_rules! impl_bytes_value {
    ($($t:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl FeatureValue for $t {
                type Type = Vec<u8>;
                #[inline]
                fn into_feature_type(self) -> Vec<u8> {
                    let $v = self;
                    $conv
                }
            }
        )*
    };
}

impl_bytes_value! {
    String => |s| s.into_bytes(),
    &String => |s| s.as_bytes().to_vec(),
    &str => |s| s.as_bytes().to_vec(),
    &&str => |s| s.as_bytes().to_vec(),
    Box<str> => |s| s.into_string().into_bytes(),
    Cow<'_, str> => |s| s.into_owned().into_bytes(),
    Vec<u8> => |b| b,
    &Vec<u8> => |b| b.clone(),
    &[u8] => |b| b.to_vec(),
    Cow<'_, [u8]> => |b| b.into_owned(),
}
