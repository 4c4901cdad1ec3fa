//! Opaque entity identifiers.
//!
//! The backend hands out ids as strings (UUIDs or numeric strings) while older
//! payloads and route parameters carry plain numbers. [`EntityId`] stores the
//! server's text verbatim (surrounding whitespace trimmed) and JSON numbers by
//! their decimal text, so `7`, `"7"` and `" 7 "` compare equal while `"007"`
//! stays a distinct id and is sent back unchanged.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Type-tolerant entity id with a lossless string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an id from its textual form, trimming surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use mentoria_api::EntityId;
    ///
    /// assert_eq!(EntityId::new("7"), EntityId::from(7_u64));
    /// assert_eq!(EntityId::new(" 7 "), EntityId::from(7_i64));
    /// assert_eq!(EntityId::new("007").as_str(), "007");
    /// assert_eq!(EntityId::new("a1b2-c3").as_str(), "a1b2-c3");
    /// ```
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Returns the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for EntityId {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&Self> for EntityId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EntityId {
                fn from(n: $ty) -> Self {
                    Self(n.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(i32, i64, u32, u64, usize);

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

struct EntityIdVisitor;

impl<'de> Visitor<'de> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or integer id")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(EntityId::new(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(EntityId::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(EntityId::from(v))
    }

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn visit_f64<E>(self, v: f64) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        if v.fract() == 0.0 && v.abs() < 9.0e15 {
            Ok(EntityId::from(v as i64))
        } else {
            Ok(EntityId(v.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}
