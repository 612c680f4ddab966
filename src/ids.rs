//! Typed Resource Ids

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

/// A remote resource id tagged with the record type it identifies.
///
/// Resource stores are free to hand out numeric or string ids. Both are kept
/// as their string form so that ids of different stores compare the same way.
pub struct ResourceId<T>(String, PhantomData<fn() -> T>);

impl<T> ResourceId<T> {
    /// Wrap the given raw id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw id.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<T> Clone for ResourceId<T> {
    fn clone(&self) -> Self {
        Self::new(self.0.clone())
    }
}

impl<T> Debug for ResourceId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for ResourceId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for ResourceId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for ResourceId<T> {}

impl<T> Hash for ResourceId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for ResourceId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ResourceId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Borrow<str> for ResourceId<T> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<T> From<&str> for ResourceId<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<String> for ResourceId<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> From<u64> for ResourceId<T> {
    fn from(value: u64) -> Self {
        Self::new(value.to_string())
    }
}

impl<T> Serialize for ResourceId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de, T> Deserialize<'de> for ResourceId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ResourceIdVisitor(PhantomData))
    }
}

struct ResourceIdVisitor<T>(PhantomData<fn() -> T>);

impl<T> Visitor<'_> for ResourceIdVisitor<T> {
    type Value = ResourceId<T>;

    fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("a string or integer resource id")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ResourceId::new(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ResourceId::new(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ResourceId::new(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ResourceId::new(value.to_string()))
    }
}

/// User Id, as issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw user id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw user id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    struct Widget;

    type WidgetId = ResourceId<Widget>;

    #[test]
    fn numeric_ids_deserialize_to_their_decimal_string() -> TestResult {
        let id: WidgetId = serde_json::from_str("42")?;

        assert_eq!(id.as_str(), "42");

        Ok(())
    }

    #[test]
    fn string_ids_round_trip_as_strings() -> TestResult {
        let id: WidgetId = serde_json::from_str("\"abc\"")?;

        assert_eq!(serde_json::to_string(&id)?, "\"abc\"");

        Ok(())
    }

    #[test]
    fn numeric_and_string_forms_compare_equal() -> TestResult {
        let numeric: WidgetId = serde_json::from_str("7")?;

        assert_eq!(numeric, WidgetId::from("7"));
        assert_eq!(numeric, WidgetId::from(7_u64));

        Ok(())
    }

    #[test]
    fn fractional_ids_are_rejected() {
        let result = serde_json::from_str::<WidgetId>("1.5");

        assert!(result.is_err(), "expected an error for a float id");
    }
}
