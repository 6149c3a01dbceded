//! One-or-many string values as they appear in S3 policy documents.

use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize};

/// A list of strings that may be written as a bare string on the wire.
///
/// Decodes from either `"value"` or `["a", "b"]`, and always encodes as an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StringOrSlice(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for StringOrSlice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => Ok(Self(vec![value])),
            OneOrMany::Many(values) => Ok(Self(values)),
        }
    }
}

impl StringOrSlice {
    /// Creates a value from any iterator of strings.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Returns the values sorted and deduplicated, for order-independent comparison.
    pub fn normalized(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self.0.iter().map(String::as_str).collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper and returns the inner list.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for StringOrSlice {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for StringOrSlice {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<&str> for StringOrSlice {
    fn from(value: &str) -> Self {
        Self(vec![value.to_owned()])
    }
}
