use std::fmt;
use std::iter;

use url::form_urlencoded;

/// Values that can be appended under a single key.
///
/// A scalar yields one entry, an `Option` yields at most one, and a list
/// yields one entry per element in order. `None` elements are silently
/// dropped, never stringified.
pub trait IntoValues {
    /// An iterator over the entry values.
    type Values: IntoIterator<Item = String>;

    /// Returns the values to append.
    fn into_values(self) -> Self::Values;
}

macro_rules! scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl IntoValues for $ty {
            type Values = iter::Once<String>;

            fn into_values(self) -> Self::Values {
                iter::once(self.to_string())
            }
        }

        impl IntoValues for Option<$ty> {
            type Values = std::option::IntoIter<String>;

            fn into_values(self) -> Self::Values {
                self.map(|value| value.to_string()).into_iter()
            }
        }

        impl IntoValues for Vec<$ty> {
            type Values = Vec<String>;

            fn into_values(self) -> Self::Values {
                self.into_iter().map(|value| value.to_string()).collect()
            }
        }

        impl IntoValues for Vec<Option<$ty>> {
            type Values = Vec<String>;

            fn into_values(self) -> Self::Values {
                self.into_iter()
                    .flatten()
                    .map(|value| value.to_string())
                    .collect()
            }
        }
    )*};
}

scalar!(&str, String, bool, i32, i64, u32, u64, usize, f32, f64);

/// An insertion-ordered multi-map of query parameters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> QueryParams {
        QueryParams {
            entries: Vec::new(),
        }
    }

    /// Parse a raw query string, with or without a leading `?`.
    pub fn parse(query: &str) -> QueryParams {
        let query = query.strip_prefix('?').unwrap_or(query);

        QueryParams {
            entries: form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }

    /// The first value for the given key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// All values for the given key, in insertion order.
    pub fn get<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Append one entry per value under the given key.
    pub fn append(&mut self, key: impl Into<String>, values: impl IntoValues) {
        let key = key.into();

        for value in values.into_values() {
            self.entries.push((key.clone(), value));
        }
    }

    /// Remove all entries for the given key, returning their values.
    pub fn remove(&mut self, key: &str) -> Vec<String> {
        let mut removed = Vec::new();

        self.entries.retain_mut(|(name, value)| {
            if name == key {
                removed.push(std::mem::take(value));
                false
            } else {
                true
            }
        });

        removed
    }

    /// Append every entry of `source` after the existing entries.
    pub fn merge(&mut self, source: impl Into<QueryParams>) {
        self.entries.extend(source.into().entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: IntoValues,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for QueryParams
where
    K: Into<String>,
    V: IntoValues,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, values) in iter {
            self.append(key, values);
        }
    }
}

impl<K, V> From<Vec<(K, V)>> for QueryParams
where
    K: Into<String>,
    V: IntoValues,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for QueryParams
where
    K: Into<String>,
    V: IntoValues,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<&str> for QueryParams {
    fn from(query: &str) -> Self {
        QueryParams::parse(query)
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        for (key, value) in self.iter() {
            serializer.append_pair(key, value);
        }

        write!(f, "{}", serializer.finish())
    }
}

impl fmt::Debug for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
