use crate::query::IntoValues;

use std::fmt;

/// An insertion-ordered multi-map of header names and values.
///
/// Names are normalized to lowercase; lookups are case-insensitive.
/// Duplicate names accumulate as multiple values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Headers {
        Headers {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// The first value for the given name.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// All values for the given name, in insertion order.
    pub fn get<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Append one entry per value under the given name.
    pub fn append(&mut self, name: impl Into<String>, values: impl IntoValues) {
        let name = name.into().to_ascii_lowercase();

        for value in values.into_values() {
            self.entries.push((name.clone(), value));
        }
    }

    /// Replace any existing entries for the given name.
    pub fn insert(&mut self, name: &str, values: impl IntoValues) -> bool {
        let replaced = !self.remove(name).is_empty();
        self.append(name, values);
        replaced
    }

    /// Remove all entries for the given name, returning their values.
    pub fn remove(&mut self, name: &str) -> Vec<String> {
        let mut removed = Vec::new();

        self.entries.retain_mut(|(key, value)| {
            if key.eq_ignore_ascii_case(name) {
                removed.push(std::mem::take(value));
                false
            } else {
                true
            }
        });

        removed
    }

    /// Append every entry of `source` after the existing entries.
    ///
    /// Existing entries are kept; duplicate names accumulate, with the new
    /// entries appended after the old ones.
    pub fn merge(&mut self, source: impl Into<Headers>) {
        self.entries.extend(source.into().entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<String>,
    V: IntoValues,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl<N, V> Extend<(N, V)> for Headers
where
    N: Into<String>,
    V: IntoValues,
{
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, values) in iter {
            self.append(name, values);
        }
    }
}

impl<N, V> From<Vec<(N, V)>> for Headers
where
    N: Into<String>,
    V: IntoValues,
{
    fn from(pairs: Vec<(N, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<N, V, const X: usize> From<[(N, V); X]> for Headers
where
    N: Into<String>,
    V: IntoValues,
{
    fn from(pairs: [(N, V); X]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
