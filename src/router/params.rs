use smallvec::SmallVec;
use std::collections::HashMap;

/// Number of path parameters kept inline before the buffer spills to the heap.
/// Most routes carry ≤4 parameters (e.g. `/users/:id/posts/:post`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// A single URL parameter: the wildcard name and the matched path text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub key: String,
    pub value: String,
}

/// Parameters extracted by a lookup, in left-to-right path order.
///
/// Duplicate keys are kept; [`PathParams::get`] returns the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(SmallVec<[PathParam; MAX_INLINE_PARAMS]>);

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Buffer sized for `capacity` parameters.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(SmallVec::with_capacity(capacity))
    }

    /// Value of the first parameter named `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathParam> {
        self.0.iter()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(PathParam {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Pushes a parameter from raw tree bytes.
    pub(crate) fn push_bytes(&mut self, key: &[u8], value: &[u8]) {
        self.push(utf8(key), utf8(value));
    }

    /// Collect into a map. Later duplicates do not overwrite earlier ones,
    /// matching [`PathParams::get`].
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::with_capacity(self.0.len());
        for p in &self.0 {
            map.entry(p.key.clone()).or_insert_with(|| p.value.clone());
        }
        map
    }
}

impl std::ops::Index<usize> for PathParams {
    type Output = PathParam;

    fn index(&self, i: usize) -> &PathParam {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = &'a PathParam;
    type IntoIter = std::slice::Iter<'a, PathParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
