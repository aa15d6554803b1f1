//! Request header map.
//!
//! Names are kept exactly as received. Writing a name that is already present
//! replaces its value, so duplicate header lines resolve last-write-wins.

/// An order-preserving, single-value HTTP header map.
///
/// # Examples
///
/// ```
/// use lilhttp::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("User-Agent", "curl/8.0");
/// headers.insert("User-Agent", "foo/1.0");
///
/// assert_eq!(headers.len(), 1);
/// assert_eq!(headers.get("User-Agent"), Some("foo/1.0"));
/// assert_eq!(headers.get("user-agent"), Some("foo/1.0"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    inner: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    ///
    /// An entry whose name is byte-identical to `name` is replaced and moved
    /// to the end, so it becomes the most recent write.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.inner.retain(|(k, _)| *k != name);
        self.inner.push((name, value.into()));
    }

    /// Returns the value for `name`, compared ASCII case-insensitively.
    ///
    /// When several spellings of the same name were received, the most
    /// recently written one wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the number of distinct literal names.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no header entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over all `(name, value)` pairs in write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_get() {
        let mut h = Headers::new();
        h.insert("Content-Type", "text/plain");
        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(h.get("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn duplicate_name_last_write_wins() {
        let mut h = Headers::new();
        h.insert("X-Foo", "first");
        h.insert("X-Foo", "second");
        assert_eq!(h.len(), 1);
        assert_eq!(h.get("X-Foo"), Some("second"));
    }

    #[test]
    fn names_keep_received_case() {
        let mut h = Headers::new();
        h.insert("accept-encoding", "gzip");
        h.insert("Accept-Encoding", "br");
        let names: Vec<_> = h.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["accept-encoding", "Accept-Encoding"]);
        assert_eq!(h.get("ACCEPT-ENCODING"), Some("br"));
    }
}
