use std::fmt;

/// Separator between schema keys in the string form of a path.
pub const DELIMITER: &str = "__";

/// Location of a control or group, as the sequence of schema keys leading to it.
///
/// The `__`-joined string is only produced at the serialization boundary
/// (`Display`) and consumed by [`ConfigPath::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a delimited path string. The empty string is the root.
    pub fn parse(encoded: &str) -> Self {
        if encoded.is_empty() {
            return Self::root();
        }

        Self {
            segments: encoded.split(DELIMITER).map(str::to_string).collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Segment-wise prefix test: `opt` is a prefix of `opt__x` but not of `option__x`.
    pub fn starts_with(&self, prefix: &ConfigPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Human readable form used in validation messages (`a > b > c`).
    pub fn display_chain(&self) -> String {
        self.segments.join(" > ")
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(DELIMITER))
    }
}

impl From<&str> for ConfigPath {
    fn from(encoded: &str) -> Self {
        Self::parse(encoded)
    }
}
