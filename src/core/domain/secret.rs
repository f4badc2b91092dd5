//! Secret type.
//!
//! A path/value pair discovered by a walk or written to a backend.

/// A secret with its hierarchical path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Secret {
    path: String,
    value: String,
}

impl Secret {
    /// Create a new secret from a path and value
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// `/`-delimited path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Opaque payload
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Split into path and value
    pub fn into_parts(self) -> (String, String) {
        (self.path, self.value)
    }
}

/// Values are never displayed.
impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}
