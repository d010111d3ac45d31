use std::fmt;

/// Error returned by [`Document::resolve`](crate::Document::resolve) when
/// the id argument is unusable.
///
/// The block grammar itself is total: every input produces a block
/// sequence, so parsing has no error surface. The only failure condition
/// in the crate is this programmer-misuse case at the lookup boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    /// Human-readable error message.
    pub message: String,
}

impl ResolveError {
    /// Create an error for a blank (empty or whitespace-only) reference id.
    pub fn blank_id() -> Self {
        Self {
            message: "reference id must not be blank".to_string(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ResolveError {}
