//! Shared error taxonomy (spec.md §7).
//!
//! Validation and backend errors never cross the `Device`/`CommandQueue`
//! boundary as a `Result`: they are logged and degrade to a null handle or a
//! dropped command. This enum exists for backends to classify a failure
//! consistently before logging it, and for unit tests that want to assert on
//! *why* a create call failed without scraping log output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// A descriptor field violates a stated invariant (bad dimensions, usage
    /// combination, format mismatch, out-of-bounds region, ...).
    InvalidDescriptor,
    /// A handle did not resolve to a live resource of the expected kind.
    UnknownHandle,
    /// The driver reported a failure (compile, link, incomplete framebuffer,
    /// sync failure) for an otherwise well-formed request.
    BackendFailure,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidationError::InvalidDescriptor => "invalid descriptor",
            ValidationError::UnknownHandle => "unknown handle",
            ValidationError::BackendFailure => "backend failure",
        };
        f.write_str(s)
    }
}

impl std::error::Error for ValidationError {}
