// SPDX-License-Identifier: Apache-2.0

use alloc::collections::TryReserveError;

/// Errors reported by list operations and by the JSON codec.
///
/// The same kind is stored as a list's sticky error once a mutation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No entry with the requested name (and kind) exists.
    NotFound,
    /// An entry exists under the name, but not of the requested kind.
    TypeMismatch,
    /// Malformed JSON, a bad escape, numeric overflow, a heterogeneous array,
    /// an invalid name or an empty array.
    InvalidInput,
    /// Growing an internal buffer failed.
    OutOfMemory,
    /// The operation cannot be expressed, e.g. encoding a descriptor as JSON.
    Unsupported,
    /// The list's sticky error is set; it rejects further mutation.
    AlreadyInErrorState,
    /// The name is already present in a list that requires unique names.
    Exists,
    /// The byte sink failed while the encoder was handing over its output.
    Io,
}

/// Result type used throughout the crate.
pub type Result<T, E = ErrorKind> = core::result::Result<T, E>;

impl ErrorKind {
    /// Short lowercase description, also used by `Display`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "entry not found",
            ErrorKind::TypeMismatch => "entry has a different type",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::OutOfMemory => "out of memory",
            ErrorKind::Unsupported => "operation not supported",
            ErrorKind::AlreadyInErrorState => "list is in an error state",
            ErrorKind::Exists => "name already exists",
            ErrorKind::Io => "i/o error",
        }
    }
}

impl From<TryReserveError> for ErrorKind {
    fn from(_: TryReserveError) -> Self {
        ErrorKind::OutOfMemory
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ErrorKind {}
