//! JSON encoding of the persisted task document.
//!
//! The document is a single JSON array of [`Task`] objects. There is no
//! version field: a document that does not match the schema is simply a
//! decode error.

use crate::task::Task;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization of the task list failed.
    #[error("task list encode error: {0}")]
    Encode(String),
    /// The bytes are not a valid task document.
    #[error("task list decode error: {0}")]
    Decode(String),
}

/// Output layout of an encoded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Single line, no insignificant whitespace.
    #[default]
    Compact,
    /// Indented, one field per line.
    Pretty,
}

/// Encodes a task list as a JSON array.
///
/// # Errors
///
/// Returns `CodecError::Encode` if serialization fails.
pub fn encode(tasks: &[Task], layout: Layout) -> Result<Vec<u8>, CodecError> {
    let result = match layout {
        Layout::Compact => serde_json::to_vec(tasks),
        Layout::Pretty => serde_json::to_vec_pretty(tasks),
    };
    result.map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes a JSON array of tasks.
///
/// All-or-nothing: one bad record fails the whole document.
///
/// # Errors
///
/// Returns `CodecError::Decode` if the bytes are not a JSON array of
/// well-formed task objects.
pub fn decode(bytes: &[u8]) -> Result<Vec<Task>, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}
