use std::fmt;

// === StorageError ===

/// Errors from the persistent key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// Database operation failed.
    Database(String),
    /// Failed to serialize or deserialize a stored value.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Database(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::Serialization(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StorageError {}

// === BrowserError ===

/// Errors surfaced by the native browser API contract. Sync engines treat
/// these as recoverable: each call site logs and continues.
#[derive(Debug)]
pub enum BrowserError {
    /// Tab with the given id was not found.
    TabNotFound(i64),
    /// Window with the given id was not found.
    WindowNotFound(u64),
    /// Tab group with the given id was not found.
    GroupNotFound(u64),
    /// Bookmark node with the given id was not found.
    NodeNotFound(String),
    /// The provided position index is out of bounds.
    InvalidIndex(usize),
    /// The native API could not be reached or rejected the call.
    Unavailable(String),
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::TabNotFound(id) => write!(f, "Tab not found: {}", id),
            BrowserError::WindowNotFound(id) => write!(f, "Window not found: {}", id),
            BrowserError::GroupNotFound(id) => write!(f, "Tab group not found: {}", id),
            BrowserError::NodeNotFound(id) => write!(f, "Bookmark node not found: {}", id),
            BrowserError::InvalidIndex(index) => write!(f, "Invalid index: {}", index),
            BrowserError::Unavailable(msg) => write!(f, "Browser API unavailable: {}", msg),
        }
    }
}

impl std::error::Error for BrowserError {}
