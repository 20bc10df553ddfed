use archy::types::errors::*;

// === StorageError Tests ===

#[test]
fn storage_error_database_display() {
    let err = StorageError::Database("disk full".to_string());
    assert_eq!(err.to_string(), "Storage database error: disk full");
}

#[test]
fn storage_error_serialization_display() {
    let err = StorageError::Serialization("trailing comma".to_string());
    assert_eq!(
        err.to_string(),
        "Storage serialization error: trailing comma"
    );
}

#[test]
fn storage_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(StorageError::Database("x".to_string()));
    assert!(err.source().is_none());
}

// === BrowserError Tests ===

#[test]
fn browser_error_display_variants() {
    assert_eq!(
        BrowserError::TabNotFound(42).to_string(),
        "Tab not found: 42"
    );
    assert_eq!(
        BrowserError::WindowNotFound(7).to_string(),
        "Window not found: 7"
    );
    assert_eq!(
        BrowserError::GroupNotFound(3).to_string(),
        "Tab group not found: 3"
    );
    assert_eq!(
        BrowserError::NodeNotFound("bm-9".to_string()).to_string(),
        "Bookmark node not found: bm-9"
    );
    assert_eq!(BrowserError::InvalidIndex(99).to_string(), "Invalid index: 99");
    assert_eq!(
        BrowserError::Unavailable("worker asleep".to_string()).to_string(),
        "Browser API unavailable: worker asleep"
    );
}

#[test]
fn browser_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(BrowserError::TabNotFound(1));
    assert!(err.source().is_none());
}
