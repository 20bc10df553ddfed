// Archy services
// Engines and cross-cutting infrastructure: the two native-mirror
// reconcilers, structured diagnostics, and failure containment.

pub mod bookmark_sync;
pub mod logger;
pub mod recovery;
pub mod tab_group_sync;
