// Archy persistent store: section tree, pinned tabs, and flags.

pub mod section_store;

pub use section_store::SectionStore;
