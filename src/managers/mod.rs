// Archy state managers
// Managers hold the pure state logic: the section tree model, the live-tab
// snapshot pipeline, and the drag-and-drop reducer.

pub mod drag_manager;
pub mod section_manager;
pub mod snapshot_manager;
