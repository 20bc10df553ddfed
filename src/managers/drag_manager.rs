//! Drag-and-drop reducer.
//!
//! A small state machine translating pointer drag/drop events into a
//! single move intent. Drag state is always cleared on drop or drag-end,
//! whether or not the resulting move succeeds, so a failed move can never
//! leave the UI stuck in a dragging state. Interpreting the intent
//! (no-op detection, Today special cases, tab-to-bookmark conversion) is
//! the job of `section_manager::plan_move`.

use crate::types::section::SectionItem;

/// Discriminates what is being dragged, for presentation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Tab,
    Bookmark,
    Folder,
}

/// Descriptor of the item currently being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DragItem {
    pub kind: DragKind,
    pub item: SectionItem,
    pub section_id: String,
    pub index: usize,
}

impl DragItem {
    pub fn new(item: SectionItem, section_id: &str, index: usize) -> Self {
        let kind = match &item {
            SectionItem::Tab(_) | SectionItem::Archived(_) => DragKind::Tab,
            SectionItem::Bookmark(_) => DragKind::Bookmark,
            SectionItem::Folder(_) => DragKind::Folder,
        };
        Self {
            kind,
            item,
            section_id: section_id.to_string(),
            index,
        }
    }
}

/// Where the drop indicator currently renders. `index` of `None` means
/// "end of the section" (hovering the section body, not a specific item).
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndicator {
    pub section_id: String,
    pub index: Option<usize>,
}

/// The single output of a completed drag.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveIntent {
    pub drag: DragItem,
    pub target_section_id: String,
    pub target_index: Option<usize>,
}

/// Drag state: the dragged descriptor plus the current drop indicator.
#[derive(Debug, Default)]
pub struct DragController {
    drag: Option<DragItem>,
    indicator: Option<DropIndicator>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn indicator(&self) -> Option<&DropIndicator> {
        self.indicator.as_ref()
    }

    /// Captures the drag descriptor at drag start.
    pub fn begin_drag(&mut self, item: DragItem) {
        self.drag = Some(item);
        self.indicator = None;
    }

    /// Pointer is over a section body (not a specific item). Returns true
    /// when the indicator changed, so callers can skip redundant renders.
    pub fn drag_over_section(&mut self, section_id: &str, index: Option<usize>) -> bool {
        if self.drag.is_none() {
            return false;
        }
        let next = DropIndicator {
            section_id: section_id.to_string(),
            index,
        };
        if self.indicator.as_ref() == Some(&next) {
            return false;
        }
        self.indicator = Some(next);
        true
    }

    /// Insertion index for a pointer hovering the item at `index`: the
    /// upper half inserts before, the lower half after.
    pub fn drop_index_for_item(index: usize, pointer_y: f32, item_top: f32, item_height: f32) -> usize {
        let midpoint = item_top + item_height / 2.0;
        if pointer_y < midpoint {
            index
        } else {
            index + 1
        }
    }

    /// Pointer is over the item at `index`. Computes the insertion point
    /// from the pointer position and updates the indicator, suppressing it
    /// when the drop would land back on the dragged item's own slot.
    pub fn drag_over_item(
        &mut self,
        section_id: &str,
        index: usize,
        pointer_y: f32,
        item_top: f32,
        item_height: f32,
    ) -> bool {
        let Some(drag) = &self.drag else {
            return false;
        };
        let drop_index = Self::drop_index_for_item(index, pointer_y, item_top, item_height);

        if drag.section_id == section_id
            && (drop_index == drag.index || drop_index == drag.index + 1)
        {
            let changed = self.indicator.is_some();
            self.indicator = None;
            return changed;
        }
        self.drag_over_section(section_id, Some(drop_index))
    }

    /// Commits the drag. Emits the move intent for the consumer and clears
    /// all drag state unconditionally.
    pub fn drop_on(&mut self, target_section_id: &str, target_index: Option<usize>) -> Option<MoveIntent> {
        let intent = self.drag.take().map(|drag| MoveIntent {
            drag,
            target_section_id: target_section_id.to_string(),
            target_index,
        });
        self.indicator = None;
        intent
    }

    /// Drag was cancelled (escape, drag left the surface). Clears state.
    pub fn end_drag(&mut self) {
        self.drag = None;
        self.indicator = None;
    }
}
