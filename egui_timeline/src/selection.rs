//! 选择模块
//!
//! Tracks at most one selected item by id.

use crate::structure::ItemId;

/// Delta reported when the selection changes. Each list holds at most one id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub removed: Vec<ItemId>,
    pub added: Vec<ItemId>,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionModel {
    selected: Option<ItemId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selected == Some(id)
    }

    /// Selects `id`, or clears the selection for `None`.
    ///
    /// Returns the change, or `None` when `id` was already the selection.
    pub fn select(&mut self, id: Option<ItemId>) -> Option<SelectionChange> {
        if id == self.selected {
            return None;
        }

        let previous = std::mem::replace(&mut self.selected, id);
        Some(SelectionChange {
            removed: previous.into_iter().collect(),
            added: id.into_iter().collect(),
        })
    }

    pub fn deselect(&mut self) -> Option<SelectionChange> {
        self.select(None)
    }

    /// Must run before the item leaves the collection so that no listener
    /// ever sees a selection pointing at a removed item.
    pub fn on_item_removed(&mut self, id: ItemId) -> Option<SelectionChange> {
        if self.is_selected(id) {
            self.deselect()
        } else {
            None
        }
    }

    /// Drops the selection if it refers to none of `ids`, e.g. after the whole
    /// collection was replaced.
    pub fn retain(&mut self, mut ids: impl Iterator<Item = ItemId>) -> Option<SelectionChange> {
        match self.selected {
            Some(selected) if !ids.any(|id| id == selected) => self.deselect(),
            _ => None,
        }
    }
}
