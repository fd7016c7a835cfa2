//! Which entity, if any, is highlighted.
//!
//! Only the picking path writes the selection. The renderer reads it once per
//! frame to decide whether the outline passes run.

use crate::{common::RgbaColor, scene::EntityId};

/// Outline appearance and the stencil value it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Flat color of the outline rim.
    pub outline_color: RgbaColor,
    /// Multiplier applied to the selected entity's scale for the outline shell.
    pub outline_scale: f32,
    /// Value written to the stencil buffer under the rim.
    pub stencil_reference: u32,
    /// Whether outline rendering is enabled.
    pub outline_enabled: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            outline_color: RgbaColor::CYAN,
            outline_scale: 1.08,
            stencil_reference: 1,
            outline_enabled: true,
        }
    }
}

/// Outcome of applying a pick to the selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Selected(EntityId),
    Deselected(EntityId),
    Replaced { from: EntityId, to: EntityId },
}

/// At most one selected entity, plus the outline settings used to draw it.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Option<EntityId>,
    config: SelectionConfig,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SelectionConfig) -> Self {
        Self {
            selected: None,
            config,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SelectionConfig {
        &mut self.config
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected == Some(id)
    }

    /// The entity the outline should be drawn around this frame. `None` when
    /// nothing is selected or outlines are switched off.
    pub fn outlined(&self) -> Option<EntityId> {
        self.selected.filter(|_| self.config.outline_enabled)
    }

    /// Applies the result of a pointer pick.
    ///
    /// Hitting the selected entity again clears the selection, hitting another
    /// entity replaces it, and hitting nothing clears it.
    pub fn apply_pick(&mut self, hit: Option<EntityId>) -> SelectionChange {
        let change = match (self.selected, hit) {
            (None, None) => SelectionChange::Unchanged,
            (Some(current), None) => SelectionChange::Deselected(current),
            (Some(current), Some(id)) if current == id => SelectionChange::Deselected(current),
            (Some(current), Some(id)) => SelectionChange::Replaced { from: current, to: id },
            (None, Some(id)) => SelectionChange::Selected(id),
        };
        self.selected = match change {
            SelectionChange::Selected(id) | SelectionChange::Replaced { to: id, .. } => Some(id),
            SelectionChange::Deselected(_) | SelectionChange::Unchanged => None,
        };
        change
    }

    pub fn set(&mut self, id: EntityId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
