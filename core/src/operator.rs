//! Interaction operators.
//!
//! An operator owns a piece of interaction state and the callbacks that
//! drive it. The [`OperatorManager`] keeps operators in priority order and
//! mirrors that order onto the dispatcher, so the front operator sees each
//! event first.

mod navigation;
mod selection;

pub use navigation::NavigationOperator;
pub use selection::SelectionOperator;

use crate::event::{CallbackId, EventDispatcher};

pub type OperatorId = u32;

/// Ids of the operators the viewer installs by default.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BuiltinOperatorId {
    Navigation = 0,
    Selection = 1,
}

impl From<BuiltinOperatorId> for OperatorId {
    fn from(id: BuiltinOperatorId) -> Self {
        id as OperatorId
    }
}

pub trait Operator {
    /// Registers the operator's callbacks and remembers their ids.
    fn activate(&mut self, dispatcher: &mut EventDispatcher);

    /// Unregisters every callback registered by `activate`.
    fn deactivate(&mut self, dispatcher: &mut EventDispatcher);

    fn id(&self) -> OperatorId;

    fn name(&self) -> &str;

    /// Empty while the operator is inactive.
    fn callback_ids(&self) -> &[CallbackId];

    fn is_active(&self) -> bool;
}

/// Operators in priority order, front first.
pub struct OperatorManager {
    operators: Vec<Box<dyn Operator>>,
}

impl Default for OperatorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorManager {
    pub fn new() -> Self {
        Self {
            operators: Vec::new(),
        }
    }

    /// Activates `operator` and gives it the highest priority.
    pub fn push_front(&mut self, mut operator: Box<dyn Operator>, dispatcher: &mut EventDispatcher) {
        if !operator.is_active() {
            operator.activate(dispatcher);
        }
        self.operators.insert(0, operator);
        self.reorder_callbacks(dispatcher);
    }

    /// Activates `operator` and gives it the lowest priority.
    pub fn push_back(&mut self, mut operator: Box<dyn Operator>, dispatcher: &mut EventDispatcher) {
        if !operator.is_active() {
            operator.activate(dispatcher);
        }
        self.operators.push(operator);
        self.reorder_callbacks(dispatcher);
    }

    /// Deactivates and drops the operator. Returns `false` for an unknown id.
    pub fn remove(&mut self, id: OperatorId, dispatcher: &mut EventDispatcher) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let mut operator = self.operators.remove(pos);
        if operator.is_active() {
            operator.deactivate(dispatcher);
        }
        self.reorder_callbacks(dispatcher);
        true
    }

    pub fn move_to_front(&mut self, id: OperatorId, dispatcher: &mut EventDispatcher) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        if pos > 0 {
            let operator = self.operators.remove(pos);
            self.operators.insert(0, operator);
            self.reorder_callbacks(dispatcher);
        }
        true
    }

    fn reorder_callbacks(&self, dispatcher: &mut EventDispatcher) {
        let ordered_ids: Vec<CallbackId> = self
            .operators
            .iter()
            .flat_map(|op| op.callback_ids().iter().copied())
            .collect();
        dispatcher.reorder(&ordered_ids);
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Operator> {
        self.operators.iter().map(|op| op.as_ref())
    }

    /// Position 0 is the front.
    pub fn position(&self, id: OperatorId) -> Option<usize> {
        self.operators.iter().position(|op| op.id() == id)
    }
}
