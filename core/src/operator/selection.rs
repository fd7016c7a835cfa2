use crate::event::{CallbackId, Event, EventContext, EventDispatcher, EventKind};
use crate::input::MouseButton;
use crate::operator::{Operator, OperatorId};
use crate::scene::pick_pickable;
use crate::selection::SelectionChange;

/// Left button press picks the entity under the pointer and toggles its
/// selection.
///
/// Picking happens on the press itself, so how long the button is held and
/// whether a drag follows make no difference. Drags are left to navigation.
pub struct SelectionOperator {
    id: OperatorId,
    callback_ids: Vec<CallbackId>,
}

impl SelectionOperator {
    pub fn new(id: OperatorId) -> Self {
        Self {
            id,
            callback_ids: Vec::new(),
        }
    }

    fn perform_selection(cursor_x: f32, cursor_y: f32, ctx: &mut EventContext<'_>) {
        let hit = pick_pickable(cursor_x, cursor_y, ctx.viewport, ctx.camera, ctx.scene);
        match ctx.selection.apply_pick(hit) {
            SelectionChange::Unchanged => {}
            SelectionChange::Selected(id) => log::debug!("Selected entity {id}"),
            SelectionChange::Deselected(id) => log::debug!("Deselected entity {id}"),
            SelectionChange::Replaced { from, to } => {
                log::debug!("Selection moved from entity {from} to {to}")
            }
        }
    }
}

impl Operator for SelectionOperator {
    fn activate(&mut self, dispatcher: &mut EventDispatcher) {
        let mouse_down_callback = dispatcher.register(EventKind::MouseDown, |event, ctx| {
            let Event::MouseDown { button, position } = event else {
                return false;
            };
            if *button == MouseButton::Left {
                SelectionOperator::perform_selection(position.0, position.1, ctx);
                true
            } else {
                false
            }
        });

        self.callback_ids = vec![mouse_down_callback];
    }

    fn deactivate(&mut self, dispatcher: &mut EventDispatcher) {
        for id in self.callback_ids.drain(..) {
            dispatcher.unregister(id);
        }
    }

    fn id(&self) -> OperatorId {
        self.id
    }

    fn name(&self) -> &str {
        "Selection"
    }

    fn callback_ids(&self) -> &[CallbackId] {
        &self.callback_ids
    }

    fn is_active(&self) -> bool {
        !self.callback_ids.is_empty()
    }
}
