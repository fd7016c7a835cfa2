use std::collections::HashMap;
use web_time::Instant;

use crate::input::{ElementState, KeyEvent, MouseButton, MouseScrollDelta};
use crate::scene::{Camera, Scene, Viewport};
use crate::selection::SelectionState;

/// Movement threshold in pixels before a mouse button hold becomes a drag.
const DRAG_THRESHOLD_PIXELS: f32 = 4.0;

/// State handed to event callbacks.
///
/// Nothing in here touches the GPU, so operators can be driven from tests
/// with a plain scene and camera.
pub struct EventContext<'c> {
    /// Mutable reference to the active camera
    pub camera: &'c mut Camera,
    /// Mutable reference to the scene
    pub scene: &'c mut Scene,
    /// Mutable reference to the current selection
    pub selection: &'c mut SelectionState,
    /// Size of the render target, for turning pointer positions into rays.
    pub viewport: Viewport,
}

/// Unique identifier for a registered callback.
pub type CallbackId = u32;

/// Callbacks return `true` to stop propagation to later callbacks of the
/// same kind.
type EventCallback = Box<dyn for<'c> Fn(&Event, &mut EventContext<'c>) -> bool>;

/// enum representing event types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EventKind {
    /// Per-frame update tick
    Update,
    /// Window was resized
    Resized,
    /// Keyboard input occurred
    KeyboardInput,
    /// Cursor position changed within the window
    CursorMoved,
    /// Mouse button was pressed or released
    MouseInput,
    /// Mouse wheel was scrolled
    MouseWheel,
    /// Mouse button went down at a known cursor position
    MouseDown,
    /// Mouse drag started (button held and moved beyond threshold)
    MouseDragStart,
    /// Mouse drag in progress (button held and moving)
    MouseDrag,
    /// Mouse drag ended (button released after dragging)
    MouseDragEnd,
    /// Mouse click (button pressed and released without dragging)
    MouseClick,
}

/// Application events with associated data.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Per-frame tick, dispatched before rendering.
    Update {
        /// Time elapsed since last update in seconds
        delta_time: f32,
    },
    /// Window was resized to the given physical size (width, height)
    Resized((u32, u32)),
    /// Keyboard input occurred
    KeyboardInput {
        /// The keyboard event details
        event: KeyEvent,
        /// If `true`, the event was generated synthetically
        is_synthetic: bool,
    },
    /// Cursor position changed (absolute position)
    CursorMoved {
        /// New cursor position in physical pixels (x, y) from the top-left corner
        position: (f64, f64),
    },
    /// Mouse button was pressed or released
    MouseInput {
        /// Whether the button was pressed or released
        state: ElementState,
        /// Which mouse button
        button: MouseButton,
    },
    /// Mouse wheel was scrolled
    MouseWheel {
        /// Scroll delta (line or pixel units)
        delta: MouseScrollDelta,
    },
    /// Mouse button pressed. Only sent once the cursor position is known.
    MouseDown {
        /// Which mouse button was pressed
        button: MouseButton,
        /// Cursor position at the press (in physical pixels)
        position: (f32, f32),
    },
    /// Mouse drag started (button held and moved beyond threshold)
    MouseDragStart {
        /// Which mouse button is being dragged
        button: MouseButton,
        /// Position where the button was initially pressed (in physical pixels)
        start_pos: (f32, f32),
        /// Current cursor position (in physical pixels)
        current_pos: (f32, f32),
    },
    /// Mouse drag in progress (button held and moving)
    MouseDrag {
        /// Which mouse button is being dragged
        button: MouseButton,
        /// Position where the button was initially pressed (in physical pixels)
        start_pos: (f32, f32),
        /// Current cursor position (in physical pixels)
        current_pos: (f32, f32),
        /// Delta from last cursor position (in physical pixels)
        delta: (f32, f32),
    },
    /// Mouse drag ended (button released after dragging)
    MouseDragEnd {
        /// Which mouse button was being dragged
        button: MouseButton,
        /// Position where the button was initially pressed (in physical pixels)
        start_pos: (f32, f32),
        /// Position where the button was released (in physical pixels)
        end_pos: (f32, f32),
    },
    /// Mouse click: press and release without dragging, however long the
    /// button was held.
    MouseClick {
        /// Which mouse button was clicked
        button: MouseButton,
        /// Position where the click occurred (in physical pixels)
        position: (f32, f32),
        /// Duration of the button press in milliseconds
        duration_ms: u64,
    },
}

impl Event {
    /// Returns the [`EventKind`] discriminant for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Update { .. } => EventKind::Update,
            Self::Resized(_) => EventKind::Resized,
            Self::KeyboardInput { .. } => EventKind::KeyboardInput,
            Self::CursorMoved { .. } => EventKind::CursorMoved,
            Self::MouseInput { .. } => EventKind::MouseInput,
            Self::MouseWheel { .. } => EventKind::MouseWheel,
            Self::MouseDown { .. } => EventKind::MouseDown,
            Self::MouseDragStart { .. } => EventKind::MouseDragStart,
            Self::MouseDrag { .. } => EventKind::MouseDrag,
            Self::MouseDragEnd { .. } => EventKind::MouseDragEnd,
            Self::MouseClick { .. } => EventKind::MouseClick,
        }
    }
}

/// A mouse button that is currently held.
#[derive(Debug, Clone)]
struct ButtonState {
    /// Cursor position at the press
    down_position: (f32, f32),
    /// When the button went down
    down_time: Instant,
    /// Set once the cursor has travelled past the drag threshold
    is_dragging: bool,
    /// Total cursor travel since the press, in pixels.
    distance_dragged: f32,
}

/// Routes events to callbacks registered per [`EventKind`].
///
/// Callbacks for one kind run in order until one returns `true`. The
/// dispatcher also tracks held buttons and synthesizes [`Event::MouseDown`],
/// [`Event::MouseClick`] and the drag events from raw presses, releases and
/// cursor moves. Synthesized events are dispatched before the raw event that
/// caused them.
pub struct EventDispatcher {
    callback_map: HashMap<EventKind, Vec<(CallbackId, EventCallback)>>,
    next_id: u32,
    button_states: HashMap<MouseButton, ButtonState>,
    current_cursor_position: Option<(f32, f32)>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            callback_map: HashMap::new(),
            next_id: 0,
            button_states: HashMap::new(),
            current_cursor_position: None,
        }
    }

    /// Registers a callback and returns the id used to unregister or reorder it.
    pub fn register<F>(&mut self, kind: EventKind, callback: F) -> CallbackId
    where
        F: for<'c> Fn(&Event, &mut EventContext<'c>) -> bool + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        self.callback_map
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));

        id
    }

    /// Returns `true` if the callback was found and removed.
    pub fn unregister(&mut self, id: CallbackId) -> bool {
        for callbacks in self.callback_map.values_mut() {
            if let Some(pos) = callbacks.iter().position(|(cid, _)| *cid == id) {
                callbacks.remove(pos);
                return true;
            }
        }
        false
    }

    /// Puts the callbacks of `kind` in the order given by `ids`. Callbacks not
    /// listed keep their relative order after the listed ones. Unknown ids are
    /// ignored.
    ///
    /// Returns `false` if nothing is registered for `kind`.
    pub fn reorder_kind(&mut self, kind: EventKind, ids: &[CallbackId]) -> bool {
        let Some(callbacks) = self.callback_map.get_mut(&kind) else {
            return false;
        };
        let mut reordered = Vec::with_capacity(callbacks.len());
        for &id in ids {
            if let Some(pos) = callbacks.iter().position(|(cid, _)| *cid == id) {
                reordered.push(callbacks.remove(pos));
            }
        }
        reordered.append(callbacks);
        *callbacks = reordered;
        true
    }

    /// Applies [`EventDispatcher::reorder_kind`] to every kind.
    pub fn reorder(&mut self, ids: &[CallbackId]) {
        let kinds: Vec<EventKind> = self.callback_map.keys().copied().collect();
        for kind in kinds {
            self.reorder_kind(kind, ids);
        }
    }

    /// Dispatches `event`, synthesizing click and drag events first.
    ///
    /// Returns `true` if a callback stopped propagation of `event` itself.
    pub fn dispatch(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> bool {
        self.process_event(event, ctx);
        self.dispatch_to_callbacks(event, ctx)
    }

    fn dispatch_to_callbacks(&self, event: &Event, ctx: &mut EventContext<'_>) -> bool {
        if let Some(callbacks) = self.callback_map.get(&event.kind()) {
            for (_id, callback) in callbacks {
                if callback(event, ctx) {
                    return true;
                }
            }
        }
        false
    }

    fn process_event(&mut self, event: &Event, ctx: &mut EventContext<'_>) {
        match event {
            Event::CursorMoved { position } => {
                self.process_cursor_moved(*position, ctx);
            }
            Event::MouseInput { state, button } => {
                self.process_mouse_input(*state, *button, ctx);
            }
            _ => {}
        }
    }

    /// Tracks the cursor and turns movement with a held button into drag events.
    fn process_cursor_moved(&mut self, position: (f64, f64), ctx: &mut EventContext<'_>) {
        let current_pos = (position.0 as f32, position.1 as f32);
        let previous = self.current_cursor_position.replace(current_pos);
        let Some(previous) = previous else {
            return;
        };
        let delta = (current_pos.0 - previous.0, current_pos.1 - previous.1);
        let distance = (delta.0 * delta.0 + delta.1 * delta.1).sqrt();

        // Collected first so the button map is not borrowed during dispatch.
        let mut drag_events = Vec::new();
        for (button, button_state) in &mut self.button_states {
            button_state.distance_dragged += distance;

            if button_state.is_dragging {
                drag_events.push(Event::MouseDrag {
                    button: *button,
                    start_pos: button_state.down_position,
                    current_pos,
                    delta,
                });
            } else if button_state.distance_dragged > DRAG_THRESHOLD_PIXELS {
                button_state.is_dragging = true;
                drag_events.push(Event::MouseDragStart {
                    button: *button,
                    start_pos: button_state.down_position,
                    current_pos,
                });
            }
        }

        for drag_event in drag_events {
            self.dispatch_to_callbacks(&drag_event, ctx);
        }
    }

    fn process_mouse_input(
        &mut self,
        state: ElementState,
        button: MouseButton,
        ctx: &mut EventContext<'_>,
    ) {
        match state {
            ElementState::Pressed => {
                // A press before any cursor position is known has nowhere to point at.
                if let Some(pos) = self.current_cursor_position {
                    self.button_states.insert(
                        button,
                        ButtonState {
                            down_position: pos,
                            down_time: Instant::now(),
                            is_dragging: false,
                            distance_dragged: 0.0,
                        },
                    );
                    let down = Event::MouseDown {
                        button,
                        position: pos,
                    };
                    self.dispatch_to_callbacks(&down, ctx);
                }
            }
            ElementState::Released => {
                if let Some(button_state) = self.button_states.remove(&button) {
                    if button_state.is_dragging {
                        self.synthesize_drag_end(button, button_state, ctx);
                    } else {
                        self.synthesize_click(button, button_state, ctx);
                    }
                }
            }
        }
    }

    fn synthesize_drag_end(
        &self,
        button: MouseButton,
        button_state: ButtonState,
        ctx: &mut EventContext<'_>,
    ) {
        let end_pos = self
            .current_cursor_position
            .unwrap_or(button_state.down_position);
        let drag_end = Event::MouseDragEnd {
            button,
            start_pos: button_state.down_position,
            end_pos,
        };
        self.dispatch_to_callbacks(&drag_end, ctx);
    }

    /// A release that never crossed the drag threshold is a click. There is
    /// no time limit, so a slow press still counts.
    fn synthesize_click(
        &self,
        button: MouseButton,
        button_state: ButtonState,
        ctx: &mut EventContext<'_>,
    ) {
        let click = Event::MouseClick {
            button,
            position: button_state.down_position,
            duration_ms: button_state.down_time.elapsed().as_millis() as u64,
        };
        self.dispatch_to_callbacks(&click, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use cgmath::Point3;

    struct Fixture {
        camera: Camera,
        scene: Scene,
        selection: SelectionState,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                camera: Camera::looking_at_origin(Point3::new(0.0, 0.0, 5.0), 45.0, 0.1, 100.0),
                scene: Scene::new(),
                selection: SelectionState::new(),
            }
        }

        fn ctx(&mut self) -> EventContext<'_> {
            EventContext {
                camera: &mut self.camera,
                scene: &mut self.scene,
                selection: &mut self.selection,
                viewport: Viewport::new(800, 600),
            }
        }
    }

    fn cursor(x: f64, y: f64) -> Event {
        Event::CursorMoved { position: (x, y) }
    }

    fn mouse(state: ElementState) -> Event {
        Event::MouseInput {
            state,
            button: MouseButton::Left,
        }
    }

    /// Records the kind of every event that reaches it.
    fn record_kinds(dispatcher: &mut EventDispatcher, kinds: &[EventKind]) -> Rc<RefCell<Vec<Event>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for &kind in kinds {
            let log = Rc::clone(&log);
            dispatcher.register(kind, move |event, _ctx| {
                log.borrow_mut().push(event.clone());
                false
            });
        }
        log
    }

    #[test]
    fn test_dispatcher_register_ids_are_unique() {
        let mut dispatcher = EventDispatcher::new();

        let id1 = dispatcher.register(EventKind::KeyboardInput, |_event, _ctx| false);
        let id2 = dispatcher.register(EventKind::KeyboardInput, |_event, _ctx| false);
        let id3 = dispatcher.register(EventKind::MouseInput, |_event, _ctx| false);

        assert_eq!((id1, id2, id3), (0, 1, 2));
        assert_eq!(dispatcher.callback_map[&EventKind::KeyboardInput].len(), 2);
        assert_eq!(dispatcher.callback_map[&EventKind::MouseInput].len(), 1);
    }

    #[test]
    fn test_dispatcher_unregister() {
        let mut dispatcher = EventDispatcher::new();
        let id = dispatcher.register(EventKind::MouseWheel, |_event, _ctx| false);

        assert!(dispatcher.unregister(id));
        assert!(dispatcher.callback_map[&EventKind::MouseWheel].is_empty());
        assert!(!dispatcher.unregister(id));
        assert!(!dispatcher.unregister(999));
    }

    #[test]
    fn test_dispatch_without_callbacks() {
        let mut dispatcher = EventDispatcher::new();
        let mut fixture = Fixture::new();
        assert!(!dispatcher.dispatch(&Event::Update { delta_time: 0.016 }, &mut fixture.ctx()));
    }

    #[test]
    fn test_dispatch_stop_propagation() {
        let mut dispatcher = EventDispatcher::new();
        let counter = Rc::new(Cell::new(0));

        let c1 = Rc::clone(&counter);
        dispatcher.register(EventKind::MouseWheel, move |_event, _ctx| {
            c1.set(c1.get() + 1);
            false
        });
        let c2 = Rc::clone(&counter);
        dispatcher.register(EventKind::MouseWheel, move |_event, _ctx| {
            c2.set(c2.get() + 10);
            true
        });
        let c3 = Rc::clone(&counter);
        dispatcher.register(EventKind::MouseWheel, move |_event, _ctx| {
            c3.set(c3.get() + 100);
            false
        });

        let mut fixture = Fixture::new();
        let event = Event::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
        };
        assert!(dispatcher.dispatch(&event, &mut fixture.ctx()));
        assert_eq!(counter.get(), 11);
    }

    #[test]
    fn test_callbacks_can_mutate_context() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(EventKind::Update, |_event, ctx| {
            ctx.selection.set(7);
            ctx.camera.fovy = 30.0;
            true
        });

        let mut fixture = Fixture::new();
        dispatcher.dispatch(&Event::Update { delta_time: 0.0 }, &mut fixture.ctx());
        assert_eq!(fixture.selection.selected(), Some(7));
        assert_eq!(fixture.camera.fovy, 30.0);
    }

    #[test]
    fn test_reorder_kind() {
        let mut dispatcher = EventDispatcher::new();
        let id1 = dispatcher.register(EventKind::Resized, |_event, _ctx| false);
        let id2 = dispatcher.register(EventKind::Resized, |_event, _ctx| false);
        let id3 = dispatcher.register(EventKind::Resized, |_event, _ctx| false);

        assert!(dispatcher.reorder_kind(EventKind::Resized, &[id3, 999, id1]));
        let order: Vec<CallbackId> = dispatcher.callback_map[&EventKind::Resized]
            .iter()
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(order, vec![id3, id1, id2]);

        assert!(!dispatcher.reorder_kind(EventKind::MouseClick, &[id1]));
    }

    #[test]
    fn test_reorder_all_kinds() {
        let mut dispatcher = EventDispatcher::new();
        let id1 = dispatcher.register(EventKind::MouseInput, |_event, _ctx| false);
        let id2 = dispatcher.register(EventKind::MouseInput, |_event, _ctx| false);
        let id3 = dispatcher.register(EventKind::KeyboardInput, |_event, _ctx| false);
        let id4 = dispatcher.register(EventKind::KeyboardInput, |_event, _ctx| false);

        dispatcher.reorder(&[id2, id4, id1, id3]);

        let mouse = &dispatcher.callback_map[&EventKind::MouseInput];
        assert_eq!((mouse[0].0, mouse[1].0), (id2, id1));
        let keys = &dispatcher.callback_map[&EventKind::KeyboardInput];
        assert_eq!((keys[0].0, keys[1].0), (id4, id3));
    }

    #[test]
    fn test_press_release_without_drag_is_click() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(
            &mut dispatcher,
            &[EventKind::MouseClick, EventKind::MouseDragStart, EventKind::MouseDragEnd],
        );
        let mut fixture = Fixture::new();

        dispatcher.dispatch(&cursor(100.0, 100.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Pressed), &mut fixture.ctx());
        // Small jitter stays under the drag threshold.
        dispatcher.dispatch(&cursor(102.0, 101.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Released), &mut fixture.ctx());

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        match &log[0] {
            Event::MouseClick { button, position, .. } => {
                assert_eq!(*button, MouseButton::Left);
                assert_eq!(*position, (100.0, 100.0));
            }
            other => panic!("expected a click, got {other:?}"),
        }
    }

    #[test]
    fn test_drag_does_not_click() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(
            &mut dispatcher,
            &[
                EventKind::MouseClick,
                EventKind::MouseDragStart,
                EventKind::MouseDrag,
                EventKind::MouseDragEnd,
            ],
        );
        let mut fixture = Fixture::new();

        dispatcher.dispatch(&cursor(10.0, 10.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Pressed), &mut fixture.ctx());
        dispatcher.dispatch(&cursor(20.0, 10.0), &mut fixture.ctx());
        dispatcher.dispatch(&cursor(25.0, 13.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Released), &mut fixture.ctx());

        let kinds: Vec<EventKind> = log.borrow().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::MouseDragStart, EventKind::MouseDrag, EventKind::MouseDragEnd]
        );
        assert_eq!(
            log.borrow()[1],
            Event::MouseDrag {
                button: MouseButton::Left,
                start_pos: (10.0, 10.0),
                current_pos: (25.0, 13.0),
                delta: (5.0, 3.0),
            }
        );
        assert_eq!(
            log.borrow()[2],
            Event::MouseDragEnd {
                button: MouseButton::Left,
                start_pos: (10.0, 10.0),
                end_pos: (25.0, 13.0),
            }
        );
    }

    #[test]
    fn test_cursor_moves_without_buttons_do_not_drag() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(&mut dispatcher, &[EventKind::MouseDragStart, EventKind::MouseDrag]);
        let mut fixture = Fixture::new();

        for x in 0..20 {
            dispatcher.dispatch(&cursor(x as f64 * 10.0, 0.0), &mut fixture.ctx());
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_press_without_cursor_position_is_ignored() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(&mut dispatcher, &[EventKind::MouseDown, EventKind::MouseClick]);
        let mut fixture = Fixture::new();

        dispatcher.dispatch(&mouse(ElementState::Pressed), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Released), &mut fixture.ctx());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_press_sends_mouse_down_at_cursor() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(&mut dispatcher, &[EventKind::MouseDown, EventKind::MouseInput]);
        let mut fixture = Fixture::new();

        dispatcher.dispatch(&cursor(40.0, 60.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Pressed), &mut fixture.ctx());

        let log = log.borrow();
        assert_eq!(
            log[0],
            Event::MouseDown {
                button: MouseButton::Left,
                position: (40.0, 60.0),
            }
        );
        assert_eq!(log[1], mouse(ElementState::Pressed));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_slow_press_release_is_still_click() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(&mut dispatcher, &[EventKind::MouseClick]);
        let mut fixture = Fixture::new();

        dispatcher.dispatch(&cursor(100.0, 100.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Pressed), &mut fixture.ctx());
        std::thread::sleep(std::time::Duration::from_millis(350));
        dispatcher.dispatch(&mouse(ElementState::Released), &mut fixture.ctx());

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        match &log[0] {
            Event::MouseClick { duration_ms, .. } => assert!(*duration_ms >= 350),
            other => panic!("expected a click, got {other:?}"),
        }
    }

    #[test]
    fn test_synthesized_events_precede_raw_event() {
        let mut dispatcher = EventDispatcher::new();
        let log = record_kinds(&mut dispatcher, &[EventKind::MouseInput, EventKind::MouseClick]);
        let mut fixture = Fixture::new();

        dispatcher.dispatch(&cursor(5.0, 5.0), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Pressed), &mut fixture.ctx());
        dispatcher.dispatch(&mouse(ElementState::Released), &mut fixture.ctx());

        let kinds: Vec<EventKind> = log.borrow().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::MouseInput, EventKind::MouseClick, EventKind::MouseInput]
        );
    }
}
