use web_time::Instant;

use crate::{
    error::RendererError,
    event::{Event, EventContext, EventDispatcher},
    operator::{BuiltinOperatorId, NavigationOperator, OperatorManager, SelectionOperator},
    renderer::Renderer,
    scene::{Camera, Scene, SceneSetup, Viewport},
    selection::SelectionState,
};

/// Main viewer that encapsulates the renderer, scene, selection and event handling
pub struct Viewer<'a> {
    renderer: Renderer<'a>,
    scene: Scene,
    selection: SelectionState,
    dispatcher: EventDispatcher,
    operator_manager: OperatorManager,
    /// Last time update() was called, for delta_time calculation
    last_update_time: Option<Instant>,
}

impl<'a> Viewer<'a> {
    /// Create a new Viewer with an empty scene on the given surface target
    pub async fn new<T>(surface_target: T, width: u32, height: u32) -> Result<Self, RendererError>
    where
        T: Into<wgpu::SurfaceTarget<'a>>,
    {
        let renderer = Renderer::new(surface_target, width, height).await?;

        let mut dispatcher = EventDispatcher::new();
        let mut operator_manager = OperatorManager::new();

        // Selection sees presses first; navigation only consumes drags and the wheel
        let selection_operator =
            Box::new(SelectionOperator::new(BuiltinOperatorId::Selection.into()));
        operator_manager.push_back(selection_operator, &mut dispatcher);

        let nav_operator = Box::new(NavigationOperator::new(
            BuiltinOperatorId::Navigation.into(),
        ));
        operator_manager.push_back(nav_operator, &mut dispatcher);

        Ok(Self {
            renderer,
            scene: Scene::new(),
            selection: SelectionState::new(),
            dispatcher,
            operator_manager,
            last_update_time: None,
        })
    }

    /// Create a new Viewer from a winit Window, sized to its inner size
    #[cfg(feature = "winit-support")]
    pub async fn from_window(
        window: std::sync::Arc<winit::window::Window>,
    ) -> Result<Self, RendererError> {
        let size = window.inner_size();
        Self::new(window, size.width, size.height).await
    }

    /// Installs a built scene together with its camera and outline style.
    /// Any current selection is dropped.
    pub fn load_setup(&mut self, setup: SceneSetup) {
        self.scene = setup.scene;
        self.renderer.set_camera(setup.camera);
        self.selection.clear();
        let config = self.selection.config_mut();
        config.outline_scale = setup.outline_scale;
        config.outline_color = setup.outline_color;
    }

    /// Handle a single event by dispatching it to registered handlers.
    ///
    /// Resizes reach the renderer before any operator sees them.
    pub fn handle_event(&mut self, event: &Event) {
        if let Event::Resized(size) = event {
            self.renderer.resize(*size);
        }

        let viewport = self.renderer.viewport();
        let mut ctx = EventContext {
            camera: self.renderer.camera_mut(),
            scene: &mut self.scene,
            selection: &mut self.selection,
            viewport,
        };
        self.dispatcher.dispatch(event, &mut ctx);
    }

    /// Dispatch an Update event with delta_time since last update.
    ///
    /// On the first call, a 60 Hz frame time is assumed.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta_time = match self.last_update_time {
            Some(last) => now.duration_since(last).as_secs_f32(),
            None => 1.0 / 60.0,
        };
        self.last_update_time = Some(now);

        self.handle_event(&Event::Update { delta_time });
    }

    /// Draws the scene with the current selection outlined.
    pub fn render(&mut self) -> anyhow::Result<()> {
        self.renderer.render(&self.scene, &self.selection)
    }

    /// One iteration of the frame loop: update, then render. The outline
    /// follows the selected entity because the renderer resyncs it every frame.
    pub fn frame(&mut self) -> anyhow::Result<()> {
        self.update();
        self.render()
    }

    pub fn camera(&self) -> &Camera {
        self.renderer.camera()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        self.renderer.camera_mut()
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.renderer.set_camera(camera);
    }

    /// Get the current viewport size as (width, height)
    pub fn size(&self) -> (u32, u32) {
        self.renderer.size()
    }

    pub fn viewport(&self) -> Viewport {
        self.renderer.viewport()
    }

    pub fn renderer(&self) -> &Renderer<'a> {
        &self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn operator_manager(&self) -> &OperatorManager {
        &self.operator_manager
    }

    /// Both halves needed to add, remove or reorder operators.
    pub fn operator_manager_and_dispatcher_mut(
        &mut self,
    ) -> (&mut OperatorManager, &mut EventDispatcher) {
        (&mut self.operator_manager, &mut self.dispatcher)
    }
}
