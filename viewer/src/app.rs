use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use stencil_outline::Viewer;
use stencil_outline::event::Event;
use stencil_outline::input::NamedKey;
use stencil_outline::winit_support::convert_window_event;

use crate::options::ViewerOptions;

/// Application state for the winit event loop
pub struct App<'a> {
    options: ViewerOptions,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer<'a>>,
    /// First fatal error, reported once the event loop returns
    error: Option<anyhow::Error>,
}

impl<'a> App<'a> {
    pub fn new(options: ViewerOptions) -> Self {
        Self {
            options,
            window: None,
            viewer: None,
            error: None,
        }
    }

    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn create_viewer(&self, window: Arc<Window>) -> anyhow::Result<Viewer<'a>> {
        let mut viewer = pollster::block_on(Viewer::from_window(window))?;
        viewer.load_setup(self.options.preset.build());

        let config = viewer.selection_mut().config_mut();
        if let Some(scale) = self.options.outline_scale {
            config.outline_scale = scale;
        }
        if let Some(color) = self.options.outline_color {
            config.outline_color = color;
        }
        log::info!(
            "Loaded {} preset with {} entities",
            self.options.preset,
            viewer.scene().entities().len()
        );
        Ok(viewer)
    }

    fn handle_redraw_requested(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            if let Err(e) = viewer.frame() {
                log::error!("Render error: {}", e);
            }
        }

        // Request next frame
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl<'a> ApplicationHandler for App<'a> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Stencil Outline Viewer")
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                let err = anyhow::anyhow!("failed to create window: {}", e);
                return self.fail(event_loop, err);
            }
        };

        match self.create_viewer(window.clone()) {
            Ok(viewer) => {
                self.viewer = Some(viewer);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::RedrawRequested => {
                self.handle_redraw_requested();
                return;
            }
            _ => {}
        }

        let Some(converted) = convert_window_event(&event) else {
            return;
        };
        if let Event::KeyboardInput { event: key, .. } = &converted {
            if key.is_press_of(NamedKey::Escape) {
                event_loop.exit();
                return;
            }
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.handle_event(&converted);
        }
    }
}
