mod input;
mod timing;

use crate::assets::MODEL_EXTENSIONS;
use crate::config::EditorConfig;
use crate::editor::EditorContext;
use crate::render::{FrameRenderer, HeadlessRenderer};
use crate::ui::{ToolbarCommand, UiState};
use input::{map_mouse_button, wheel_notches, InputAction, InputState};
use timing::FrameLoop;

use glam::Vec2;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

pub struct App {
    window: Option<Arc<Window>>,
    editor: EditorContext,
    renderer: Box<dyn FrameRenderer>,
    ui: UiState,
    input: InputState,
    cursor: Option<Vec2>,
    frames: FrameLoop,
    base_title: String,
}

impl App {
    fn new(config: EditorConfig) -> Self {
        let base_title = config.window.title.clone();
        Self {
            window: None,
            editor: EditorContext::new(config),
            renderer: Box::new(HeadlessRenderer::new()),
            ui: UiState::new(),
            input: InputState::default(),
            cursor: None,
            frames: FrameLoop::new(Duration::from_millis(16), Instant::now()),
            base_title,
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let millihz = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz());
        self.frames.set_refresh_rate_millihertz(millihz, Instant::now());
    }

    fn render(&mut self) {
        if self.frames.is_cancelled() {
            return;
        }
        self.frames.begin_frame();
        self.editor.frame();
        if let Err(err) = self
            .renderer
            .render(self.editor.registry().graph(), self.editor.camera())
        {
            log::warn!("Frame {} not rendered: {}", self.frames.frames(), err);
        }
        self.ui.update(&self.editor);
        if let Some(panel) = self.ui.properties() {
            log::trace!("{}", panel.lines().join(" | "));
        }
        if let Some(menu) = self.ui.menu() {
            let labels: Vec<&str> = menu.entries.iter().map(|(_, label)| *label).collect();
            log::trace!("menu at {:?}: {}", menu.position, labels.join(", "));
        }
        if let Some(window) = &self.window {
            window.set_title(&self.ui.window_title(&self.base_title));
        }
    }

    fn run_command(&mut self, command: ToolbarCommand) {
        log::info!("Toolbar: {}", command.id());
        if let Some(name) = command.primitive_name() {
            self.editor.add_primitive(name);
            return;
        }
        match command {
            ToolbarCommand::AddModel => self.handle_add_model_action(),
            ToolbarCommand::ExportScene => self.handle_export_scene_action(),
            ToolbarCommand::ImportScene => self.handle_import_scene_action(),
            _ => {}
        }
    }

    fn handle_add_model_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("glTF", &MODEL_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.editor.add_model(path);
    }

    fn handle_export_scene_action(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Scene", &["json"])
            .set_file_name("scene.json")
            .save_file()
        {
            if let Err(e) = self.editor.save_scene(&path) {
                log::warn!("Failed to save scene: {}", e);
            }
        }
    }

    fn handle_import_scene_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Scene", &["json"])
            .pick_file()
        else {
            return;
        };
        // failures are logged by the editor and leave the scene as it was
        if self.editor.load_scene(&path).is_ok() {
            log::info!("Scene loaded from {:?}", path);
        }
    }

    /// Stops the frame loop and releases the renderer. Safe to call twice.
    fn teardown(&mut self) {
        if self.frames.is_cancelled() {
            return;
        }
        self.frames.cancel();
        self.editor.shutdown();
        self.renderer.dispose();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = &self.editor.config().window;
        let window_attrs = WindowAttributes::default()
            .with_title(self.base_title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.editor.resize(size.width, size.height);
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                self.cursor = None;
                self.editor.pointer_left();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.input.set_modifiers(modifiers);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                match self.input.handle_key(event.physical_key, pressed) {
                    InputAction::Quit => {
                        self.teardown();
                        event_loop.exit();
                    }
                    InputAction::Toolbar(command) => self.run_command(command),
                    InputAction::GizmoMode(mode) => self.editor.set_gizmo_mode(mode),
                    InputAction::None => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                self.editor.resize(new_size.width, new_size.height);
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let client = Vec2::new(position.x as f32, position.y as f32);
                self.cursor = Some(client);
                self.editor.pointer_moved(client);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.editor.pointer_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_mouse_button(button) else {
                    return;
                };
                match state {
                    ElementState::Pressed => {
                        if let Some(client) = self.cursor {
                            self.editor.pointer_down(button, client);
                        }
                    }
                    ElementState::Released => self.editor.pointer_up(button),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.editor.wheel(wheel_notches(delta));
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let (due, next) = self.frames.poll(Instant::now());
        let Some(next) = next else {
            return;
        };
        if due {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(next));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

pub fn run(config: EditorConfig) {
    log::info!("Scene editor starting ({}x{})", config.window.width, config.window.height);
    let toolbar: Vec<&str> = ToolbarCommand::ALL.iter().map(|command| command.id()).collect();
    log::info!("   Toolbar: {}", toolbar.join(", "));
    log::info!("   1-4 add primitives, M model, Ctrl+S export, Ctrl+O import, W/E/R gizmo");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");

    log::info!("Goodbye");
}
