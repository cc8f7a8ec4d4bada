pub mod arbiter;
pub mod context_menu;

use crate::assets::{ModelImporter, PendingImport};
use crate::config::EditorConfig;
use crate::render::pick::{self, PickOutcome};
use crate::render::{Camera, GizmoMode, OrbitControls, Viewport};
use crate::scene::factory::ObjectFactory;
use crate::scene::serialization::{self, ImportReport, SerializationError};
use crate::scene::{NodeId, SceneRegistry};
use arbiter::{InteractionArbiter, InteractionMode, SecondaryClick};
use context_menu::{ContextMenuAction, ContextMenuController};
use glam::{Vec2, Vec3};
use std::path::{Path, PathBuf};

const DRAG_ROTATE_SPEED: f32 = 0.01;
const DRAG_SCALE_SPEED: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Everything the editor owns for one session. Created once at startup and
/// handed to the shell; no component reaches for global state.
pub struct EditorContext {
    config: EditorConfig,
    registry: SceneRegistry,
    arbiter: InteractionArbiter,
    menu: ContextMenuController,
    factory: ObjectFactory,
    importer: ModelImporter,
    pending: Vec<PendingImport>,
    viewport: Viewport,
    pointer: Option<Vec2>,
    primary_down: bool,
}

impl EditorContext {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_importer(config, ModelImporter::gltf())
    }

    pub fn with_importer(config: EditorConfig, importer: ModelImporter) -> Self {
        let viewport = Viewport::from_size(config.window.width, config.window.height);
        let registry =
            SceneRegistry::with_fixtures(config.fixtures.ground_size, config.fixtures.grid_divisions);
        let camera = Camera::from_config(&config.camera, viewport.width / viewport.height.max(1.0));
        let arbiter = InteractionArbiter::new(OrbitControls::new(camera, &config.orbit));
        Self {
            config,
            registry,
            arbiter,
            menu: ContextMenuController::new(),
            factory: ObjectFactory::new(),
            importer,
            pending: Vec::new(),
            viewport,
            pointer: None,
            primary_down: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn arbiter(&self) -> &InteractionArbiter {
        &self.arbiter
    }

    pub fn menu(&self) -> &ContextMenuController {
        &self.menu
    }

    pub fn camera(&self) -> &Camera {
        self.arbiter.orbit().camera()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> InteractionMode {
        self.arbiter.mode()
    }

    pub fn pending_imports(&self) -> usize {
        self.pending.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::from_size(width, height);
        self.arbiter.orbit_mut().camera_mut().set_aspect(width, height);
    }

    pub fn pick_at(&self, client: Vec2) -> PickOutcome {
        pick::pick(self.registry.graph(), self.camera(), &self.viewport, client)
    }

    pub fn pointer_down(&mut self, button: PointerButton, client: Vec2) {
        self.pointer = Some(client);
        match button {
            PointerButton::Primary => {
                if let Some(action) = self.menu.item_at(client, &self.arbiter) {
                    self.dispatch_menu_action(action);
                    return;
                }
                self.menu.on_document_click(client, &self.arbiter);
                self.primary_down = true;
                let outcome = self.pick_at(client);
                self.arbiter.primary_click(outcome, &self.registry);
                if outcome.editable().is_some() && outcome.editable() == self.arbiter.attached() {
                    self.arbiter.begin_drag(&self.registry);
                }
            }
            PointerButton::Secondary => {
                let outcome = self.pick_at(client);
                match self.arbiter.secondary_click(outcome, &self.registry) {
                    SecondaryClick::ShowMenu(node) => self.menu.open(client, node),
                    SecondaryClick::Rejected => self.menu.close(),
                }
            }
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        if button == PointerButton::Primary {
            self.primary_down = false;
            if self.arbiter.gizmo().is_dragging() {
                self.arbiter.end_drag(&self.registry);
            }
        }
    }

    /// Primary-button travel drives the gizmo while it is dragging and the
    /// orbit camera otherwise.
    pub fn pointer_moved(&mut self, client: Vec2) {
        let previous = self.pointer.replace(client);
        let Some(previous) = previous else {
            return;
        };
        if !self.primary_down {
            return;
        }
        let pixels = client - previous;
        if self.arbiter.gizmo().is_dragging() {
            let delta = self.gizmo_delta(pixels);
            self.arbiter.drag(delta, &mut self.registry);
        } else {
            self.arbiter.orbit_mut().rotate(pixels.x, pixels.y);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn wheel(&mut self, notches: f32) {
        self.arbiter.orbit_mut().zoom(notches);
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        log::debug!("Gizmo mode: {}", mode.label());
        self.arbiter.set_gizmo_mode(mode);
    }

    pub fn dispatch_menu_action(&mut self, action: ContextMenuAction) -> bool {
        log::info!("Menu action: {}", action.label());
        self.menu.dispatch(action, &mut self.arbiter, &mut self.registry)
    }

    pub fn add_primitive(&mut self, name: &str) -> Option<NodeId> {
        self.factory.create_primitive(&mut self.registry, name)
    }

    /// Starts a background model decode. The node appears once `poll_imports`
    /// sees the result.
    pub fn add_model(&mut self, path: PathBuf) {
        log::info!("Importing model {}", path.display());
        let pending = self.factory.import_model(&self.importer, path);
        self.pending.push(pending);
    }

    /// Inserts every finished model decode. Failures are logged and dropped.
    pub fn poll_imports(&mut self) -> Vec<NodeId> {
        let mut inserted = Vec::new();
        for pending in std::mem::take(&mut self.pending) {
            match pending.try_take() {
                None => self.pending.push(pending),
                Some(Ok(model)) => {
                    log::info!(
                        "Model {} decoded: {} meshes",
                        pending.path().display(),
                        model.mesh_count()
                    );
                    inserted.push(self.factory.insert_model(&mut self.registry, model));
                }
                Some(Err(err)) => log::error!("Model import failed: {err}"),
            }
        }
        inserted
    }

    /// Replaces the editable content with `json`. A malformed document is
    /// logged and leaves the scene as it was.
    pub fn import_scene(&mut self, json: &str) -> Result<ImportReport, SerializationError> {
        let result = serialization::import_from_str(&mut self.registry, json);
        self.after_import(&result);
        result
    }

    pub fn save_scene(&self, path: &Path) -> Result<(), SerializationError> {
        serialization::save_scene_to_file(&self.registry, path)?;
        log::info!(
            "Exported {} objects to {}",
            self.registry.editable_ids().len(),
            path.display()
        );
        Ok(())
    }

    pub fn load_scene(&mut self, path: &Path) -> Result<ImportReport, SerializationError> {
        let result = serialization::load_scene_from_file(&mut self.registry, path);
        self.after_import(&result);
        result
    }

    /// Per-frame tick: lands finished imports and applies queued orbit input.
    pub fn frame(&mut self) -> bool {
        let inserted = !self.poll_imports().is_empty();
        let moved = self.arbiter.update();
        inserted || moved
    }

    pub fn shutdown(&mut self) {
        if !self.pending.is_empty() {
            log::info!("Dropping {} unfinished model imports", self.pending.len());
        }
        self.pending.clear();
        self.menu.close();
    }

    fn after_import(&mut self, result: &Result<ImportReport, SerializationError>) {
        match result {
            Ok(report) => {
                log::info!(
                    "Scene imported: {} removed, {} inserted, {} skipped",
                    report.removed,
                    report.inserted,
                    report.skipped
                );
                if self
                    .menu
                    .state()
                    .is_some_and(|state| !self.registry.contains(state.target))
                {
                    self.menu.close();
                }
                self.arbiter.forget_missing(&self.registry);
            }
            Err(err) => log::error!("Scene import failed: {err}"),
        }
    }

    fn gizmo_delta(&self, pixels: Vec2) -> Vec3 {
        match self.arbiter.gizmo().mode() {
            GizmoMode::Translate => {
                let camera = self.camera();
                let offset = camera.target - camera.position;
                let forward = offset.normalize_or_zero();
                let right = forward.cross(Vec3::Y).normalize_or_zero();
                let up = right.cross(forward);
                let units = offset.length() / self.viewport.height.max(1.0);
                (right * pixels.x - up * pixels.y) * units
            }
            GizmoMode::Rotate => Vec3::new(pixels.y, pixels.x, 0.0) * DRAG_ROTATE_SPEED,
            GizmoMode::Scale => Vec3::splat(-pixels.y * DRAG_SCALE_SPEED),
        }
    }
}
