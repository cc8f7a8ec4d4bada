//! Interaction arbiter
//!
//! Coordinates the orbit camera, the transform gizmo and the single-object
//! selection. Only two facts are stored: the click-driven selection and the
//! gizmo attachment. `InteractionMode` is always derived from them.
//!
//! Invariant after every transition: orbit is enabled exactly when the gizmo
//! has no attached node.

use crate::render::pick::PickOutcome;
use crate::render::{GizmoEvent, GizmoMode, OrbitControls, TransformGizmo};
use crate::scene::{NodeId, SceneRegistry};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Selected(NodeId),
    Editing(NodeId),
}

impl InteractionMode {
    pub fn derive(selection: Option<NodeId>, attached: Option<NodeId>) -> Self {
        match (selection, attached) {
            (_, Some(node)) => InteractionMode::Editing(node),
            (Some(node), None) => InteractionMode::Selected(node),
            (None, None) => InteractionMode::Idle,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "Idle",
            InteractionMode::Selected(_) => "Selected",
            InteractionMode::Editing(_) => "Editing",
        }
    }
}

/// Live transform of the focused node, refreshed on every gizmo change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    pub node: NodeId,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

/// Result of a secondary click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryClick {
    ShowMenu(NodeId),
    Rejected,
}

pub struct InteractionArbiter {
    orbit: OrbitControls,
    gizmo: TransformGizmo,
    selection: Option<NodeId>,
    snapshot: Option<TransformSnapshot>,
}

impl InteractionArbiter {
    pub fn new(orbit: OrbitControls) -> Self {
        let mut arbiter = Self {
            orbit,
            gizmo: TransformGizmo::new(),
            selection: None,
            snapshot: None,
        };
        arbiter.orbit.enabled = true;
        arbiter
    }

    pub fn mode(&self) -> InteractionMode {
        InteractionMode::derive(self.selection, self.gizmo.attached())
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn attached(&self) -> Option<NodeId> {
        self.gizmo.attached()
    }

    pub fn snapshot(&self) -> Option<&TransformSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    /// Camera input goes through here; `enabled` stays under arbiter control.
    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit.enabled
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        self.gizmo.set_mode(mode);
    }

    /// Button 0 on the canvas.
    pub fn primary_click(&mut self, outcome: PickOutcome, registry: &SceneRegistry) {
        match outcome.editable() {
            Some(node) if registry.graph().is_editable(node) => {
                self.selection = Some(node);
            }
            _ => {
                self.selection = None;
                if self.gizmo.attached().is_none() {
                    self.enable_orbit();
                }
            }
        }
        self.refresh_snapshot(registry);
    }

    /// Context click over the canvas. A node being edited keeps its session:
    /// right-clicking any other node is rejected with no state change.
    pub fn secondary_click(&mut self, outcome: PickOutcome, registry: &SceneRegistry) -> SecondaryClick {
        let Some(node) = outcome.editable().filter(|id| registry.graph().is_editable(*id)) else {
            return SecondaryClick::Rejected;
        };
        match self.gizmo.attached() {
            Some(attached) if attached != node => {
                log::debug!("Context click on {node:?} rejected while editing {attached:?}");
                SecondaryClick::Rejected
            }
            _ => {
                self.selection = Some(node);
                self.refresh_snapshot(registry);
                SecondaryClick::ShowMenu(node)
            }
        }
    }

    pub fn enter_edit_mode(&mut self, registry: &SceneRegistry) -> bool {
        let Some(node) = self.selection.filter(|id| registry.graph().is_editable(*id)) else {
            return false;
        };
        self.gizmo.attach(node);
        self.drain_gizmo_events(registry);
        self.orbit.enabled = false;
        self.refresh_snapshot(registry);
        true
    }

    pub fn cancel_edit_mode(&mut self, registry: &SceneRegistry) {
        self.gizmo.detach();
        self.drain_gizmo_events(registry);
        self.enable_orbit();
        self.refresh_snapshot(registry);
    }

    /// Removes `node`. Non-editable or missing targets are left alone; the
    /// arbiter still returns to Idle.
    pub fn delete_node(&mut self, node: NodeId, registry: &mut SceneRegistry) -> bool {
        let removed = registry.remove(node);
        self.selection = None;
        if self.gizmo.attached().is_some_and(|id| !registry.contains(id)) {
            self.gizmo.detach();
            self.drain_gizmo_events(registry);
        }
        if self.gizmo.attached().is_none() {
            self.enable_orbit();
        }
        self.refresh_snapshot(registry);
        removed
    }

    /// Clears references to nodes that no longer exist, e.g. after a scene import.
    pub fn forget_missing(&mut self, registry: &SceneRegistry) {
        if self.selection.is_some_and(|id| !registry.contains(id)) {
            self.selection = None;
        }
        if self.gizmo.attached().is_some_and(|id| !registry.contains(id)) {
            self.gizmo.detach();
            self.drain_gizmo_events(registry);
            self.enable_orbit();
        }
        self.refresh_snapshot(registry);
    }

    pub fn begin_drag(&mut self, registry: &SceneRegistry) {
        self.gizmo.begin_drag();
        self.drain_gizmo_events(registry);
    }

    pub fn drag(&mut self, delta: Vec3, registry: &mut SceneRegistry) {
        self.gizmo.drag(delta, registry.graph_mut());
        self.drain_gizmo_events(registry);
    }

    pub fn end_drag(&mut self, registry: &SceneRegistry) {
        self.gizmo.end_drag();
        self.drain_gizmo_events(registry);
    }

    pub fn handle_gizmo_event(&mut self, event: GizmoEvent, registry: &SceneRegistry) {
        match event {
            GizmoEvent::DraggingChanged(true) => self.orbit.enabled = false,
            GizmoEvent::DraggingChanged(false) => {
                if self.gizmo.attached().is_none() {
                    self.enable_orbit();
                }
            }
            GizmoEvent::ObjectChange => self.refresh_snapshot(registry),
        }
    }

    /// Per-frame tick for the orbit widget.
    pub fn update(&mut self) -> bool {
        self.orbit.update()
    }

    fn drain_gizmo_events(&mut self, registry: &SceneRegistry) {
        for event in self.gizmo.drain_events() {
            self.handle_gizmo_event(event, registry);
        }
    }

    fn enable_orbit(&mut self) {
        self.orbit.enabled = true;
        self.orbit.sync_from_camera();
    }

    fn refresh_snapshot(&mut self, registry: &SceneRegistry) {
        let focus = match self.mode() {
            InteractionMode::Idle => None,
            InteractionMode::Selected(node) | InteractionMode::Editing(node) => Some(node),
        };
        self.snapshot = focus
            .and_then(|node| registry.get(node).map(|n| (node, n.transform)))
            .map(|(node, transform)| TransformSnapshot {
                node,
                position: transform.position,
                rotation: transform.rotation,
                scale: transform.scale,
            });
    }
}
