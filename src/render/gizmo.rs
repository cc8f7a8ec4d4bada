use crate::scene::{NodeId, SceneGraph};
use glam::Vec3;
use std::collections::VecDeque;

const SCALE_MIN: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    pub fn label(self) -> &'static str {
        match self {
            GizmoMode::Translate => "Translate",
            GizmoMode::Rotate => "Rotate",
            GizmoMode::Scale => "Scale",
        }
    }
}

/// Notifications the gizmo raises; drained by whoever coordinates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    DraggingChanged(bool),
    ObjectChange,
}

#[derive(Debug, Default)]
pub struct TransformGizmo {
    attached: Option<NodeId>,
    mode: GizmoMode,
    dragging: bool,
    events: VecDeque<GizmoEvent>,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> Option<NodeId> {
        self.attached
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn attach(&mut self, node: NodeId) {
        if self.attached != Some(node) {
            self.end_drag();
        }
        self.attached = Some(node);
    }

    pub fn detach(&mut self) {
        self.end_drag();
        self.attached = None;
    }

    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
    }

    pub fn begin_drag(&mut self) {
        if self.attached.is_some() && !self.dragging {
            self.dragging = true;
            self.events.push_back(GizmoEvent::DraggingChanged(true));
        }
    }

    /// Applies `delta` to the attached node in the current mode. Translate
    /// adds world units, rotate adds radians, scale multiplies by `1 + delta`.
    pub fn drag(&mut self, delta: Vec3, graph: &mut SceneGraph) {
        if !self.dragging {
            return;
        }
        let Some(node) = self.attached.and_then(|id| graph.get_mut(id)) else {
            return;
        };
        let transform = &mut node.transform;
        match self.mode {
            GizmoMode::Translate => transform.position += delta,
            GizmoMode::Rotate => transform.rotation += delta,
            GizmoMode::Scale => {
                transform.scale = (transform.scale * (Vec3::ONE + delta)).max(Vec3::splat(SCALE_MIN));
            }
        }
        self.events.push_back(GizmoEvent::ObjectChange);
    }

    pub fn end_drag(&mut self) {
        if self.dragging {
            self.dragging = false;
            self.events.push_back(GizmoEvent::DraggingChanged(false));
        }
    }

    pub fn drain_events(&mut self) -> Vec<GizmoEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, GeometryKind, SceneNode};

    fn graph_with_box() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let id = graph
            .add_child(
                graph.root(),
                SceneNode::new("Box", Geometry::Primitive(GeometryKind::Box)).editable(true),
            )
            .unwrap();
        (graph, id)
    }

    #[test]
    fn drag_emits_events_in_order() {
        let (mut graph, id) = graph_with_box();
        let mut gizmo = TransformGizmo::new();
        gizmo.attach(id);
        gizmo.begin_drag();
        gizmo.drag(Vec3::new(1.0, 0.0, 0.0), &mut graph);
        gizmo.end_drag();
        assert_eq!(
            gizmo.drain_events(),
            vec![
                GizmoEvent::DraggingChanged(true),
                GizmoEvent::ObjectChange,
                GizmoEvent::DraggingChanged(false),
            ]
        );
        assert_eq!(graph.get(id).unwrap().transform.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn drag_without_attachment_is_ignored() {
        let (mut graph, id) = graph_with_box();
        let mut gizmo = TransformGizmo::new();
        gizmo.begin_drag();
        gizmo.drag(Vec3::ONE, &mut graph);
        assert!(gizmo.drain_events().is_empty());
        assert_eq!(graph.get(id).unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn scale_mode_clamps_to_minimum() {
        let (mut graph, id) = graph_with_box();
        let mut gizmo = TransformGizmo::new();
        gizmo.set_mode(GizmoMode::Scale);
        gizmo.attach(id);
        gizmo.begin_drag();
        gizmo.drag(Vec3::splat(-5.0), &mut graph);
        assert_eq!(graph.get(id).unwrap().transform.scale, Vec3::splat(SCALE_MIN));
    }

    #[test]
    fn detach_mid_drag_ends_drag() {
        let (_graph, id) = graph_with_box();
        let mut gizmo = TransformGizmo::new();
        gizmo.attach(id);
        gizmo.begin_drag();
        gizmo.detach();
        assert!(!gizmo.is_dragging());
        assert_eq!(gizmo.attached(), None);
        assert_eq!(
            gizmo.drain_events().last(),
            Some(&GizmoEvent::DraggingChanged(false))
        );
    }
}
