pub mod factory;
pub mod serialization;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Stable handle into the scene arena. Ids are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Closed set of primitives that round-trip through a `SceneDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Box,
    Sphere,
    Cylinder,
    Torus,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 4] = [
        GeometryKind::Box,
        GeometryKind::Sphere,
        GeometryKind::Cylinder,
        GeometryKind::Torus,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            GeometryKind::Box => "Box",
            GeometryKind::Sphere => "Sphere",
            GeometryKind::Cylinder => "Cylinder",
            GeometryKind::Torus => "Torus",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Local-space bounds of the unit primitive.
    pub fn local_bounds(self) -> Aabb {
        match self {
            GeometryKind::Box | GeometryKind::Sphere | GeometryKind::Cylinder => {
                Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
            }
            GeometryKind::Torus => {
                let outer = TORUS_RADIUS + TORUS_TUBE;
                Aabb::new(
                    Vec3::new(-outer, -outer, -TORUS_TUBE),
                    Vec3::new(outer, outer, TORUS_TUBE),
                )
            }
        }
    }
}

pub const TORUS_RADIUS: f32 = 0.4;
pub const TORUS_TUBE: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn union(self, other: Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(self, matrix: &Mat4) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb::new(min, max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Primitive(GeometryKind),
    /// Imported mesh, bounds in node-local space.
    Mesh { bounds: Aabb },
    Plane { size: f32 },
    Grid { size: f32, divisions: u32 },
    Empty,
}

impl Geometry {
    /// Type tag as written by scene export. `None` for nodes without geometry.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Geometry::Primitive(kind) => Some(kind.tag()),
            Geometry::Mesh { .. } => Some("Mesh"),
            Geometry::Plane { .. } => Some("PlaneGeometry"),
            Geometry::Grid { .. } => Some("GridHelper"),
            Geometry::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler XYZ, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub geometry: Geometry,
    /// 24-bit RGB material colour.
    pub color: u32,
    pub editable: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            geometry,
            color: 0xffffff,
            editable: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color & 0xffffff;
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Node arena with parent/child links. Slot `0` is always the root.
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(SceneNode::new("Scene", Geometry::Empty))],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_editable(&self, id: NodeId) -> bool {
        self.get(id).map(|node| node.editable).unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Appends `node` under `parent`. Returns `None` if the parent is gone.
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(Some(node));
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(id);
        }
        Some(id)
    }

    /// Drops `id` and its whole subtree. The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        if id == self.root() || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.0 as usize].take() {
                stack.extend(node.children);
            }
        }
        true
    }

    /// Depth-first, parents before children, siblings in insertion order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the scene root. Editable content is inserted and removed through here;
/// fixtures (ground, grid, lights) are added once at startup.
pub struct SceneRegistry {
    graph: SceneGraph,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            graph: SceneGraph::new(),
        }
    }

    /// Registry pre-populated with the non-editable fixtures.
    pub fn with_fixtures(ground_size: f32, grid_divisions: u32) -> Self {
        let mut registry = Self::new();
        registry.insert(
            SceneNode::new("Ground", Geometry::Plane { size: ground_size }).with_color(0x808080),
        );
        registry.insert(SceneNode::new(
            "Grid",
            Geometry::Grid {
                size: ground_size,
                divisions: grid_divisions,
            },
        ));
        registry.insert(SceneNode::new("Ambient Light", Geometry::Empty));
        let sun = Transform {
            position: Vec3::new(5.0, 10.0, 7.5),
            ..Transform::default()
        };
        registry.insert(SceneNode::new("Directional Light", Geometry::Empty).with_transform(sun));
        registry
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    pub fn insert(&mut self, node: SceneNode) -> NodeId {
        let root = self.graph.root();
        // the root always exists
        self.graph
            .add_child(root, node)
            .unwrap_or(root)
    }

    /// No-op for nodes that are missing or not editable.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.graph.is_editable(id) {
            return false;
        }
        self.graph.detach(id)
    }

    pub fn for_each_editable(&self, mut visitor: impl FnMut(NodeId, &SceneNode)) {
        for id in self.graph.descendants(self.graph.root()) {
            if let Some(node) = self.graph.get(id) {
                if node.editable {
                    visitor(id, node);
                }
            }
        }
    }

    pub fn editable_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.for_each_editable(|id, _| ids.push(id));
        ids
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.graph.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.graph.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains(id)
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}
