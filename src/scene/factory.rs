use crate::assets::{ModelGraph, ModelImporter, ModelNode, PendingImport};
use crate::scene::{Aabb, Geometry, GeometryKind, NodeId, SceneNode, SceneRegistry, Transform};
use glam::{Mat4, Vec3};
use rand::Rng;
use std::path::PathBuf;

/// Toolbar name to primitive kind: `cube`, `sphere`, `cylinder`, `torus`.
pub fn kind_from_name(name: &str) -> Option<GeometryKind> {
    match name {
        "cube" => Some(GeometryKind::Box),
        "sphere" => Some(GeometryKind::Sphere),
        "cylinder" => Some(GeometryKind::Cylinder),
        "torus" => Some(GeometryKind::Torus),
        _ => None,
    }
}

/// Editable primitive node with unit geometry and the given colour.
pub fn primitive_node(kind: GeometryKind, name: String, color: u32) -> SceneNode {
    SceneNode::new(name, Geometry::Primitive(kind))
        .with_color(color)
        .editable(true)
}

pub fn random_color() -> u32 {
    rand::thread_rng().gen_range(0..=0xffffff)
}

#[derive(Debug, Default)]
pub struct ObjectFactory {
    spawned: u32,
}

impl ObjectFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown names are ignored.
    pub fn create_primitive(&mut self, registry: &mut SceneRegistry, name: &str) -> Option<NodeId> {
        let kind = kind_from_name(name)?;
        Some(self.create_kind(registry, kind))
    }

    pub fn create_kind(&mut self, registry: &mut SceneRegistry, kind: GeometryKind) -> NodeId {
        self.spawned += 1;
        let rest_height = -kind.local_bounds().min.y;
        let transform = Transform {
            position: Vec3::new(0.0, rest_height, 0.0),
            ..Transform::default()
        };
        let node = primitive_node(kind, format!("{} {}", kind.tag(), self.spawned), random_color())
            .with_transform(transform);
        let id = registry.insert(node);
        log::info!("Added {} ({:?})", kind.tag(), id);
        id
    }

    /// Starts decoding in the background; insert the result with `insert_model`.
    pub fn import_model(&self, importer: &ModelImporter, path: PathBuf) -> PendingImport {
        importer.spawn(path)
    }

    /// Inserts a decoded model. The root and every mesh-bearing node become
    /// editable; the root is lifted so the model rests on the ground.
    pub fn insert_model(&mut self, registry: &mut SceneRegistry, model: ModelGraph) -> NodeId {
        let root = registry.insert(SceneNode::new(model.name.clone(), Geometry::Empty).editable(true));
        let mut bounds: Option<Aabb> = None;
        for node in &model.roots {
            insert_model_node(registry, root, node, Mat4::IDENTITY, &mut bounds);
        }
        if let (Some(bounds), Some(root_node)) = (bounds, registry.get_mut(root)) {
            if bounds.min.y.is_finite() {
                root_node.transform.position.y = -bounds.min.y;
            }
        }
        log::info!("Inserted model '{}' ({:?})", model.name, root);
        root
    }
}

fn insert_model_node(
    registry: &mut SceneRegistry,
    parent: NodeId,
    node: &ModelNode,
    parent_matrix: Mat4,
    bounds: &mut Option<Aabb>,
) {
    let matrix = parent_matrix * node.transform.matrix();
    let geometry = match node.mesh_bounds {
        Some(mesh_bounds) => {
            let world = mesh_bounds.transformed(&matrix);
            *bounds = Some(bounds.map_or(world, |b| b.union(world)));
            Geometry::Mesh { bounds: mesh_bounds }
        }
        None => Geometry::Empty,
    };
    let scene_node = SceneNode::new(node.name.clone(), geometry)
        .with_transform(node.transform)
        .editable(node.mesh_bounds.is_some());
    let Some(id) = registry.graph_mut().add_child(parent, scene_node) else {
        return;
    };
    for child in &node.children {
        insert_model_node(registry, id, child, matrix, bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(name: &str, y: f32, children: Vec<ModelNode>) -> ModelNode {
        ModelNode {
            name: name.to_string(),
            transform: Transform {
                position: Vec3::new(0.0, y, 0.0),
                ..Transform::default()
            },
            mesh_bounds: Some(Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))),
            children,
        }
    }

    #[test]
    fn primitives_rest_on_ground_and_are_editable() {
        let mut registry = SceneRegistry::with_fixtures(20.0, 20);
        let mut factory = ObjectFactory::new();
        for name in ["cube", "sphere", "cylinder", "torus"] {
            let id = factory.create_primitive(&mut registry, name).unwrap();
            let node = registry.get(id).unwrap();
            assert!(node.editable);
            let bottom = node.transform.position.y
                + match node.geometry {
                    Geometry::Primitive(kind) => kind.local_bounds().min.y,
                    _ => unreachable!(),
                };
            assert!(bottom.abs() < 1e-6);
            assert!(node.color <= 0xffffff);
        }
        assert_eq!(registry.editable_ids().len(), 4);
    }

    #[test]
    fn unknown_primitive_name_is_a_no_op() {
        let mut registry = SceneRegistry::with_fixtures(20.0, 20);
        let mut factory = ObjectFactory::new();
        assert!(factory.create_primitive(&mut registry, "cone").is_none());
        assert!(registry.editable_ids().is_empty());
    }

    #[test]
    fn primitive_names_count_up() {
        let mut registry = SceneRegistry::new();
        let mut factory = ObjectFactory::new();
        let a = factory.create_kind(&mut registry, GeometryKind::Box);
        let b = factory.create_kind(&mut registry, GeometryKind::Sphere);
        assert_eq!(registry.get(a).unwrap().name, "Box 1");
        assert_eq!(registry.get(b).unwrap().name, "Sphere 2");
    }

    #[test]
    fn model_meshes_become_editable_and_root_is_lifted() {
        let mut registry = SceneRegistry::with_fixtures(20.0, 20);
        let mut factory = ObjectFactory::new();
        let model = ModelGraph {
            name: "robot".to_string(),
            roots: vec![ModelNode {
                name: "pivot".to_string(),
                transform: Transform::default(),
                mesh_bounds: None,
                children: vec![mesh("body", -2.0, vec![mesh("head", 3.0, Vec::new())])],
            }],
        };
        let root = factory.insert_model(&mut registry, model);
        let root_node = registry.get(root).unwrap();
        assert!(root_node.editable);
        assert!((root_node.transform.position.y - 3.0).abs() < 1e-5);

        let names: Vec<(String, bool)> = registry
            .graph()
            .descendants(root)
            .into_iter()
            .map(|id| {
                let node = registry.get(id).unwrap();
                (node.name.clone(), node.editable)
            })
            .collect();
        assert_eq!(
            names,
            vec![
                ("pivot".to_string(), false),
                ("body".to_string(), true),
                ("head".to_string(), true),
            ]
        );
    }
}
