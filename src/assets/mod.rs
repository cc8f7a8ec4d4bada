use crate::scene::{Aabb, Transform};
use glam::{EulerRot, Quat, Vec3};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

pub const MODEL_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("unsupported model format: {path}")]
    UnsupportedFormat { path: String },
    #[error("failed to decode glTF {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF {path} contains no meshes")]
    EmptyModel { path: String },
    #[error("import worker for {path} exited without a result")]
    WorkerGone { path: String },
}

/// Decoded model, detached from any scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGraph {
    pub name: String,
    pub roots: Vec<ModelNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    /// Local-space bounds when the node carries a mesh.
    pub mesh_bounds: Option<Aabb>,
    pub children: Vec<ModelNode>,
}

impl ModelGraph {
    pub fn mesh_count(&self) -> usize {
        fn count(node: &ModelNode) -> usize {
            usize::from(node.mesh_bounds.is_some()) + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }
}

pub trait ModelDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<ModelGraph, AssetError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GltfDecoder;

impl ModelDecoder for GltfDecoder {
    fn decode(&self, path: &Path) -> Result<ModelGraph, AssetError> {
        let path_str = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        if !extension.is_some_and(|ext| MODEL_EXTENSIONS.contains(&ext.as_str())) {
            return Err(AssetError::UnsupportedFormat { path: path_str });
        }

        let (document, _buffers, _images) = gltf::import(path).map_err(|source| AssetError::Decode {
            path: path_str.clone(),
            source,
        })?;
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| AssetError::EmptyModel {
                path: path_str.clone(),
            })?;

        let graph = ModelGraph {
            name: path
                .file_stem()
                .and_then(|value| value.to_str())
                .unwrap_or("model")
                .to_string(),
            roots: scene.nodes().map(|node| convert_node(&node)).collect(),
        };
        if graph.mesh_count() == 0 {
            return Err(AssetError::EmptyModel { path: path_str });
        }
        Ok(graph)
    }
}

fn convert_node(node: &gltf::Node) -> ModelNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let (rx, ry, rz) = Quat::from_array(rotation).to_euler(EulerRot::XYZ);
    let mesh_bounds = node.mesh().and_then(|mesh| {
        mesh.primitives()
            .map(|primitive| {
                let bb = primitive.bounding_box();
                Aabb::new(Vec3::from(bb.min), Vec3::from(bb.max))
            })
            .reduce(Aabb::union)
    });
    ModelNode {
        name: node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index())),
        transform: Transform {
            position: Vec3::from(translation),
            rotation: Vec3::new(rx, ry, rz),
            scale: Vec3::from(scale),
        },
        mesh_bounds,
        children: node.children().map(|child| convert_node(&child)).collect(),
    }
}

/// Runs decodes off the main thread; results come back through `PendingImport`.
#[derive(Clone)]
pub struct ModelImporter {
    decoder: Arc<dyn ModelDecoder>,
}

impl ModelImporter {
    pub fn new(decoder: Arc<dyn ModelDecoder>) -> Self {
        Self { decoder }
    }

    pub fn gltf() -> Self {
        Self::new(Arc::new(GltfDecoder))
    }

    pub fn spawn(&self, path: PathBuf) -> PendingImport {
        let (sender, receiver) = mpsc::channel();
        let decoder = Arc::clone(&self.decoder);
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("model-import".to_string())
            .spawn(move || {
                // receiver may be gone if the editor shut down first
                let _ = sender.send(decoder.decode(&worker_path));
            });
        if let Err(err) = spawned {
            log::warn!("Failed to start import worker for {}: {}", path.display(), err);
        }
        PendingImport { path, receiver }
    }
}

pub struct PendingImport {
    path: PathBuf,
    receiver: Receiver<Result<ModelGraph, AssetError>>,
}

impl PendingImport {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` while the decode is still running.
    pub fn try_take(&self) -> Option<Result<ModelGraph, AssetError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(self.worker_gone())),
        }
    }

    #[cfg(test)]
    pub fn wait(self) -> Result<ModelGraph, AssetError> {
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => Err(self.worker_gone()),
        }
    }

    fn worker_gone(&self) -> AssetError {
        AssetError::WorkerGone {
            path: self.path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "name": "Tri", "mesh": 0, "translation": [0.0, 2.0, 0.0] } ],
        "meshes": [ { "primitives": [ { "attributes": { "POSITION": 0 } } ] } ],
        "accessors": [ {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        } ],
        "bufferViews": [ { "buffer": 0, "byteLength": 36 } ],
        "buffers": [ {
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        } ]
    }"#;

    struct FailingDecoder;

    impl ModelDecoder for FailingDecoder {
        fn decode(&self, path: &Path) -> Result<ModelGraph, AssetError> {
            Err(AssetError::EmptyModel {
                path: path.display().to_string(),
            })
        }
    }

    #[test]
    fn gltf_decoder_reads_nodes_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();

        let graph = GltfDecoder.decode(&path).unwrap();
        assert_eq!(graph.name, "triangle");
        assert_eq!(graph.mesh_count(), 1);
        let node = &graph.roots[0];
        assert_eq!(node.name, "Tri");
        assert_eq!(node.transform.position, Vec3::new(0.0, 2.0, 0.0));
        let bounds = node.mesh_bounds.unwrap();
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let result = GltfDecoder.decode(Path::new("model.obj"));
        assert!(matches!(result, Err(AssetError::UnsupportedFormat { .. })));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = GltfDecoder.decode(&dir.path().join("absent.glb"));
        assert!(matches!(result, Err(AssetError::Decode { .. })));
    }

    #[test]
    fn importer_delivers_result_through_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();

        let pending = ModelImporter::gltf().spawn(path.clone());
        assert_eq!(pending.path(), path.as_path());
        let graph = pending.wait().unwrap();
        assert_eq!(graph.mesh_count(), 1);

        let failing = ModelImporter::new(Arc::new(FailingDecoder)).spawn(path);
        assert!(matches!(failing.wait(), Err(AssetError::EmptyModel { .. })));
    }
}
