use crate::scene::factory::primitive_node;
use crate::scene::{GeometryKind, SceneRegistry, Transform};
use glam::Vec3;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// One persisted editable node.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub name: String,
    /// Written from the node's geometry tag as-is; only the four primitive
    /// tags are accepted back on import.
    pub geometry_kind: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub color_hex: String,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    pub objects: Vec<SceneRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub removed: usize,
    pub inserted: usize,
    pub skipped: usize,
}

pub fn format_color_hex(color: u32) -> String {
    format!("#{:06x}", color & 0xffffff)
}

pub fn parse_color_hex(value: &str) -> Option<u32> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Editable nodes that carry geometry, in traversal order. Group nodes with no
/// geometry (imported model roots) have nothing to describe and are left out.
pub fn export_document(registry: &SceneRegistry) -> SceneDocument {
    let mut objects = Vec::new();
    registry.for_each_editable(|_, node| {
        let Some(tag) = node.geometry.tag() else {
            return;
        };
        let transform = node.transform;
        objects.push(SceneRecord {
            name: node.name.clone(),
            geometry_kind: tag.to_string(),
            position: transform.position.to_array(),
            rotation: transform.rotation.to_array(),
            scale: transform.scale.to_array(),
            color_hex: format_color_hex(node.color),
        });
    });
    SceneDocument { objects }
}

pub fn export_to_string(registry: &SceneRegistry) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_document(registry))?)
}

/// Parses `json` and, only if it parses, replaces every editable node with the
/// document's contents. A parse failure leaves the registry untouched.
pub fn import_from_str(registry: &mut SceneRegistry, json: &str) -> Result<ImportReport> {
    let document: SceneDocument = serde_json::from_str(json)?;
    Ok(apply_document(registry, &document))
}

pub fn apply_document(registry: &mut SceneRegistry, document: &SceneDocument) -> ImportReport {
    let mut report = ImportReport::default();
    for id in registry.editable_ids() {
        // children of an already removed model are gone with it
        if registry.remove(id) {
            report.removed += 1;
        }
    }

    for record in &document.objects {
        let Some(kind) = GeometryKind::from_tag(&record.geometry_kind) else {
            log::debug!(
                "Skipping '{}': unknown geometry kind '{}'",
                record.name,
                record.geometry_kind
            );
            report.skipped += 1;
            continue;
        };
        let Some(color) = parse_color_hex(&record.color_hex) else {
            log::warn!(
                "Skipping '{}': invalid colour '{}'",
                record.name,
                record.color_hex
            );
            report.skipped += 1;
            continue;
        };
        let transform = Transform {
            position: Vec3::from(record.position),
            rotation: Vec3::from(record.rotation),
            scale: Vec3::from(record.scale),
        };
        registry.insert(primitive_node(kind, record.name.clone(), color).with_transform(transform));
        report.inserted += 1;
    }
    report
}

pub fn save_scene_to_file(registry: &SceneRegistry, path: &Path) -> Result<()> {
    let json = export_to_string(registry)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_scene_from_file(registry: &mut SceneRegistry, path: &Path) -> Result<ImportReport> {
    let json = std::fs::read_to_string(path)?;
    import_from_str(registry, &json)
}
