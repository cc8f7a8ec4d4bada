//! Pointer picking
//!
//! A pointer position is turned into a world-space ray through the active
//! camera and intersected against every node under the scene root. Hits are
//! ordered nearest first; for each hit the parent chain is climbed until an
//! editable node is found. The first editable ancestor across all hits wins.
//!
//! Fixtures (ground, grid) still intersect, so a ray that only strikes them
//! is reported as `PickOutcome::NonEditable` rather than `PickOutcome::Nothing`.

use crate::render::Camera;
use crate::scene::{Aabb, Geometry, GeometryKind, NodeId, SceneGraph};
use glam::{Mat4, Vec2, Vec3};

const PLANE_THICKNESS: f32 = 0.001;

// ========================================================================
// Viewport / NDC
// ========================================================================

/// Canvas bounding box in client (window) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Client coordinates to normalized device coordinates (+y up).
    pub fn to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x = (client.x - self.left) / self.width * 2.0 - 1.0;
        let y = -((client.y - self.top) / self.height * 2.0 - 1.0);
        Some(Vec2::new(x, y))
    }
}

// ========================================================================
// Ray queries
// ========================================================================

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
}

impl SceneGraph {
    /// All geometry-bearing descendants of the root struck by `ray`, nearest first.
    pub fn intersect_ray(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits: Vec<RayHit> = self
            .descendants(self.root())
            .into_iter()
            .filter_map(|id| {
                let node = self.get(id)?;
                let world = self.world_matrix(id);
                let distance = ray_hit_geometry(ray, &world, &node.geometry)?;
                Some(RayHit { node: id, distance })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn ray_hit_geometry(ray: &Ray, world: &Mat4, geometry: &Geometry) -> Option<f32> {
    if !matrix_is_finite(world) {
        return None;
    }
    let inv = world.inverse();
    if !matrix_is_finite(&inv) {
        return None;
    }
    let origin_local = inv.transform_point3(ray.origin);
    let dir_local = inv.transform_vector3(ray.direction);
    if dir_local.length_squared() <= f32::EPSILON {
        return None;
    }
    let dir_local = dir_local.normalize();

    let t_local = match geometry {
        Geometry::Primitive(GeometryKind::Sphere) => {
            ray_sphere_intersection(origin_local, dir_local, Vec3::ZERO, 0.5)?
        }
        Geometry::Primitive(GeometryKind::Cylinder) => {
            ray_cylinder_intersection(origin_local, dir_local, 0.5, 0.5)?
        }
        Geometry::Primitive(kind) => {
            let bounds = kind.local_bounds();
            ray_aabb_intersection(origin_local, dir_local, bounds.min, bounds.max)?.0
        }
        Geometry::Mesh { bounds } => {
            ray_aabb_intersection(origin_local, dir_local, bounds.min, bounds.max)?.0
        }
        Geometry::Plane { size } | Geometry::Grid { size, .. } => {
            let slab = plane_slab(*size);
            ray_aabb_intersection(origin_local, dir_local, slab.min, slab.max)?.0
        }
        Geometry::Empty => return None,
    };
    let hit_world = world.transform_point3(origin_local + dir_local * t_local);
    Some((hit_world - ray.origin).length())
}

fn plane_slab(size: f32) -> Aabb {
    let half = size * 0.5;
    Aabb::new(
        Vec3::new(-half, -PLANE_THICKNESS, -half),
        Vec3::new(half, 0.0, half),
    )
}

pub fn matrix_is_finite(mat: &Mat4) -> bool {
    mat.to_cols_array().iter().all(|v| v.is_finite())
}

pub fn ray_sphere_intersection(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let mut t = -b - sqrt_d;
    if t < 0.0 {
        t = -b + sqrt_d;
    }
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Capped cylinder around +Y centred at the origin.
pub fn ray_cylinder_intersection(origin: Vec3, dir: Vec3, radius: f32, half_height: f32) -> Option<f32> {
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    };

    let a = dir.x * dir.x + dir.z * dir.z;
    if a > 1e-8 {
        let b = origin.x * dir.x + origin.z * dir.z;
        let c = origin.x * origin.x + origin.z * origin.z - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let sqrt_d = discriminant.sqrt();
            for t in [(-b - sqrt_d) / a, (-b + sqrt_d) / a] {
                let y = origin.y + dir.y * t;
                if y.abs() <= half_height {
                    consider(t);
                }
            }
        }
    }

    if dir.y.abs() > 1e-8 {
        for cap in [-half_height, half_height] {
            let t = (cap - origin.y) / dir.y;
            let p = origin + dir * t;
            if p.x * p.x + p.z * p.z <= radius * radius {
                consider(t);
            }
        }
    }

    best
}

pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    let origin_arr = origin.to_array();
    let dir_arr = dir.to_array();
    let min_arr = min.to_array();
    let max_arr = max.to_array();
    for i in 0..3 {
        let o = origin_arr[i];
        let d = dir_arr[i];
        if d.abs() < 1e-6 {
            if o < min_arr[i] || o > max_arr[i] {
                return None;
            }
        } else {
            let inv_d = 1.0 / d;
            let mut t1 = (min_arr[i] - o) * inv_d;
            let mut t2 = (max_arr[i] - o) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }
    if t_max < 0.0 {
        return None;
    }
    let t_hit = if t_min >= 0.0 { t_min } else { t_max };
    Some((t_hit, origin + dir * t_hit))
}

// ========================================================================
// Picking service
// ========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    Editable { node: NodeId, distance: f32 },
    /// The ray struck only geometry with no editable ancestor.
    NonEditable,
    /// The ray struck nothing.
    Nothing,
}

impl PickOutcome {
    pub fn editable(&self) -> Option<NodeId> {
        match self {
            PickOutcome::Editable { node, .. } => Some(*node),
            _ => None,
        }
    }
}

pub fn pick(graph: &SceneGraph, camera: &Camera, viewport: &Viewport, client: Vec2) -> PickOutcome {
    let Some(ndc) = viewport.to_ndc(client) else {
        return PickOutcome::Nothing;
    };
    let (origin, direction) = camera.ray_from_ndc(ndc);
    pick_ray(graph, &Ray { origin, direction })
}

pub fn pick_ray(graph: &SceneGraph, ray: &Ray) -> PickOutcome {
    let hits = graph.intersect_ray(ray);
    if hits.is_empty() {
        return PickOutcome::Nothing;
    }
    hits.iter()
        .find_map(|hit| {
            editable_ancestor(graph, hit.node).map(|node| PickOutcome::Editable {
                node,
                distance: hit.distance,
            })
        })
        .unwrap_or(PickOutcome::NonEditable)
}

/// Climbs from `node` towards the root, stopping at the root's direct children.
pub fn editable_ancestor(graph: &SceneGraph, node: NodeId) -> Option<NodeId> {
    let root = graph.root();
    let mut current = node;
    loop {
        if graph.is_editable(current) {
            return Some(current);
        }
        match graph.parent(current) {
            Some(parent) if parent != root => current = parent,
            _ => return None,
        }
    }
}

// ========================================================================
// Tests
// ========================================================================
