use crate::config::{CameraConfig, OrbitConfig};
use glam::{Mat4, Vec2, Vec3};

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, fov_y_deg: f32, aspect: f32) -> Self {
        Self {
            position,
            target,
            fov_y_deg,
            aspect: aspect.max(1e-3),
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self::new(
            Vec3::from(config.position),
            Vec3::from(config.target),
            config.fov_y_deg,
            aspect,
        )
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let inverse = (self.projection() * self.view()).inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let direction = (far - near).normalize_or_zero();
        (self.position, direction)
    }
}

/// Orbit-camera widget. Pointer input is queued while enabled and applied to
/// the camera on `update()`, once per frame.
pub struct OrbitControls {
    camera: Camera,
    pub enabled: bool,
    yaw: f32,
    pitch: f32,
    distance: f32,
    pending_rotate: Vec2,
    pending_zoom: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitControls {
    pub fn new(camera: Camera, config: &OrbitConfig) -> Self {
        let mut controls = Self {
            camera,
            enabled: true,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            pending_rotate: Vec2::ZERO,
            pending_zoom: 0.0,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        };
        controls.sync_from_camera();
        controls
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Pointer travel in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if self.enabled {
            self.pending_rotate += Vec2::new(dx, dy);
        }
    }

    /// Wheel notches; positive moves towards the target.
    pub fn zoom(&mut self, delta: f32) {
        if self.enabled {
            self.pending_zoom += delta;
        }
    }

    /// Applies queued input. Returns true when the camera moved.
    pub fn update(&mut self) -> bool {
        if !self.enabled {
            self.pending_rotate = Vec2::ZERO;
            self.pending_zoom = 0.0;
            return false;
        }
        if self.pending_rotate == Vec2::ZERO && self.pending_zoom == 0.0 {
            return false;
        }
        self.yaw -= self.pending_rotate.x * self.rotate_speed;
        self.pitch = (self.pitch + self.pending_rotate.y * self.rotate_speed)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        wrap_angle(&mut self.yaw);
        let scale = (1.0 - self.zoom_speed).powf(self.pending_zoom);
        self.distance = (self.distance * scale).clamp(self.min_distance, self.max_distance);
        self.pending_rotate = Vec2::ZERO;
        self.pending_zoom = 0.0;
        self.apply();
        true
    }

    /// Re-derives the spherical state from the camera and drops queued input.
    pub fn sync_from_camera(&mut self) {
        let offset = self.camera.position - self.camera.target;
        let (yaw, pitch) = offset_to_yaw_pitch(offset);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = offset
            .length()
            .clamp(self.min_distance, self.max_distance);
        self.pending_rotate = Vec2::ZERO;
        self.pending_zoom = 0.0;
    }

    fn apply(&mut self) {
        let cos_pitch = self.pitch.cos();
        let offset = Vec3::new(
            self.yaw.sin() * cos_pitch,
            self.pitch.sin(),
            self.yaw.cos() * cos_pitch,
        ) * self.distance;
        self.camera.position = self.camera.target + offset;
    }
}

fn offset_to_yaw_pitch(offset: Vec3) -> (f32, f32) {
    let len = offset.length().max(1e-6);
    let n = offset / len;
    let yaw = n.x.atan2(n.z);
    let pitch = n.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn wrap_angle(angle: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        *angle = (*angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> OrbitControls {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 1.0);
        OrbitControls::new(camera, &OrbitConfig::default())
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 16.0 / 9.0);
        let (origin, dir) = camera.ray_from_ndc(Vec2::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut orbit = controls();
        orbit.enabled = false;
        orbit.rotate(100.0, 0.0);
        orbit.zoom(3.0);
        assert!(!orbit.update());
        assert!((orbit.camera().position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_keeps_distance_to_target() {
        let mut orbit = controls();
        orbit.rotate(120.0, -40.0);
        assert!(orbit.update());
        let camera = orbit.camera();
        assert!(camera.position.is_finite());
        assert!((camera.position.distance(camera.target) - 5.0).abs() < 1e-4);
        assert!((camera.position - Vec3::new(0.0, 0.0, 5.0)).length() > 0.1);
    }

    #[test]
    fn sync_discards_drift_and_queued_input() {
        let mut orbit = controls();
        orbit.rotate(50.0, 0.0);
        orbit.camera_mut().position = Vec3::new(3.0, 0.0, 0.0);
        orbit.sync_from_camera();
        assert!(!orbit.update());
        assert!((orbit.camera().position - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }
}
