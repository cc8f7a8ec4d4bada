mod camera;
pub mod gizmo;
pub mod pick;

pub use camera::{Camera, OrbitControls};
pub use gizmo::{GizmoEvent, GizmoMode, TransformGizmo};
pub use pick::{PickOutcome, Viewport};

use crate::scene::SceneGraph;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("renderer has been disposed")]
    Disposed,
}

/// Frame-render seam. A GPU backend implements this; the editor core only
/// needs "draw the graph from this camera" and a one-shot teardown.
pub trait FrameRenderer {
    fn render(&mut self, graph: &SceneGraph, camera: &Camera) -> Result<(), RenderError>;
    fn dispose(&mut self);
}

/// Backend used when no GPU renderer is linked: counts frames and traces what
/// would be drawn.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    disposed: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn render(&mut self, graph: &SceneGraph, camera: &Camera) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::Disposed);
        }
        self.frames += 1;
        log::trace!(
            "frame {}: {} nodes, eye {:?}",
            self.frames,
            graph.descendants(graph.root()).len(),
            camera.position
        );
        Ok(())
    }

    fn dispose(&mut self) {
        if !self.disposed {
            log::info!("Renderer disposed after {} frames", self.frames);
            self.disposed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn headless_renderer_refuses_frames_after_dispose() {
        let graph = SceneGraph::new();
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 1.0);
        let mut renderer = HeadlessRenderer::new();
        renderer.render(&graph, &camera).unwrap();
        renderer.dispose();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert!(matches!(renderer.render(&graph, &camera), Err(RenderError::Disposed)));
        assert_eq!(renderer.frames(), 1);
    }
}
