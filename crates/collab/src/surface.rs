//! The drawing-canvas seam.
//!
//! The canvas is an external collaborator: it hands out scene snapshots
//! and accepts updates, and this core consumes the trait without ever
//! implementing a canvas.

use sketchsync_scene::{Scene, ScenePatch};

/// An update pushed back into the drawing surface.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneUpdate {
    Full(Scene),
    Patch(ScenePatch),
}

/// What the drawing canvas exposes to the synchronization core.
pub trait DrawingSurface {
    /// Snapshot of the scene as currently drawn.
    fn current_scene(&self) -> Scene;

    /// Pushes an externally-sourced update into the canvas.
    fn apply_scene_update(&mut self, update: SceneUpdate);
}
