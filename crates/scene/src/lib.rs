//! sketchsync-scene — drawing-scene model and identity-keyed diff adapter.
//!
//! Specializes the generic diff engine to drawing scenes: element lists
//! are indexed by their stable `"id"` before diffing, so reordering or
//! bulk regeneration by the drawing library never produces spurious
//! full-array replacements.

pub mod adapter;
pub mod types;

pub use adapter::{apply_scene_diff, diff_scene, index_elements, ApplyMode};
pub use types::{Scene, ScenePatch};
