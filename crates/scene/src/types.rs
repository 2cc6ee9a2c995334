//! Scene and scene-patch types.
//!
//! Serde shapes match the collaboration wire format: `{elements,
//! appState, files}` for scenes, and the same three fields for patches
//! with `elements`/`files` as generic patches and `appState` carried in
//! full.

use serde::{Deserialize, Serialize};
use sketchsync_diff::{Doc, Patch};

/// A drawing's elements, view/editor state, and embedded files.
///
/// Each element is a keyed record carrying a stable unique `"id"`;
/// `app_state` is a flat record of editor settings; `files` maps file
/// identifiers to embedded asset metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub elements: Vec<Doc>,
    #[serde(default = "Doc::empty_record")]
    pub app_state: Doc,
    #[serde(default = "Doc::empty_record")]
    pub files: Doc,
}

impl Scene {
    pub fn empty() -> Scene {
        Scene {
            elements: Vec::new(),
            app_state: Doc::empty_record(),
            files: Doc::empty_record(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Scene {
        Scene::empty()
    }
}

/// The delta between two scenes.
///
/// `elements` is a patch over the id-keyed element map, `files` a patch
/// over the file map. `app_state` is always the full new state: editor
/// state is replaced wholesale, since partially merged editor flags can
/// leave the UI in an inconsistent combination of old and new.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Patch>,
    #[serde(default = "Doc::empty_record")]
    pub app_state: Doc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Patch>,
}

impl ScenePatch {
    /// True when neither elements nor files changed. Used by the session
    /// manager's outbound suppression: an app-state-only delta is not
    /// worth a message.
    pub fn is_trivial(&self) -> bool {
        self.elements.is_none() && self.files.is_none()
    }
}
