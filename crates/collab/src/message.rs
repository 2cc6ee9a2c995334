//! Collaboration wire messages.
//!
//! Two message kinds flow over the transport: page lifecycle
//! (`page_update`) and scene deltas (`scene_update`). The JSON field
//! names are the contract both ends of the channel speak.

use serde::{Deserialize, Serialize};
use sketchsync_scene::ScenePatch;

/// A single frame on the collaboration channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CollabMessage {
    /// Page created (unknown id), renamed (known id), or deleted
    /// (`name == None`).
    PageUpdate {
        #[serde(rename = "sketchID")]
        page_id: String,
        #[serde(rename = "pageName")]
        name: Option<String>,
    },
    /// A scene delta for one page.
    SceneUpdate {
        #[serde(rename = "sketchID")]
        page_id: String,
        #[serde(rename = "sketchData")]
        patch: ScenePatch,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_update_wire_shape() {
        let msg = CollabMessage::PageUpdate {
            page_id: "p1".into(),
            name: Some("Landing".into()),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"action": "page_update", "sketchID": "p1", "pageName": "Landing"})
        );
    }

    #[test]
    fn page_delete_encodes_null_name() {
        let msg = CollabMessage::PageUpdate {
            page_id: "p1".into(),
            name: None,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"action": "page_update", "sketchID": "p1", "pageName": null})
        );
    }

    #[test]
    fn scene_update_round_trips() {
        let frame = json!({
            "action": "scene_update",
            "sketchID": "p2",
            "sketchData": {
                "elements": {"a": {"x": 4}},
                "appState": {"zoom": 1},
            }
        });
        let msg: CollabMessage = serde_json::from_value(frame).unwrap();
        match &msg {
            CollabMessage::SceneUpdate { page_id, patch } => {
                assert_eq!(page_id, "p2");
                assert!(patch.elements.is_some());
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
        let encoded = serde_json::to_value(&msg).unwrap();
        let decoded: CollabMessage = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, msg);
    }
}
