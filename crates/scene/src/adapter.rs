//! Identity-keyed scene diffing.
//!
//! Drawing elements are frequently reordered or bulk-regenerated by the
//! drawing library between snapshots; position-based diffing would
//! constantly misfire. The adapter indexes both element lists by stable
//! `"id"` and diffs the resulting maps with the generic engine, so a
//! patch touches only the elements that genuinely changed.

use sketchsync_diff::{apply_patch, diff, Doc, DocMap, Patch};
use tracing::warn;

use crate::types::{Scene, ScenePatch};

/// How [`apply_scene_diff`] reconciles the element list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Chained local edits: merge through the id-keyed map and flatten
    /// back to a list in map order.
    Stacked,
    /// A single authoritative remote patch: merge fragments into the
    /// existing element list in place, appending unknown ids.
    Remote,
}

/// Extracts an element's stable identifier, if it has one.
fn element_id(element: &Doc) -> Option<&str> {
    element.get("id").and_then(Doc::as_str)
}

/// Builds the id→element map for a scene's element list. Elements
/// lacking an identifier are skipped with a diagnostic; they cannot be
/// tracked across snapshots.
pub fn index_elements(elements: &[Doc]) -> DocMap {
    let mut map = DocMap::new();
    for element in elements {
        match element_id(element) {
            Some(id) => {
                map.insert(id.to_owned(), element.clone());
            }
            None => warn!("skipping element without a stable id"),
        }
    }
    map
}

/// Diffs two scenes. Returns `None` when nothing changed; otherwise the
/// patch carries the element-map delta, the files delta, and the full
/// new app state.
pub fn diff_scene(old: &Scene, new: &Scene) -> Option<ScenePatch> {
    let old_elements = Doc::Record(index_elements(&old.elements));
    let new_elements = Doc::Record(index_elements(&new.elements));
    let elements = diff(&old_elements, &new_elements);
    let files = diff(&old.files, &new.files);
    let app_state_changed = diff(&old.app_state, &new.app_state).is_some();

    if elements.is_none() && files.is_none() && !app_state_changed {
        return None;
    }
    Some(ScenePatch {
        elements,
        app_state: new.app_state.clone(),
        files,
    })
}

/// Applies a scene patch to a base scene.
///
/// `files` is merged via the generic engine in both modes; `app_state`
/// is taken verbatim from the patch, never merged.
pub fn apply_scene_diff(base: &Scene, patch: &ScenePatch, mode: ApplyMode) -> Scene {
    let elements = match &patch.elements {
        None => base.elements.clone(),
        Some(element_patch) => match mode {
            ApplyMode::Stacked => apply_stacked(&base.elements, element_patch),
            ApplyMode::Remote => apply_remote(&base.elements, element_patch),
        },
    };
    let files = match &patch.files {
        Some(file_patch) => apply_patch(&base.files, file_patch),
        None => base.files.clone(),
    };
    Scene {
        elements,
        app_state: patch.app_state.clone(),
        files,
    }
}

fn apply_stacked(base: &[Doc], element_patch: &Patch) -> Vec<Doc> {
    let base_map = Doc::Record(index_elements(base));
    match apply_patch(&base_map, element_patch) {
        Doc::Record(map) => map.into_values().collect(),
        Doc::List(items) => items,
        other => {
            warn!(?other, "element patch did not merge to a keyed map; keeping base elements");
            base.to_vec()
        }
    }
}

fn apply_remote(base: &[Doc], element_patch: &Patch) -> Vec<Doc> {
    let fragments = match element_patch {
        Patch::Update(map) => map,
        // A full-map replacement rebuilds the list from the map's values.
        Patch::Replace(Doc::Record(map)) => {
            return map.values().cloned().collect();
        }
        Patch::Replace(Doc::List(items)) => return items.clone(),
        other => {
            warn!(?other, "unexpected element patch shape; keeping base elements");
            return base.to_vec();
        }
    };

    let mut elements = base.to_vec();
    for (id, fragment) in fragments {
        if matches!(fragment, Patch::Remove) {
            elements.retain(|element| element_id(element) != Some(id));
            continue;
        }
        match elements
            .iter()
            .position(|element| element_id(element) == Some(id))
        {
            Some(index) => {
                elements[index] = apply_patch(&elements[index], fragment);
            }
            None => {
                let fresh = apply_patch(&Doc::empty_record(), fragment);
                if element_id(&fresh).is_some() {
                    elements.push(fresh);
                } else {
                    warn!(%id, "dropping element fragment without a stable id");
                }
            }
        }
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn scene(elements: Value, app_state: Value, files: Value) -> Scene {
        Scene {
            elements: elements
                .as_array()
                .unwrap()
                .iter()
                .map(|v| Doc::from(v.clone()))
                .collect(),
            app_state: Doc::from(app_state),
            files: Doc::from(files),
        }
    }

    #[test]
    fn unchanged_scene_diffs_to_none() {
        let a = scene(json!([{"id": "a", "x": 0}]), json!({"zoom": 1}), json!({}));
        assert_eq!(diff_scene(&a, &a.clone()), None);
    }

    #[test]
    fn reorder_plus_move_touches_only_the_moved_element() {
        let old = scene(
            json!([{"id": "a", "x": 0}, {"id": "b", "x": 0}]),
            json!({}),
            json!({}),
        );
        let new = scene(
            json!([{"id": "b", "x": 5}, {"id": "a", "x": 0}]),
            json!({}),
            json!({}),
        );
        let patch = diff_scene(&old, &new).unwrap();
        let elements = patch.elements.unwrap();
        assert_eq!(elements.to_value(), json!({"b": {"x": 5}}));
        assert!(patch.files.is_none());
    }

    #[test]
    fn elements_without_ids_are_skipped_not_fatal() {
        let old = scene(json!([{"x": 0}]), json!({}), json!({}));
        let new = scene(json!([{"x": 0}, {"id": "a", "x": 1}]), json!({}), json!({}));
        let patch = diff_scene(&old, &new).unwrap();
        assert_eq!(
            patch.elements.unwrap().to_value(),
            json!({"a": {"id": "a", "x": 1}})
        );
    }

    #[test]
    fn app_state_only_change_still_produces_a_patch() {
        let old = scene(json!([]), json!({"zoom": 1}), json!({}));
        let new = scene(json!([]), json!({"zoom": 2}), json!({}));
        let patch = diff_scene(&old, &new).unwrap();
        assert!(patch.is_trivial());
        assert_eq!(patch.app_state, Doc::from(json!({"zoom": 2})));
    }

    #[test]
    fn remote_apply_merges_existing_elements_in_place() {
        let base = scene(
            json!([{"id": "a", "x": 0, "w": 10}, {"id": "b", "x": 0}]),
            json!({}),
            json!({}),
        );
        let patch = diff_scene(
            &base,
            &scene(
                json!([{"id": "a", "x": 3, "w": 10}, {"id": "b", "x": 0}]),
                json!({}),
                json!({}),
            ),
        )
        .unwrap();
        let applied = apply_scene_diff(&base, &patch, ApplyMode::Remote);
        assert_eq!(applied.elements[0], Doc::from(json!({"id": "a", "x": 3, "w": 10})));
        assert_eq!(applied.elements[1], base.elements[1]);
    }

    #[test]
    fn remote_apply_appends_new_elements() {
        let base = scene(json!([{"id": "a", "x": 0}]), json!({}), json!({}));
        let next = scene(
            json!([{"id": "a", "x": 0}, {"id": "c", "x": 9}]),
            json!({}),
            json!({}),
        );
        let patch = diff_scene(&base, &next).unwrap();
        let applied = apply_scene_diff(&base, &patch, ApplyMode::Remote);
        assert_eq!(applied.elements.len(), 2);
        assert_eq!(applied.elements[1], Doc::from(json!({"id": "c", "x": 9})));
    }

    #[test]
    fn remote_apply_removes_deleted_elements() {
        let base = scene(
            json!([{"id": "a", "x": 0}, {"id": "b", "x": 0}]),
            json!({}),
            json!({}),
        );
        let next = scene(json!([{"id": "b", "x": 0}]), json!({}), json!({}));
        let patch = diff_scene(&base, &next).unwrap();
        let applied = apply_scene_diff(&base, &patch, ApplyMode::Remote);
        assert_eq!(applied.elements, next.elements);
    }

    #[test]
    fn remote_apply_drops_fragments_without_ids() {
        let base = scene(json!([]), json!({}), json!({}));
        let patch = ScenePatch {
            elements: Some(Patch::from_value(json!({"ghost": {"x": 1}}))),
            app_state: Doc::empty_record(),
            files: None,
        };
        let applied = apply_scene_diff(&base, &patch, ApplyMode::Remote);
        assert!(applied.elements.is_empty());
    }

    #[test]
    fn stacked_apply_compounds_chained_edits() {
        let base = scene(
            json!([{"id": "a", "x": 0}, {"id": "b", "x": 0}]),
            json!({}),
            json!({}),
        );
        let step1 = diff_scene(
            &base,
            &scene(
                json!([{"id": "a", "x": 1}, {"id": "b", "x": 0}]),
                json!({}),
                json!({}),
            ),
        )
        .unwrap();
        let mid = apply_scene_diff(&base, &step1, ApplyMode::Stacked);
        let step2 = diff_scene(
            &mid,
            &scene(
                json!([{"id": "a", "x": 1}, {"id": "b", "x": 2}]),
                json!({}),
                json!({}),
            ),
        )
        .unwrap();
        let end = apply_scene_diff(&mid, &step2, ApplyMode::Stacked);
        assert_eq!(end.elements[0], Doc::from(json!({"id": "a", "x": 1})));
        assert_eq!(end.elements[1], Doc::from(json!({"id": "b", "x": 2})));
    }

    #[test]
    fn files_merge_through_the_generic_engine() {
        let base = scene(json!([]), json!({}), json!({"f1": {"kept": true}}));
        let next = scene(
            json!([]),
            json!({}),
            json!({"f1": {"kept": true}, "f2": {"mimeType": "image/png"}}),
        );
        let patch = diff_scene(&base, &next).unwrap();
        let applied = apply_scene_diff(&base, &patch, ApplyMode::Remote);
        assert_eq!(applied.files, next.files);
    }
}
