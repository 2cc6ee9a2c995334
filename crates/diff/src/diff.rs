//! Recursive structural differ.
//!
//! `diff(old, new)` returns `None` when nothing changed, `Some(patch)`
//! otherwise. Total over its input domain: the documented full-replacement
//! fallbacks are policy, not failure modes.

use crate::doc::{Doc, DocMap};
use crate::patch::{Patch, PatchMap};

/// Diffs two documents of the same logical shape.
///
/// Lists are replaced wholesale whenever the length changes (or the old
/// side is not a list); same-length lists are diffed positionally, which
/// is only correct when the caller has pre-aligned elements by identity.
pub fn diff(old: &Doc, new: &Doc) -> Option<Patch> {
    if old == new {
        return None;
    }
    if let Doc::List(new_items) = new {
        return match old {
            Doc::List(old_items) if old_items.len() == new_items.len() => {
                diff_lists(old_items, new_items)
            }
            _ => Some(Patch::Replace(new.clone())),
        };
    }
    if new.is_null() {
        return Some(Patch::Remove);
    }
    match (old, new) {
        (Doc::Record(old_map), Doc::Record(new_map)) => diff_records(old_map, new_map),
        // No keyed structure to diff against on at least one side.
        _ => Some(Patch::Replace(new.clone())),
    }
}

fn diff_lists(old: &[Doc], new: &[Doc]) -> Option<Patch> {
    let mut out = PatchMap::new();
    for (index, (old_item, new_item)) in old.iter().zip(new).enumerate() {
        if let Some(patch) = diff(old_item, new_item) {
            out.insert(index.to_string(), patch);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(Patch::Update(out))
    }
}

fn diff_records(old: &DocMap, new: &DocMap) -> Option<Patch> {
    let mut out = PatchMap::new();
    for (key, old_val) in old {
        match new.get(key) {
            Some(new_val) => {
                // Recursive Remove results are kept: "cleared" must stay
                // distinguishable from "unchanged" on the receiving side.
                if let Some(patch) = diff(old_val, new_val) {
                    out.insert(key.clone(), patch);
                }
            }
            None => {
                out.insert(key.clone(), Patch::Remove);
            }
        }
    }
    for (key, new_val) in new {
        if old.contains_key(key) {
            continue;
        }
        // Null and absent are one category on the wire, so an added
        // null-valued key degenerates to a removal.
        let patch = if new_val.is_null() {
            Patch::Remove
        } else {
            Patch::Replace(new_val.clone())
        };
        out.insert(key.clone(), patch);
    }
    if out.is_empty() {
        None
    } else {
        Some(Patch::Update(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Doc {
        Doc::from(v)
    }

    #[test]
    fn identical_docs_are_a_noop() {
        let a = doc(json!({"a": 1, "b": [1, 2], "c": {"d": null}}));
        assert_eq!(diff(&a, &a.clone()), None);
    }

    #[test]
    fn scalar_change_is_a_full_replacement() {
        assert_eq!(
            diff(&doc(json!(1)), &doc(json!(2))),
            Some(Patch::Replace(doc(json!(2))))
        );
    }

    #[test]
    fn removed_key_diffs_to_explicit_removal() {
        let patch = diff(&doc(json!({"a": 1})), &doc(json!({}))).unwrap();
        assert_eq!(patch.to_value(), json!({"a": null}));
    }

    #[test]
    fn added_key_carries_its_value() {
        let patch = diff(&doc(json!({"a": 1})), &doc(json!({"a": 1, "b": 2}))).unwrap();
        assert_eq!(patch.to_value(), json!({"b": 2}));
    }

    #[test]
    fn nested_change_touches_only_the_changed_path() {
        let old = doc(json!({"user": {"name": "ada", "age": 36}, "tag": "x"}));
        let new = doc(json!({"user": {"name": "ada", "age": 37}, "tag": "x"}));
        let patch = diff(&old, &new).unwrap();
        assert_eq!(patch.to_value(), json!({"user": {"age": 37}}));
    }

    #[test]
    fn resized_list_is_replaced_in_full() {
        let patch = diff(&doc(json!([1, 2, 3])), &doc(json!([1, 2, 3, 4]))).unwrap();
        assert_eq!(patch, Patch::Replace(doc(json!([1, 2, 3, 4]))));
    }

    #[test]
    fn same_length_list_diffs_positionally() {
        let patch = diff(&doc(json!([1, 2, 3])), &doc(json!([1, 9, 3]))).unwrap();
        assert_eq!(patch.to_value(), json!({"1": 9}));
    }

    #[test]
    fn non_list_to_list_is_replaced_in_full() {
        let patch = diff(&doc(json!({"a": 1})), &doc(json!([1]))).unwrap();
        assert_eq!(patch, Patch::Replace(doc(json!([1]))));
    }

    #[test]
    fn value_to_null_is_a_removal() {
        assert_eq!(diff(&doc(json!({"a": 1})), &Doc::Null), Some(Patch::Remove));
    }

    #[test]
    fn null_to_value_is_a_full_replacement() {
        assert_eq!(
            diff(&Doc::Null, &doc(json!({"a": 1}))),
            Some(Patch::Replace(doc(json!({"a": 1}))))
        );
    }

    #[test]
    fn empty_patch_collapses_to_noop() {
        // Different key order, identical content.
        let old = doc(json!({"a": 1, "b": 2}));
        let new = doc(json!({"b": 2, "a": 1}));
        assert_eq!(diff(&old, &new), None);
    }
}
