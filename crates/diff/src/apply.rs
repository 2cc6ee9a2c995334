//! Patch application.
//!
//! Mirrors the differ's fallback policy: `Replace` wins wholesale,
//! `Update` merges keyed records, and a merge result of `Null` finalizes
//! a removal (the key is omitted, not set to null).

use crate::doc::{Doc, DocMap};
use crate::patch::{Patch, PatchMap};

/// Applies `patch` to `base`, reconstructing the successor document.
pub fn apply_patch(base: &Doc, patch: &Patch) -> Doc {
    apply(base, patch, false)
}

/// Like [`apply_patch`], but a merged record whose keys are all
/// non-negative integer-like strings is materialized as an ordered list.
/// Used when reconstructing an array-shaped field from an index-keyed
/// patch.
pub fn apply_patch_flatten(base: &Doc, patch: &Patch) -> Doc {
    apply(base, patch, true)
}

fn apply(base: &Doc, patch: &Patch, flatten: bool) -> Doc {
    match patch {
        Patch::Remove => Doc::Null,
        Patch::Replace(doc) => doc.clone(),
        Patch::Update(entries) => match base {
            Doc::Record(base_map) => finish(merge(base_map, entries, flatten), flatten),
            // Lists are merged element-wise through their index-keyed
            // record form and flattened back, so positional diffs of
            // same-length lists round-trip.
            Doc::List(items) => {
                let indexed: DocMap = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item.clone()))
                    .collect();
                into_list_or_record(merge(&indexed, entries, flatten))
            }
            // An absent (or scalar) base behaves as an empty record.
            _ => finish(merge(&DocMap::new(), entries, flatten), flatten),
        },
    }
}

fn merge(base: &DocMap, entries: &PatchMap, flatten: bool) -> DocMap {
    let mut out = DocMap::new();
    for (key, base_val) in base {
        match entries.get(key) {
            Some(patch) => {
                let applied = apply(base_val, patch, flatten);
                // Null finalizes a removal.
                if !applied.is_null() {
                    out.insert(key.clone(), applied);
                }
            }
            None => {
                out.insert(key.clone(), base_val.clone());
            }
        }
    }
    for (key, patch) in entries {
        if base.contains_key(key) {
            continue;
        }
        let applied = apply(&Doc::Null, patch, flatten);
        if !applied.is_null() {
            out.insert(key.clone(), applied);
        }
    }
    out
}

fn finish(map: DocMap, flatten: bool) -> Doc {
    if flatten {
        into_list_or_record(map)
    } else {
        Doc::Record(map)
    }
}

/// Materializes an index-keyed record as a list ordered by numeric key;
/// any non-integer key keeps the record form.
fn into_list_or_record(map: DocMap) -> Doc {
    if map.keys().any(|k| k.parse::<usize>().is_err()) {
        return Doc::Record(map);
    }
    let mut keyed: Vec<(usize, Doc)> = map
        .into_iter()
        .map(|(k, v)| (k.parse::<usize>().unwrap_or(0), v))
        .collect();
    keyed.sort_by_key(|(index, _)| *index);
    Doc::List(keyed.into_iter().map(|(_, item)| item).collect())
}
