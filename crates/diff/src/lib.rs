//! sketchsync-diff — structural diff/patch engine.
//!
//! Pure, total functions over tree-shaped documents: [`diff`] produces the
//! smallest patch transforming one document into another, [`apply_patch`]
//! reconstructs the successor from a base and a patch. The engine makes no
//! schema assumptions; callers that need identity-keyed array diffing
//! (drawing scenes) pre-align elements before calling in.
//!
//! Documents and patches are closed tagged variants, so the "no-op vs
//! explicit removal" distinction is a type (`Option<Patch>` vs
//! [`Patch::Remove`]) rather than a sentinel-value convention.

pub mod apply;
pub mod diff;
pub mod doc;
pub mod patch;

pub use apply::{apply_patch, apply_patch_flatten};
pub use diff::diff;
pub use doc::{Doc, DocMap, Scalar};
pub use patch::{Patch, PatchMap};
