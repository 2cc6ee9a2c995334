//! sketchsync-variations — caching and backend types for AI-generated
//! design variants.
//!
//! The cache is an explicitly owned object with an injected clock
//! (`now_ms` parameters), so expiry and pruning are deterministic under
//! test. The generation/variation backends themselves live outside this
//! core; this crate carries their request/response contracts and the
//! response parsing rules.

pub mod backend;
pub mod cache;
pub mod fingerprint;

pub use backend::{
    parse_generate_response, parse_variation_response, BackendError, GenerateResponse,
    GenerationBackend, VariationBackend, VariationRequest, VariationResponse,
};
pub use cache::{VariationCache, VariationCacheConfig, VariationEntry};
pub use fingerprint::fingerprint;
