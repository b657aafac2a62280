mod dedup;
mod engine;
mod limiter;
pub mod patcher;
mod source;

pub use dedup::dedup_sources;
pub use engine::{create_fingerprint_from_sources, fold, resolve_source};
pub use limiter::Limiter;
pub use source::{DebugInfo, Fingerprint, FingerprintSource, HashSource};
