pub mod hash;
pub mod path;

pub use hash::{digest_entries, digest_hex, HashAlgorithm, Hasher};
pub use path::{is_descendant, join_posix, normalize_relative};
