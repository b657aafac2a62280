use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use xxhash_rust::xxh3::Xxh3;

use crate::error::ConfigError;

/// Digest used for every per-source and fold-level hash of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
    /// 128-bit xxh3. Fastest option, not collision resistant against adversaries.
    Xxh3,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Xxh3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Xxh3 => "xxh3",
        }
    }

    /// Length of the lowercase hex digest this algorithm emits.
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
            HashAlgorithm::Xxh3 => 32,
        }
    }

    pub fn hasher(&self) -> Hasher {
        match self {
            HashAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
            HashAlgorithm::Xxh3 => Hasher::Xxh3(Box::new(Xxh3::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = wanted.replace('-', "");
        HashAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == wanted)
            .ok_or_else(|| ConfigError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Incremental digest over one of the supported algorithms.
pub enum Hasher {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Xxh3(Box<Xxh3>),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
            Hasher::Xxh3(h) => h.update(data),
        }
    }

    /// Finish and encode as lowercase hex.
    pub fn finalize_hex(self) -> String {
        match self {
            Hasher::Sha1(h) => format!("{:x}", h.finalize()),
            Hasher::Sha256(h) => format!("{:x}", h.finalize()),
            Hasher::Sha512(h) => format!("{:x}", h.finalize()),
            Hasher::Xxh3(h) => format!("{:032x}", h.digest128()),
        }
    }
}

/// Hash a single in-memory buffer
pub fn digest_hex(algorithm: HashAlgorithm, data: &[u8]) -> String {
    let mut hasher = algorithm.hasher();
    hasher.update(data);
    hasher.finalize_hex()
}

/// Hash an ordered list of `(id, hex digest)` entries.
///
/// Both directory digests and the top-level fingerprint digest are built this way, so the
/// caller is responsible for handing entries over in their canonical order.
pub fn digest_entries<'a, I>(algorithm: HashAlgorithm, entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut hasher = algorithm.hasher();
    for (id, hash) in entries {
        hasher.update(id.as_bytes());
        hasher.update(hash.as_bytes());
    }
    hasher.finalize_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_known_vector() {
        assert_eq!(
            digest_hex(HashAlgorithm::Sha1, b"HelloWorld"),
            "db8ac1c259eb89d4a131b253bacfca5f319d54f2"
        );
    }

    #[test]
    fn test_hex_lengths_match_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let hex = digest_hex(algorithm, b"abc");
            assert_eq!(hex.len(), algorithm.hex_len(), "{algorithm}");
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!("sha1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("xxh3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Xxh3);
        assert!(matches!(
            "md5".parse::<HashAlgorithm>(),
            Err(ConfigError::UnsupportedAlgorithm(name)) if name == "md5"
        ));
    }

    #[test]
    fn test_digest_entries_is_order_sensitive() {
        let a = digest_entries(HashAlgorithm::Sha1, [("a", "1"), ("b", "2")]);
        let b = digest_entries(HashAlgorithm::Sha1, [("b", "2"), ("a", "1")]);
        assert_ne!(a, b);
        assert_eq!(a, digest_hex(HashAlgorithm::Sha1, b"a1b2"));
    }
}
