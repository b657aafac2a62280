use serde::{Deserialize, Serialize};

/// One unit of input to the fingerprint, as handed over by a sourcer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HashSource {
    /// A single file, relative to the project root
    File {
        #[serde(rename = "filePath", alias = "file_path")]
        file_path: String,
        #[serde(default)]
        reasons: Vec<String>,
    },
    /// A directory subtree, relative to the project root
    Dir {
        #[serde(rename = "filePath", alias = "file_path")]
        file_path: String,
        #[serde(default)]
        reasons: Vec<String>,
    },
    /// Inline data with no filesystem backing
    Contents {
        id: String,
        #[serde(with = "contents_serde")]
        contents: Vec<u8>,
        #[serde(default)]
        reasons: Vec<String>,
    },
}

impl HashSource {
    pub fn file(file_path: impl Into<String>, reasons: &[&str]) -> Self {
        HashSource::File {
            file_path: file_path.into(),
            reasons: to_owned_reasons(reasons),
        }
    }

    pub fn dir(file_path: impl Into<String>, reasons: &[&str]) -> Self {
        HashSource::Dir {
            file_path: file_path.into(),
            reasons: to_owned_reasons(reasons),
        }
    }

    pub fn contents(id: impl Into<String>, contents: impl Into<Vec<u8>>, reasons: &[&str]) -> Self {
        HashSource::Contents {
            id: id.into(),
            contents: contents.into(),
            reasons: to_owned_reasons(reasons),
        }
    }

    /// Stable identity: the file path for files and directories, the id for inline contents.
    pub fn id(&self) -> &str {
        match self {
            HashSource::File { file_path, .. } | HashSource::Dir { file_path, .. } => file_path,
            HashSource::Contents { id, .. } => id,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            HashSource::File { file_path, .. } | HashSource::Dir { file_path, .. } => {
                Some(file_path)
            }
            HashSource::Contents { .. } => None,
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            HashSource::File { reasons, .. }
            | HashSource::Dir { reasons, .. }
            | HashSource::Contents { reasons, .. } => reasons,
        }
    }

    pub(crate) fn reasons_mut(&mut self) -> &mut Vec<String> {
        match self {
            HashSource::File { reasons, .. }
            | HashSource::Dir { reasons, .. }
            | HashSource::Contents { reasons, .. } => reasons,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HashSource::File { .. } => "file",
            HashSource::Dir { .. } => "dir",
            HashSource::Contents { .. } => "contents",
        }
    }
}

fn to_owned_reasons(reasons: &[&str]) -> Vec<String> {
    reasons.iter().map(|r| r.to_string()).collect()
}

/// Diagnostics attached to a resolved source when the `debug` option is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(
        rename = "isTransformed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_transformed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DebugInfo>,
}

/// A source together with the digest of its resolved bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintSource {
    #[serde(flatten)]
    pub source: HashSource,
    pub hash: String,
    #[serde(rename = "debugInfo", default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl FingerprintSource {
    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn reasons(&self) -> &[String] {
        self.source.reasons()
    }
}

/// Digest-of-digests over every resolved source of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub hash: String,
    pub sources: Vec<FingerprintSource>,
}

impl Fingerprint {
    pub fn source(&self, id: &str) -> Option<&FingerprintSource> {
        self.sources.iter().find(|source| source.id() == id)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Inline contents serialize as a string when they are UTF-8 and as a byte array otherwise.
mod contents_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(contents: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(contents) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_seq(contents),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.into_bytes(),
            Repr::Bytes(bytes) => bytes,
        })
    }
}
