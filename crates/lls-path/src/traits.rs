use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{PathError, PathResult};

/// Selects a path algorithm by name in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathAlgorithmKind {
    Encoded,
    Hashed,
    #[default]
    Timestamp,
}

impl fmt::Display for PathAlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Encoded => "encoded",
            Self::Hashed => "hashed",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Strategy that picks the physical path for a newly stored key.
///
/// `get` has no side effects: it neither creates directories nor checks
/// whether the path is free. The file name of every returned path is the
/// encoded key, so [`PathAlgorithm::key_for_path`] inverts any path the
/// algorithm produced.
pub trait PathAlgorithm: Send + Sync + fmt::Debug {
    /// Candidate path for `key` under the store base.
    fn get(&self, key: &str) -> PathResult<PathBuf>;

    /// Root directory all paths are placed under.
    fn store_base(&self) -> &Path;

    fn kind(&self) -> PathAlgorithmKind;

    fn encode(&self, key: &str) -> PathResult<String> {
        codec::encode(key)
    }

    fn decode(&self, name: &str) -> PathResult<String> {
        codec::decode(name)
    }

    /// Recover the key stored at `path` from its file name alone.
    fn key_for_path(&self, path: &Path) -> PathResult<String> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PathError::NoFileName(path.to_path_buf()))?;
        self.decode(name)
    }
}
