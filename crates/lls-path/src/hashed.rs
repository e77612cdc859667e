use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::PathResult;
use crate::traits::{PathAlgorithm, PathAlgorithmKind};

/// Default number of fan-out directory levels.
pub const DEFAULT_DEPTH: usize = 2;

/// Hex characters of the hash used per directory level.
const LEVEL_WIDTH: usize = 2;

/// Spreads files across fan-out directories taken from the BLAKE3 hash of
/// the key: `base/ab/cd/<encoded key>` for depth 2.
#[derive(Clone, Debug)]
pub struct HashPathAlgorithm {
    store_base: PathBuf,
    depth: usize,
}

impl HashPathAlgorithm {
    pub fn new(store_base: impl Into<PathBuf>) -> Self {
        Self::with_depth(store_base, DEFAULT_DEPTH)
    }

    /// Depth is clamped so the directories never exhaust the 64-character hash.
    pub fn with_depth(store_base: impl Into<PathBuf>, depth: usize) -> Self {
        Self {
            store_base: store_base.into(),
            depth: depth.min(64 / LEVEL_WIDTH),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl PathAlgorithm for HashPathAlgorithm {
    fn get(&self, key: &str) -> PathResult<PathBuf> {
        let encoded = codec::encode(key)?;
        let hash = blake3::hash(key.as_bytes()).to_hex();
        let digest = hash.as_str();
        let mut path = self.store_base.clone();
        for level in 0..self.depth {
            let start = level * LEVEL_WIDTH;
            path.push(&digest[start..start + LEVEL_WIDTH]);
        }
        path.push(encoded);
        Ok(path)
    }

    fn store_base(&self) -> &Path {
        &self.store_base
    }

    fn kind(&self) -> PathAlgorithmKind {
        PathAlgorithmKind::Hashed
    }
}
