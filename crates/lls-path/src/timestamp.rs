use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::codec;
use crate::error::PathResult;
use crate::traits::{PathAlgorithm, PathAlgorithmKind};

/// Buckets files by the time they were first stored:
/// `base/yyyy/MMdd/HH/mm/<encoded key>`.
///
/// The directories say nothing about the key; only the file name does.
#[derive(Clone, Debug)]
pub struct TimestampPathAlgorithm {
    store_base: PathBuf,
}

impl TimestampPathAlgorithm {
    pub fn new(store_base: impl Into<PathBuf>) -> Self {
        Self {
            store_base: store_base.into(),
        }
    }

    /// Path `key` would receive if stored at instant `at`.
    pub fn path_at(&self, key: &str, at: DateTime<Utc>) -> PathResult<PathBuf> {
        let encoded = codec::encode(key)?;
        let mut path = self.store_base.clone();
        for bucket in ["%Y", "%m%d", "%H", "%M"] {
            path.push(at.format(bucket).to_string());
        }
        path.push(encoded);
        Ok(path)
    }
}

impl PathAlgorithm for TimestampPathAlgorithm {
    fn get(&self, key: &str) -> PathResult<PathBuf> {
        self.path_at(key, Utc::now())
    }

    fn store_base(&self) -> &Path {
        &self.store_base
    }

    fn kind(&self) -> PathAlgorithmKind {
        PathAlgorithmKind::Timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn buckets_by_minute() {
        let algo = TimestampPathAlgorithm::new("/store");
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 59).unwrap();
        assert_eq!(
            algo.path_at("demo:1", at).unwrap(),
            PathBuf::from("/store/2024/0307/09/05/demo_1")
        );
    }

    #[test]
    fn key_comes_from_file_name_only() {
        let algo = TimestampPathAlgorithm::new("/store");
        let path = algo.get("demo:1+DC+DC1.0").unwrap();
        assert!(path.starts_with("/store"));
        assert_eq!(algo.key_for_path(&path).unwrap(), "demo:1+DC+DC1.0");
    }

    #[test]
    fn rejects_invalid_key() {
        let algo = TimestampPathAlgorithm::new("/store");
        assert!(algo.get("no colon here").is_err());
    }
}
