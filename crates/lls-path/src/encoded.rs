use std::path::{Path, PathBuf};

use lls_types::{Pid, KEY_SEPARATOR};

use crate::codec;
use crate::error::PathResult;
use crate::traits::{PathAlgorithm, PathAlgorithmKind};

/// Places each file in a directory named after its PID namespace:
/// `base/<namespace>/<encoded key>`.
///
/// The path is a pure function of the key, so the layout can be inverted
/// without consulting any index.
#[derive(Clone, Debug)]
pub struct EncodedPathAlgorithm {
    store_base: PathBuf,
}

impl EncodedPathAlgorithm {
    pub fn new(store_base: impl Into<PathBuf>) -> Self {
        Self {
            store_base: store_base.into(),
        }
    }
}

impl PathAlgorithm for EncodedPathAlgorithm {
    fn get(&self, key: &str) -> PathResult<PathBuf> {
        let encoded = codec::encode(key)?;
        let primary = key.split(KEY_SEPARATOR).next().unwrap_or(key);
        let pid = Pid::parse(primary)?;
        Ok(self.store_base.join(pid.namespace()).join(encoded))
    }

    fn store_base(&self) -> &Path {
        &self.store_base
    }

    fn kind(&self) -> PathAlgorithmKind {
        PathAlgorithmKind::Encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_nests_under_namespace() {
        let algo = EncodedPathAlgorithm::new("/store");
        assert_eq!(
            algo.get("demo:1").unwrap(),
            PathBuf::from("/store/demo/demo_1")
        );
    }

    #[test]
    fn datastream_key_keeps_suffix_in_file_name() {
        let algo = EncodedPathAlgorithm::new("/store");
        let path = algo.get("demo:1+DC+DC1.0").unwrap();
        assert_eq!(path, PathBuf::from("/store/demo/demo_1+DC+DC1.0"));
        assert_eq!(algo.key_for_path(&path).unwrap(), "demo:1+DC+DC1.0");
    }

    #[test]
    fn get_is_deterministic() {
        let algo = EncodedPathAlgorithm::new("/store");
        assert_eq!(algo.get("a.b:c").unwrap(), algo.get("a.b:c").unwrap());
    }

    #[test]
    fn invalid_key_is_rejected() {
        let algo = EncodedPathAlgorithm::new("/store");
        assert!(algo.get("../escape").is_err());
    }

    #[test]
    fn namespace_cannot_climb_out_of_base() {
        let algo = EncodedPathAlgorithm::new("/store");
        assert!(algo.get("..:x").is_err());
        assert!(algo.get(".:x+DC+DC1.0").is_err());
        let path = algo.get("...:x").unwrap();
        assert!(path.starts_with("/store/..."));
    }
}
