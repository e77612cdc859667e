//! Lossless mapping between logical keys and file names.
//!
//! The first `+` in a key splits it into a primary segment and a suffix.
//! The primary segment is a PID and is stored in its filename form; the
//! suffix (`+dsId+versionId` for datastreams) is passed through verbatim
//! but must not contain anything a file name cannot hold.

use lls_types::{Pid, KEY_SEPARATOR};

use crate::error::{PathError, PathResult};

const FORBIDDEN_SUFFIX_CHARS: &[char] = &['/', '\\', '\0', '\n', '\r'];

/// Encode a key into a file name.
pub fn encode(key: &str) -> PathResult<String> {
    let (primary, suffix) = split(key);
    check_suffix(suffix).map_err(|reason| PathError::InvalidKey {
        key: key.to_string(),
        reason,
    })?;
    let pid = Pid::parse(primary).map_err(|e| PathError::InvalidKey {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(format!("{}{suffix}", pid.to_filename()))
}

/// Decode a file name produced by [`encode`] back into its key.
pub fn decode(name: &str) -> PathResult<String> {
    let (primary, suffix) = split(name);
    let undecodable = |reason: String| PathError::Undecodable {
        name: name.to_string(),
        reason,
    };
    check_suffix(suffix).map_err(undecodable)?;
    let pid = Pid::from_filename(primary).map_err(|e| undecodable(e.to_string()))?;
    Ok(format!("{pid}{suffix}"))
}

/// Split at the first separator; the suffix keeps its leading `+`.
fn split(key: &str) -> (&str, &str) {
    match key.find(KEY_SEPARATOR) {
        Some(i) => key.split_at(i),
        None => (key, ""),
    }
}

fn check_suffix(suffix: &str) -> Result<(), String> {
    match suffix.chars().find(|c| FORBIDDEN_SUFFIX_CHARS.contains(c)) {
        Some(c) => Err(format!("suffix contains {c:?}")),
        None => Ok(()),
    }
}
