use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::pid::Pid;

/// Separator between the segments of a composite key.
pub const KEY_SEPARATOR: char = '+';

/// The two disjoint key spaces managed by the storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Whole serialized objects, keyed by PID.
    Object,
    /// Datastream content, keyed by `pid+datastreamId+versionId`.
    Datastream,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Datastream => "datastream",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of one version of one datastream: `pid+datastreamId+versionId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatastreamKey {
    pub pid: Pid,
    pub datastream_id: String,
    pub version_id: String,
}

impl DatastreamKey {
    pub fn new(
        pid: Pid,
        datastream_id: impl Into<String>,
        version_id: impl Into<String>,
    ) -> Result<Self, TypeError> {
        let key = Self {
            pid,
            datastream_id: datastream_id.into(),
            version_id: version_id.into(),
        };
        validate_segment(&key, &key.datastream_id, "datastream id")?;
        validate_segment(&key, &key.version_id, "version id")?;
        Ok(key)
    }

    /// Parse the `+`-joined textual form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = |reason: String| TypeError::InvalidDatastreamKey {
            key: s.to_string(),
            reason,
        };
        let mut parts = s.splitn(3, KEY_SEPARATOR);
        let (Some(pid), Some(ds), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected pid+datastreamId+versionId".into()));
        };
        let pid = Pid::parse(pid).map_err(|e| invalid(e.to_string()))?;
        Self::new(pid, ds, version)
    }
}

fn validate_segment(key: &DatastreamKey, segment: &str, what: &str) -> Result<(), TypeError> {
    let reason = if segment.is_empty() {
        Some(format!("{what} must not be empty"))
    } else {
        segment
            .chars()
            .find(|c| matches!(c, '+' | '/' | '\\' | '\0' | '\n' | '\r'))
            .map(|c| format!("{what} contains {c:?}"))
    };
    match reason {
        Some(reason) => Err(TypeError::InvalidDatastreamKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

impl fmt::Display for DatastreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.pid, self.datastream_id, self.version_id
        )
    }
}

impl FromStr for DatastreamKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
