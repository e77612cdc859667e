use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use lls_fs::FileSystem;
use lls_path::PathAlgorithm;
use serde::Serialize;

/// Outcome of a point lookup. Absence is an ordinary value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Found(PathBuf),
    NotFound,
    /// More than one entry, or an entry without a usable path.
    Inconsistent { reason: String },
}

/// What a registry needs to know about the store it indexes in order to
/// rebuild and audit itself.
#[derive(Clone)]
pub struct RegistryContext {
    /// Directories walked by rebuild and audit.
    pub store_bases: Vec<PathBuf>,
    pub file_system: Arc<dyn FileSystem>,
    /// Used to decode file names back into keys.
    pub algorithm: Arc<dyn PathAlgorithm>,
    /// Where key enumerations spill to; the system temp dir when `None`.
    pub spill_dir: Option<PathBuf>,
}

impl RegistryContext {
    pub fn new(
        store_bases: Vec<PathBuf>,
        file_system: Arc<dyn FileSystem>,
        algorithm: Arc<dyn PathAlgorithm>,
    ) -> Self {
        Self {
            store_bases,
            file_system,
            algorithm,
            spill_dir: None,
        }
    }

    pub fn with_spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }
}

impl fmt::Debug for RegistryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryContext")
            .field("store_bases", &self.store_bases)
            .field("algorithm", &self.algorithm.kind())
            .field("spill_dir", &self.spill_dir)
            .finish()
    }
}

/// Summary of a rebuild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    /// Files encountered under the store bases.
    pub files_seen: usize,
    /// Entries written to the registry.
    pub registered: usize,
    /// Files whose names did not decode to a key.
    pub skipped: usize,
    /// Files whose key had already been registered from another path.
    pub duplicates: usize,
}

/// One discrepancy found by an audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum AuditFinding {
    /// A file decodes to a key the registry does not know.
    Unregistered { key: String, path: PathBuf },
    /// The registry points the key somewhere other than this file.
    PathMismatch {
        key: String,
        registered: PathBuf,
        actual: PathBuf,
    },
    /// A registered path has no file behind it.
    MissingFile { key: String, path: PathBuf },
    /// A file name does not decode to any key.
    Undecodable { path: PathBuf, reason: String },
    /// The registry reported an inconsistency for the key.
    Inconsistent { key: String, reason: String },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered { key, path } => {
                write!(f, "{key}: file {} is not registered", path.display())
            }
            Self::PathMismatch {
                key,
                registered,
                actual,
            } => write!(
                f,
                "{key}: registered at {} but found at {}",
                registered.display(),
                actual.display()
            ),
            Self::MissingFile { key, path } => {
                write!(f, "{key}: registered file {} is missing", path.display())
            }
            Self::Undecodable { path, reason } => {
                write!(f, "{}: not a stored key ({reason})", path.display())
            }
            Self::Inconsistent { key, reason } => write!(f, "{key}: {reason}"),
        }
    }
}

/// Result of an audit in one or both directions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub files_checked: usize,
    pub entries_checked: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: AuditReport) {
        self.files_checked += other.files_checked;
        self.entries_checked += other.entries_checked;
        self.findings.extend(other.findings);
    }
}
