use thiserror::Error;

/// Errors produced when parsing identifiers and keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid PID {pid:?}: {reason}")]
    InvalidPid { pid: String, reason: String },

    #[error("invalid PID filename {filename:?}: {reason}")]
    InvalidFilename { filename: String, reason: String },

    #[error("invalid datastream key {key:?}: {reason}")]
    InvalidDatastreamKey { key: String, reason: String },
}
