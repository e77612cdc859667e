//! Foundation types for the low-level storage engine.
//!
//! Every stored payload is addressed by a logical key. For whole objects the
//! key is a [`Pid`]; for datastream content it is a [`DatastreamKey`], the
//! `pid+datastreamId+versionId` triple. Object keys and datastream keys live
//! in separate [`Namespace`]s and are never compared across them.
//!
//! # Key Types
//!
//! - [`Pid`] -- validated persistent identifier with a filesystem-safe form
//! - [`DatastreamKey`] -- composite key for one version of one datastream
//! - [`Namespace`] -- which store a key belongs to

pub mod error;
pub mod key;
pub mod pid;

pub use error::TypeError;
pub use key::{DatastreamKey, Namespace, KEY_SEPARATOR};
pub use pid::{Pid, MAX_PID_LENGTH};
