//! Path algorithms for the low-level storage engine.
//!
//! A [`PathAlgorithm`] chooses the physical location of a payload the first
//! time its key is stored. The choice is recorded in the path registry and
//! never revisited, so algorithms only need to be deterministic for a given
//! key and instant, not stable across configuration changes.
//!
//! Every strategy names the file after the encoded key (see [`codec`]). That
//! is what lets rebuild and audit recover keys from a directory walk:
//!
//! - [`EncodedPathAlgorithm`] -- `base/<pid namespace>/<encoded key>`
//! - [`HashPathAlgorithm`] -- `base/<hash fan-out>/<encoded key>`
//! - [`TimestampPathAlgorithm`] -- `base/yyyy/MMdd/HH/mm/<encoded key>`

pub mod codec;
pub mod encoded;
pub mod error;
pub mod hashed;
pub mod timestamp;
pub mod traits;

pub use codec::{decode, encode};
pub use encoded::EncodedPathAlgorithm;
pub use error::{PathError, PathResult};
pub use hashed::HashPathAlgorithm;
pub use timestamp::TimestampPathAlgorithm;
pub use traits::{PathAlgorithm, PathAlgorithmKind};
