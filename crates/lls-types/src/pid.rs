use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of a PID in its canonical `namespace:id` form.
pub const MAX_PID_LENGTH: usize = 64;

/// Persistent identifier of a whole object, `namespace:id`.
///
/// The namespace is drawn from `[A-Za-z0-9.-]` and is never `.` or `..`;
/// the id from
/// `[A-Za-z0-9.~_-]` plus `%XX` escapes. Because the namespace can never
/// contain `_`, the filename form (`namespace_id`) is recovered exactly by
/// splitting on the first underscore.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pid(String);

impl Pid {
    /// Parse and validate a PID in canonical form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidPid {
            pid: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if s.len() > MAX_PID_LENGTH {
            return Err(invalid(&format!("longer than {MAX_PID_LENGTH} characters")));
        }
        let (namespace, id) = s
            .split_once(':')
            .ok_or_else(|| invalid("missing ':' between namespace and id"))?;

        if namespace.is_empty() {
            return Err(invalid("namespace must not be empty"));
        }
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(invalid(&format!("namespace contains {ch:?}")));
        }
        // The namespace doubles as a directory name.
        if namespace == "." || namespace == ".." {
            return Err(invalid("namespace must not be a relative directory reference"));
        }
        if id.is_empty() {
            return Err(invalid("id must not be empty"));
        }
        validate_id(id).map_err(|reason| invalid(&reason))?;

        Ok(Self(s.to_string()))
    }

    /// Recover a PID from its filename form.
    pub fn from_filename(filename: &str) -> Result<Self, TypeError> {
        let (namespace, id) = filename
            .split_once('_')
            .ok_or_else(|| TypeError::InvalidFilename {
                filename: filename.to_string(),
                reason: "missing '_' between namespace and id".into(),
            })?;
        Self::parse(&format!("{namespace}:{id}")).map_err(|e| TypeError::InvalidFilename {
            filename: filename.to_string(),
            reason: e.to_string(),
        })
    }

    /// Filesystem-safe form: the `:` separator replaced by `_`.
    pub fn to_filename(&self) -> String {
        self.0.replacen(':', "_", 1)
    }

    /// The namespace portion (before the `:`).
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or(&self.0)
    }

    /// The id portion (after the `:`).
    pub fn id(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '~' | '_' | '-')
}

fn validate_id(id: &str) -> Result<(), String> {
    let bytes = id.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '%' {
            let escape = bytes.get(i + 1..i + 3).unwrap_or_default();
            if escape.len() != 2 || !escape.iter().all(u8::is_ascii_hexdigit) {
                return Err(format!("malformed escape at offset {i}"));
            }
            i += 3;
        } else if is_id_char(c) {
            i += 1;
        } else {
            return Err(format!("id contains {c:?}"));
        }
    }
    Ok(())
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pid({})", self.0)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Pid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Pid> for String {
    fn from(pid: Pid) -> Self {
        pid.0
    }
}

impl AsRef<str> for Pid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
