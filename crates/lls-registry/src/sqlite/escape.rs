/// Character the backing database treats as an escape in stored text.
pub const DEFAULT_ESCAPE: char = '\\';

/// Protects stored paths from a database that interprets an escape
/// character inside string values.
///
/// When enabled, every occurrence of the escape character is doubled on the
/// way in and collapsed on the way out, so Windows-style paths survive
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathEscape {
    escape: Option<char>,
}

impl PathEscape {
    /// Store paths verbatim.
    pub const fn none() -> Self {
        Self { escape: None }
    }

    /// Double the given character.
    pub const fn with_char(escape: char) -> Self {
        Self {
            escape: Some(escape),
        }
    }

    /// Backslash escaping when `backslash_is_escape` is set.
    pub const fn from_flag(backslash_is_escape: bool) -> Self {
        if backslash_is_escape {
            Self::with_char(DEFAULT_ESCAPE)
        } else {
            Self::none()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.escape.is_some()
    }

    pub fn escape(&self, raw: &str) -> String {
        match self.escape {
            Some(c) => {
                let mut doubled = String::with_capacity(raw.len());
                for ch in raw.chars() {
                    doubled.push(ch);
                    if ch == c {
                        doubled.push(c);
                    }
                }
                doubled
            }
            None => raw.to_string(),
        }
    }

    pub fn unescape(&self, stored: &str) -> String {
        match self.escape {
            Some(c) => {
                let mut out = String::with_capacity(stored.len());
                let mut chars = stored.chars().peekable();
                while let Some(ch) = chars.next() {
                    out.push(ch);
                    if ch == c && chars.peek() == Some(&c) {
                        chars.next();
                    }
                }
                out
            }
            None => stored.to_string(),
        }
    }
}

impl Default for PathEscape {
    fn default() -> Self {
        Self::from_flag(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_are_doubled_and_restored() {
        let esc = PathEscape::from_flag(true);
        let raw = r"C:\store\2024\demo_1";
        let stored = esc.escape(raw);
        assert_eq!(stored, r"C:\\store\\2024\\demo_1");
        assert_eq!(esc.unescape(&stored), raw);
    }

    #[test]
    fn disabled_is_identity() {
        let esc = PathEscape::none();
        assert!(!esc.is_enabled());
        assert_eq!(esc.escape(r"a\b"), r"a\b");
        assert_eq!(esc.unescape(r"a\\b"), r"a\\b");
    }

    #[test]
    fn custom_escape_character() {
        let esc = PathEscape::with_char('%');
        assert_eq!(esc.escape("/s/a%3Ab"), "/s/a%%3Ab");
        assert_eq!(esc.unescape("/s/a%%3Ab"), "/s/a%3Ab");
    }

    #[test]
    fn runs_of_escape_characters_roundtrip() {
        let esc = PathEscape::default();
        let raw = r"\\\x\";
        assert_eq!(esc.unescape(&esc.escape(raw)), raw);
    }
}
