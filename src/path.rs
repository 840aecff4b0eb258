//! Path normalization
//!
//! Every operation addresses nodes by a canonical path: absolute, rooted at
//! `/`, no repeated or trailing slashes, no `.` or `..` segments. `..` pops a
//! segment and clamps at the root. Segments are stored in Unicode NFC so that
//! composed and decomposed spellings of a name address the same node.

use crate::error::VfsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Normalize a raw path string into canonical form.
///
/// Total and idempotent: `normalize(&normalize(p)) == normalize(p)`.
pub fn normalize(raw: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    for segment in raw.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name.nfc().collect()),
        }
    }

    if segments.is_empty() {
        return SEPARATOR.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 1);
    for segment in &segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// A path in canonical form
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPath(String);

impl CanonicalPath {
    /// Validate and normalize a raw path.
    ///
    /// Control characters (NUL included) are rejected before normalization.
    pub fn parse(raw: &str) -> Result<Self, VfsError> {
        if let Some(bad) = raw.chars().find(|c| c.is_control()) {
            return Err(VfsError::invalid_path(
                raw,
                format!("contains control character {:?}", bad),
            ));
        }
        Ok(CanonicalPath(normalize(raw)))
    }

    /// The root path `/`
    pub fn root() -> Self {
        CanonicalPath(SEPARATOR.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Non-empty segments from the root down
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Final segment; empty for the root
    pub fn name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// Parent directory path; `None` for the root
    pub fn parent(&self) -> Option<CanonicalPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(0) => Some(CanonicalPath::root()),
            Some(idx) => Some(CanonicalPath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append a relative path (which may itself contain separators)
    pub fn join(&self, relative: &str) -> CanonicalPath {
        CanonicalPath(normalize(&format!("{}{}{}", self.0, SEPARATOR, relative)))
    }

    /// Resolve user input against this path as the working directory.
    ///
    /// Absolute input ignores the working directory.
    pub fn resolve(&self, input: &str) -> Result<CanonicalPath, VfsError> {
        if input.starts_with(SEPARATOR) {
            CanonicalPath::parse(input)
        } else {
            CanonicalPath::parse(&format!("{}{}{}", self.0, SEPARATOR, input))
        }
    }

    /// True if `ancestor` equals this path or is one of its ancestors.
    pub fn starts_with(&self, ancestor: &CanonicalPath) -> bool {
        if ancestor.is_root() || self == ancestor {
            return true;
        }
        self.0.starts_with(&ancestor.0)
            && self.0.as_bytes().get(ancestor.0.len()) == Some(&(SEPARATOR as u8))
    }

    /// Path of `self` relative to `base`, without a leading separator.
    pub fn strip_prefix(&self, base: &CanonicalPath) -> Option<&str> {
        if !self.starts_with(base) {
            return None;
        }
        if self == base {
            return Some("");
        }
        let offset = if base.is_root() { 1 } else { base.0.len() + 1 };
        Some(&self.0[offset..])
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CanonicalPath {
    type Error = VfsError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        CanonicalPath::parse(&raw)
    }
}

impl From<CanonicalPath> for String {
    fn from(path: CanonicalPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_basic_forms() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("home/user"), "/home/user");
        assert_eq!(normalize("//home///user//"), "/home/user");
        assert_eq!(normalize("/home/user/"), "/home/user");
    }

    #[test]
    fn test_normalize_resolves_dots_and_clamps() {
        assert_eq!(normalize("/home/./user"), "/home/user");
        assert_eq!(normalize("/home/user/../guest"), "/home/guest");
        assert_eq!(normalize("/../../etc"), "/etc");
        assert_eq!(normalize(".."), "/");
    }

    #[test]
    fn test_normalize_composes_unicode() {
        // "e" + combining acute accent vs precomposed "é"
        assert_eq!(normalize("/cafe\u{301}"), normalize("/caf\u{e9}"));
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        let err = CanonicalPath::parse("/home/\0user").unwrap_err();
        assert!(matches!(err, VfsError::InvalidPath { .. }));
    }

    #[test]
    fn test_parent_and_name() {
        let path = CanonicalPath::parse("/home/user/a.txt").unwrap();
        assert_eq!(path.name(), "a.txt");
        assert_eq!(path.parent().unwrap().as_str(), "/home/user");

        let top = CanonicalPath::parse("/etc").unwrap();
        assert_eq!(top.parent().unwrap(), CanonicalPath::root());
        assert!(CanonicalPath::root().parent().is_none());
        assert_eq!(CanonicalPath::root().name(), "");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let cwd = CanonicalPath::parse("/home/user").unwrap();
        assert_eq!(cwd.resolve("src").unwrap().as_str(), "/home/user/src");
        assert_eq!(cwd.resolve("../other").unwrap().as_str(), "/home/other");
        assert_eq!(cwd.resolve("/etc/passwd").unwrap().as_str(), "/etc/passwd");
    }

    #[test]
    fn test_starts_with_is_segment_wise() {
        let a = CanonicalPath::parse("/home/user").unwrap();
        let b = CanonicalPath::parse("/home/user2").unwrap();
        let c = CanonicalPath::parse("/home/user/docs").unwrap();
        assert!(!b.starts_with(&a));
        assert!(c.starts_with(&a));
        assert!(a.starts_with(&a));
        assert!(a.starts_with(&CanonicalPath::root()));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "[a-z./\u{e9}\u{301} ]{0,40}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(once.starts_with('/'));
            prop_assert!(once == "/" || !once.ends_with('/'));
            prop_assert!(!once.contains("//"));
        }

        #[test]
        fn prop_normalize_arbitrary_strings_idempotent(raw in any::<String>()) {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
