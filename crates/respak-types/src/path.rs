//! Normalized virtual paths.
//!
//! A [`VfsPath`] is the only path type the rest of respak accepts. Every
//! constructor normalizes, so two paths that address the same location always
//! compare (and hash) equal:
//!
//! | Input | Normalized |
//! |-------|------------|
//! | `"/assets/textures/"` | `"assets/textures"` |
//! | `"assets\\textures\\a.png"` | `"assets/textures/a.png"` |
//! | `"assets//textures"` | `"assets/textures"` |
//! | `""`, `"/"`, `"\\"` | `""` |
//!
//! All operations are textual. None of them look at a filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The canonical separator.
pub const SEPARATOR: char = '/';

/// A normalized, separator-canonical path.
///
/// Leading and trailing separators are stripped, runs of separators collapse
/// to one and `\` is rewritten to `/`. The empty path addresses the root of
/// whatever it is resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VfsPath(String);

impl VfsPath {
    /// Normalize a raw path string.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref();
        let mut normalized = String::with_capacity(raw.len());
        for segment in raw.split(['/', '\\']).filter(|s| !s.is_empty()) {
            if !normalized.is_empty() {
                normalized.push(SEPARATOR);
            }
            normalized.push_str(segment);
        }
        Self(normalized)
    }

    /// The canonical empty path.
    pub const fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, root first. The empty path has none.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Combine two paths with a single separator.
    ///
    /// An empty operand passes the other one through unchanged.
    pub fn join(&self, other: impl Into<VfsPath>) -> VfsPath {
        let other = other.into();
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self.clone();
        }
        Self(format!("{}{SEPARATOR}{}", self.0, other.0))
    }

    /// Remove `prefix` from the front of this path.
    ///
    /// - empty prefix: returns `self` unchanged
    /// - equal paths: returns the empty path
    /// - `prefix` is a leading run of whole segments: returns the remainder
    /// - otherwise: returns `self` unchanged
    pub fn strip_prefix(&self, prefix: &VfsPath) -> VfsPath {
        if prefix.is_empty() {
            return self.clone();
        }
        if self == prefix {
            return Self::empty();
        }
        match self.0.strip_prefix(prefix.as_str()) {
            Some(rest) if rest.starts_with(SEPARATOR) => Self(rest[1..].to_string()),
            _ => self.clone(),
        }
    }

    /// Whether `prefix` is a leading run of whole segments of this path.
    pub fn starts_with(&self, prefix: &VfsPath) -> bool {
        prefix.is_empty()
            || self == prefix
            || self
                .0
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// The final segment, or `""` for the empty path.
    pub fn file_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }

    /// Text after the last `.` of the final segment, without the dot.
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(pos) => &name[pos + 1..],
            None => "",
        }
    }

    /// The final segment with its extension (and the dot) removed.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(pos) => &name[..pos],
            None => name,
        }
    }

    /// Everything before the final segment.
    pub fn parent(&self) -> VfsPath {
        match self.0.rfind(SEPARATOR) {
            Some(pos) => Self(self.0[..pos].to_string()),
            None => Self::empty(),
        }
    }

    /// Append text to the final segment, e.g. `"lang/en"` + `".json"`.
    ///
    /// Separators in `suffix` are dropped; the result never gains segments.
    pub fn with_suffix(&self, suffix: &str) -> VfsPath {
        let suffix: String = suffix.chars().filter(|c| *c != SEPARATOR && *c != '\\').collect();
        Self::new(format!("{}{suffix}", self.0))
    }

    /// This path with the extension (if any) removed from the final segment.
    pub fn without_extension(&self) -> VfsPath {
        let ext = self.extension();
        if ext.is_empty() {
            return self.clone();
        }
        Self::new(&self.0[..self.0.len() - ext.len() - 1])
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VfsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VfsPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for VfsPath {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&String> for VfsPath {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&VfsPath> for VfsPath {
    fn from(path: &VfsPath) -> Self {
        path.clone()
    }
}

impl From<VfsPath> for String {
    fn from(path: VfsPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("assets/textures/a.png", "assets/textures/a.png")]
    #[case::leading("/assets/a.png", "assets/a.png")]
    #[case::trailing("assets/", "assets")]
    #[case::doubled("assets//textures///a.png", "assets/textures/a.png")]
    #[case::backslashes("assets\\textures\\a.png", "assets/textures/a.png")]
    #[case::mixed("\\assets/\\textures//", "assets/textures")]
    #[case::empty("", "")]
    #[case::only_separators("/\\//", "")]
    #[case::dots_are_literal("a/./b", "a/./b")]
    fn normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(VfsPath::new(raw).as_str(), expected);
    }

    #[rstest]
    #[case::both("a/b", "c/d", "a/b/c/d")]
    #[case::left_empty("", "c", "c")]
    #[case::right_empty("a", "", "a")]
    #[case::both_empty("", "", "")]
    fn join(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        assert_eq!(VfsPath::new(a).join(b).as_str(), expected);
    }

    #[rstest]
    #[case::remainder("a/b/c", "a", "b/c")]
    #[case::equal("a/b", "a/b", "")]
    #[case::empty_prefix("a/b", "", "a/b")]
    #[case::mismatch("a/b", "x", "a/b")]
    #[case::partial_segment("ab/c", "a", "ab/c")]
    fn strip_prefix(#[case] path: &str, #[case] prefix: &str, #[case] expected: &str) {
        let path = VfsPath::new(path);
        assert_eq!(path.strip_prefix(&VfsPath::new(prefix)).as_str(), expected);
    }

    #[rstest]
    #[case::simple("a/b/stone.png", "stone.png", "png", "stone", "a/b")]
    #[case::double_ext("x.tar.gz", "x.tar.gz", "gz", "x.tar", "")]
    #[case::no_ext("dir/readme", "readme", "", "readme", "dir")]
    #[case::dot_in_dir("v1.2/readme", "readme", "", "readme", "v1.2")]
    #[case::empty("", "", "", "", "")]
    fn name_parts(
        #[case] raw: &str,
        #[case] name: &str,
        #[case] ext: &str,
        #[case] stem: &str,
        #[case] parent: &str,
    ) {
        let path = VfsPath::new(raw);
        assert_eq!(path.file_name(), name);
        assert_eq!(path.extension(), ext);
        assert_eq!(path.file_stem(), stem);
        assert_eq!(path.parent().as_str(), parent);
    }

    #[test]
    fn suffix_and_extension_removal() {
        let path = VfsPath::new("lang/en_us");
        let with = path.with_suffix(".json");
        assert_eq!(with.as_str(), "lang/en_us.json");
        assert_eq!(with.without_extension(), path);
    }

    #[rstest]
    #[case::slash(".js/on")]
    #[case::backslash(".js\\on")]
    #[case::leading("/.json")]
    fn suffix_never_adds_segments(#[case] suffix: &str) {
        let with = VfsPath::new("lang/en_us").with_suffix(suffix);
        assert_eq!(with.as_str(), "lang/en_us.json");
        assert_eq!(with.depth(), 2);
    }

    #[test]
    fn segments_and_depth() {
        let path = VfsPath::new("/a/b/c/");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(path.depth(), 3);
        assert_eq!(VfsPath::empty().depth(), 0);
    }

    #[test]
    fn starts_with_respects_segments() {
        let path = VfsPath::new("assets/textures");
        assert!(path.starts_with(&VfsPath::new("assets")));
        assert!(path.starts_with(&VfsPath::empty()));
        assert!(!path.starts_with(&VfsPath::new("asset")));
    }

    #[test]
    fn equality_is_by_normalized_text() {
        use std::collections::HashSet;
        let set: HashSet<VfsPath> = ["a/b", "/a/b/", "a\\b", "a//b"]
            .into_iter()
            .map(VfsPath::new)
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serde_normalizes() {
        let path: VfsPath = serde_json::from_str(r#""\\assets\\lang\\""#).unwrap();
        assert_eq!(path.as_str(), "assets/lang");
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""assets/lang""#);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "[a-z./\\\\]{0,24}") {
            let once = VfsPath::new(&raw);
            let twice = VfsPath::new(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn join_then_strip_round_trips(a in "[a-z]{1,6}(/[a-z]{1,6}){0,3}", b in "[a-z]{1,6}(/[a-z]{1,6}){0,3}") {
            let a = VfsPath::new(&a);
            let b = VfsPath::new(&b);
            prop_assert_eq!(a.join(&b).strip_prefix(&a), b);
        }
    }
}
