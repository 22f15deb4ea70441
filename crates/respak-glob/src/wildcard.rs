//! Wildcard file-name patterns.
//!
//! The common shapes (`*`, `*.ext`, `name*`, literal) never touch the regex
//! engine; everything else is compiled to an anchored regex where `*` means
//! `.*` and every other character is literal.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::{ExtensionFilter, GlobError, LIST_SEPARATOR};

/// A single compiled glob.
#[derive(Debug, Clone)]
pub enum Glob {
    /// `*`: matches every name.
    Any,
    /// `*.png`: name ends with the suffix.
    Suffix(String),
    /// Built from an [`ExtensionFilter`]: like `Suffix`, but the name must
    /// have a stem, so `.png` alone does not match.
    Extension(String),
    /// `icon_*`: name starts with the prefix.
    Prefix(String),
    /// No wildcard at all.
    Exact(String),
    /// Anything else, e.g. `a*b*c`.
    Regex(Regex),
}

impl Glob {
    /// Compile one glob.
    pub fn compile(glob: &str) -> Result<Self, GlobError> {
        let stars = glob.matches('*').count();

        if glob.chars().all(|c| c == '*') && stars > 0 {
            return Ok(Glob::Any);
        }
        if stars == 0 {
            return Ok(Glob::Exact(glob.to_string()));
        }
        if stars == 1 {
            if let Some(suffix) = glob.strip_prefix('*') {
                return Ok(Glob::Suffix(suffix.to_string()));
            }
            if let Some(prefix) = glob.strip_suffix('*') {
                return Ok(Glob::Prefix(prefix.to_string()));
            }
        }

        let body: Vec<String> = glob.split('*').map(regex::escape).collect();
        let source = format!("^{}$", body.join(".*"));
        let regex = Regex::new(&source).map_err(|source| GlobError::Invalid {
            glob: glob.to_string(),
            source,
        })?;
        Ok(Glob::Regex(regex))
    }

    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Glob::Any => true,
            Glob::Suffix(suffix) => name.ends_with(suffix.as_str()),
            Glob::Extension(ext) => name.len() > ext.len() && name.ends_with(ext.as_str()),
            Glob::Prefix(prefix) => name.starts_with(prefix.as_str()),
            Glob::Exact(exact) => name == exact,
            Glob::Regex(regex) => regex.is_match(name),
        }
    }
}

/// A pipe-delimited list of globs, e.g. `"*.png|*.jpg"`.
///
/// A name matches when any glob matches it. A `*` anywhere in the list makes
/// the whole pattern match everything.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    globs: Vec<Glob>,
}

impl WildcardPattern {
    /// Parse and compile a pattern list.
    pub fn parse(list: &str) -> Result<Self, GlobError> {
        let mut globs = Vec::new();
        for glob in list.split(LIST_SEPARATOR).map(str::trim).filter(|g| !g.is_empty()) {
            let compiled = Glob::compile(glob)?;
            if matches!(compiled, Glob::Any) {
                return Ok(Self::any());
            }
            globs.push(compiled);
        }

        if globs.is_empty() {
            return Err(GlobError::Empty(list.to_string()));
        }
        Ok(Self {
            source: list.trim().to_string(),
            globs,
        })
    }

    /// The pattern that accepts every name.
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            globs: vec![Glob::Any],
        }
    }

    /// Whether this pattern accepts every name.
    pub fn is_any(&self) -> bool {
        matches!(self.globs.as_slice(), [Glob::Any])
    }

    pub fn matches(&self, name: &str) -> bool {
        self.globs.iter().any(|g| g.is_match(name))
    }

    pub fn globs(&self) -> &[Glob] {
        &self.globs
    }
}

impl From<&ExtensionFilter> for WildcardPattern {
    fn from(filter: &ExtensionFilter) -> Self {
        let globs: Vec<Glob> = filter
            .extensions()
            .map(|ext| Glob::Extension(ext.to_string()))
            .collect();
        let source = filter
            .extensions()
            .map(|ext| format!("*{ext}"))
            .collect::<Vec<_>>()
            .join("|");
        Self { source, globs }
    }
}

impl FromStr for WildcardPattern {
    type Err = GlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
