//! Language files: `assets/<ns>/lang/<locale>.json` string tables.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::Deserialize;

use super::loader::Decode;
use super::registry::{AssetKind, AssetRegistry};

/// A decoded language file: translation keys mapped to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Language {
    entries: BTreeMap<String, String>,
}

impl Language {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The translation for `key`, or `key` itself when untranslated.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Decode for Language {
    fn decode(bytes: Vec<u8>) -> anyhow::Result<Self> {
        serde_json::from_slice(&bytes).context("language file is not a JSON object of strings")
    }
}

/// [`AssetKind`] for language files.
#[derive(Debug)]
pub struct LanguageFiles;

impl AssetKind for LanguageFiles {
    type Asset = Language;

    const CATEGORY: &'static str = "language";
    const DIRECTORY: &'static str = "lang";
    const EXTENSIONS: &'static str = ".json";
}

/// Registry of every language file across the loaded packs, keyed by
/// `namespace:locale`.
pub type LanguageRegistry = AssetRegistry<LanguageFiles>;
