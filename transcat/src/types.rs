//! Core, format-agnostic types for transcat.
//! Codecs decode into these; encoders serialize these.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// Translation status of a [`Unit`].
///
/// `Unfinished` and [`Unit::obsolete`] are independent: an entry can be
/// both fuzzy and obsolete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Unknown,
    Untranslated,
    Translated,
    /// Machine-suggested or unreviewed translation (`fuzzy` in PO,
    /// `type="unfinished"` in TS).
    Unfinished,
}

/// A (filename, line) pair recording where a source string appears in
/// application code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Occurrence {
    pub file: String,
    pub line: u32,
}

/// Format-specific header metadata, distinct from ordinary translation
/// units.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Header {
    /// Ordered header fields, as decoded from PO's empty-`msgid` block.
    Fields(Vec<(String, String)>),
    /// The JSON `@metadata` object, kept verbatim.
    Json(serde_json::Value),
}

/// A single translatable string and its metadata.
///
/// This is the union of what the supported formats can express; every
/// field a format cannot represent stays at its default. `format_flags`
/// survives a round trip through the *same* format only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Unit {
    /// The source string. Unique within one `context` inside one store.
    pub key: String,

    /// The translated string, possibly empty.
    pub value: String,

    /// Grouping string; empty when the format has no context concept.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    /// Extracted/auto comment (`#.` in PO).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Translator comment (`#` in PO).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator_comment: Option<String>,

    /// Where the source string appears in application code, in on-disk
    /// order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occurrences: Vec<Occurrence>,

    pub obsolete: bool,

    pub state: State,

    /// Language tag for this unit. A store may hold units of more than
    /// one language (TMX).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// `msgid_plural`, present only for PO entries with plural forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_id: Option<String>,

    /// Plural-index (0–9) to translated form.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plurals: BTreeMap<u8, String>,

    /// Format-specific flags (e.g. PO's non-fuzzy flags), preserved
    /// verbatim for a same-format round trip.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_flags: Vec<String>,
}

impl Unit {
    /// Creates a unit with the given key and value; every other field
    /// starts at its default.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Unit {
            key: key.into(),
            value: value.into(),
            ..Unit::default()
        }
    }

    /// Parses this unit's language tag, tolerating the underscore
    /// separators Qt uses (`en_US`).
    pub fn parse_language_identifier(&self) -> Option<LanguageIdentifier> {
        self.lang.as_ref()?.replace('_', "-").parse().ok()
    }

    pub fn has_plural(&self) -> bool {
        self.plural_id.is_some()
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unit {{ key: {}, value: {}, state: {:?} }}",
            self.key, self.value, self.state
        )
    }
}

/// Ordered collection of [`Unit`]s plus optional header metadata; one
/// file's contents.
///
/// Insertion order is the on-disk order and is preserved on re-encode
/// for the formats where order is observable (PO, TS, Properties, DTD).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Store {
    pub units: Vec<Unit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Derives a new store that takes ownership of another store's
    /// units. The source is consumed; its header does not carry over.
    pub fn from_store(store: Store) -> Self {
        Store {
            units: store.units,
            header: None,
        }
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    /// Finds the unit identified by `key` within `context`, if present.
    pub fn find_unit(&self, key: &str, context: &str) -> Option<&Unit> {
        self.units
            .iter()
            .find(|u| u.key == key && u.context == context)
    }

    pub fn find_unit_mut(&mut self, key: &str, context: &str) -> Option<&mut Unit> {
        self.units
            .iter_mut()
            .find(|u| u.key == key && u.context == context)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_new_defaults() {
        let unit = Unit::new("hello", "bonjour");
        assert_eq!(unit.key, "hello");
        assert_eq!(unit.value, "bonjour");
        assert_eq!(unit.context, "");
        assert_eq!(unit.state, State::Unknown);
        assert!(!unit.obsolete);
        assert!(unit.comment.is_none());
        assert!(unit.occurrences.is_empty());
        assert!(unit.plurals.is_empty());
    }

    #[test]
    fn test_unit_parse_language_identifier() {
        let mut unit = Unit::new("k", "v");
        unit.lang = Some("fr_FR".to_string());
        let id = unit.parse_language_identifier().unwrap();
        assert_eq!(id.language.as_str(), "fr");
        assert_eq!(id.region.unwrap().as_str(), "FR");
    }

    #[test]
    fn test_unit_parse_invalid_language() {
        let mut unit = Unit::new("k", "v");
        unit.lang = Some("not a language tag".to_string());
        assert!(unit.parse_language_identifier().is_none());
    }

    #[test]
    fn test_store_from_store_transfers_units() {
        let mut source = Store::new();
        source.add_unit(Unit::new("a", "1"));
        source.add_unit(Unit::new("b", "2"));
        source.header = Some(Header::Fields(vec![(
            "Language".to_string(),
            "de".to_string(),
        )]));

        let derived = Store::from_store(source);
        assert_eq!(derived.len(), 2);
        assert!(derived.header.is_none());
    }

    #[test]
    fn test_store_find_unit_respects_context() {
        let mut store = Store::new();
        let mut in_menu = Unit::new("Open", "Ouvrir");
        in_menu.context = "Menu".to_string();
        store.add_unit(in_menu);
        store.add_unit(Unit::new("Open", "Ouverte"));

        assert_eq!(store.find_unit("Open", "Menu").unwrap().value, "Ouvrir");
        assert_eq!(store.find_unit("Open", "").unwrap().value, "Ouverte");
        assert!(store.find_unit("Open", "Dialog").is_none());
    }

    #[test]
    fn test_unit_display() {
        let unit = Unit::new("hello", "bonjour");
        let display = format!("{}", unit);
        assert!(display.contains("hello"));
        assert!(display.contains("bonjour"));
    }
}
