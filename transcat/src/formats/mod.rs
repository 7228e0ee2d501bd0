//! All supported translation file formats for transcat.
//!
//! This module re-exports the main types for each format and provides
//! the [`FormatType`] enum plus the static extension registry used for
//! generic format handling across the crate.

pub mod dtd;
pub mod json;
pub mod po;
pub mod properties;
pub mod tmx;
pub mod ts;

mod xml;

use std::{
    fmt::{Display, Formatter},
    io::{BufRead, Cursor, Write},
    path::Path,
    str::FromStr,
};

// Reexporting the formats for easier access
pub use dtd::Format as DtdFormat;
pub use json::Format as JsonFormat;
pub use po::Format as PoFormat;
pub use properties::Format as PropertiesFormat;
pub use tmx::Format as TmxFormat;
pub use ts::Format as TsFormat;

use crate::{error::Error, traits::Codec, types::Store};

/// Represents all supported translation file formats for generic
/// handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// gettext Portable Object (`.po`) and template (`.pot`) files.
    Po,
    /// Qt Linguist XML translation sources (`.ts`).
    Ts,
    /// Flat JSON objects with optional `@metadata` (`.json`).
    Json,
    /// Java-style `.properties` files.
    Properties,
    /// Translation Memory eXchange files (`.tmx`). Decode only.
    Tmx,
    /// XUL-style DTD entity files (`.dtd`).
    Dtd,
}

/// The statically enumerated registry: each format and the file
/// extensions it owns. Extensions must be disjoint across entries.
const REGISTRY: &[(FormatType, &[&str])] = &[
    (FormatType::Po, &["po", "pot"]),
    (FormatType::Ts, &["ts"]),
    (FormatType::Json, &["json"]),
    (FormatType::Properties, &["properties"]),
    (FormatType::Tmx, &["tmx"]),
    (FormatType::Dtd, &["dtd"]),
];

/// Resolves the codec responsible for a path from its extension.
///
/// This is a pure function of the path and is consulted once per input
/// file and once for the output file.
///
/// # Example
/// ```rust
/// use transcat::formats::{FormatType, resolve};
/// assert_eq!(resolve("x.po").unwrap(), FormatType::Po);
/// assert_eq!(resolve("x.pot").unwrap(), FormatType::Po);
/// assert!(resolve("x.unknownext").is_err());
/// ```
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<FormatType, Error> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))?;

    let mut matches = REGISTRY
        .iter()
        .filter(|(_, extensions)| extensions.contains(&ext.as_str()))
        .map(|(format, _)| *format);
    let format = matches
        .next()
        .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))?;
    debug_assert!(matches.next().is_none(), "registry extensions overlap");
    Ok(format)
}

impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Po => write!(f, "po"),
            FormatType::Ts => write!(f, "ts"),
            FormatType::Json => write!(f, "json"),
            FormatType::Properties => write!(f, "properties"),
            FormatType::Tmx => write!(f, "tmx"),
            FormatType::Dtd => write!(f, "dtd"),
        }
    }
}

impl FromStr for FormatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "po" | "pot" | "gettext" => Ok(FormatType::Po),
            "ts" | "linguist" => Ok(FormatType::Ts),
            "json" => Ok(FormatType::Json),
            "properties" => Ok(FormatType::Properties),
            "tmx" => Ok(FormatType::Tmx),
            "dtd" => Ok(FormatType::Dtd),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the file extensions registered for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        REGISTRY
            .iter()
            .find(|(format, _)| *format == self)
            .map(|(_, extensions)| *extensions)
            .unwrap_or(&[])
    }

    /// Decodes one file's contents with this format's codec.
    pub fn decode_reader<R: BufRead>(self, reader: R, lang: Option<&str>) -> Result<Store, Error> {
        match self {
            FormatType::Po => po::Format::decode_reader(reader, lang),
            FormatType::Ts => ts::Format::decode_reader(reader, lang),
            FormatType::Json => json::Format::decode_reader(reader, lang),
            FormatType::Properties => properties::Format::decode_reader(reader, lang),
            FormatType::Tmx => tmx::Format::decode_reader(reader, lang),
            FormatType::Dtd => dtd::Format::decode_reader(reader, lang),
        }
    }

    /// Encodes a store with this format's codec.
    pub fn encode_writer<W: Write>(self, store: &Store, writer: W) -> Result<(), Error> {
        match self {
            FormatType::Po => po::Format::encode_writer(store, writer),
            FormatType::Ts => ts::Format::encode_writer(store, writer),
            FormatType::Json => json::Format::encode_writer(store, writer),
            FormatType::Properties => properties::Format::encode_writer(store, writer),
            FormatType::Tmx => tmx::Format::encode_writer(store, writer),
            FormatType::Dtd => dtd::Format::encode_writer(store, writer),
        }
    }

    /// Decodes a file. Dispatches through each codec's `read_from` so
    /// format-specific behavior (BOM-aware decoding for Properties)
    /// applies.
    pub fn read_from<P: AsRef<Path>>(self, path: P, lang: Option<&str>) -> Result<Store, Error> {
        match self {
            FormatType::Po => po::Format::read_from(path, lang),
            FormatType::Ts => ts::Format::read_from(path, lang),
            FormatType::Json => json::Format::read_from(path, lang),
            FormatType::Properties => properties::Format::read_from(path, lang),
            FormatType::Tmx => tmx::Format::read_from(path, lang),
            FormatType::Dtd => dtd::Format::read_from(path, lang),
        }
    }

    /// Decodes from a string.
    pub fn decode_str(self, s: &str, lang: Option<&str>) -> Result<Store, Error> {
        self.decode_reader(Cursor::new(s), lang)
    }

    /// Encodes into an in-memory buffer.
    pub fn encode_to_vec(self, store: &Store) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.encode_writer(store, &mut buf)?;
        Ok(buf)
    }

    /// Encodes into a string.
    pub fn encode_to_string(self, store: &Store) -> Result<String, Error> {
        let buf = self.encode_to_vec(store)?;
        String::from_utf8(buf)
            .map_err(|e| Error::Encode(format!("output is not valid UTF-8: {}", e)))
    }
}
