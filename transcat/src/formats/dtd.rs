//! Support for XUL-style DTD entity localization files.
//!
//! Only `<!ENTITY name "content">` declarations are modeled; the
//! internal/external subset structure of arbitrary hand-written DTDs is
//! not, so encoding is best-effort rather than fully round-trippable.

use std::io::{BufRead, Read, Write};

use lazy_static::lazy_static;
use quick_xml::escape::{escape, unescape};
use regex::Regex;

use crate::{
    error::Error,
    traits::Codec,
    types::{Store, Unit},
};

lazy_static! {
    static ref ENTITY_REGEX: Regex =
        Regex::new(r#"<!ENTITY\s+([^\s"'<>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#).unwrap();
    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
}

/// Represents the DTD entity file format.
pub struct Format;

impl Codec for Format {
    fn decode_reader<R: BufRead>(mut reader: R, lang: Option<&str>) -> Result<Store, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let content = COMMENT_REGEX.replace_all(&content, "");

        let mut store = Store::new();
        for captures in ENTITY_REGEX.captures_iter(&content) {
            let name = &captures[1];
            let raw = captures
                .get(2)
                .or_else(|| captures.get(3))
                .map_or("", |m| m.as_str());
            let value = unescape(raw).map_err(|e| {
                Error::Decode(format!("entity `{}` has malformed content: {}", name, e))
            })?;
            let mut unit = Unit::new(name, value.into_owned());
            unit.lang = lang.map(str::to_owned);
            store.add_unit(unit);
        }

        let declared = content.matches("<!ENTITY").count();
        if declared != store.units.len() {
            return Err(Error::Decode(format!(
                "unbalanced entity declarations: {} `<!ENTITY` marker(s) but {} parsed",
                declared,
                store.units.len()
            )));
        }
        Ok(store)
    }

    fn encode_writer<W: Write>(store: &Store, mut writer: W) -> Result<(), Error> {
        let mut out = String::new();
        for unit in &store.units {
            out.push_str("<!ENTITY ");
            out.push_str(&unit.key);
            out.push_str(" \"");
            out.push_str(&escape(unit.value.as_str()));
            out.push_str("\">\n");
        }
        writer.write_all(out.as_bytes()).map_err(Error::Io)
    }
}
