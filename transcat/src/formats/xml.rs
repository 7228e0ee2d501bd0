//! Shared helpers for the XML-based codecs (TS, TMX).

use std::io::BufRead;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::error::Error;

/// Returns the unescaped value of the named attribute, if present.
pub(crate) fn attribute_value(e: &BytesStart, name: &[u8]) -> Result<Option<String>, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| Error::Decode(format!("malformed attribute: {}", err)))?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

/// Accumulates the text content of the current element up to its
/// matching end tag, descending through any nested markup.
pub(crate) fn read_text<R: BufRead>(xml: &mut Reader<R>, end: &[u8]) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => text.push_str(&e.unescape()?),
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(e)) => {
                if depth == 0 {
                    if e.name().as_ref() != end {
                        return Err(Error::Decode(format!(
                            "mismatched closing tag inside <{}>",
                            String::from_utf8_lossy(end)
                        )));
                    }
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(Error::Decode(format!(
                    "unexpected end of file inside <{}>",
                    String::from_utf8_lossy(end)
                )));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e)),
        }
        buf.clear();
    }
    Ok(text)
}
