//! Support for Translation Memory eXchange (`.tmx`) files.
//!
//! Each `<tu>` pairs one source-language `<tuv>` with any number of
//! target-language variants; every target variant becomes one unit
//! sharing the source segment as its key. Only decoding is supported.

use std::io::{BufRead, Write};

use quick_xml::{Reader, events::Event};

use crate::{
    error::Error,
    formats::xml::{attribute_value, read_text},
    traits::Codec,
    types::{Store, Unit},
};

/// Represents the TMX file format.
pub struct Format;

struct Variant {
    lang: String,
    text: String,
}

impl Codec for Format {
    /// Decodes a TMX file. The `lang` argument is ignored: every unit's
    /// language comes from its `<tuv>` element.
    fn decode_reader<R: BufRead>(reader: R, _lang: Option<&str>) -> Result<Store, Error> {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut store = Store::new();
        let mut header_srclang: Option<String> = None;

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"header" => header_srclang = attribute_value(&e, b"srclang")?,
                    b"tu" => {
                        let srclang =
                            attribute_value(&e, b"srclang")?.or_else(|| header_srclang.clone());
                        let variants = parse_tu(&mut xml)?;
                        push_units(&mut store, srclang, variants)?;
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"header" => {
                    header_srclang = attribute_value(&e, b"srclang")?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::Xml(e)),
            }
            buf.clear();
        }
        Ok(store)
    }

    fn encode_writer<W: Write>(_store: &Store, _writer: W) -> Result<(), Error> {
        Err(Error::Encode("TMX output is not supported".to_string()))
    }
}

fn parse_tu<R: BufRead>(xml: &mut Reader<R>) -> Result<Vec<Variant>, Error> {
    let mut buf = Vec::new();
    let mut variants = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"tuv" => {
                let lang = attribute_value(&e, b"xml:lang")?
                    .or(attribute_value(&e, b"lang")?)
                    .ok_or_else(|| {
                        Error::Decode("<tuv> is missing its xml:lang attribute".to_string())
                    })?;
                let text = parse_tuv(xml)?;
                variants.push(Variant { lang, text });
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"tu" => break,
            Ok(Event::Eof) => {
                return Err(Error::Decode(
                    "unexpected end of file inside <tu>".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e)),
        }
        buf.clear();
    }
    Ok(variants)
}

fn parse_tuv<R: BufRead>(xml: &mut Reader<R>) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut seg: Option<String> = None;
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"seg" => {
                seg = Some(read_text(xml, b"seg")?);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"tuv" => break,
            Ok(Event::Eof) => {
                return Err(Error::Decode(
                    "unexpected end of file inside <tuv>".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e)),
        }
        buf.clear();
    }
    seg.ok_or_else(|| Error::Decode("<tuv> is missing its <seg> element".to_string()))
}

fn push_units(
    store: &mut Store,
    srclang: Option<String>,
    variants: Vec<Variant>,
) -> Result<(), Error> {
    let srclang = srclang.ok_or_else(|| {
        Error::Decode("<tu> has no source language: neither it nor <header> declares srclang".to_string())
    })?;

    let mut sources = variants.iter().filter(|v| v.lang == srclang);
    let source = sources.next().ok_or_else(|| {
        Error::Decode(format!(
            "<tu> has no <tuv> matching source language `{}`",
            srclang
        ))
    })?;
    if sources.next().is_some() {
        return Err(Error::Decode(format!(
            "<tu> has more than one <tuv> matching source language `{}`",
            srclang
        )));
    }

    let source_text = source.text.clone();
    for variant in &variants {
        if variant.lang == srclang {
            continue;
        }
        let mut unit = Unit::new(source_text.clone(), variant.text.clone());
        unit.lang = Some(variant.lang.clone());
        store.add_unit(unit);
    }
    Ok(())
}
