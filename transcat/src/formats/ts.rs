//! Support for Qt Linguist `.ts` translation source files.
//!
//! Messages are grouped under named `<context>` elements; the root `<TS>`
//! element declares the file's language.

use std::io::{BufRead, Write};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::Error,
    formats::xml::{attribute_value, read_text},
    traits::Codec,
    types::{Occurrence, State, Store, Unit},
};

const TS_VERSION: &str = "2.1";

/// Represents the Qt Linguist TS file format.
pub struct Format;

impl Codec for Format {
    fn decode_reader<R: BufRead>(reader: R, lang: Option<&str>) -> Result<Store, Error> {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();
        let mut store = Store::new();
        let mut root_lang: Option<String> = None;
        let mut root_seen = false;
        let mut context_name = String::new();

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"TS" => {
                        root_seen = true;
                        root_lang = attribute_value(&e, b"language")?;
                    }
                    b"context" => context_name.clear(),
                    b"name" => context_name = read_text(&mut xml, b"name")?,
                    b"message" => {
                        let unit = parse_message(&mut xml, &context_name)?;
                        store.add_unit(unit);
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"name" => context_name.clear(),
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::Xml(e)),
            }
            buf.clear();
        }

        if !root_seen {
            return Err(Error::Decode("missing <TS> root element".to_string()));
        }
        let effective = lang.map(str::to_owned).or(root_lang).ok_or_else(|| {
            Error::Decode("<TS> element is missing its language attribute".to_string())
        })?;
        for unit in &mut store.units {
            unit.lang = Some(effective.clone());
        }
        Ok(store)
    }

    fn encode_writer<W: Write>(store: &Store, mut writer: W) -> Result<(), Error> {
        let language = store_language(store)?;

        // group units by context in first-seen order
        let mut groups: Vec<(&str, Vec<&Unit>)> = Vec::new();
        for unit in &store.units {
            match groups
                .iter_mut()
                .find(|(name, _)| *name == unit.context.as_str())
            {
                Some((_, units)) => units.push(unit),
                None => groups.push((unit.context.as_str(), vec![unit])),
            }
        }

        let mut xml = Writer::new_with_indent(&mut writer, b' ', 4);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut ts = BytesStart::new("TS");
        ts.push_attribute(("version", TS_VERSION));
        ts.push_attribute(("language", language.as_str()));
        xml.write_event(Event::Start(ts))?;

        for (name, units) in &groups {
            xml.write_event(Event::Start(BytesStart::new("context")))?;
            write_text_element(&mut xml, "name", name)?;
            for unit in units {
                xml.write_event(Event::Start(BytesStart::new("message")))?;
                for occurrence in &unit.occurrences {
                    let mut location = BytesStart::new("location");
                    location.push_attribute(("filename", occurrence.file.as_str()));
                    location.push_attribute(("line", occurrence.line.to_string().as_str()));
                    xml.write_event(Event::Empty(location))?;
                }
                write_text_element(&mut xml, "source", &unit.key)?;
                if let Some(comment) = &unit.comment {
                    write_text_element(&mut xml, "comment", comment)?;
                }
                let mut translation = BytesStart::new("translation");
                if unit.obsolete {
                    translation.push_attribute(("type", "obsolete"));
                } else if unit.state == State::Unfinished {
                    translation.push_attribute(("type", "unfinished"));
                }
                xml.write_event(Event::Start(translation))?;
                xml.write_event(Event::Text(BytesText::new(&unit.value)))?;
                xml.write_event(Event::End(BytesEnd::new("translation")))?;
                xml.write_event(Event::End(BytesEnd::new("message")))?;
            }
            xml.write_event(Event::End(BytesEnd::new("context")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("TS")))?;
        Ok(())
    }
}

fn parse_message<R: BufRead>(xml: &mut Reader<R>, context: &str) -> Result<Unit, Error> {
    let mut buf = Vec::new();
    let mut source: Option<String> = None;
    let mut value = String::new();
    let mut comment: Option<String> = None;
    let mut occurrences = Vec::new();
    let mut state = State::Unknown;
    let mut obsolete = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"source" => source = Some(read_text(xml, b"source")?),
                b"comment" => comment = Some(read_text(xml, b"comment")?),
                b"translation" => {
                    apply_translation_type(
                        attribute_value(&e, b"type")?,
                        &mut state,
                        &mut obsolete,
                    );
                    value = read_text(xml, b"translation")?;
                }
                b"location" => {
                    occurrences.push(parse_location(&e)?);
                    let mut skip = Vec::new();
                    xml.read_to_end_into(e.name(), &mut skip)?;
                }
                _ => {
                    let mut skip = Vec::new();
                    xml.read_to_end_into(e.name(), &mut skip)?;
                }
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"location" => occurrences.push(parse_location(&e)?),
                b"translation" => apply_translation_type(
                    attribute_value(&e, b"type")?,
                    &mut state,
                    &mut obsolete,
                ),
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"message" => break,
            Ok(Event::Eof) => {
                return Err(Error::Decode(
                    "unexpected end of file inside <message>".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(e)),
        }
        buf.clear();
    }

    let source = source.ok_or_else(|| {
        Error::Decode("<message> is missing its <source> element".to_string())
    })?;
    let mut unit = Unit::new(source, value);
    unit.context = context.to_string();
    unit.comment = comment;
    unit.occurrences = occurrences;
    unit.state = state;
    unit.obsolete = obsolete;
    Ok(unit)
}

fn apply_translation_type(kind: Option<String>, state: &mut State, obsolete: &mut bool) {
    match kind.as_deref() {
        Some("unfinished") => *state = State::Unfinished,
        Some("obsolete") => *obsolete = true,
        _ => {}
    }
}

fn parse_location(e: &BytesStart) -> Result<Occurrence, Error> {
    let file = attribute_value(e, b"filename")?.ok_or_else(|| {
        Error::Decode("<location> is missing its filename attribute".to_string())
    })?;
    let line = attribute_value(e, b"line")?
        .ok_or_else(|| Error::Decode("<location> is missing its line attribute".to_string()))?;
    let line = line
        .parse::<u32>()
        .map_err(|_| Error::Decode(format!("malformed location line number `{}`", line)))?;
    Ok(Occurrence { file, line })
}

/// The language reported by the root element: taken from the first unit,
/// after checking the store agrees on it.
fn store_language(store: &Store) -> Result<String, Error> {
    let first = store.units.first().ok_or_else(|| {
        Error::InconsistentLanguage("cannot encode an empty store".to_string())
    })?;
    let language = first.lang.clone().ok_or_else(|| {
        Error::InconsistentLanguage("first unit carries no language".to_string())
    })?;
    let reference = first.parse_language_identifier();

    for unit in &store.units {
        let Some(lang) = &unit.lang else { continue };
        let agrees = match (&reference, unit.parse_language_identifier()) {
            (Some(a), Some(b)) => a.language == b.language,
            _ => *lang == language,
        };
        if !agrees {
            return Err(Error::InconsistentLanguage(format!(
                "units mix languages `{}` and `{}`",
                language, lang
            )));
        }
    }
    Ok(language)
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Error> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_basic_ts() {
        let content = indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <!DOCTYPE TS>
            <TS version="2.1" language="fr_FR">
            <context>
                <name>MainWindow</name>
                <message>
                    <location filename="mainwindow.cpp" line="14"/>
                    <source>Open</source>
                    <translation>Ouvrir</translation>
                </message>
                <message>
                    <source>Save</source>
                    <translation type="unfinished">Enregistrer</translation>
                </message>
                <message>
                    <source>Quit</source>
                    <translation type="obsolete">Quitter</translation>
                </message>
            </context>
            </TS>
        "#};
        let store = Format::decode_str(content, None).unwrap();
        assert_eq!(store.units.len(), 3);

        let open = &store.units[0];
        assert_eq!(open.key, "Open");
        assert_eq!(open.value, "Ouvrir");
        assert_eq!(open.context, "MainWindow");
        assert_eq!(open.lang.as_deref(), Some("fr_FR"));
        assert_eq!(open.occurrences.len(), 1);
        assert_eq!(open.occurrences[0].file, "mainwindow.cpp");
        assert_eq!(open.occurrences[0].line, 14);

        assert_eq!(store.units[1].state, State::Unfinished);
        assert!(store.units[2].obsolete);
    }

    #[test]
    fn test_missing_language_attribute_is_an_error() {
        let content = r#"<TS version="2.1"><context><name>C</name></context></TS>"#;
        let error = Format::decode_str(content, None).unwrap_err();
        assert!(error.to_string().contains("language"));
    }

    #[test]
    fn test_explicit_lang_overrides_missing_attribute() {
        let content = indoc! {r#"
            <TS version="2.1">
            <context>
                <name>C</name>
                <message>
                    <source>Hi</source>
                    <translation>Salut</translation>
                </message>
            </context>
            </TS>
        "#};
        let store = Format::decode_str(content, Some("fr")).unwrap();
        assert_eq!(store.units[0].lang.as_deref(), Some("fr"));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let content = indoc! {r#"
            <TS version="2.1" language="fr">
            <context>
                <name>C</name>
                <message>
                    <translation>Salut</translation>
                </message>
            </context>
            </TS>
        "#};
        let error = Format::decode_str(content, None).unwrap_err();
        assert!(error.to_string().contains("<source>"));
    }

    #[test]
    fn test_round_trip_preserves_contexts_and_state() {
        let mut store = Store::new();
        for (context, key, value) in [
            ("Dialog", "Yes", "Oui"),
            ("Dialog", "No", "Non"),
            ("Menu", "Open", "Ouvrir"),
        ] {
            let mut unit = Unit::new(key, value);
            unit.context = context.to_string();
            unit.lang = Some("fr".to_string());
            store.add_unit(unit);
        }
        store.units[1].state = State::Unfinished;
        store.units[2].obsolete = true;
        store.units[2].occurrences.push(Occurrence {
            file: "menu.cpp".to_string(),
            line: 7,
        });

        let encoded = Format::encode_to_string(&store).unwrap();
        assert!(encoded.starts_with("<?xml"));
        let reparsed = Format::decode_str(&encoded, None).unwrap();
        assert_eq!(store, reparsed);
    }

    #[test]
    fn test_encode_groups_units_by_context_in_first_seen_order() {
        let mut store = Store::new();
        for (context, key) in [("B", "one"), ("A", "two"), ("B", "three")] {
            let mut unit = Unit::new(key, "x");
            unit.context = context.to_string();
            unit.lang = Some("de".to_string());
            store.add_unit(unit);
        }
        let encoded = Format::encode_to_string(&store).unwrap();
        let b_at = encoded.find("<name>B</name>").unwrap();
        let a_at = encoded.find("<name>A</name>").unwrap();
        assert!(b_at < a_at);
        // both B units live in the single B context
        assert_eq!(encoded.matches("<name>B</name>").count(), 1);
    }

    #[test]
    fn test_encode_empty_store_fails() {
        let error = Format::encode_to_string(&Store::new()).unwrap_err();
        assert!(matches!(error, Error::InconsistentLanguage(_)));
    }

    #[test]
    fn test_encode_mixed_languages_fails() {
        let mut store = Store::new();
        let mut first = Unit::new("a", "b");
        first.lang = Some("fr".to_string());
        let mut second = Unit::new("c", "d");
        second.lang = Some("de".to_string());
        store.add_unit(first);
        store.add_unit(second);
        let error = Format::encode_to_string(&store).unwrap_err();
        assert!(matches!(error, Error::InconsistentLanguage(_)));
    }

    #[test]
    fn test_encode_tolerates_regional_variants() {
        let mut store = Store::new();
        let mut first = Unit::new("a", "b");
        first.lang = Some("fr_FR".to_string());
        let mut second = Unit::new("c", "d");
        second.lang = Some("fr".to_string());
        store.add_unit(first);
        store.add_unit(second);
        let encoded = Format::encode_to_string(&store).unwrap();
        assert!(encoded.contains(r#"language="fr_FR""#));
    }

    #[test]
    fn test_escaped_content_round_trips() {
        let mut unit = Unit::new("5 < 6 & \"quoted\"", "cinq < six");
        unit.lang = Some("fr".to_string());
        let mut store = Store::new();
        store.add_unit(unit);
        let encoded = Format::encode_to_string(&store).unwrap();
        let reparsed = Format::decode_str(&encoded, None).unwrap();
        assert_eq!(store, reparsed);
    }
}
