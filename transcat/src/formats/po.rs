//! Support for gettext Portable Object (`.po`/`.pot`) translation files.
//!
//! The grammar is block-oriented: entries are separated by blank lines,
//! and every string field may span multiple physical lines that are
//! concatenated after unescaping. A block whose `msgid` decodes to the
//! empty string is the file header, not a translation entry.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{
    error::Error,
    traits::Codec,
    types::{Header, Occurrence, State, Store, Unit},
};

lazy_static! {
    static ref MSGSTR_INDEX_REGEX: Regex = Regex::new(r"^msgstr\[(\d+)\]").unwrap();
}

const MAX_PLURAL_INDEX: u8 = 9;

/// Represents the gettext PO file format.
pub struct Format;

/// Which multi-line string field a bare `"..."` continuation extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OpenField {
    #[default]
    None,
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr,
    PluralForm(u8),
}

/// One blank-line-delimited block, accumulated field by field.
#[derive(Debug, Default)]
struct Block {
    translator_comments: Vec<String>,
    extracted_comments: Vec<String>,
    occurrences: Vec<Occurrence>,
    flags: Vec<String>,
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    plural_forms: BTreeMap<u8, String>,
    obsolete: bool,
}

impl Block {
    fn is_empty(&self) -> bool {
        self.translator_comments.is_empty()
            && self.extracted_comments.is_empty()
            && self.occurrences.is_empty()
            && self.flags.is_empty()
            && self.msgctxt.is_none()
            && self.msgid.is_none()
            && self.msgid_plural.is_none()
            && self.msgstr.is_none()
            && self.plural_forms.is_empty()
    }
}

impl Codec for Format {
    fn decode_reader<R: BufRead>(reader: R, lang: Option<&str>) -> Result<Store, Error> {
        let mut store = Store::new();
        let mut header_lang: Option<String> = None;
        let mut block = Block::default();
        let mut open = OpenField::None;
        let mut line_no = 0usize;

        for line in reader.lines() {
            let line = line?;
            line_no += 1;
            let mut line = line.trim_end();

            if line.is_empty() {
                if !block.is_empty() {
                    flush_block(
                        std::mem::take(&mut block),
                        &mut store,
                        &mut header_lang,
                        line_no,
                    )?;
                }
                open = OpenField::None;
                continue;
            }

            if let Some(rest) = line.strip_prefix("#~") {
                block.obsolete = true;
                line = rest.strip_prefix(' ').unwrap_or(rest);
            }

            if let Some(rest) = line.strip_prefix("#,") {
                for flag in rest.split(',') {
                    let flag = flag.trim();
                    if !flag.is_empty() {
                        block.flags.push(flag.to_string());
                    }
                }
                open = OpenField::None;
            } else if let Some(rest) = line.strip_prefix("#:") {
                parse_occurrences(rest, line_no, &mut block.occurrences)?;
                open = OpenField::None;
            } else if let Some(rest) = line.strip_prefix("#.") {
                let rest = rest.strip_prefix(' ').unwrap_or(rest);
                block.extracted_comments.push(rest.to_string());
                open = OpenField::None;
            } else if line.starts_with("#|") {
                // previous-msgid annotations are not modeled
                open = OpenField::None;
            } else if let Some(rest) = line.strip_prefix('#') {
                let rest = rest.strip_prefix(' ').unwrap_or(rest);
                block.translator_comments.push(rest.to_string());
                open = OpenField::None;
            } else if line.starts_with('"') {
                let text = parse_string(line, line_no)?;
                append_continuation(&mut block, open, &text, line_no)?;
            } else if let Some(rest) = line.strip_prefix("msgctxt") {
                if block.msgctxt.is_some() {
                    return Err(Error::decode_at(line_no, "duplicate msgctxt"));
                }
                block.msgctxt = Some(parse_string(rest, line_no)?);
                open = OpenField::Msgctxt;
            } else if let Some(rest) = line.strip_prefix("msgid_plural") {
                if block.msgid_plural.is_some() {
                    return Err(Error::decode_at(line_no, "duplicate msgid_plural"));
                }
                block.msgid_plural = Some(parse_string(rest, line_no)?);
                open = OpenField::MsgidPlural;
            } else if line.starts_with("msgstr[") {
                let captures = MSGSTR_INDEX_REGEX
                    .captures(line)
                    .ok_or_else(|| Error::decode_at(line_no, "malformed plural index"))?;
                let index: u8 = captures[1]
                    .parse()
                    .map_err(|_| Error::decode_at(line_no, "malformed plural index"))?;
                if index > MAX_PLURAL_INDEX {
                    return Err(Error::decode_at(
                        line_no,
                        format!("plural index {} out of range", index),
                    ));
                }
                let rest = &line[captures[0].len()..];
                let text = parse_string(rest, line_no)?;
                if block.plural_forms.insert(index, text).is_some() {
                    return Err(Error::decode_at(
                        line_no,
                        format!("duplicate plural index {}", index),
                    ));
                }
                open = OpenField::PluralForm(index);
            } else if let Some(rest) = line.strip_prefix("msgid") {
                if block.msgid.is_some() {
                    return Err(Error::decode_at(
                        line_no,
                        "unexpected msgid (missing blank line between entries?)",
                    ));
                }
                block.msgid = Some(parse_string(rest, line_no)?);
                open = OpenField::Msgid;
            } else if let Some(rest) = line.strip_prefix("msgstr") {
                if block.msgstr.is_some() {
                    return Err(Error::decode_at(line_no, "duplicate msgstr"));
                }
                block.msgstr = Some(parse_string(rest, line_no)?);
                open = OpenField::Msgstr;
            } else {
                return Err(Error::decode_at(
                    line_no,
                    format!("unrecognized line `{}`", line),
                ));
            }
        }

        if !block.is_empty() {
            flush_block(block, &mut store, &mut header_lang, line_no + 1)?;
        }

        let effective = lang.map(str::to_owned).or(header_lang);
        if let Some(effective) = effective {
            for unit in &mut store.units {
                unit.lang = Some(effective.clone());
            }
        }
        debug!("decoded {} PO unit(s)", store.units.len());
        Ok(store)
    }

    fn encode_writer<W: Write>(store: &Store, mut writer: W) -> Result<(), Error> {
        let mut out = String::new();
        let mut first = true;

        match &store.header {
            Some(Header::Fields(fields)) => {
                out.push_str("msgid \"\"\nmsgstr \"\"\n");
                for (key, value) in fields {
                    out.push_str(&format!("\"{}\"\n", escape(&format!("{}: {}\n", key, value))));
                }
                first = false;
            }
            Some(Header::Json(_)) => debug!("PO encode: dropping a non-PO header block"),
            None => {}
        }

        for unit in &store.units {
            if !first {
                out.push('\n');
            }
            first = false;
            encode_unit(&mut out, unit);
        }

        writer.write_all(out.as_bytes()).map_err(Error::Io)
    }
}

fn append_continuation(
    block: &mut Block,
    open: OpenField,
    text: &str,
    line_no: usize,
) -> Result<(), Error> {
    let field = match open {
        OpenField::Msgctxt => block.msgctxt.as_mut(),
        OpenField::Msgid => block.msgid.as_mut(),
        OpenField::MsgidPlural => block.msgid_plural.as_mut(),
        OpenField::Msgstr => block.msgstr.as_mut(),
        OpenField::PluralForm(index) => block.plural_forms.get_mut(&index),
        OpenField::None => None,
    };
    match field {
        Some(field) => {
            field.push_str(text);
            Ok(())
        }
        None => Err(Error::decode_at(
            line_no,
            "continuation line without a preceding string field",
        )),
    }
}

fn flush_block(
    block: Block,
    store: &mut Store,
    header_lang: &mut Option<String>,
    line_no: usize,
) -> Result<(), Error> {
    let Some(msgid) = block.msgid else {
        if block.msgstr.is_some() || !block.plural_forms.is_empty() {
            return Err(Error::decode_at(line_no, "msgstr without msgid"));
        }
        // dangling comment block, nothing to keep
        return Ok(());
    };

    if msgid.is_empty() && block.msgctxt.is_none() && !block.obsolete {
        if store.header.is_some() {
            return Err(Error::decode_at(line_no, "duplicate header entry"));
        }
        let fields = parse_header_fields(block.msgstr.as_deref().unwrap_or(""));
        *header_lang = fields
            .iter()
            .find(|(key, _)| key == "Language")
            .map(|(_, value)| value.clone())
            .filter(|value| !value.is_empty());
        store.header = Some(Header::Fields(fields));
        return Ok(());
    }

    let mut unit = Unit::new(msgid, block.msgstr.unwrap_or_default());
    unit.context = block.msgctxt.unwrap_or_default();
    if !block.extracted_comments.is_empty() {
        unit.comment = Some(block.extracted_comments.join("\n"));
    }
    if !block.translator_comments.is_empty() {
        unit.translator_comment = Some(block.translator_comments.join("\n"));
    }
    unit.occurrences = block.occurrences;
    unit.obsolete = block.obsolete;
    unit.plural_id = block.msgid_plural;
    unit.plurals = block.plural_forms;
    for flag in block.flags {
        if flag == "fuzzy" {
            unit.state = State::Unfinished;
        } else {
            unit.format_flags.push(flag);
        }
    }
    store.add_unit(unit);
    Ok(())
}

/// Splits the header `msgstr` into ordered `Key: value` fields. A line
/// without a colon continues the previous field's value.
fn parse_header_fields(msgstr: &str) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();
    for line in msgstr.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) => fields.push((key.trim().to_string(), value.trim().to_string())),
            None => {
                if let Some((_, value)) = fields.last_mut() {
                    value.push('\n');
                    value.push_str(line.trim());
                }
            }
        }
    }
    fields
}

fn parse_occurrences(
    rest: &str,
    line_no: usize,
    out: &mut Vec<Occurrence>,
) -> Result<(), Error> {
    for token in rest.split_whitespace() {
        let (file, line) = token
            .rsplit_once(':')
            .ok_or_else(|| Error::decode_at(line_no, format!("malformed location `{}`", token)))?;
        let line = line
            .parse::<u32>()
            .map_err(|_| Error::decode_at(line_no, format!("malformed location `{}`", token)))?;
        out.push(Occurrence {
            file: file.to_string(),
            line,
        });
    }
    Ok(())
}

/// Parses one double-quoted string literal, decoding backslash escapes.
fn parse_string(s: &str, line_no: usize) -> Result<String, Error> {
    let s = s.trim_start();
    let mut chars = s.chars();
    if chars.next() != Some('"') {
        return Err(Error::decode_at(line_no, "expected string literal"));
    }
    let mut out = String::new();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                closed = true;
                break;
            }
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return Err(Error::decode_at(line_no, "unterminated string")),
            },
            other => out.push(other),
        }
    }
    if !closed {
        return Err(Error::decode_at(line_no, "unterminated string"));
    }
    let rest = chars.as_str().trim();
    if !rest.is_empty() {
        return Err(Error::decode_at(
            line_no,
            format!("unexpected trailing content `{}`", rest),
        ));
    }
    Ok(out)
}

fn encode_unit(out: &mut String, unit: &Unit) {
    if let Some(tcomment) = &unit.translator_comment {
        for line in tcomment.lines() {
            out.push_str(&format!("# {}\n", line));
        }
    }
    if let Some(comment) = &unit.comment {
        for line in comment.lines() {
            out.push_str(&format!("#. {}\n", line));
        }
    }
    for occurrence in &unit.occurrences {
        out.push_str(&format!("#: {}:{}\n", occurrence.file, occurrence.line));
    }
    let mut flags = unit.format_flags.clone();
    if unit.state == State::Unfinished {
        flags.push("fuzzy".to_string());
    }
    if !flags.is_empty() {
        out.push_str(&format!("#, {}\n", flags.join(", ")));
    }

    let prefix = if unit.obsolete { "#~ " } else { "" };
    if !unit.context.is_empty() {
        out.push_str(&format!("{}msgctxt \"{}\"\n", prefix, escape(&unit.context)));
    }
    out.push_str(&format!("{}msgid \"{}\"\n", prefix, escape(&unit.key)));
    if let Some(plural_id) = &unit.plural_id {
        out.push_str(&format!(
            "{}msgid_plural \"{}\"\n",
            prefix,
            escape(plural_id)
        ));
        for (index, form) in &unit.plurals {
            out.push_str(&format!(
                "{}msgstr[{}] \"{}\"\n",
                prefix,
                index,
                escape(form)
            ));
        }
    } else {
        out.push_str(&format!("{}msgstr \"{}\"\n", prefix, escape(&unit.value)));
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}
