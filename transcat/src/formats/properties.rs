//! Support for Java-style `.properties` files.
//!
//! Line-oriented `key=value` pairs with `#`/`!` comments, backslash line
//! continuations, and `\uXXXX` escapes. A run of comment lines
//! immediately preceding a property is attached to it as its comment.

use std::fs::File;
use std::io::{BufRead, Read, Write};
use std::path::Path;

use crate::{
    error::Error,
    traits::Codec,
    types::{Store, Unit},
};

/// Represents the Java Properties file format.
pub struct Format;

impl Codec for Format {
    fn decode_reader<R: BufRead>(reader: R, lang: Option<&str>) -> Result<Store, Error> {
        let mut store = Store::new();
        let mut comment_run: Vec<String> = Vec::new();
        let mut lines = reader.lines();
        let mut line_no = 0usize;

        while let Some(line) = lines.next() {
            let line = line?;
            line_no += 1;
            let trimmed = line.trim_start();

            if trimmed.is_empty() {
                // a blank line breaks the comment run; a run with no
                // following property is dropped
                comment_run.clear();
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix(['#', '!']) {
                comment_run.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
                continue;
            }

            let mut logical = trimmed.to_string();
            while ends_with_odd_backslashes(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => {
                        line_no += 1;
                        let next = next?;
                        logical.push_str(next.trim_start());
                    }
                    None => {
                        return Err(Error::decode_at(line_no, "line continuation at end of file"));
                    }
                }
            }

            let (raw_key, raw_value) = split_key_value(&logical);
            let mut unit = Unit::new(
                unescape(raw_key, line_no)?,
                unescape(raw_value, line_no)?,
            );
            unit.lang = lang.map(str::to_owned);
            if !comment_run.is_empty() {
                unit.comment = Some(comment_run.join("\n"));
                comment_run.clear();
            }
            store.add_unit(unit);
        }
        Ok(store)
    }

    fn encode_writer<W: Write>(store: &Store, mut writer: W) -> Result<(), Error> {
        let mut out = String::new();
        for unit in &store.units {
            if let Some(comment) = &unit.comment {
                for line in comment.lines() {
                    out.push_str("# ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            out.push_str(&escape(&unit.key, true));
            out.push('=');
            out.push_str(&escape(&unit.value, false));
            out.push('\n');
        }
        writer.write_all(out.as_bytes()).map_err(Error::Io)
    }

    /// Override default file reading to support BOM-aware decoding
    /// (properties files in the wild are a mix of encodings).
    fn read_from<P: AsRef<Path>>(path: P, lang: Option<&str>) -> Result<Store, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;
        Self::decode_str(&decoded, lang)
    }
}

fn ends_with_odd_backslashes(s: &str) -> bool {
    s.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped `=`, `:` or whitespace;
/// at most one `=`/`:` after the key is consumed as the separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split_at = None;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                split_at = Some(i);
                break;
            }
            _ => {}
        }
    }

    let Some(i) = split_at else {
        return (line, "");
    };
    let key = &line[..i];
    let mut rest = line[i..].trim_start_matches([' ', '\t', '\u{c}']);
    if let Some(after) = rest.strip_prefix(['=', ':']) {
        rest = after.trim_start_matches([' ', '\t', '\u{c}']);
    }
    (key, rest)
}

fn unescape(s: &str, line_no: usize) -> Result<String, Error> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let code = read_code_unit(&mut chars, line_no)?;
                if (0xD800..=0xDBFF).contains(&code) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(Error::decode_at(
                            line_no,
                            "unpaired high surrogate in \\u escape",
                        ));
                    }
                    let low = read_code_unit(&mut chars, line_no)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(Error::decode_at(
                            line_no,
                            "unpaired high surrogate in \\u escape",
                        ));
                    }
                    let combined =
                        0x10000 + ((u32::from(code) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    let c = char::from_u32(combined).ok_or_else(|| {
                        Error::decode_at(line_no, "invalid \\u escape pair")
                    })?;
                    out.push(c);
                } else if (0xDC00..=0xDFFF).contains(&code) {
                    return Err(Error::decode_at(
                        line_no,
                        "unpaired low surrogate in \\u escape",
                    ));
                } else {
                    let c = char::from_u32(u32::from(code)).ok_or_else(|| {
                        Error::decode_at(line_no, "invalid \\u escape")
                    })?;
                    out.push(c);
                }
            }
            // Java drops the backslash in front of any other character
            Some(other) => out.push(other),
            None => return Err(Error::decode_at(line_no, "dangling escape character")),
        }
    }
    Ok(out)
}

fn read_code_unit(chars: &mut std::str::Chars<'_>, line_no: usize) -> Result<u16, Error> {
    let mut code: u32 = 0;
    for _ in 0..4 {
        let c = chars
            .next()
            .ok_or_else(|| Error::decode_at(line_no, "truncated \\u escape"))?;
        let digit = c.to_digit(16).ok_or_else(|| {
            Error::decode_at(line_no, format!("invalid hex digit `{}` in \\u escape", c))
        })?;
        code = code * 16 + digit;
    }
    Ok(code as u16)
}

/// Escapes a key or value for output. Output stays ASCII: non-ASCII and
/// control characters become `\uXXXX` code units. Keys additionally
/// escape every space and separator character; values only a leading
/// space.
fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut leading = true;
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || leading => out.push_str("\\ "),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
        leading = false;
    }
    out
}
