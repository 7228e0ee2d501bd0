//! All error types for the transcat crate.
//!
//! These are returned from all fallible operations (decoding, encoding,
//! conversion, etc.).

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("inconsistent language: {0}")]
    InconsistentLanguage(String),

    #[error("{path}: {source}")]
    File { path: String, source: Box<Error> },
}

impl Error {
    /// Creates a decode error pinned to a source line.
    pub(crate) fn decode_at(line: usize, message: impl Into<String>) -> Self {
        Error::Decode(format!("line {}: {}", line, message.into()))
    }

    /// Wraps an error with the path of the file it occurred in.
    pub(crate) fn in_file(path: impl AsRef<Path>, source: Error) -> Self {
        Error::File {
            path: path.as_ref().display().to_string(),
            source: Box::new(source),
        }
    }
}
