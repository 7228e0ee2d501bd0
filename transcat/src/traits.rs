//! The shared codec capability interface.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::{error::Error, types::Store};

/// A decoder/encoder pair for one on-disk translation format.
///
/// Every format implements the same two operations over readers and
/// writers; path and string conveniences are provided. `lang` supplies
/// the default language for units in formats that carry none of their
/// own (JSON, Properties, DTD) and overrides the file's own declaration
/// elsewhere.
///
/// # Example
///
/// ```rust,no_run
/// use transcat::traits::Codec;
/// let store = transcat::formats::po::Format::read_from("fr.po", None)?;
/// transcat::formats::json::Format::write_to(&store, "fr.json")?;
/// # Ok::<(), transcat::Error>(())
/// ```
pub trait Codec {
    /// Decode one file's contents from any reader.
    fn decode_reader<R: BufRead>(reader: R, lang: Option<&str>) -> Result<Store, Error>;

    /// Encode a store to any writer. Encoding never mutates the store.
    fn encode_writer<W: Write>(store: &Store, writer: W) -> Result<(), Error>;

    /// Decode from a string.
    fn decode_str(s: &str, lang: Option<&str>) -> Result<Store, Error> {
        Self::decode_reader(Cursor::new(s), lang)
    }

    /// Decode from a file path.
    fn read_from<P: AsRef<Path>>(path: P, lang: Option<&str>) -> Result<Store, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        Self::decode_reader(BufReader::new(file), lang)
    }

    /// Encode into an in-memory buffer.
    fn encode_to_vec(store: &Store) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        Self::encode_writer(store, &mut buf)?;
        Ok(buf)
    }

    /// Encode into a string.
    fn encode_to_string(store: &Store) -> Result<String, Error> {
        let buf = Self::encode_to_vec(store)?;
        String::from_utf8(buf)
            .map_err(|e| Error::Encode(format!("output is not valid UTF-8: {}", e)))
    }

    /// Encode to a file path.
    fn write_to<P: AsRef<Path>>(store: &Store, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        Self::encode_writer(store, BufWriter::new(file))
    }
}
