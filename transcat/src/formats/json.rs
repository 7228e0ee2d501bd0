//! Support for flat JSON translation files.
//!
//! The file is a single object mapping keys to translated strings; the
//! reserved `@metadata` key holds header metadata. Decode yields units
//! in lexicographic key order (this format does not preserve the source
//! object's serialization order); encode writes keys in store order.

use std::io::{BufRead, Write};

use log::debug;
use serde_json::{Map, Value};

use crate::{
    error::Error,
    traits::Codec,
    types::{Header, Store, Unit},
};

const METADATA_KEY: &str = "@metadata";

/// Represents the flat JSON translation file format.
pub struct Format;

impl Codec for Format {
    fn decode_reader<R: BufRead>(reader: R, lang: Option<&str>) -> Result<Store, Error> {
        let object: Map<String, Value> = serde_json::from_reader(reader)?;
        let mut store = Store::new();

        let mut entries: Vec<(&String, &Value)> = object.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in entries {
            if key == METADATA_KEY {
                store.header = Some(Header::Json(value.clone()));
                continue;
            }
            let text = value.as_str().ok_or_else(|| {
                Error::Decode(format!("value for key `{}` is not a string", key))
            })?;
            let mut unit = Unit::new(key.clone(), text);
            unit.lang = lang.map(str::to_owned);
            store.add_unit(unit);
        }
        Ok(store)
    }

    /// Encodes keys in store order. Only key and value are
    /// representable; all other unit metadata is dropped by design.
    fn encode_writer<W: Write>(store: &Store, writer: W) -> Result<(), Error> {
        let mut object = Map::new();
        match &store.header {
            Some(Header::Json(metadata)) => {
                object.insert(METADATA_KEY.to_string(), metadata.clone());
            }
            Some(Header::Fields(_)) => debug!("JSON encode: dropping a non-JSON header block"),
            None => {}
        }

        for unit in &store.units {
            if object.contains_key(&unit.key) {
                debug!(
                    "JSON encode: duplicate key `{}` dropped (first write wins)",
                    unit.key
                );
                continue;
            }
            object.insert(unit.key.clone(), Value::String(unit.value.clone()));
        }

        serde_json::to_writer_pretty(writer, &Value::Object(object))?;
        Ok(())
    }
}
