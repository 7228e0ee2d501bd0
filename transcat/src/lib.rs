#![forbid(unsafe_code)]
//! Translation-file interchange toolkit.
//!
//! Reads localization data from gettext PO/POT, Qt Linguist TS, flat
//! JSON, Java-style Properties, TMX, and Mozilla DTD files into one
//! unified model ([`Store`] of [`Unit`]s) and writes it back out to any
//! of them, optionally re-keyed against a template file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use transcat::{convert, formats::resolve, traits::Codec};
//!
//! // Convert between formats automatically, merging several inputs
//! convert("app_fr.json", &["app_fr.po", "extra_fr.po"], None)?;
//!
//! // Or work with the unified Store model
//! let format = resolve("app_fr.po")?;
//! let store = format.read_from("app_fr.po", None)?;
//! transcat::formats::ts::Format::write_to(&store, "app_fr.ts")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Formats
//!
//! - **gettext PO/POT**: block-oriented catalogs with contexts, plural
//!   forms, fuzzy/obsolete markers, and source locations
//! - **Qt Linguist TS**: XML sources grouped by context
//! - **JSON**: flat objects with an optional `@metadata` header
//! - **Java Properties**: line-oriented `key=value` pairs
//! - **TMX**: translation memories (decode only)
//! - **DTD**: XUL-style `<!ENTITY>` declarations
//!
//! A decode failure anywhere aborts a conversion whole: partial output
//! is never written, because silently dropping translation data is
//! worse than failing loudly.

pub mod converter;
pub mod error;
pub mod formats;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    converter::{convert, merge_with_template},
    error::Error,
    formats::{FormatType, resolve},
    traits::Codec,
    types::{Header, Occurrence, State, Store, Unit},
};
