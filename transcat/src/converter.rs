//! The conversion pipeline: decode input files, concatenate their
//! units, optionally re-key them against a template, and encode into
//! the format selected by the output path.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::{
    error::Error,
    formats,
    types::{Store, Unit},
};

/// Converts one or more translation files into a single output file.
///
/// Every path's format is resolved from its extension. Inputs are
/// decoded and their units concatenated in input order, then in-store
/// order. When a template is given, the combined units are re-keyed
/// against it (see [`merge_with_template`]). The result is encoded into
/// an in-memory buffer before anything is written, so no output file is
/// created or modified when any step fails.
///
/// # Example
///
/// ```rust,no_run
/// use transcat::convert;
/// // Merge two PO files into a Qt Linguist TS file.
/// convert("app.ts", &["app.po", "extra.po"], None)?;
/// # Ok::<(), transcat::Error>(())
/// ```
pub fn convert<P: AsRef<Path>>(
    output: P,
    inputs: &[P],
    template: Option<P>,
) -> Result<(), Error> {
    let mut combined = Store::new();
    for path in inputs {
        let store = read_store(path.as_ref())?;
        debug!(
            "decoded {} unit(s) from {}",
            store.units.len(),
            path.as_ref().display()
        );
        combined.units.extend(store.units);
    }

    let template_store = match &template {
        Some(path) => Some(read_store(path.as_ref())?),
        None => None,
    };

    let output_format = formats::resolve(&output)?;
    let store = match template_store {
        Some(template_store) => merge_with_template(combined, template_store),
        None => combined,
    };

    let encoded = output_format
        .encode_to_vec(&store)
        .map_err(|e| Error::in_file(&output, e))?;
    fs::write(&output, encoded).map_err(|e| Error::in_file(&output, e.into()))?;
    Ok(())
}

/// Re-keys a combined store against a template store.
///
/// Each template unit is reinterpreted as a mapping rule: its key is the
/// output property name and its original value is the text to match
/// combined units against. The match is an inner join on key; a matched
/// rule takes the combined unit's value, an unmatched rule keeps an
/// empty value. When several combined units share a key, the last match
/// in combined-store order wins (and a warning is logged).
pub fn merge_with_template(combined: Store, template: Store) -> Store {
    struct Rule {
        match_key: String,
        matched: bool,
        unit: Unit,
    }

    let mut rules: Vec<Rule> = template
        .units
        .into_iter()
        .map(|mut unit| {
            let match_key = std::mem::take(&mut unit.value);
            Rule {
                match_key,
                matched: false,
                unit,
            }
        })
        .collect();

    for unit in &combined.units {
        for rule in rules.iter_mut().filter(|rule| rule.match_key == unit.key) {
            if rule.matched {
                warn!(
                    "template key `{}` matches more than one input unit; keeping the last match in input order",
                    rule.unit.key
                );
            }
            rule.unit.value = unit.value.clone();
            rule.matched = true;
        }
    }

    Store {
        units: rules.into_iter().map(|rule| rule.unit).collect(),
        header: None,
    }
}

fn read_store(path: &Path) -> Result<Store, Error> {
    let format = formats::resolve(path)?;
    format
        .read_from(path, None)
        .map_err(|e| Error::in_file(path, e))
}
