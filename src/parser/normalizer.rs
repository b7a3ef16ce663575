//! Stats payload normalizer.
//!
//! Accepts every payload shape bundlers produce and flattens it into an
//! ordered list of [`CompilationResult`]:
//! - a single compilation object
//! - an object whose compilations live in a `children` array (multi-config builds)
//! - a top-level array of independent compilations (array-style config)
//!
//! Child compilations (worker bundles and similar) follow their parent,
//! depth first. Nothing downstream branches on the original shape.

use super::schema::{CompilationResult, Entrypoint, StatsAsset, StatsChunk};
use crate::utils::config::COMPILATION_FIELD_NAMES;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Normalized payload
#[derive(Debug, Default)]
pub struct NormalizedStats {
    /// Compilations in payload order
    pub compilations: Vec<CompilationResult>,

    /// Entries that could not be parsed and were left out
    pub skipped: Vec<ParseError>,
}

/// Normalize a stats payload given as JSON text
///
/// # Errors
/// * `ParseError::JsonError` - text is not JSON
/// * see [`normalize_stats`]
pub fn parse_stats_str(raw: &str) -> Result<NormalizedStats, ParseError> {
    let payload: Value = serde_json::from_str(raw)?;
    normalize_stats(&payload)
}

/// Normalize a stats payload into an ordered list of compilations
///
/// **Public** - main entry point for parsing
///
/// For a multi-entry payload an unparseable entry is skipped and recorded in
/// [`NormalizedStats::skipped`]; the rest are still processed.
///
/// # Errors
/// * `ParseError::InvalidPayload` - payload is not an object or array, or a
///   single-compilation payload lacks chunk/module/asset structure
/// * `ParseError::NoCompilations` - no entry of a multi-entry payload was usable
pub fn normalize_stats(payload: &Value) -> Result<NormalizedStats, ParseError> {
    let mut normalized = NormalizedStats::default();

    match payload {
        Value::Array(entries) => {
            debug!("Stats payload is an array of {} compilations", entries.len());
            for (index, entry) in entries.iter().enumerate() {
                let label = format!("payload[{}]", index);
                if let Err(e) = collect_compilations(entry, &label, &mut normalized) {
                    warn!("Skipping stats entry: {}", e);
                    normalized.skipped.push(e);
                }
            }

            if normalized.compilations.is_empty() {
                return Err(ParseError::NoCompilations {
                    entries: entries.len(),
                });
            }
        }

        Value::Object(_) => {
            collect_compilations(payload, "payload", &mut normalized)?;

            if normalized.compilations.is_empty() {
                return Err(ParseError::NoCompilations {
                    entries: normalized.skipped.len(),
                });
            }
        }

        _ => {
            return Err(ParseError::invalid(
                "payload",
                "a JSON object or an array of compilation objects",
            ))
        }
    }

    debug!(
        "Normalized {} compilations ({} skipped)",
        normalized.compilations.len(),
        normalized.skipped.len()
    );

    Ok(normalized)
}

/// Push the compilation at `value` and its child compilations, depth first
///
/// **Private** - recursive helper for normalize_stats
fn collect_compilations(
    value: &Value,
    label: &str,
    normalized: &mut NormalizedStats,
) -> Result<(), ParseError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ParseError::invalid(label, "a compilation object"))?;

    let children = match obj.get("children") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(children)) => children.as_slice(),
        Some(_) => return Err(ParseError::invalid(label, "`children` to be an array")),
    };

    let has_records = COMPILATION_FIELD_NAMES
        .iter()
        .any(|field| obj.get(*field).is_some_and(Value::is_array));

    if !has_records && children.is_empty() {
        return Err(ParseError::invalid(
            label,
            "`assets`, `chunks` or `modules` arrays, or a `children` array",
        ));
    }

    // An object without its own assets but with children is only a container
    let has_own_assets = obj
        .get("assets")
        .and_then(Value::as_array)
        .is_some_and(|assets| !assets.is_empty());

    if has_records && (has_own_assets || children.is_empty()) {
        normalized.compilations.push(parse_compilation(obj, label)?);
    } else {
        debug!("{} is a container of {} compilations", label, children.len());
    }

    for (index, child) in children.iter().enumerate() {
        let child_label = format!("{}.children[{}]", label, index);
        if let Err(e) = collect_compilations(child, &child_label, normalized) {
            warn!("Skipping child compilation: {}", e);
            normalized.skipped.push(e);
        }
    }

    Ok(())
}

/// Build a CompilationResult from one compilation object
///
/// **Private** - internal helper for collect_compilations
fn parse_compilation(obj: &Map<String, Value>, label: &str) -> Result<CompilationResult, ParseError> {
    let assets: Vec<StatsAsset> = parse_records(obj, "assets", label)?;
    let chunks: Vec<StatsChunk> = parse_records(obj, "chunks", label)?;

    let modules = match obj.get("modules") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(modules)) => modules.clone(),
        Some(_) => return Err(ParseError::invalid(label, "`modules` to be an array")),
    };

    let entrypoints = parse_entrypoints(obj, label);

    debug!(
        "{}: {} assets, {} chunks, {} modules",
        label,
        assets.len(),
        chunks.len(),
        modules.len()
    );

    Ok(CompilationResult {
        entry: label.to_string(),
        name: obj.get("name").and_then(Value::as_str).map(str::to_string),
        assets,
        chunks,
        modules,
        entrypoints,
    })
}

/// Parse an array field record by record
///
/// **Private** - a malformed record is logged and skipped, the field itself
/// must still be an array
fn parse_records<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    field: &str,
    label: &str,
) -> Result<Vec<T>, ParseError> {
    let items = match obj.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ParseError::invalid(
                label,
                format!("`{}` to be an array", field),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                // Log but don't fail - sibling records are still usable
                warn!("{}: skipping malformed {}[{}]: {}", label, field, index, e);
            }
        }
    }

    Ok(records)
}

/// Parse entrypoints, keyed by entrypoint name
///
/// **Private** - entrypoints only feed report metadata, so a bad one is dropped
fn parse_entrypoints(obj: &Map<String, Value>, label: &str) -> BTreeMap<String, Entrypoint> {
    let Some(entries) = obj.get("entrypoints").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(key, value)| match Entrypoint::deserialize(value) {
            Ok(entrypoint) => {
                let name = entrypoint.name.clone().unwrap_or_else(|| key.clone());
                Some((name, entrypoint))
            }
            Err(e) => {
                warn!("{}: skipping malformed entrypoint `{}`: {}", label, key, e);
                None
            }
        })
        .collect()
}
