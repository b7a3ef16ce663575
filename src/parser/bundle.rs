//! Emitted bundle parser.
//!
//! Locates the source text of each module inside an emitted JavaScript bundle.
//! Bundlers store modules as a list of wrapper functions, either an object
//! keyed by module id or an array indexed by module id:
//!
//! ```text
//! (self.webpackChunk = self.webpackChunk || []).push([[1], { 42: (e, t, n) => { ... } }]);
//! (function (modules) { /* runtime */ })([function (module) { ... }, , function () { ... }]);
//! ```
//!
//! Everything outside the module wrappers is the bundle's runtime source.

use crate::utils::error::SourceError;
use indexmap::IndexMap;
use log::debug;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrayExpression, ArrayExpressionElement, Expression, ObjectExpression, ObjectPropertyKind,
    PropertyKey,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use std::collections::HashMap;

/// Sources located in one emitted bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSources {
    /// Bundle text outside of any module wrapper
    pub runtime_src: String,

    /// Module wrapper source keyed by module id (as written in the bundle)
    pub modules: HashMap<String, String>,
}

impl BundleSources {
    /// Source of one module, looked up by its stats id
    pub fn module_source(&self, id: &impl ToString) -> Option<&str> {
        self.modules.get(&id.to_string()).map(String::as_str)
    }
}

/// Parse an emitted bundle and extract per-module sources
///
/// **Public** - used by bundle source providers
///
/// # Arguments
/// * `asset_name` - File name, used to pick script or module parsing
/// * `src` - Bundle contents
///
/// # Returns
/// Located module sources. A bundle without a module list (everything
/// inlined into the runtime) has no modules and its whole text as runtime source.
///
/// # Errors
/// * `SourceError::Syntax` - the parser gave up on the file
pub fn parse_bundle(asset_name: &str, src: &str) -> Result<BundleSources, SourceError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(asset_name).unwrap_or_default();
    let ret = Parser::new(&allocator, src, source_type).parse();

    if ret.panicked {
        return Err(SourceError::Syntax {
            asset: asset_name.to_string(),
            message: format!("{} unrecoverable syntax errors", ret.errors.len()),
        });
    }

    if !ret.errors.is_empty() {
        // Recoverable errors (e.g. odd dynamic requires) leave a usable AST
        debug!("{}: {} recoverable syntax errors", asset_name, ret.errors.len());
    }

    let mut finder = ModuleListFinder::default();
    finder.visit_program(&ret.program);

    if finder.modules.is_empty() {
        if !ret.errors.is_empty() {
            return Err(SourceError::Syntax {
                asset: asset_name.to_string(),
                message: format!("{} syntax errors and no module list", ret.errors.len()),
            });
        }

        debug!("{}: no module list, sources are all runtime", asset_name);
        return Ok(BundleSources {
            runtime_src: src.to_string(),
            modules: HashMap::new(),
        });
    }

    let modules = finder
        .modules
        .iter()
        .map(|(id, span)| (id.clone(), slice(src, *span).to_string()))
        .collect();

    let mut spans: Vec<Span> = finder.modules.values().copied().collect();
    spans.sort_by_key(|span| span.start);

    debug!("{}: located {} module sources", asset_name, spans.len());

    Ok(BundleSources {
        runtime_src: runtime_source(src, &spans),
        modules,
    })
}

/// AST visitor collecting module wrapper spans.
///
/// Does not descend into a module list once found, so objects inside module
/// code are never mistaken for module lists.
#[derive(Default)]
struct ModuleListFinder {
    /// First location wins when an id appears twice
    modules: IndexMap<String, Span>,
}

impl ModuleListFinder {
    fn record(&mut self, entries: Vec<(String, Span)>) {
        for (id, span) in entries {
            self.modules.entry(id).or_insert(span);
        }
    }
}

impl<'a> Visit<'a> for ModuleListFinder {
    fn visit_object_expression(&mut self, obj: &ObjectExpression<'a>) {
        match modules_from_object(obj) {
            Some(entries) => self.record(entries),
            None => walk::walk_object_expression(self, obj),
        }
    }

    fn visit_array_expression(&mut self, arr: &ArrayExpression<'a>) {
        match modules_from_array(arr) {
            Some(entries) => self.record(entries),
            None => walk::walk_array_expression(self, arr),
        }
    }
}

/// `{ 1: function () {}, "./a.js": () => {} }`
///
/// Identifier keys are rejected: runtime helpers build objects like
/// `{ a: () => x }` that must not be read as module lists.
fn modules_from_object(obj: &ObjectExpression<'_>) -> Option<Vec<(String, Span)>> {
    if obj.properties.is_empty() {
        return None;
    }

    obj.properties
        .iter()
        .map(|property| {
            let ObjectPropertyKind::ObjectProperty(property) = property else {
                return None;
            };

            let id = match &property.key {
                PropertyKey::NumericLiteral(lit) => format_numeric_id(lit.value),
                PropertyKey::StringLiteral(lit) => lit.value.to_string(),
                _ => return None,
            };

            wrapper_span(&property.value).map(|span| (id, span))
        })
        .collect()
}

/// `[function () {}, , function () {}]`, holes allowed
fn modules_from_array(arr: &ArrayExpression<'_>) -> Option<Vec<(String, Span)>> {
    let mut entries = Vec::new();

    for (index, element) in arr.elements.iter().enumerate() {
        let span = match element {
            ArrayExpressionElement::Elision(_) => continue,
            ArrayExpressionElement::FunctionExpression(func) => func.span,
            ArrayExpressionElement::ArrowFunctionExpression(arrow) => arrow.span,
            _ => return None,
        };
        entries.push((index.to_string(), span));
    }

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

fn wrapper_span(expr: &Expression<'_>) -> Option<Span> {
    match expr {
        Expression::FunctionExpression(func) => Some(func.span),
        Expression::ArrowFunctionExpression(arrow) => Some(arrow.span),
        Expression::ParenthesizedExpression(paren) => wrapper_span(&paren.expression),
        _ => None,
    }
}

/// Numeric keys are written without a fractional part (`42`, not `42.0`)
fn format_numeric_id(value: f64) -> String {
    if value.fract() == 0.0 && value >= 0.0 && value < u64::MAX as f64 {
        format!("{}", value as u64)
    } else {
        value.to_string()
    }
}

fn slice(src: &str, span: Span) -> &str {
    src.get(span.start as usize..span.end as usize).unwrap_or_default()
}

/// Concatenate the text between module spans (spans sorted by start)
fn runtime_source(src: &str, spans: &[Span]) -> String {
    let mut runtime = String::with_capacity(src.len());
    let mut cursor = 0usize;

    for span in spans {
        let start = span.start as usize;
        if start > cursor {
            runtime.push_str(src.get(cursor..start).unwrap_or_default());
        }
        cursor = cursor.max(span.end as usize);
    }

    if cursor < src.len() {
        runtime.push_str(src.get(cursor..).unwrap_or_default());
    }

    runtime
}
