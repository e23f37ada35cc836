//! `$ref` resolution and rewriting.
//!
//! A reference resolves to a definition by the last segment of its pointer,
//! so `#/$defs/Foo`, `#/definitions/Foo` and `#/components/schemas/Foo` all
//! name `Foo`. Rewriting is a single structural pass over the tree and never
//! dereferences anything, which keeps self-referential definitions safe.

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::Value;

use crate::types::{DEFINITIONS_PREFIX, REF_KEY};

/// Returns the definition name a pointer resolves to.
///
/// JSON-Pointer escapes (`~1` for `/`, `~0` for `~`) in the last segment are
/// decoded.
///
/// # Examples
///
/// ```
/// use model_typegen_core::reference_name;
///
/// assert_eq!(reference_name("#/$defs/Foo"), "Foo");
/// assert_eq!(reference_name("#/definitions/a~1b"), "a/b");
/// assert_eq!(reference_name("Bare"), "Bare");
/// ```
pub fn reference_name(pointer: &str) -> Cow<'_, str> {
    let segment = pointer.rsplit('/').next().unwrap_or(pointer);
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Builds the combined-namespace pointer for a definition name.
pub fn definition_pointer(name: &str) -> String {
    let escaped = name.replace('~', "~0").replace('/', "~1");
    format!("{DEFINITIONS_PREFIX}{escaped}")
}

/// Points every `$ref` in `document` into the combined namespace.
///
/// Returns the number of references rewritten.
///
/// # Examples
///
/// ```
/// use model_typegen_core::rewrite_references;
/// use serde_json::json;
///
/// let mut doc = json!({
///     "properties": {
///         "items": {"type": "array", "items": {"$ref": "#/$defs/Item"}}
///     }
/// });
/// assert_eq!(rewrite_references(&mut doc), 1);
/// assert_eq!(doc["properties"]["items"]["items"]["$ref"], "#/definitions/Item");
/// ```
pub fn rewrite_references(document: &mut Value) -> usize {
    rewrite(document, None)
}

/// Like [`rewrite_references`], but only rewrites references whose resolved
/// name is in `known`. Other references are left untouched.
pub fn rewrite_known_references(document: &mut Value, known: &HashSet<String>) -> usize {
    rewrite(document, Some(known))
}

fn rewrite(value: &mut Value, known: Option<&HashSet<String>>) -> usize {
    match value {
        Value::Object(map) => {
            let mut rewritten = 0;
            for (key, child) in map.iter_mut() {
                if key == REF_KEY {
                    if let Value::String(target) = child {
                        let name = reference_name(target).into_owned();
                        if known.is_none_or(|names| names.contains(&name)) {
                            *target = definition_pointer(&name);
                            rewritten += 1;
                        }
                        continue;
                    }
                }
                rewritten += rewrite(child, known);
            }
            rewritten
        }
        Value::Array(items) => items.iter_mut().map(|item| rewrite(item, known)).sum(),
        _ => 0,
    }
}

/// Collects every `$ref` string in `document`, depth first.
pub fn collect_references(document: &Value) -> Vec<&str> {
    let mut found = Vec::new();
    collect(document, &mut found);
    found
}

fn collect<'a>(value: &'a Value, found: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(target) if key == REF_KEY => found.push(target),
                    _ => collect(child, found),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect(item, found)),
        _ => {}
    }
}
