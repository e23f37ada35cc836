//! Property-name casing transforms.
//!
//! Renames the keys of each definition's `properties` and the entries of its
//! `required` list through a [`CaseRule`]. Reference targets are definition
//! names, not property names, so `$ref` values are never touched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Namespace, PROPERTIES_KEY, REQUIRED_KEY};

/// Letter-case convention applied to property names.
///
/// Leading and trailing underscores survive every rule. Names that are
/// entirely upper case (`ID`) or numeric are left as they are.
///
/// # Examples
///
/// ```
/// use model_typegen_core::CaseRule;
///
/// assert_eq!(CaseRule::Camel.apply("user_name"), "userName");
/// assert_eq!(CaseRule::Pascal.apply("user_name"), "UserName");
/// assert_eq!(CaseRule::Snake.apply("userName"), "user_name");
/// assert_eq!(CaseRule::Camel.apply("_private_key"), "_privateKey");
/// assert_eq!(CaseRule::Camel.apply("ID"), "ID");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseRule {
    /// `user_name` → `userName`
    Camel,
    /// `user_name` → `UserName`
    Pascal,
    /// `userName` → `user_name`
    Snake,
}

impl CaseRule {
    /// Renames one identifier.
    pub fn apply(self, name: &str) -> String {
        if is_shouting_or_numeric(name) {
            return name.to_string();
        }
        let (leading, core, trailing) = split_underscore_affixes(name);
        let converted = match self {
            Self::Camel => lower_first(&pascalize(core)),
            Self::Pascal => pascalize(core),
            Self::Snake => snakeify(core),
        };
        format!("{leading}{converted}{trailing}")
    }
}

/// Casing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    /// Two properties of one definition map to the same renamed key.
    #[error(
        "properties '{first}' and '{second}' of definition '{definition}' both become '{renamed}'"
    )]
    NamingCollision {
        definition: String,
        first: String,
        second: String,
        renamed: String,
    },
}

/// Applies `rule` to every definition in the namespace.
///
/// # Errors
///
/// Returns [`CaseError::NamingCollision`] on the first definition where two
/// property names collapse into one. Every definition is checked before any
/// is renamed, so the namespace is left unchanged on error.
pub fn transform_namespace(namespace: &mut Namespace, rule: CaseRule) -> Result<(), CaseError> {
    for (name, definition) in namespace.iter() {
        if let Some(Value::Object(properties)) = definition.get(PROPERTIES_KEY) {
            renamed_keys(name, properties, rule)?;
        }
    }
    for (name, definition) in namespace.iter_mut() {
        transform_definition(name, definition, rule)?;
    }
    Ok(())
}

/// Applies `rule` to the `properties` keys and `required` entries of one
/// definition.
///
/// # Examples
///
/// ```
/// use model_typegen_core::{CaseRule, transform_definition};
/// use serde_json::json;
///
/// let mut user = json!({
///     "properties": {
///         "user_name": {"type": "string"},
///         "is_active": {"type": "boolean"}
///     },
///     "required": ["user_name"]
/// });
/// transform_definition("User", &mut user, CaseRule::Camel).unwrap();
///
/// assert_eq!(user["required"], json!(["userName"]));
/// assert!(user["properties"].get("isActive").is_some());
/// ```
pub fn transform_definition(
    name: &str,
    definition: &mut Value,
    rule: CaseRule,
) -> Result<(), CaseError> {
    let Some(object) = definition.as_object_mut() else {
        return Ok(());
    };

    if let Some(Value::Object(properties)) = object.get_mut(PROPERTIES_KEY) {
        let renames = renamed_keys(name, properties, rule)?;
        let original = std::mem::take(properties);
        let mut renamed_properties = Map::with_capacity(original.len());
        for (renamed, (_, schema)) in renames.into_iter().zip(original) {
            renamed_properties.insert(renamed, schema);
        }
        *properties = renamed_properties;
    }

    if let Some(Value::Array(required)) = object.get_mut(REQUIRED_KEY) {
        for entry in required.iter_mut() {
            if let Value::String(property) = entry {
                *property = rule.apply(property);
            }
        }
    }

    Ok(())
}

/// New property keys in order, or the first pair that collapses into one.
fn renamed_keys(
    definition: &str,
    properties: &Map<String, Value>,
    rule: CaseRule,
) -> Result<Vec<String>, CaseError> {
    let mut sources: HashMap<String, &str> = HashMap::with_capacity(properties.len());
    let mut renames = Vec::with_capacity(properties.len());
    for key in properties.keys() {
        let renamed = rule.apply(key);
        if let Some(first) = sources.get(&renamed) {
            return Err(CaseError::NamingCollision {
                definition: definition.to_string(),
                first: (*first).to_string(),
                second: key.clone(),
                renamed,
            });
        }
        sources.insert(renamed.clone(), key);
        renames.push(renamed);
    }
    Ok(renames)
}

fn is_shouting_or_numeric(name: &str) -> bool {
    let has_cased = name.chars().any(char::is_alphabetic);
    let all_upper = name
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase);
    (has_cased && all_upper) || (!name.is_empty() && name.chars().all(|c| c.is_ascii_digit()))
}

fn split_underscore_affixes(name: &str) -> (&str, &str, &str) {
    let core_start = name.len() - name.trim_start_matches('_').len();
    let rest = &name[core_start..];
    let core_len = rest.trim_end_matches('_').len();
    (&name[..core_start], &rest[..core_len], &rest[core_len..])
}

fn pascalize(core: &str) -> String {
    let mut out = String::with_capacity(core.len());
    let mut upper_next = true;
    for c in core.chars() {
        if matches!(c, '_' | '-' | ' ') {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn snakeify(core: &str) -> String {
    let chars: Vec<char> = core.chars().collect();
    let mut out = String::with_capacity(core.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | ' ') {
            out.push('_');
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            let acronym_end =
                prev.is_some_and(char::is_uppercase) && next.is_some_and(char::is_lowercase);
            if (after_lower || acronym_end) && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
