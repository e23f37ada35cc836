//! Schema document, namespace, and combined schema types.
//!
//! Schema documents are plain [`serde_json::Value`] trees. The workspace
//! enables serde_json's `preserve_order` feature, so object keys keep their
//! insertion order through every transform and into the serialized output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reference::{definition_pointer, reference_name};

/// A raw JSON-Schema-like tree: an object, an array, or a scalar.
pub type SchemaDocument = Value;

/// Reserved key holding a reference pointer.
pub const REF_KEY: &str = "$ref";
/// Reserved key holding a model's local definitions.
pub const DEFS_KEY: &str = "$defs";
/// Top-level key naming a model.
pub const TITLE_KEY: &str = "title";
/// Key holding the property schemas of an object definition.
pub const PROPERTIES_KEY: &str = "properties";
/// Key holding the list of required property names.
pub const REQUIRED_KEY: &str = "required";
/// Pointer prefix of every definition in a combined schema.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Title of the synthetic root of a [`CombinedSchema`].
pub const COMBINED_TITLE: &str = "TypegenRoot";
/// Description of the synthetic root of a [`CombinedSchema`].
pub const COMBINED_DESCRIPTION: &str =
    "Synthetic wrapper listing every exported definition. Not a model.";

/// Flat, ordered mapping of definition names to definitions.
///
/// Inserting an existing name replaces its definition but keeps the name's
/// original position, so iteration order is always discovery order.
///
/// # Examples
///
/// ```
/// use model_typegen_core::Namespace;
/// use serde_json::json;
///
/// let mut namespace = Namespace::new();
/// namespace.insert("B", json!({"type": "string"}));
/// namespace.insert("A", json!({"type": "integer"}));
/// namespace.insert("B", json!({"type": "boolean"}));
///
/// assert_eq!(namespace.names().collect::<Vec<_>>(), vec!["B", "A"]);
/// assert_eq!(namespace.get("B"), Some(&json!({"type": "boolean"})));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace {
    definitions: Map<String, Value>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, definition: Value) -> Option<Value> {
        self.definitions.insert(name.into(), definition)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Definition names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.definitions.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.definitions
            .iter_mut()
            .map(|(name, def)| (name.as_str(), def))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Consumes the namespace, returning the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.definitions
    }
}

/// A `{"$ref": "..."}` pointer entry.
///
/// # Examples
///
/// ```
/// use model_typegen_core::Reference;
///
/// let reference = Reference::to_definition("Inner");
/// assert_eq!(reference.target, "#/definitions/Inner");
/// assert_eq!(reference.name(), "Inner");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub target: String,
}

impl Reference {
    /// Creates a reference into the combined definitions namespace.
    pub fn to_definition(name: &str) -> Self {
        Self {
            target: definition_pointer(name),
        }
    }

    /// Name of the definition this reference resolves to.
    pub fn name(&self) -> String {
        reference_name(&self.target).into_owned()
    }
}

/// Merged output: one root document exposing every definition.
///
/// Serializes to an object with exactly the keys `definitions`, `title`,
/// `description` and `oneOf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSchema {
    pub definitions: Namespace,
    pub title: String,
    pub description: String,
    #[serde(rename = "oneOf")]
    pub one_of: Vec<Reference>,
}

impl CombinedSchema {
    /// Wraps a namespace, selecting every definition from the root in
    /// namespace order.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_typegen_core::{CombinedSchema, Namespace, COMBINED_TITLE};
    /// use serde_json::json;
    ///
    /// let mut namespace = Namespace::new();
    /// namespace.insert("A", json!({"title": "A"}));
    /// let combined = CombinedSchema::new(namespace);
    ///
    /// assert_eq!(combined.title, COMBINED_TITLE);
    /// assert_eq!(combined.one_of[0].target, "#/definitions/A");
    /// ```
    pub fn new(definitions: Namespace) -> Self {
        let one_of = definitions.names().map(Reference::to_definition).collect();
        Self {
            definitions,
            title: COMBINED_TITLE.to_string(),
            description: COMBINED_DESCRIPTION.to_string(),
            one_of,
        }
    }

    /// Builds the JSON document handed to a type generator.
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "definitions".to_string(),
            Value::Object(self.definitions.clone().into_map()),
        );
        root.insert(TITLE_KEY.to_string(), Value::String(self.title.clone()));
        root.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        let one_of = self
            .one_of
            .iter()
            .map(|reference| {
                let mut entry = Map::new();
                entry.insert(REF_KEY.to_string(), Value::String(reference.target.clone()));
                Value::Object(entry)
            })
            .collect();
        root.insert("oneOf".to_string(), Value::Array(one_of));
        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_combined_schema_serializes_expected_keys_in_order() {
        let mut namespace = Namespace::new();
        namespace.insert("A", json!({"title": "A"}));
        namespace.insert("B", json!({"title": "B"}));
        let combined = CombinedSchema::new(namespace);

        let value = combined.to_value();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["definitions", "title", "description", "oneOf"]);
        assert_eq!(
            value["oneOf"],
            json!([{"$ref": "#/definitions/A"}, {"$ref": "#/definitions/B"}])
        );
        assert_eq!(serde_json::to_value(&combined).unwrap(), value);
    }

    #[test]
    fn test_namespace_overwrite_keeps_position() {
        let mut namespace = Namespace::new();
        namespace.insert("X", json!(1));
        namespace.insert("Y", json!(2));
        let previous = namespace.insert("X", json!(3));

        assert_eq!(previous, Some(json!(1)));
        assert_eq!(namespace.names().collect::<Vec<_>>(), vec!["X", "Y"]);
        assert_eq!(namespace.len(), 2);
    }
}
