//! Template System - host object templates
//!
//! An object template is host-owned JSON. Field order is kept as-is so the
//! generated files diff cleanly against the ones the host editor writes.

pub mod builtin;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::files;

/// The kinds of base template the builders start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseTemplate {
    TileSystem,
    TokenCommand,
    TokenControl,
    SheetFaction,
    CardDeck,
}

impl BaseTemplate {
    pub const ALL: [BaseTemplate; 5] = [
        BaseTemplate::TileSystem,
        BaseTemplate::TokenCommand,
        BaseTemplate::TokenControl,
        BaseTemplate::SheetFaction,
        BaseTemplate::CardDeck,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            BaseTemplate::TileSystem => "tile-system",
            BaseTemplate::TokenCommand => "token-command",
            BaseTemplate::TokenControl => "token-control",
            BaseTemplate::SheetFaction => "sheet-faction",
            BaseTemplate::CardDeck => "card-deck",
        }
    }
}

impl fmt::Display for BaseTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A single host object template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectTemplate {
    fields: Map<String, Value>,
}

impl ObjectTemplate {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(BuildError::Template(format!(
                "template must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let value: Value = files::read_json(path)?;
        Self::from_value(value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn guid(&self) -> Option<&str> {
        self.fields.get("GUID").and_then(Value::as_str)
    }

    pub fn metadata(&self) -> Option<&str> {
        self.fields.get("Metadata").and_then(Value::as_str)
    }

    pub fn template_type(&self) -> Option<&str> {
        self.fields.get("Type").and_then(Value::as_str)
    }

    /// Per-card metadata of a deck template, in index order.
    pub fn card_metadata(&self) -> Option<Vec<String>> {
        let map = self.fields.get("CardMetadata")?.as_object()?;
        let mut entries: Vec<(u64, String)> = map
            .iter()
            .map(|(k, v)| {
                let index = k.parse::<u64>().unwrap_or(u64::MAX);
                let value = v.as_str().unwrap_or_default().to_string();
                (index, value)
            })
            .collect();
        entries.sort_by_key(|(index, _)| *index);
        Some(entries.into_iter().map(|(_, v)| v).collect())
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn set_guid(&mut self, guid: &str) -> &mut Self {
        self.set_field("GUID", guid)
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.set_field("Name", name)
    }

    pub fn set_metadata(&mut self, metadata: &str) -> &mut Self {
        self.set_field("Metadata", metadata)
    }

    pub fn set_tags<S: AsRef<str>>(&mut self, tags: &[S]) -> &mut Self {
        let tags: Vec<Value> = tags.iter().map(|t| Value::from(t.as_ref())).collect();
        self.set_field("Tags", tags)
    }

    pub fn set_model_texture(&mut self, index: usize, texture: &str) -> Result<&mut Self> {
        self.set_model_field(index, "Texture", texture)
    }

    pub fn set_model(&mut self, index: usize, model: &str) -> Result<&mut Self> {
        self.set_model_field(index, "Model", model)
    }

    pub fn set_model_extra_map(&mut self, index: usize, extra_map: &str) -> Result<&mut Self> {
        self.set_model_field(index, "ExtraMap", extra_map)
    }

    fn set_model_field(&mut self, index: usize, key: &str, value: &str) -> Result<&mut Self> {
        let model = self
            .fields
            .get_mut("Models")
            .and_then(Value::as_array_mut)
            .and_then(|models| models.get_mut(index))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| BuildError::Template(format!("template has no Models[{}]", index)))?;
        model.insert(key.to_string(), Value::from(value));
        Ok(self)
    }

    /// Insert `"<index>": value` into an index-keyed object field such as
    /// `CardNames`, creating the field if needed.
    pub fn set_indexed(&mut self, key: &str, index: usize, value: &str) -> Result<&mut Self> {
        let entry = self
            .fields
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let map = entry
            .as_object_mut()
            .ok_or_else(|| BuildError::Template(format!("{} is not an object", key)))?;
        map.insert(index.to_string(), Value::from(value));
        Ok(self)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.fields)?)
    }

    /// Write to `<templates_root>/<relative_file>`.
    pub fn write_to(&self, templates_root: &Path, relative_file: &str) -> Result<()> {
        let path = templates_root.join(relative_file);
        files::write(&path, self.to_pretty_json()?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Template registry - base templates the builders clone from
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: HashMap<BaseTemplate, ObjectTemplate>,
}

impl TemplateRegistry {
    /// Registry holding only the built-in base templates.
    pub fn new() -> Self {
        let templates = BaseTemplate::ALL
            .iter()
            .map(|kind| (*kind, builtin::base_template(*kind)))
            .collect();
        Self { templates }
    }

    /// Built-ins, overridden by any `<kind>.json` in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::new();
        for kind in BaseTemplate::ALL {
            let path = dir.join(format!("{}.json", kind.file_stem()));
            if path.is_file() {
                tracing::debug!("base template {} from {}", kind, path.display());
                registry.register(kind, ObjectTemplate::load(&path)?);
            }
        }
        Ok(registry)
    }

    /// A fresh copy of the base template for `kind`.
    pub fn instantiate(&self, kind: BaseTemplate) -> ObjectTemplate {
        self.templates
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| builtin::base_template(kind))
    }

    pub fn register(&mut self, kind: BaseTemplate, template: ObjectTemplate) {
        self.templates.insert(kind, template);
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
