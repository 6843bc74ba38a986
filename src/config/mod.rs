//! Schema configuration loading
//!
//! Record shapes can be declared in code with [`RecordShape`] builders or
//! loaded from YAML:
//!
//! ```yaml
//! max_page_size: 500
//! collections:
//!   - name: orders
//!     searchable: [reference, user.fullName]
//!     fields:
//!       - name: reference
//!         type: string
//!       - name: total
//!         type: f64
//!       - name: user
//!         fields:
//!           - name: full_name
//!             alias: fullName
//!             type: string
//!       - name: items
//!         list: true
//!         fields:
//!           - { name: sku, type: string }
//!           - { name: qty, type: u32 }
//! ```

use crate::core::error::{ConfigError, QueryError, SieveError};
use crate::core::path;
use crate::core::query::DEFAULT_MAX_PAGE_SIZE;
use crate::core::shape::{CollectionSchema, FieldDef, FieldKind, NativeType, RecordShape};
use serde::{Deserialize, Serialize};

/// One declared field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Canonical (storage side) name
    pub name: String,

    /// Wire name, when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Native type code of a scalar field (`i32`, `string`, `datetime`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub native_type: Option<String>,

    /// Fields of an embedded record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldConfig>>,

    /// The field holds a collection of the declared type or record
    #[serde(default)]
    pub list: bool,
}

/// One declared collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub name: String,

    /// Wire paths matched by the global search
    #[serde(default)]
    pub searchable: Vec<String>,

    pub fields: Vec<FieldConfig>,
}

/// Complete schema configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Upper bound for page sizes, also used for `limit = -1`
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    pub collections: Vec<CollectionConfig>,
}

fn default_max_page_size() -> u64 {
    DEFAULT_MAX_PAGE_SIZE
}

impl SchemaConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the schema of one collection
    ///
    /// Searchable paths are resolved here, so a typo fails at registration
    /// rather than on the first search.
    pub fn collection(&self, name: &str) -> Result<CollectionSchema, SieveError> {
        let config = self
            .collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| QueryError::UnknownCollection {
                name: name.to_string(),
            })?;
        config.to_schema()
    }

    /// Build the schemas of all collections, in declaration order
    pub fn schemas(&self) -> Result<Vec<CollectionSchema>, SieveError> {
        self.collections.iter().map(CollectionConfig::to_schema).collect()
    }
}

impl CollectionConfig {
    pub fn to_schema(&self) -> Result<CollectionSchema, SieveError> {
        let shape = record_shape(&self.name, &self.name, &self.fields)?;
        for searchable in &self.searchable {
            path::resolve(&shape, searchable)?;
        }
        tracing::debug!(
            collection = %self.name,
            fields = shape.fields.len(),
            searchable = self.searchable.len(),
            "collection schema loaded"
        );
        Ok(CollectionSchema::new(&self.name, shape).with_searchable(self.searchable.iter().cloned()))
    }
}

fn record_shape(collection: &str, name: &str, fields: &[FieldConfig]) -> Result<RecordShape, ConfigError> {
    fields
        .iter()
        .try_fold(RecordShape::new(name), |shape, field| {
            Ok(shape.field(field_def(collection, field)?))
        })
}

fn field_def(collection: &str, config: &FieldConfig) -> Result<FieldDef, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidField {
        collection: collection.to_string(),
        field: config.name.clone(),
        message: message.to_string(),
    };

    let kind = match (&config.native_type, &config.fields) {
        (Some(_), Some(_)) => return Err(invalid("declares both a type and nested fields")),
        (None, None) => return Err(invalid("declares neither a type nor nested fields")),
        (Some(code), None) => {
            let native = NativeType::parse(code)
                .ok_or_else(|| invalid(&format!("unknown type '{code}'")))?;
            FieldKind::Scalar(native)
        }
        (None, Some(fields)) => FieldKind::Record(record_shape(collection, &config.name, fields)?),
    };
    let kind = if config.list {
        FieldKind::List(Box::new(kind))
    } else {
        kind
    };

    let def = FieldDef::new(&config.name, kind);
    Ok(match &config.alias {
        Some(alias) => def.with_alias(alias),
        None => def,
    })
}
