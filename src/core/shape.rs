//! Record shape descriptors
//!
//! A [`RecordShape`] is the statically declared schema of one stored record:
//! its fields, their wire aliases and their native types. Shapes are built
//! once at startup (in code or from [`crate::config::SchemaConfig`]) and are
//! read-only afterwards, so they can be shared freely between requests.

use std::fmt;

/// Native (storage side) type of a scalar field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeType {
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    Date,
    DateTime,
    /// Fixed size array of scalars, not filterable
    Array(Box<NativeType>),
}

impl NativeType {
    /// Parse a native type code such as `i32`, `datetime` or `array<u8>`
    pub fn parse(code: &str) -> Option<NativeType> {
        let code = code.trim();
        if let Some(inner) = code
            .strip_prefix("array<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return NativeType::parse(inner).map(|t| NativeType::Array(Box::new(t)));
        }

        let native = match code {
            "string" => NativeType::String,
            "char" => NativeType::Char,
            "i8" => NativeType::I8,
            "i16" => NativeType::I16,
            "i32" => NativeType::I32,
            "i64" => NativeType::I64,
            "isize" => NativeType::Isize,
            "u8" => NativeType::U8,
            "u16" => NativeType::U16,
            "u32" => NativeType::U32,
            "u64" => NativeType::U64,
            "usize" => NativeType::Usize,
            "f32" => NativeType::F32,
            "f64" => NativeType::F64,
            "bool" => NativeType::Bool,
            "date" => NativeType::Date,
            "datetime" => NativeType::DateTime,
            _ => return None,
        };
        Some(native)
    }

    /// Code accepted back by [`NativeType::parse`]
    pub fn code(&self) -> String {
        let code = match self {
            NativeType::String => "string",
            NativeType::Char => "char",
            NativeType::I8 => "i8",
            NativeType::I16 => "i16",
            NativeType::I32 => "i32",
            NativeType::I64 => "i64",
            NativeType::Isize => "isize",
            NativeType::U8 => "u8",
            NativeType::U16 => "u16",
            NativeType::U32 => "u32",
            NativeType::U64 => "u64",
            NativeType::Usize => "usize",
            NativeType::F32 => "f32",
            NativeType::F64 => "f64",
            NativeType::Bool => "bool",
            NativeType::Date => "date",
            NativeType::DateTime => "datetime",
            NativeType::Array(inner) => return format!("array<{}>", inner.code()),
        };
        code.to_string()
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What a field holds
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A single scalar value
    Scalar(NativeType),
    /// An embedded record; paths continue into its fields
    Record(RecordShape),
    /// A collection; paths continue into the element type
    List(Box<FieldKind>),
}

impl FieldKind {
    /// Shape that path traversal continues into, if any
    pub fn nested_shape(&self) -> Option<&RecordShape> {
        match self {
            FieldKind::Scalar(_) => None,
            FieldKind::Record(shape) => Some(shape),
            FieldKind::List(element) => element.nested_shape(),
        }
    }

    /// Whether this field holds many values
    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::List(_))
    }
}

/// One declared field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Canonical (storage side) name
    pub name: String,
    /// Wire name, when it differs from `name`
    pub alias: Option<String>,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            alias: None,
            kind,
        }
    }

    /// Scalar field of the given native type
    pub fn scalar(name: impl Into<String>, native: NativeType) -> Self {
        Self::new(name, FieldKind::Scalar(native))
    }

    /// Embedded record field
    pub fn record(name: impl Into<String>, shape: RecordShape) -> Self {
        Self::new(name, FieldKind::Record(shape))
    }

    /// Collection of embedded records
    pub fn list_of(name: impl Into<String>, shape: RecordShape) -> Self {
        Self::new(name, FieldKind::List(Box::new(FieldKind::Record(shape))))
    }

    /// Collection of scalars
    pub fn list_of_scalars(name: impl Into<String>, native: NativeType) -> Self {
        Self::new(name, FieldKind::List(Box::new(FieldKind::Scalar(native))))
    }

    /// Attach a wire alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Declared shape of a record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl RecordShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field declaration
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Look a field up by wire name
    ///
    /// Canonical names win over aliases, so an alias can never shadow a
    /// real field of the same name.
    pub fn lookup(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|f| f.alias.as_deref() == Some(name))
            })
    }
}

/// A registered collection: its record shape and search configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    pub name: String,
    pub shape: RecordShape,
    /// Wire paths matched by the global free-text search
    pub searchable: Vec<String>,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, shape: RecordShape) -> Self {
        Self {
            name: name.into(),
            shape,
            searchable: Vec::new(),
        }
    }

    /// Declare the paths the global search applies to
    pub fn with_searchable<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable = paths.into_iter().map(Into::into).collect();
        self
    }
}
