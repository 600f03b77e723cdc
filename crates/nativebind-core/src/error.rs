//! Error types for binding generation

use thiserror::Error;

/// Result type alias for generation operations
pub type GenResult<T> = Result<T, GenError>;

/// Error type for schema resolution and code emission
///
/// Every variant names the schema path it was raised at so that a failed
/// module can be reported precisely. All variants abort the module except
/// [`GenError::UndeterminedPropertyType`], see [`GenError::is_recoverable`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    /// `$ref` names a module URI that is not in the schema index
    #[error("unknown module reference '{reference}' at {path}")]
    UnknownModuleReference { reference: String, path: String },

    /// `$ref` fragment does not point at anything in its owning document
    #[error("unresolved reference '{reference}' at {path}")]
    UnresolvedReference { reference: String, path: String },

    /// A reference chain loops back onto itself
    #[error("cyclic schema reference at {path}: {}", chain.join(" -> "))]
    CyclicSchemaReference { chain: Vec<String>, path: String },

    /// `allOf` members disagree on a scalar keyword
    #[error("conflicting allOf merge at {path}: {detail}")]
    ConflictingAllOfMerge { detail: String, path: String },

    /// `oneOf` / `anyOf` where a concrete type is required
    #[error("unsupported union schema at {path}")]
    UnsupportedUnionSchema { path: String },

    /// Object typed only through `patternProperties`
    #[error("unsupported patternProperties at {path}")]
    UnsupportedPatternProperties { path: String },

    /// Tuple `items` whose members are not all the same shape
    #[error("heterogeneous array items at {path}")]
    HeterogeneousArrayItems { path: String },

    /// Two different definitions claimed the same generated symbol
    #[error("type name collision for '{name}' at {path}")]
    TypeNameCollision { name: String, path: String },

    /// Schema has no shape that maps to a native type
    #[error("undetermined property type at {path}")]
    UndeterminedPropertyType { path: String },

    /// Document is not a usable schema
    #[error("invalid schema at {path}: {detail}")]
    InvalidSchema { detail: String, path: String },

    /// Generator configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl GenError {
    /// Stable numeric code, used in reports and the CLI exit summary
    pub fn error_code(&self) -> u32 {
        match self {
            GenError::UnknownModuleReference { .. } => 1,
            GenError::UnresolvedReference { .. } => 2,
            GenError::CyclicSchemaReference { .. } => 3,
            GenError::ConflictingAllOfMerge { .. } => 4,
            GenError::UnsupportedUnionSchema { .. } => 5,
            GenError::UnsupportedPatternProperties { .. } => 6,
            GenError::HeterogeneousArrayItems { .. } => 7,
            GenError::TypeNameCollision { .. } => 8,
            GenError::UndeterminedPropertyType { .. } => 9,
            GenError::InvalidSchema { .. } => 10,
            GenError::Config(_) => 11,
        }
    }

    /// Whether emission may skip the offending item and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GenError::UndeterminedPropertyType { .. })
    }

    /// Schema path the error was raised at, if it carries one
    pub fn path(&self) -> Option<&str> {
        match self {
            GenError::UnknownModuleReference { path, .. }
            | GenError::UnresolvedReference { path, .. }
            | GenError::CyclicSchemaReference { path, .. }
            | GenError::ConflictingAllOfMerge { path, .. }
            | GenError::UnsupportedUnionSchema { path }
            | GenError::UnsupportedPatternProperties { path }
            | GenError::HeterogeneousArrayItems { path }
            | GenError::TypeNameCollision { path, .. }
            | GenError::UndeterminedPropertyType { path }
            | GenError::InvalidSchema { path, .. } => Some(path),
            GenError::Config(_) => None,
        }
    }
}

impl From<serde_json::Error> for GenError {
    fn from(err: serde_json::Error) -> Self {
        GenError::InvalidSchema {
            detail: err.to_string(),
            path: "#".to_string(),
        }
    }
}

impl From<toml::de::Error> for GenError {
    fn from(err: toml::de::Error) -> Self {
        GenError::Config(err.to_string())
    }
}
