/*!
Scalar and format classification.

Every shape maps to exactly one [`ParameterType`]; there is no failure
path, unrecognized kinds classify as `unknown`. Formats are a purely
numeric-width hint computed independently of the scalar kind.
*/

use crate::shape::{IntWidth, ShapeKind, TypeShape};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
    Unknown,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Boolean => "boolean",
            ParameterType::Integer => "integer",
            ParameterType::Number => "number",
            ParameterType::String => "string",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
            ParameterType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric width refinement, meaningful only for integer/number kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Int32,
    Int64,
    Float,
    Double,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Int32 => "int32",
            Format::Int64 => "int64",
            Format::Float => "float",
            Format::Double => "double",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Override registry mapping qualified type names to scalar kinds.
///
/// Registry entries take precedence over structural classification, so
/// a host type that is a record internally can still render as an
/// opaque scalar. The registry is an explicit value owned by the
/// caller; registrations only affect derivations performed after them.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRegistry {
    overrides: IndexMap<String, ParameterType>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry {
            overrides: IndexMap::new(),
        };
        registry.register("std::time::Duration", ParameterType::Integer);
        registry.register("chrono::DateTime", ParameterType::String);
        registry.register("chrono::NaiveDate", ParameterType::String);
        registry.register("uuid::Uuid", ParameterType::String);
        registry.register("serde_json::Number", ParameterType::Number);
        registry
    }
}

impl TypeRegistry {
    /// Registry with the default seed set
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no seed entries
    pub fn empty() -> Self {
        TypeRegistry {
            overrides: IndexMap::new(),
        }
    }

    /// Register an override for a qualified type name
    pub fn register(&mut self, qualified_name: &str, kind: ParameterType) {
        self.overrides.insert(qualified_name.to_string(), kind);
    }

    /// Chaining form of [`register`](Self::register)
    pub fn with_override(mut self, qualified_name: &str, kind: ParameterType) -> Self {
        self.register(qualified_name, kind);
        self
    }

    /// Look up an override by qualified name
    pub fn get(&self, qualified_name: &str) -> Option<ParameterType> {
        self.overrides.get(qualified_name).copied()
    }

    /// Whether the shape's qualified name carries an override
    pub fn has_override(&self, shape: &TypeShape) -> bool {
        shape
            .qualified_name()
            .and_then(|name| self.get(name))
            .is_some()
    }

    /// Classify a shape into its scalar kind.
    ///
    /// Pointers are unwrapped transitively. An override on the
    /// qualified name wins over the structural kind.
    pub fn classify(&self, shape: &TypeShape) -> ParameterType {
        if let ShapeKind::Pointer(inner) = &shape.kind {
            return self.classify(inner);
        }

        if let Some(kind) = shape.qualified_name().and_then(|name| self.get(name)) {
            return kind;
        }

        match &shape.kind {
            ShapeKind::Bool => ParameterType::Boolean,
            ShapeKind::Int(_) | ShapeKind::Uint(_) => ParameterType::Integer,
            ShapeKind::Float32 | ShapeKind::Float64 => ParameterType::Number,
            ShapeKind::Str => ParameterType::String,
            ShapeKind::Sequence(_) => ParameterType::Array,
            ShapeKind::Record(_) | ShapeKind::Mapping(_) => ParameterType::Object,
            ShapeKind::Pointer(inner) => self.classify(inner),
            ShapeKind::Unsupported => ParameterType::Unknown,
        }
    }
}

/// Classify a shape's numeric width.
///
/// Independent of the override registry; pointers unwrap the same way.
/// Platform-word integers keep the behavior of the original rules:
/// signed words format as int32, unsigned words carry no format.
pub fn classify_format(shape: &TypeShape) -> Option<Format> {
    match &shape.kind {
        ShapeKind::Pointer(inner) => classify_format(inner),
        ShapeKind::Int(IntWidth::W8 | IntWidth::W16 | IntWidth::W32 | IntWidth::WSize) => {
            Some(Format::Int32)
        }
        ShapeKind::Uint(IntWidth::W8 | IntWidth::W16 | IntWidth::W32) => Some(Format::Int32),
        ShapeKind::Int(IntWidth::W64) | ShapeKind::Uint(IntWidth::W64) => Some(Format::Int64),
        ShapeKind::Float64 => Some(Format::Double),
        ShapeKind::Float32 => Some(Format::Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{RecordShape, Shaped};

    #[test]
    fn test_register_and_get() {
        let mut registry = TypeRegistry::new();
        registry.register("serde_json::Number", ParameterType::Integer);
        assert_eq!(
            registry.get("serde_json::Number"),
            Some(ParameterType::Integer)
        );
        assert_eq!(registry.get("no::such::Type"), None);
    }

    #[test]
    fn test_classify_unwraps_pointers() {
        let registry = TypeRegistry::new();
        let shape = TypeShape::pointer(TypeShape::pointer(TypeShape::sequence(
            TypeShape::int(IntWidth::W32),
        )));
        assert_eq!(registry.classify(&shape), ParameterType::Array);
    }

    #[test]
    fn test_classify_structural() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.classify(&TypeShape::bool()), ParameterType::Boolean);
        assert_eq!(
            registry.classify(&TypeShape::uint(IntWidth::W16)),
            ParameterType::Integer
        );
        assert_eq!(
            registry.classify(&TypeShape::float32()),
            ParameterType::Number
        );
        assert_eq!(
            registry.classify(&TypeShape::string()),
            ParameterType::String
        );
        assert_eq!(
            registry.classify(&TypeShape::record(RecordShape::new("Pet"))),
            ParameterType::Object
        );
        assert_eq!(
            registry.classify(&TypeShape::mapping(TypeShape::string())),
            ParameterType::Object
        );
    }

    #[test]
    fn test_classify_unknown_total() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.classify(&TypeShape::unsupported()),
            ParameterType::Unknown
        );
        assert_eq!(
            registry.classify(&TypeShape::pointer(TypeShape::unsupported())),
            ParameterType::Unknown
        );
    }

    #[test]
    fn test_classify_seed_overrides() {
        let registry = TypeRegistry::new();
        assert_eq!(
            registry.classify(&chrono::DateTime::<chrono::Utc>::shape()),
            ParameterType::String
        );
        assert_eq!(
            registry.classify(&std::time::Duration::shape()),
            ParameterType::Integer
        );
        assert_eq!(
            registry.classify(&serde_json::Number::shape()),
            ParameterType::Number
        );
        assert_eq!(
            registry.classify(&uuid::Uuid::shape()),
            ParameterType::String
        );
    }

    #[test]
    fn test_format_widths() {
        assert_eq!(
            classify_format(&TypeShape::int(IntWidth::W8)),
            Some(Format::Int32)
        );
        assert_eq!(
            classify_format(&TypeShape::uint(IntWidth::W32)),
            Some(Format::Int32)
        );
        assert_eq!(
            classify_format(&TypeShape::int(IntWidth::W64)),
            Some(Format::Int64)
        );
        assert_eq!(
            classify_format(&TypeShape::uint(IntWidth::W64)),
            Some(Format::Int64)
        );
        assert_eq!(classify_format(&TypeShape::float32()), Some(Format::Float));
        assert_eq!(classify_format(&TypeShape::float64()), Some(Format::Double));
        assert_eq!(classify_format(&TypeShape::string()), None);
        assert_eq!(classify_format(&TypeShape::uint(IntWidth::WSize)), None);
    }

    #[test]
    fn test_format_unwraps_pointers() {
        let shape = TypeShape::pointer(TypeShape::pointer(TypeShape::float64()));
        assert_eq!(classify_format(&shape), Some(Format::Double));
    }

    #[test]
    fn test_format_ignores_overrides() {
        // Duration carries an integer override, but its format comes
        // from the underlying width alone.
        let shape = std::time::Duration::shape();
        assert_eq!(classify_format(&shape), Some(Format::Int64));

        // An override to integer on a string-shaped type adds no format.
        let registry =
            TypeRegistry::new().with_override("serde_json::Number", ParameterType::Integer);
        assert_eq!(
            registry.classify(&serde_json::Number::shape()),
            ParameterType::Integer
        );
        assert_eq!(classify_format(&serde_json::Number::shape()), None);
    }
}
