/*!
Runtime type-shape descriptors.

Rust has no reflection, so the derivation core consumes explicit shape
values instead of inspecting live types. A [`TypeShape`] is a closed
description of one type: its structural kind, and, for host types that
have one, a fully-qualified declared name used by the override registry
and by schema naming. Shapes are either built by hand through the
builder methods or produced by the [`Shaped`] trait.
*/

use std::collections::{BTreeMap, HashMap};

/// Description of one type: an optional qualified name plus its
/// structural kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeShape {
    /// Fully-qualified declared name, if the host type has one
    /// (e.g. `chrono::DateTime`). Consulted by the override registry.
    pub name: Option<String>,
    /// Structural kind
    pub kind: ShapeKind,
}

/// Closed set of structural kinds a type can have.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ShapeKind {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float32,
    Float64,
    Str,
    /// Indirection (`&T`, `Box<T>`, `Option<T>`); transparent everywhere
    Pointer(Box<TypeShape>),
    /// Named record with ordered fields
    Record(RecordShape),
    /// Homogeneous sequence with an element shape
    Sequence(Box<TypeShape>),
    /// String-keyed mapping with a value shape
    Mapping(Box<TypeShape>),
    /// Function pointers, channels and the like; classifies as `unknown`
    #[default]
    Unsupported,
}

/// Integer width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    /// Platform word size (`isize`/`usize`)
    WSize,
}

/// Record shape: a qualified name plus fields in declaration order.
///
/// Anonymous or function-local records must be given a scope-qualified
/// name at construction time; the derived schema name is computed from
/// the last path segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    pub name: String,
    pub fields: Vec<FieldShape>,
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Declared field name. Fields whose name does not start with an
    /// uppercase letter are treated as non-exported and skipped.
    pub name: String,
    /// Field type, possibly deferred to break recursive type graphs
    pub source: ShapeSource,
    /// Embedded substructure whose fields splice into the parent
    pub embedded: bool,
    /// Metadata annotations
    pub tags: FieldTags,
}

/// Field type, either an eager shape value or a deferred producer.
///
/// Self-referential records cannot be expressed as finite shape values;
/// the deferred form breaks the cycle by resolving one level at a time.
#[derive(Debug, Clone)]
pub enum ShapeSource {
    Shape(TypeShape),
    Deferred(fn() -> TypeShape),
}

/// Deferred sources compare by producer identity, which keeps equality
/// over self-referential shapes terminating. A deferred source never
/// equals an eager one, even when it would resolve to the same shape.
impl PartialEq for ShapeSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ShapeSource::Shape(a), ShapeSource::Shape(b)) => a == b,
            (ShapeSource::Deferred(a), ShapeSource::Deferred(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

/// Per-field annotations, mirroring the struct-tag surface of the
/// serialized form: naming, required marker, example, description and
/// allowed values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTags {
    /// Naming annotation: first comma-separated segment is the external
    /// name, `-` omits the field, a `,string` modifier coerces the
    /// property to a string
    pub json: Option<String>,
    /// Marks the field name as required
    pub required: bool,
    /// Example value
    pub example: Option<String>,
    /// Field description
    pub description: Option<String>,
    /// Short description; wins over `description` when both are set
    pub desc: Option<String>,
    /// Comma-separated list of allowed values
    pub enumeration: Option<String>,
}

impl TypeShape {
    fn plain(kind: ShapeKind) -> Self {
        TypeShape { name: None, kind }
    }

    pub fn bool() -> Self {
        Self::plain(ShapeKind::Bool)
    }

    pub fn int(width: IntWidth) -> Self {
        Self::plain(ShapeKind::Int(width))
    }

    pub fn uint(width: IntWidth) -> Self {
        Self::plain(ShapeKind::Uint(width))
    }

    pub fn float32() -> Self {
        Self::plain(ShapeKind::Float32)
    }

    pub fn float64() -> Self {
        Self::plain(ShapeKind::Float64)
    }

    pub fn string() -> Self {
        Self::plain(ShapeKind::Str)
    }

    pub fn pointer(inner: TypeShape) -> Self {
        Self::plain(ShapeKind::Pointer(Box::new(inner)))
    }

    pub fn record(record: RecordShape) -> Self {
        Self::plain(ShapeKind::Record(record))
    }

    pub fn sequence(element: TypeShape) -> Self {
        Self::plain(ShapeKind::Sequence(Box::new(element)))
    }

    pub fn mapping(value: TypeShape) -> Self {
        Self::plain(ShapeKind::Mapping(Box::new(value)))
    }

    pub fn unsupported() -> Self {
        Self::plain(ShapeKind::Unsupported)
    }

    /// Attach a fully-qualified declared name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Qualified name, from either the shape itself or its record
    pub fn qualified_name(&self) -> Option<&str> {
        if let Some(name) = &self.name {
            return Some(name);
        }
        if let ShapeKind::Record(record) = &self.kind {
            return Some(&record.name);
        }
        None
    }

    /// Stable schema name for this shape.
    ///
    /// Pointers are transparent. Records use the last path segment of
    /// their qualified name; anonymous sequences and mappings compose
    /// the element's name with an `Array`/`Map` suffix; bare scalars
    /// use their primitive label.
    pub fn derived_name(&self) -> String {
        match &self.kind {
            ShapeKind::Pointer(inner) => inner.derived_name(),
            ShapeKind::Record(record) => sanitize_name(&record.name),
            ShapeKind::Sequence(element) => match &self.name {
                Some(name) => sanitize_name(name),
                None => format!("{}Array", element.derived_name()),
            },
            ShapeKind::Mapping(value) => match &self.name {
                Some(name) => sanitize_name(name),
                None => format!("{}Map", value.derived_name()),
            },
            _ => match &self.name {
                Some(name) => sanitize_name(name),
                None => self.kind.label().to_string(),
            },
        }
    }
}

impl ShapeKind {
    /// Primitive label, used to name scalar wrapper objects
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Bool => "bool",
            ShapeKind::Int(IntWidth::W8) => "i8",
            ShapeKind::Int(IntWidth::W16) => "i16",
            ShapeKind::Int(IntWidth::W32) => "i32",
            ShapeKind::Int(IntWidth::W64) => "i64",
            ShapeKind::Int(IntWidth::WSize) => "isize",
            ShapeKind::Uint(IntWidth::W8) => "u8",
            ShapeKind::Uint(IntWidth::W16) => "u16",
            ShapeKind::Uint(IntWidth::W32) => "u32",
            ShapeKind::Uint(IntWidth::W64) => "u64",
            ShapeKind::Uint(IntWidth::WSize) => "usize",
            ShapeKind::Float32 => "f32",
            ShapeKind::Float64 => "f64",
            ShapeKind::Str => "string",
            ShapeKind::Pointer(_) => "pointer",
            ShapeKind::Record(_) => "record",
            ShapeKind::Sequence(_) => "sequence",
            ShapeKind::Mapping(_) => "mapping",
            ShapeKind::Unsupported => "unsupported",
        }
    }
}

/// Last path segment of a qualified name, punctuation stripped
fn sanitize_name(name: &str) -> String {
    let base = name.rsplit("::").next().unwrap_or(name);
    let base = base.rsplit('.').next().unwrap_or(base);
    base.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

impl RecordShape {
    pub fn new(name: &str) -> Self {
        RecordShape {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Append a field, preserving declaration order
    pub fn field(mut self, field: FieldShape) -> Self {
        self.fields.push(field);
        self
    }
}

impl FieldShape {
    pub fn new(name: &str, shape: TypeShape) -> Self {
        FieldShape {
            name: name.to_string(),
            source: ShapeSource::Shape(shape),
            embedded: false,
            tags: FieldTags::default(),
        }
    }

    /// Field whose type is resolved lazily through [`Shaped`]. This is
    /// the form to use for fields that close a type cycle.
    pub fn of<T: Shaped>(name: &str) -> Self {
        Self::deferred(name, T::shape)
    }

    /// Field whose type is produced on demand by `source`
    pub fn deferred(name: &str, source: fn() -> TypeShape) -> Self {
        FieldShape {
            name: name.to_string(),
            source: ShapeSource::Deferred(source),
            embedded: false,
            tags: FieldTags::default(),
        }
    }

    /// Resolve the field's type, one level deep
    pub fn shape(&self) -> TypeShape {
        match &self.source {
            ShapeSource::Shape(shape) => shape.clone(),
            ShapeSource::Deferred(source) => source(),
        }
    }

    /// Mark as an embedded substructure
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Set the naming annotation
    pub fn json_tag(mut self, tag: &str) -> Self {
        self.tags.json = Some(tag.to_string());
        self
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.tags.required = true;
        self
    }

    /// Set an example value
    pub fn example(mut self, value: &str) -> Self {
        self.tags.example = Some(value.to_string());
        self
    }

    /// Set the field description
    pub fn description(mut self, value: &str) -> Self {
        self.tags.description = Some(value.to_string());
        self
    }

    /// Set the short description, which wins over `description`
    pub fn desc(mut self, value: &str) -> Self {
        self.tags.desc = Some(value.to_string());
        self
    }

    /// Set the comma-separated allowed values
    pub fn enumeration(mut self, values: &str) -> Self {
        self.tags.enumeration = Some(values.to_string());
        self
    }
}

/// Types that can describe their own shape.
pub trait Shaped {
    /// Shape of this type
    fn shape() -> TypeShape;
}

impl Shaped for bool {
    fn shape() -> TypeShape {
        TypeShape::bool()
    }
}

macro_rules! shaped_int {
    ($($ty:ty => $ctor:ident($width:ident)),* $(,)?) => {
        $(impl Shaped for $ty {
            fn shape() -> TypeShape {
                TypeShape::$ctor(IntWidth::$width)
            }
        })*
    };
}

shaped_int! {
    i8 => int(W8),
    i16 => int(W16),
    i32 => int(W32),
    i64 => int(W64),
    isize => int(WSize),
    u8 => uint(W8),
    u16 => uint(W16),
    u32 => uint(W32),
    u64 => uint(W64),
    usize => uint(WSize),
}

impl Shaped for f32 {
    fn shape() -> TypeShape {
        TypeShape::float32()
    }
}

impl Shaped for f64 {
    fn shape() -> TypeShape {
        TypeShape::float64()
    }
}

impl Shaped for String {
    fn shape() -> TypeShape {
        TypeShape::string()
    }
}

impl<'a> Shaped for &'a str {
    fn shape() -> TypeShape {
        TypeShape::string()
    }
}

impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(T::shape())
    }
}

impl<T: Shaped> Shaped for Box<T> {
    fn shape() -> TypeShape {
        TypeShape::pointer(T::shape())
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape())
    }
}

impl<T: Shaped, const N: usize> Shaped for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape())
    }
}

impl<T: Shaped> Shaped for HashMap<String, T> {
    fn shape() -> TypeShape {
        TypeShape::mapping(T::shape())
    }
}

impl<T: Shaped> Shaped for BTreeMap<String, T> {
    fn shape() -> TypeShape {
        TypeShape::mapping(T::shape())
    }
}

// Host types that are structured internally but carry a registry
// override by default. Modeled as opaque named records so that removing
// the override falls back to an empty object, matching the structural
// classification rules.

impl Shaped for chrono::DateTime<chrono::Utc> {
    fn shape() -> TypeShape {
        TypeShape::record(RecordShape::new("chrono::DateTime"))
    }
}

impl Shaped for chrono::NaiveDate {
    fn shape() -> TypeShape {
        TypeShape::record(RecordShape::new("chrono::NaiveDate"))
    }
}

impl Shaped for uuid::Uuid {
    fn shape() -> TypeShape {
        TypeShape::record(RecordShape::new("uuid::Uuid"))
    }
}

impl Shaped for std::time::Duration {
    fn shape() -> TypeShape {
        TypeShape::int(IntWidth::W64).with_name("std::time::Duration")
    }
}

impl Shaped for serde_json::Number {
    fn shape() -> TypeShape {
        TypeShape::string().with_name("serde_json::Number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shaped_primitives() {
        assert_eq!(bool::shape().kind, ShapeKind::Bool);
        assert_eq!(i32::shape().kind, ShapeKind::Int(IntWidth::W32));
        assert_eq!(u64::shape().kind, ShapeKind::Uint(IntWidth::W64));
        assert_eq!(String::shape().kind, ShapeKind::Str);
        assert_eq!(f64::shape().kind, ShapeKind::Float64);
    }

    #[test]
    fn test_shaped_containers() {
        let vec = Vec::<String>::shape();
        match vec.kind {
            ShapeKind::Sequence(element) => assert_eq!(element.kind, ShapeKind::Str),
            other => panic!("expected sequence, got {:?}", other),
        }

        let map = HashMap::<String, i64>::shape();
        match map.kind {
            ShapeKind::Mapping(value) => assert_eq!(value.kind, ShapeKind::Int(IntWidth::W64)),
            other => panic!("expected mapping, got {:?}", other),
        }

        let opt = Option::<bool>::shape();
        match opt.kind {
            ShapeKind::Pointer(inner) => assert_eq!(inner.kind, ShapeKind::Bool),
            other => panic!("expected pointer, got {:?}", other),
        }
    }

    #[test]
    fn test_derived_name_record() {
        let shape = TypeShape::record(RecordShape::new("models::Pet"));
        assert_eq!(shape.derived_name(), "Pet");

        let dotted = TypeShape::record(RecordShape::new("models.Pet"));
        assert_eq!(dotted.derived_name(), "Pet");
    }

    #[test]
    fn test_derived_name_containers() {
        let pet = TypeShape::record(RecordShape::new("Pet"));
        assert_eq!(TypeShape::sequence(pet.clone()).derived_name(), "PetArray");
        assert_eq!(TypeShape::mapping(pet.clone()).derived_name(), "PetMap");
        assert_eq!(
            TypeShape::sequence(TypeShape::sequence(pet)).derived_name(),
            "PetArrayArray"
        );
    }

    #[test]
    fn test_derived_name_unwraps_pointers() {
        let shape = TypeShape::pointer(TypeShape::pointer(TypeShape::record(RecordShape::new(
            "Pet",
        ))));
        assert_eq!(shape.derived_name(), "Pet");
    }

    #[test]
    fn test_derived_name_scalar_label() {
        assert_eq!(TypeShape::int(IntWidth::W64).derived_name(), "i64");
        assert_eq!(TypeShape::string().derived_name(), "string");
    }

    #[test]
    fn test_deferred_field_resolution() {
        fn node() -> TypeShape {
            TypeShape::record(RecordShape::new("Node").field(FieldShape::deferred("Next", node)))
        }

        // Resolving one level terminates even though the type is cyclic.
        let shape = node();
        match &shape.kind {
            ShapeKind::Record(record) => {
                assert_eq!(record.fields.len(), 1);
                assert_eq!(record.fields[0].shape().derived_name(), "Node");
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_source_equality() {
        let eager = FieldShape::new("Name", TypeShape::string());
        assert_eq!(eager, eager.clone());

        let deferred = FieldShape::of::<String>("Name");
        assert_eq!(deferred, deferred.clone());

        // A deferred source is never equal to an eager one, even though
        // both resolve to the same shape here.
        assert_ne!(eager, deferred);
    }

    #[test]
    fn test_cyclic_shape_equality_terminates() {
        fn node() -> TypeShape {
            TypeShape::record(RecordShape::new("Node").field(FieldShape::deferred("Next", node)))
        }

        assert_eq!(node(), node());
    }
}
