/*!
The derivation core: turns a type shape into a flat, named set of
schema objects.

[`SchemaBuilder::inspect`] produces one property fragment per type,
[`SchemaBuilder::define_object`] one named object per type, and
[`SchemaBuilder::build_graph`] closes over every record transitively
reachable through property references. Record types are never inlined;
a property always points at them through a `$ref`, which is what makes
recursive and shared types representable.
*/

use crate::{
    shape::{RecordShape, ShapeKind, Shaped, TypeShape},
    types::{classify_format, Format, ParameterType, TypeRegistry},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One field-or-element schema fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    /// Scalar kind; empty when `reference` supersedes inline typing
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterType>,

    /// Numeric width hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    /// By-name pointer to another schema object; set if and only if
    /// the underlying type is a record without a registry override
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Element schema for sequence types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,

    /// Value schema for mapping types
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Property>>,

    /// Example value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enumeration: Vec<String>,

    /// Underlying shape, kept so the closure pass can re-derive the
    /// records a property points at. Never serialized.
    #[serde(skip)]
    pub shape: TypeShape,
}

/// Equality covers the schema facets only; the carried shape is a
/// derivation-internal artifact and is excluded.
impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.format == other.format
            && self.reference == other.reference
            && self.items == other.items
            && self.additional_properties == other.additional_properties
            && self.example == other.example
            && self.description == other.description
            && self.enumeration == other.enumeration
    }
}

/// One named schema object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaObject {
    /// Derived name; the key under which the object lives in a graph
    #[serde(skip)]
    pub name: String,

    /// Scalar kind of the object
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterType>,

    /// Numeric width hint, for scalar wrapper objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    /// Required field names, in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,

    /// Field name to property mapping, in declaration order
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub properties: IndexMap<String, Property>,

    /// Element schema for sequence objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,

    /// Value schema for mapping objects
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Property>>,
}

/// Closure result: derived name to schema object, insertion-ordered.
pub type ObjectGraph = IndexMap<String, SchemaObject>;

/// Result of a full derivation: a reference suitable for embedding in
/// a parameter or response slot, plus the expanded object graph to
/// merge into a definitions table.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSchema {
    pub reference: String,
    pub graph: ObjectGraph,
}

/// Definitions-table pointer for a derived name
pub fn make_ref(name: &str) -> String {
    format!("#/definitions/{}", name)
}

/// The type-to-schema derivation engine.
///
/// Owns the override registry it classifies with; separate builders
/// are fully independent and derivations share no state.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    registry: TypeRegistry,
}

impl SchemaBuilder {
    /// Builder with the default registry seed set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with a caller-configured registry
    pub fn with_registry(registry: TypeRegistry) -> Self {
        SchemaBuilder { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Produce the property fragment for one shape.
    ///
    /// Pointers unwrap first. Records become a bare `$ref` with the
    /// inline kind cleared; mappings and sequences carry an element
    /// property derived from their value/element shape. A registry
    /// override short-circuits all structural handling.
    pub fn inspect(&self, shape: &TypeShape) -> Property {
        if let ShapeKind::Pointer(inner) = &shape.kind {
            return self.inspect(inner);
        }

        let mut property = Property {
            kind: Some(self.registry.classify(shape)),
            format: classify_format(shape),
            shape: shape.clone(),
            ..Default::default()
        };

        if self.registry.has_override(shape) {
            return property;
        }

        match &shape.kind {
            ShapeKind::Record(_) => {
                property.reference = Some(make_ref(&shape.derived_name()));
                property.kind = None;
            }
            ShapeKind::Mapping(value) => {
                property.additional_properties = Some(Box::new(self.inspect(value)));
            }
            ShapeKind::Sequence(element) => {
                // The property stands for the element from here on.
                property.shape = (**element).clone();
                property.items = Some(Box::new(self.inspect(element)));
            }
            _ => {}
        }
        property
    }

    /// Enumerate a record's fields into a property mapping plus the
    /// ordered list of required field names.
    ///
    /// Non-exported fields are skipped. Embedded records splice their
    /// fields into the parent; their required names are not carried
    /// over. A later field deriving the same external name overwrites
    /// an earlier one.
    pub fn enumerate_fields(
        &self,
        record: &RecordShape,
    ) -> (IndexMap<String, Property>, Vec<String>) {
        let mut properties = IndexMap::new();
        let mut required = Vec::new();

        for field in &record.fields {
            if !field.name.chars().next().is_some_and(|c| c.is_uppercase()) {
                continue;
            }

            let shape = field.shape();
            if field.embedded {
                let mut target = &shape;
                while let ShapeKind::Pointer(inner) = &target.kind {
                    target = inner.as_ref();
                }
                if let ShapeKind::Record(sub) = &target.kind {
                    let (sub_properties, _) = self.enumerate_fields(sub);
                    for (name, property) in sub_properties {
                        properties.insert(name, property);
                    }
                }
                continue;
            }

            // External name from the naming annotation: first segment,
            // `-` omits the field, empty or comma-prefixed falls back
            // to the declared name.
            let tag = field.tags.json.as_deref().map(str::trim).unwrap_or("");
            let name = if tag.is_empty() || tag.starts_with(',') {
                field.name.clone()
            } else {
                tag.split(',').next().unwrap_or("").to_string()
            };
            if name == "-" {
                continue;
            }

            let mut property = if tag.contains(",string") {
                // Presentation coercion: rendered as a string no matter
                // what the field's type classifies as.
                Property {
                    kind: Some(ParameterType::String),
                    shape: shape.clone(),
                    ..Default::default()
                }
            } else {
                self.inspect(&shape)
            };

            if field.tags.required {
                required.push(name.clone());
            }
            if let Some(example) = field.tags.example.as_deref().filter(|v| !v.is_empty()) {
                property.example = Some(example.to_string());
            }
            if let Some(description) = field.tags.description.as_deref().filter(|v| !v.is_empty())
            {
                property.description = Some(description.to_string());
            }
            if let Some(desc) = field.tags.desc.as_deref().filter(|v| !v.is_empty()) {
                property.description = Some(desc.to_string());
            }
            if let Some(values) = field.tags.enumeration.as_deref().filter(|v| !v.is_empty()) {
                property.enumeration = values.split(',').map(|v| v.to_string()).collect();
            }

            properties.insert(name, property);
        }
        (properties, required)
    }

    /// Produce one named schema object for a shape.
    pub fn define_object(&self, shape: &TypeShape) -> SchemaObject {
        if let ShapeKind::Pointer(inner) = &shape.kind {
            return self.define_object(inner);
        }

        let name = shape.derived_name();
        if self.registry.has_override(shape) {
            return self.scalar_wrapper(name, shape);
        }

        match &shape.kind {
            ShapeKind::Sequence(element) => SchemaObject {
                name,
                kind: Some(ParameterType::Array),
                items: Some(Box::new(self.inspect(element))),
                ..Default::default()
            },
            ShapeKind::Mapping(value) => SchemaObject {
                name,
                kind: Some(ParameterType::Object),
                additional_properties: Some(Box::new(self.inspect(value))),
                ..Default::default()
            },
            ShapeKind::Record(record) => {
                let (properties, required) = self.enumerate_fields(record);
                SchemaObject {
                    name,
                    kind: Some(ParameterType::Object),
                    required,
                    properties,
                    ..Default::default()
                }
            }
            _ => self.scalar_wrapper(name, shape),
        }
    }

    fn scalar_wrapper(&self, name: String, shape: &TypeShape) -> SchemaObject {
        SchemaObject {
            name,
            kind: Some(self.registry.classify(shape)),
            format: classify_format(shape),
            ..Default::default()
        }
    }

    /// Materialize every schema object transitively reachable from a
    /// root shape.
    ///
    /// Fixed-point iteration with a dirty flag: each pass walks every
    /// property of every object in the graph, including element
    /// property chains, and defines any referenced record not yet
    /// present. A name, once inserted, is never re-derived, which is
    /// what makes self- and mutually-referential records terminate.
    pub fn build_graph(&self, shape: &TypeShape) -> ObjectGraph {
        let mut graph = ObjectGraph::new();
        let root = self.define_object(shape);
        graph.insert(root.name.clone(), root);

        let mut passes = 0usize;
        let mut dirty = true;
        while dirty {
            dirty = false;
            passes += 1;

            let mut discovered = Vec::new();
            for object in graph.values() {
                let element_properties = object
                    .items
                    .iter()
                    .chain(object.additional_properties.iter());
                for property in object.properties.values().chain(element_properties.map(|p| &**p)) {
                    self.collect_references(property, &graph, &mut discovered);
                }
            }

            for shape in discovered {
                let object = self.define_object(&shape);
                if !graph.contains_key(&object.name) {
                    debug!(name = %object.name, "discovered referenced object");
                    graph.insert(object.name.clone(), object);
                    dirty = true;
                }
            }
        }

        debug!(passes, objects = graph.len(), "object graph closed");
        graph
    }

    /// Record shapes this property points at that are not yet defined,
    /// walking through element property chains.
    fn collect_references(
        &self,
        property: &Property,
        graph: &ObjectGraph,
        discovered: &mut Vec<TypeShape>,
    ) {
        if matches!(property.shape.kind, ShapeKind::Record(_))
            && !self.registry.has_override(&property.shape)
            && !graph.contains_key(&property.shape.derived_name())
        {
            discovered.push(property.shape.clone());
        }
        if let Some(items) = &property.items {
            self.collect_references(items, graph, discovered);
        }
        if let Some(values) = &property.additional_properties {
            self.collect_references(values, graph, discovered);
        }
    }

    /// Derive the full schema for a shape: the root reference plus the
    /// closed object graph.
    pub fn derive_shape(&self, shape: &TypeShape) -> DerivedSchema {
        let graph = self.build_graph(shape);
        // The root object is always the first insertion.
        let root = graph
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| shape.derived_name());
        DerivedSchema {
            reference: make_ref(&root),
            graph,
        }
    }

    /// Derive the full schema for a [`Shaped`] type
    pub fn derive<T: Shaped>(&self) -> DerivedSchema {
        self.derive_shape(&T::shape())
    }
}
