/*!
# apischema

Swagger definition derivation from runtime type shapes.

This crate turns descriptions of in-memory data types into a named,
deduplicated set of schema objects, the shape of a Swagger/OpenAPI
"definitions" section, without hand-written schema files. Types are
described as [`TypeShape`] values (built by hand or through the
[`Shaped`] trait); the derivation engine walks them, classifies
scalars, references records by name instead of inlining them, and
closes over every record transitively reachable from the root.

## Features

- Total scalar/format classification: every shape maps to a kind,
  unrecognized ones to `unknown`
- Override registry for host types that should render as opaque
  scalars (timestamps, durations, arbitrary-precision numbers)
- Fixed-point graph closure that terminates on self-referential and
  mutually-referential record types
- Field metadata from annotations: naming, required, example,
  description, allowed values
- Swagger 2.0 document container with a fluent endpoint builder and
  JSON/YAML export

## Usage

```rust
use apischema::{FieldShape, RecordShape, SchemaBuilder, TypeShape};

let pet = TypeShape::record(
    RecordShape::new("Pet")
        .field(FieldShape::of::<String>("Name"))
        .field(FieldShape::of::<Vec<String>>("Tags").required()),
);

let builder = SchemaBuilder::new();
let derived = builder.derive_shape(&pet);
assert_eq!(derived.reference, "#/definitions/Pet");
assert!(derived.graph.contains_key("Pet"));
```
*/

// Re-export main types
pub use crate::{
    endpoints::EndpointBuilder,
    error::{SchemaError, SchemaResult},
    schema::{make_ref, DerivedSchema, ObjectGraph, Property, SchemaBuilder, SchemaObject},
    shape::{
        FieldShape, FieldTags, IntWidth, RecordShape, ShapeKind, ShapeSource, Shaped, TypeShape,
    },
    specification::{
        ApiSpec, Contact, Endpoint, Header, Info, License, Parameter, PathItem, Response,
        SchemaRef, SecurityRequirement, SecurityScheme, Tag,
    },
    types::{classify_format, Format, ParameterType, TypeRegistry},
};

// Shape descriptors and classification
pub mod shape;
pub mod types;

// Schema derivation
pub mod schema;

// Document assembly
pub mod endpoints;
pub mod specification;

// Serialization
pub mod error;
pub mod export;
