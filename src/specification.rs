/*!
Swagger 2.0 document container.

A serde model mirroring the wire format 1:1. The container consumes
what the derivation core produces: endpoints carry schema references,
and [`ApiSpec::add_endpoint`] expands each reference's object graph
into the shared definitions table.
*/

use crate::{
    schema::{make_ref, ObjectGraph, SchemaBuilder, SchemaObject},
    shape::{Shaped, TypeShape},
    types::{Format, ParameterType},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Complete Swagger 2.0 specification document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSpec {
    /// Specification version, always "2.0"
    pub swagger: String,

    /// API metadata
    pub info: Info,

    /// Host serving the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Base path prefix for all routes
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Transfer protocols
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub schemes: Vec<String>,

    /// Paths and their operations
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Shared schema definitions table
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub definitions: IndexMap<String, SchemaObject>,

    /// Named security schemes operations can require
    #[serde(
        rename = "securityDefinitions",
        skip_serializing_if = "IndexMap::is_empty",
        default
    )]
    pub security_definitions: IndexMap<String, SecurityScheme>,

    /// Tags for grouping operations
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<Tag>,
}

/// Scheme name to required scopes; one alternative in an operation's
/// security list.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Security scheme definition, tagged by its `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "apiKey")]
    ApiKey {
        /// Header or query parameter carrying the key
        name: String,
        #[serde(rename = "in")]
        location: String,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        flow: String,
        #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
        authorization_url: Option<String>,
        #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
        #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
        scopes: IndexMap<String, String>,
    },
}

/// API metadata information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Terms of service URL
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    /// Contact information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    /// License information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    /// API version
    pub version: String,
}

/// Contact information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// License information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Tag for grouping operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations registered under one path, keyed by HTTP method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Endpoint>,
}

impl PathItem {
    /// Whether a method maps to an operation slot
    pub fn supports(method: &str) -> bool {
        matches!(
            method,
            "GET" | "PUT" | "POST" | "DELETE" | "OPTIONS" | "HEAD" | "PATCH"
        )
    }

    fn slot(&mut self, method: &str) -> Option<&mut Option<Endpoint>> {
        match method {
            "GET" => Some(&mut self.get),
            "PUT" => Some(&mut self.put),
            "POST" => Some(&mut self.post),
            "DELETE" => Some(&mut self.delete),
            "OPTIONS" => Some(&mut self.options),
            "HEAD" => Some(&mut self.head),
            "PATCH" => Some(&mut self.patch),
            _ => None,
        }
    }
}

/// One operation: method, path and its swagger fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP method; routing key, not serialized
    #[serde(skip)]
    pub method: String,

    /// Path pattern; routing key, not serialized
    #[serde(skip)]
    pub path: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "operationId")]
    pub operation_id: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub produces: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub consumes: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,

    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    /// Security alternatives; `Some(vec![])` opts the operation out of
    /// document-level security and serializes as an empty list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// Operation parameter (path, query or body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Parameter location
    #[serde(rename = "in")]
    pub location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub required: bool,

    /// Scalar kind, for path/query parameters
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterType>,

    /// Default value, for path/query parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Schema reference, for body parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

/// One response for a status code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,

    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub headers: IndexMap<String, Header>,
}

/// Response header specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "type")]
    pub kind: ParameterType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// By-name schema pointer embedded in a parameter or response slot.
///
/// Keeps the underlying shape alongside the serialized `$ref` so the
/// document container can expand the full object graph when the
/// endpoint is registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,

    #[serde(skip)]
    pub shape: TypeShape,
}

impl SchemaRef {
    /// Reference for a [`Shaped`] type
    pub fn new<T: Shaped>() -> Self {
        Self::from_shape(T::shape())
    }

    /// Reference for an explicit shape
    pub fn from_shape(shape: TypeShape) -> Self {
        SchemaRef {
            reference: make_ref(&shape.derived_name()),
            shape,
        }
    }
}

impl Response {
    pub fn new(description: &str) -> Self {
        Response {
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Attach a response body schema for a [`Shaped`] type
    pub fn schema<T: Shaped>(mut self) -> Self {
        self.schema = Some(SchemaRef::new::<T>());
        self
    }

    /// Attach a response body schema for an explicit shape
    pub fn schema_shape(mut self, shape: TypeShape) -> Self {
        self.schema = Some(SchemaRef::from_shape(shape));
        self
    }

    /// Add a response header
    pub fn header(
        mut self,
        name: &str,
        kind: ParameterType,
        format: Option<Format>,
        description: &str,
    ) -> Self {
        self.headers.insert(
            name.to_string(),
            Header {
                kind,
                format,
                description: if description.is_empty() {
                    None
                } else {
                    Some(description.to_string())
                },
            },
        );
        self
    }
}

impl ApiSpec {
    /// New document with the given title and version
    pub fn new(title: &str, version: &str) -> Self {
        ApiSpec {
            swagger: "2.0".to_string(),
            info: Info {
                title: title.to_string(),
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: version.to_string(),
            },
            host: None,
            base_path: Some("/".to_string()),
            schemes: Vec::new(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
            security_definitions: IndexMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = Some(base_path.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.info.description = Some(description.to_string());
        self
    }

    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.schemes.push(scheme.to_string());
        self
    }

    /// Register a named security scheme operations can reference
    pub fn add_security_definition(mut self, name: &str, scheme: SecurityScheme) -> Self {
        self.security_definitions.insert(name.to_string(), scheme);
        self
    }

    pub fn add_tag(mut self, name: &str, description: Option<&str>) -> Self {
        self.tags.push(Tag {
            name: name.to_string(),
            description: description.map(|s| s.to_string()),
        });
        self
    }

    /// Register an endpoint under its path and method, expanding every
    /// schema reference it carries into the definitions table.
    ///
    /// Definitions merge by derived name, first writer wins.
    ///
    /// An endpoint with an unsupported method is dropped whole; it
    /// leaves neither a path item nor definitions behind.
    pub fn add_endpoint(&mut self, builder: &SchemaBuilder, endpoint: Endpoint) {
        if !PathItem::supports(&endpoint.method) {
            warn!(method = %endpoint.method, "unsupported method, endpoint dropped");
            return;
        }

        for parameter in &endpoint.parameters {
            if let Some(schema) = &parameter.schema {
                self.merge_graph(builder.build_graph(&schema.shape));
            }
        }
        for response in endpoint.responses.values() {
            if let Some(schema) = &response.schema {
                self.merge_graph(builder.build_graph(&schema.shape));
            }
        }

        let item = self.paths.entry(endpoint.path.clone()).or_default();
        if let Some(slot) = item.slot(&endpoint.method) {
            *slot = Some(endpoint);
        }
    }

    fn merge_graph(&mut self, graph: ObjectGraph) {
        for (name, object) in graph {
            if !self.definitions.contains_key(&name) {
                debug!(name = %name, "definition added");
                self.definitions.insert(name, object);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldShape, RecordShape};

    fn pet_shape() -> TypeShape {
        TypeShape::record(
            RecordShape::new("Pet")
                .field(FieldShape::of::<String>("Name"))
                .field(FieldShape::of::<Vec<String>>("Tags").required()),
        )
    }

    #[test]
    fn test_add_endpoint_merges_definitions() {
        let builder = SchemaBuilder::new();
        let mut spec = ApiSpec::new("petstore", "1.0.0");

        let endpoint = Endpoint::builder("post", "/pets")
            .summary("Create a pet")
            .body_shape(pet_shape(), "the pet to add", true)
            .response(201, Response::new("created").schema_shape(pet_shape()))
            .build();
        spec.add_endpoint(&builder, endpoint);

        assert!(spec.definitions.contains_key("Pet"));
        assert!(spec.paths.contains_key("/pets"));
        assert!(spec.paths["/pets"].post.is_some());
    }

    #[test]
    fn test_definitions_dedup_across_endpoints() {
        let builder = SchemaBuilder::new();
        let mut spec = ApiSpec::new("petstore", "1.0.0");

        let create = Endpoint::builder("post", "/pets")
            .body_shape(pet_shape(), "pet", true)
            .response(201, Response::new("created"))
            .build();
        let list = Endpoint::builder("get", "/pets")
            .response(
                200,
                Response::new("ok").schema_shape(TypeShape::sequence(pet_shape())),
            )
            .build();
        spec.add_endpoint(&builder, create);
        spec.add_endpoint(&builder, list);

        assert_eq!(
            spec.definitions.keys().filter(|k| *k == "Pet").count(),
            1
        );
        assert!(spec.definitions.contains_key("PetArray"));
        let item = &spec.paths["/pets"];
        assert!(item.get.is_some());
        assert!(item.post.is_some());
    }

    #[test]
    fn test_unsupported_method_leaves_document_untouched() {
        let builder = SchemaBuilder::new();
        let mut spec = ApiSpec::new("petstore", "1.0.0");

        let endpoint = Endpoint::builder("trace", "/pets")
            .body_shape(pet_shape(), "pet", true)
            .response(200, Response::new("ok"))
            .build();
        spec.add_endpoint(&builder, endpoint);

        assert!(spec.paths.is_empty());
        assert!(spec.definitions.is_empty());
    }

    #[test]
    fn test_security_definitions() {
        let spec = ApiSpec::new("petstore", "1.0.0")
            .add_security_definition(
                "api_key",
                SecurityScheme::ApiKey {
                    name: "api_key".to_string(),
                    location: "header".to_string(),
                },
            )
            .add_security_definition("admin", SecurityScheme::Basic);

        assert_eq!(spec.security_definitions.len(), 2);
        assert_eq!(
            spec.security_definitions["api_key"],
            SecurityScheme::ApiKey {
                name: "api_key".to_string(),
                location: "header".to_string(),
            }
        );
    }

    #[test]
    fn test_schema_ref_naming() {
        let reference = SchemaRef::from_shape(pet_shape());
        assert_eq!(reference.reference, "#/definitions/Pet");

        let array = SchemaRef::from_shape(TypeShape::sequence(pet_shape()));
        assert_eq!(array.reference, "#/definitions/PetArray");
    }

    #[test]
    fn test_response_builder() {
        let response = Response::new("ok")
            .schema_shape(pet_shape())
            .header("X-Rate-Limit", ParameterType::Integer, Some(Format::Int32), "per hour");

        assert_eq!(response.description, "ok");
        assert!(response.schema.is_some());
        let header = &response.headers["X-Rate-Limit"];
        assert_eq!(header.kind, ParameterType::Integer);
        assert_eq!(header.format, Some(Format::Int32));
    }
}
