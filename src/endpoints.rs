/*!
Fluent endpoint builder.

A configuration-accumulation façade over [`Endpoint`]: methods chain,
nothing is computed until the endpoint is registered on an [`ApiSpec`]
and its schema references are expanded.

[`ApiSpec`]: crate::specification::ApiSpec
*/

use crate::{
    shape::{Shaped, TypeShape},
    specification::{Endpoint, Parameter, Response, SchemaRef, SecurityRequirement},
    types::ParameterType,
};

/// Builder for one endpoint definition.
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    endpoint: Endpoint,
}

impl Endpoint {
    /// Start building an endpoint for a method and path.
    ///
    /// Consumes and produces default to `application/json`; the
    /// operation id defaults to the lowercased method followed by the
    /// camel-cased path (`get` + `/pets/{id}` = `getPetsId`).
    pub fn builder(method: &str, path: &str) -> EndpointBuilder {
        let method = method.to_uppercase();
        let endpoint = Endpoint {
            operation_id: format!("{}{}", method.to_lowercase(), camel(path)),
            method,
            path: path.to_string(),
            produces: vec!["application/json".to_string()],
            consumes: vec!["application/json".to_string()],
            ..Default::default()
        };
        EndpointBuilder { endpoint }
    }
}

impl EndpointBuilder {
    pub fn summary(mut self, summary: &str) -> Self {
        self.endpoint.summary = Some(summary.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.endpoint.description = Some(description.to_string());
        self
    }

    pub fn operation_id(mut self, operation_id: &str) -> Self {
        self.endpoint.operation_id = operation_id.to_string();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.endpoint.tags.push(tag.to_string());
        self
    }

    pub fn consumes(mut self, media_types: &[&str]) -> Self {
        self.endpoint.consumes = media_types.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn produces(mut self, media_types: &[&str]) -> Self {
        self.endpoint.produces = media_types.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.endpoint.deprecated = Some(true);
        self
    }

    /// Define a path parameter
    pub fn path_param(
        self,
        name: &str,
        kind: ParameterType,
        description: &str,
        required: bool,
    ) -> Self {
        self.typed_param("path", name, kind, description, None, required)
    }

    /// Define a path parameter with a default value
    pub fn path_param_default(
        self,
        name: &str,
        kind: ParameterType,
        description: &str,
        default: &str,
        required: bool,
    ) -> Self {
        self.typed_param("path", name, kind, description, Some(default), required)
    }

    /// Define a query parameter
    pub fn query_param(
        self,
        name: &str,
        kind: ParameterType,
        description: &str,
        required: bool,
    ) -> Self {
        self.typed_param("query", name, kind, description, None, required)
    }

    /// Define a query parameter with a default value
    pub fn query_param_default(
        self,
        name: &str,
        kind: ParameterType,
        description: &str,
        default: &str,
        required: bool,
    ) -> Self {
        self.typed_param("query", name, kind, description, Some(default), required)
    }

    fn typed_param(
        mut self,
        location: &str,
        name: &str,
        kind: ParameterType,
        description: &str,
        default: Option<&str>,
        required: bool,
    ) -> Self {
        self.endpoint.parameters.push(Parameter {
            name: name.to_string(),
            location: location.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            required,
            kind: Some(kind),
            default: default.map(|d| d.to_string()),
            schema: None,
        });
        self
    }

    /// Define a body parameter from a [`Shaped`] type, as commonly
    /// used with POST, PUT and PATCH
    pub fn body<T: Shaped>(self, description: &str, required: bool) -> Self {
        self.body_shape(T::shape(), description, required)
    }

    /// Define a body parameter from an explicit shape
    pub fn body_shape(mut self, shape: TypeShape, description: &str, required: bool) -> Self {
        self.endpoint.parameters.push(Parameter {
            name: "body".to_string(),
            location: "body".to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            required,
            kind: None,
            default: None,
            schema: Some(SchemaRef::from_shape(shape)),
        });
        self
    }

    /// Set the response for a status code; may be used multiple times
    /// with different codes
    pub fn response(mut self, code: u16, response: Response) -> Self {
        self.endpoint.responses.insert(code.to_string(), response);
        self
    }

    /// Shorthand for a 200 response
    pub fn ok(self, response: Response) -> Self {
        self.response(200, response)
    }

    /// Require a security scheme with the given scopes; may be used
    /// multiple times to offer alternatives
    pub fn security(mut self, scheme: &str, scopes: &[&str]) -> Self {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(
            scheme.to_string(),
            scopes.iter().map(|s| s.to_string()).collect(),
        );
        self.endpoint
            .security
            .get_or_insert_with(Vec::new)
            .push(requirement);
        self
    }

    /// Opt the endpoint out of security entirely; overrides any scheme
    /// set earlier and serializes as an empty requirement list
    pub fn no_security(mut self) -> Self {
        self.endpoint.security = Some(Vec::new());
        self
    }

    pub fn build(self) -> Endpoint {
        self.endpoint
    }
}

/// Camel-case a path pattern: split on separators and braces, uppercase
/// each segment's first letter, drop everything else.
fn camel(path: &str) -> String {
    path.split(|c: char| !c.is_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldShape, RecordShape};

    #[test]
    fn test_builder_defaults() {
        let endpoint = Endpoint::builder("get", "/pets/{id}").build();
        assert_eq!(endpoint.method, "GET");
        assert_eq!(endpoint.path, "/pets/{id}");
        assert_eq!(endpoint.operation_id, "getPetsId");
        assert_eq!(endpoint.produces, vec!["application/json".to_string()]);
        assert_eq!(endpoint.consumes, vec!["application/json".to_string()]);
    }

    #[test]
    fn test_camel() {
        assert_eq!(camel("/pets"), "Pets");
        assert_eq!(camel("/pets/{id}"), "PetsId");
        assert_eq!(camel("/store/order-items"), "StoreOrderItems");
    }

    #[test]
    fn test_typed_params() {
        let endpoint = Endpoint::builder("get", "/pets/{id}")
            .path_param("id", ParameterType::Integer, "pet id", true)
            .query_param_default("limit", ParameterType::Integer, "page size", "20", false)
            .build();

        assert_eq!(endpoint.parameters.len(), 2);
        let id = &endpoint.parameters[0];
        assert_eq!(id.location, "path");
        assert_eq!(id.kind, Some(ParameterType::Integer));
        assert!(id.required);

        let limit = &endpoint.parameters[1];
        assert_eq!(limit.location, "query");
        assert_eq!(limit.default.as_deref(), Some("20"));
        assert!(!limit.required);
    }

    #[test]
    fn test_body_parameter() {
        let pet = TypeShape::record(RecordShape::new("Pet").field(FieldShape::of::<String>("Name")));
        let endpoint = Endpoint::builder("post", "/pets")
            .body_shape(pet, "the pet to add", true)
            .build();

        let body = &endpoint.parameters[0];
        assert_eq!(body.name, "body");
        assert_eq!(body.location, "body");
        assert!(body.kind.is_none());
        assert_eq!(
            body.schema.as_ref().unwrap().reference,
            "#/definitions/Pet"
        );
    }

    #[test]
    fn test_responses() {
        let endpoint = Endpoint::builder("get", "/pets")
            .ok(Response::new("success"))
            .response(404, Response::new("not found"))
            .build();

        assert_eq!(endpoint.responses.len(), 2);
        assert_eq!(endpoint.responses["200"].description, "success");
        assert_eq!(endpoint.responses["404"].description, "not found");
    }

    #[test]
    fn test_security_requirements() {
        let endpoint = Endpoint::builder("delete", "/pets/{id}")
            .security("petstore_auth", &["write:pets", "read:pets"])
            .security("api_key", &[])
            .build();

        let security = endpoint.security.as_ref().unwrap();
        assert_eq!(security.len(), 2);
        assert_eq!(
            security[0]["petstore_auth"],
            vec!["write:pets".to_string(), "read:pets".to_string()]
        );
        assert!(security[1]["api_key"].is_empty());
    }

    #[test]
    fn test_no_security_clears_requirements() {
        let endpoint = Endpoint::builder("get", "/health")
            .security("api_key", &[])
            .no_security()
            .build();

        assert_eq!(endpoint.security, Some(Vec::new()));
    }

    #[test]
    fn test_overrides_and_flags() {
        let endpoint = Endpoint::builder("put", "/pets")
            .summary("update")
            .description("update a pet")
            .operation_id("updatePet")
            .tag("pets")
            .consumes(&["application/xml"])
            .produces(&["application/xml"])
            .deprecated()
            .build();

        assert_eq!(endpoint.operation_id, "updatePet");
        assert_eq!(endpoint.tags, vec!["pets".to_string()]);
        assert_eq!(endpoint.consumes, vec!["application/xml".to_string()]);
        assert_eq!(endpoint.deprecated, Some(true));
    }
}
