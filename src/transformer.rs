//! Main `@auth` transformer.
//!
//! Coordinates rule extraction, validation, marker synthesis and policy
//! synthesis over a whole schema document.

use crate::binding::{self, ResourceBinding};
use crate::config::TransformerConfig;
use crate::directives::{apply_markers, ensure_markers_absent, plan_markers};
use crate::error::{Result, TransformError, AUTH_ON_NON_OBJECT_MEMBER, AUTH_REQUIRES_MODEL};
use crate::output::TransformOutput;
use crate::parser::{
    extract_auth_rules, find_directive, has_directive, parse_schema, print_schema, SchemaDocument,
    AUTH_DIRECTIVE, MODEL_DIRECTIVE,
};
use crate::policy::{PolicyAccumulator, PolicyDocument, PolicyLimits};
use crate::rule::{AuthProvider, AuthRule};
use crate::validator::{validate_rules, ParentKind, Placement, RootTypes};
use graphql_parser::schema::{Definition, Directive, Field, TypeDefinition, TypeExtension};
use graphql_parser::Pos;
use std::collections::HashSet;
use tracing::{debug, info};

/// `@auth` transformer for one API configuration.
///
/// Each call to [`AuthTransformer::transform_document`] is an independent run
/// with its own policy accumulator.
pub struct AuthTransformer {
    /// Transformer configuration
    config: TransformerConfig,
    /// Root field to resource resolution
    binding: Box<dyn ResourceBinding>,
}

/// An `@auth` occurrence found in the document, validated and planned.
#[derive(Debug)]
struct AuthSite {
    /// Index into `document.definitions`
    definition: usize,
    /// Index into the object's fields, `None` for the type itself
    field: Option<usize>,
    type_name: String,
    node: String,
    placement: Placement,
    rules: Vec<AuthRule>,
    markers: Vec<AuthProvider>,
    position: Pos,
}

/// Where a candidate `@auth` occurrence sits.
struct SiteLocation<'d> {
    definition: usize,
    field: Option<usize>,
    type_name: &'d str,
    node: String,
    placement: Placement,
}

/// Borrowed view over object type definitions and extensions.
struct ObjectView<'d, 'a> {
    name: &'d str,
    directives: &'d [Directive<'a, String>],
    fields: &'d [Field<'a, String>],
}

impl AuthTransformer {
    /// Create a transformer using the binding described by the configuration.
    pub fn new(config: TransformerConfig) -> Result<Self> {
        config.validate()?;
        let binding = binding::from_config(&config.binding);
        Ok(Self { config, binding })
    }

    /// Create a transformer with a caller-supplied resource binding.
    pub fn with_binding(config: TransformerConfig, binding: Box<dyn ResourceBinding>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, binding })
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Parse, transform and print a schema, assembling the policy resources.
    pub fn transform_schema(&self, source: &str) -> Result<TransformOutput> {
        let mut document = parse_schema(source)?;
        let policies = self.transform_document(&mut document)?;
        Ok(TransformOutput::new(
            print_schema(&document),
            policies,
            &self.config.policy,
        ))
    }

    /// Transform a parsed document in place and return its policy documents.
    ///
    /// The whole document is validated before any node is modified, so on
    /// error the document is left as it was.
    pub fn transform_document(&self, document: &mut SchemaDocument<'_>) -> Result<Vec<PolicyDocument>> {
        let default = self.config.auth.default_provider();
        info!(
            default_provider = %default,
            definitions = document.definitions.len(),
            "Transforming @auth directives"
        );

        let sites = self.collect_sites(document)?;

        for site in &sites {
            if site.markers.is_empty() {
                continue;
            }
            if let Some(directives) = node_directives_mut(document, site.definition, site.field) {
                apply_markers(directives, &site.markers, site.position);
                debug!(
                    node = %site.node,
                    markers = ?site.markers,
                    "Added provider markers"
                );
            }
        }

        let mut accumulator = PolicyAccumulator::new();
        for site in sites.iter().filter(|s| s.placement.is_root_field()) {
            let Some(field) = field_at(document, site.definition, site.field) else {
                continue;
            };
            let Some(resource) = self.binding.resolve(&site.type_name, field) else {
                debug!(node = %site.node, "Root field has no bound resource");
                continue;
            };
            for rule in &site.rules {
                accumulator.record(rule, default, &resource);
            }
        }

        let policies = accumulator.into_documents(&PolicyLimits::from(&self.config.policy));
        info!(
            auth_sites = sites.len(),
            policies = policies.len(),
            "Transformed @auth directives"
        );
        Ok(policies)
    }

    /// Find, validate and plan every `@auth` occurrence in document order.
    fn collect_sites(&self, document: &SchemaDocument<'_>) -> Result<Vec<AuthSite>> {
        let roots = RootTypes::from_document(document);
        let models = model_types(document);
        let mut sites = Vec::new();

        for (definition, def) in document.definitions.iter().enumerate() {
            let Some(object) = object_view(def) else {
                reject_non_object_auth(def)?;
                continue;
            };
            let root = roots.classify(object.name);
            let has_model = models.contains(object.name);

            let site = SiteLocation {
                definition,
                field: None,
                type_name: object.name,
                node: object.name.to_string(),
                placement: Placement::Type { has_model, root },
            };
            sites.extend(self.plan_site(site, object.directives)?);

            let parent = ParentKind::of(root, has_model);
            for (index, field) in object.fields.iter().enumerate() {
                let site = SiteLocation {
                    definition,
                    field: Some(index),
                    type_name: object.name,
                    node: format!("{}.{}", object.name, field.name),
                    placement: Placement::Field { parent },
                };
                sites.extend(self.plan_site(site, &field.directives)?);
            }
        }

        Ok(sites)
    }

    fn plan_site(
        &self,
        location: SiteLocation<'_>,
        directives: &[Directive<'_, String>],
    ) -> Result<Option<AuthSite>> {
        let Some(auth) = find_directive(directives, AUTH_DIRECTIVE) else {
            return Ok(None);
        };
        let Some(rules) = extract_auth_rules(directives, &location.node)? else {
            return Ok(None);
        };
        debug!(
            type_name = %location.type_name,
            node = %location.node,
            rules = rules.len(),
            "Found @auth directive"
        );

        validate_rules(location.placement, &rules, &self.config.auth)?;

        let markers = if location.placement.is_root_type() {
            Vec::new()
        } else {
            plan_markers(&rules, self.config.auth.default_provider())
        };
        ensure_markers_absent(directives, &markers, &location.node)?;

        Ok(Some(AuthSite {
            definition: location.definition,
            field: location.field,
            type_name: location.type_name.to_string(),
            node: location.node,
            placement: location.placement,
            rules,
            markers,
            position: auth.position,
        }))
    }
}

/// Names of object types carrying `@model` on their definition or an extension.
fn model_types(document: &SchemaDocument<'_>) -> HashSet<String> {
    document
        .definitions
        .iter()
        .filter_map(object_view)
        .filter(|object| has_directive(object.directives, MODEL_DIRECTIVE))
        .map(|object| object.name.to_string())
        .collect()
}

/// Fail on `@auth` anywhere on a definition that is not an object type.
///
/// Interfaces, unions, enums, scalars and input objects never carry `@model`,
/// so `@auth` on the definition itself fails like any type without `@model`.
fn reject_non_object_auth<'a>(definition: &Definition<'a, String>) -> Result<()> {
    let (directives, members): (&[Directive<'a, String>], Vec<&[Directive<'a, String>]>) =
        match definition {
            Definition::TypeDefinition(TypeDefinition::Scalar(t)) => (t.directives.as_slice(), Vec::new()),
            Definition::TypeDefinition(TypeDefinition::Union(t)) => (t.directives.as_slice(), Vec::new()),
            Definition::TypeDefinition(TypeDefinition::Interface(t)) => (
                t.directives.as_slice(),
                t.fields.iter().map(|f| f.directives.as_slice()).collect(),
            ),
            Definition::TypeDefinition(TypeDefinition::InputObject(t)) => (
                t.directives.as_slice(),
                t.fields.iter().map(|f| f.directives.as_slice()).collect(),
            ),
            Definition::TypeDefinition(TypeDefinition::Enum(t)) => (
                t.directives.as_slice(),
                t.values.iter().map(|v| v.directives.as_slice()).collect(),
            ),
            Definition::TypeExtension(TypeExtension::Scalar(t)) => (t.directives.as_slice(), Vec::new()),
            Definition::TypeExtension(TypeExtension::Union(t)) => (t.directives.as_slice(), Vec::new()),
            Definition::TypeExtension(TypeExtension::Interface(t)) => (
                t.directives.as_slice(),
                t.fields.iter().map(|f| f.directives.as_slice()).collect(),
            ),
            Definition::TypeExtension(TypeExtension::InputObject(t)) => (
                t.directives.as_slice(),
                t.fields.iter().map(|f| f.directives.as_slice()).collect(),
            ),
            Definition::TypeExtension(TypeExtension::Enum(t)) => (
                t.directives.as_slice(),
                t.values.iter().map(|v| v.directives.as_slice()).collect(),
            ),
            _ => return Ok(()),
        };

    if has_directive(directives, AUTH_DIRECTIVE) {
        return Err(TransformError::InvalidDirective(
            AUTH_REQUIRES_MODEL.to_string(),
        ));
    }
    if members
        .iter()
        .any(|member| has_directive(member, AUTH_DIRECTIVE))
    {
        return Err(TransformError::InvalidDirective(
            AUTH_ON_NON_OBJECT_MEMBER.to_string(),
        ));
    }
    Ok(())
}

fn object_view<'d, 'a>(definition: &'d Definition<'a, String>) -> Option<ObjectView<'d, 'a>> {
    match definition {
        Definition::TypeDefinition(TypeDefinition::Object(object)) => Some(ObjectView {
            name: &object.name,
            directives: &object.directives,
            fields: &object.fields,
        }),
        Definition::TypeExtension(TypeExtension::Object(extension)) => Some(ObjectView {
            name: &extension.name,
            directives: &extension.directives,
            fields: &extension.fields,
        }),
        _ => None,
    }
}

fn field_at<'d, 'a>(
    document: &'d SchemaDocument<'a>,
    definition: usize,
    field: Option<usize>,
) -> Option<&'d Field<'a, String>> {
    let object = object_view(document.definitions.get(definition)?)?;
    object.fields.get(field?)
}

fn node_directives_mut<'d, 'a>(
    document: &'d mut SchemaDocument<'a>,
    definition: usize,
    field: Option<usize>,
) -> Option<&'d mut Vec<Directive<'a, String>>> {
    let (directives, fields) = match document.definitions.get_mut(definition)? {
        Definition::TypeDefinition(TypeDefinition::Object(object)) => {
            (&mut object.directives, &mut object.fields)
        }
        Definition::TypeExtension(TypeExtension::Object(extension)) => {
            (&mut extension.directives, &mut extension.fields)
        }
        _ => return None,
    };
    match field {
        None => Some(directives),
        Some(index) => fields.get_mut(index).map(|f| &mut f.directives),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BoundResource, StaticBinding};
    use crate::config::{AppSyncBindingConfig, AuthConfig, BindingConfig, FunctionBindingConfig};
    use crate::error::{OPERATIONS_ON_NON_MODEL_FIELD, OPERATIONS_ON_ROOT_FIELD};

    fn user_pools_with_iam() -> TransformerConfig {
        TransformerConfig {
            auth: AuthConfig::new(AuthProvider::UserPools)
                .with_additional(AuthProvider::Iam)
                .with_additional(AuthProvider::ApiKey),
            binding: BindingConfig::Function(FunctionBindingConfig {
                region: "us-east-1".to_string(),
                account_id: "123456789012".to_string(),
                env: Some("dev".to_string()),
            }),
            ..TransformerConfig::default()
        }
    }

    fn transformer() -> AuthTransformer {
        AuthTransformer::new(user_pools_with_iam()).unwrap()
    }

    fn directive_names(schema: &str, type_name: &str, field: Option<&str>) -> Vec<String> {
        let doc = parse_schema(schema).unwrap();
        doc.definitions
            .iter()
            .filter_map(object_view)
            .find(|o| o.name == type_name)
            .map(|o| match field {
                None => o.directives.iter().map(|d| d.name.clone()).collect(),
                Some(field) => o
                    .fields
                    .iter()
                    .find(|f| f.name == field)
                    .unwrap()
                    .directives
                    .iter()
                    .map(|d| d.name.clone())
                    .collect(),
            })
            .unwrap()
    }

    #[test]
    fn test_auth_without_model_fails() {
        let err = transformer()
            .transform_schema("type Post @auth(rules: [{ allow: private }]) { id: ID! }")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Types annotated with @auth must also be annotated with @model."
        );
    }

    #[test]
    fn test_auth_without_model_fails_with_no_fields() {
        let err = transformer()
            .transform_schema("type Post @auth(rules: [{ allow: private }])")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Types annotated with @auth must also be annotated with @model."
        );
    }

    #[test]
    fn test_non_model_field_with_operations_fails() {
        let err = transformer()
            .transform_schema(
                "type Note { text: String @auth(rules: [{ allow: private, operations: [read] }]) }",
            )
            .unwrap_err();
        assert_eq!(err.to_string(), OPERATIONS_ON_NON_MODEL_FIELD);
    }

    #[test]
    fn test_non_model_field_without_operations_gets_marker_only() {
        let output = transformer()
            .transform_schema(
                "type Note { text: String @auth(rules: [{ allow: private, provider: iam }]) }",
            )
            .unwrap();
        assert_eq!(
            directive_names(&output.schema, "Note", Some("text")),
            vec!["auth", "aws_iam"]
        );
        assert!(directive_names(&output.schema, "Note", None).is_empty());
        assert!(output.policies.is_empty());
    }

    #[test]
    fn test_root_field_with_operations_fails() {
        for root in ["Query", "Mutation", "Subscription"] {
            let schema = format!(
                "type {} {{ op: String @auth(rules: [{{ allow: private, operations: [read] }}]) }}",
                root
            );
            let err = transformer().transform_schema(&schema).unwrap_err();
            assert_eq!(err.to_string(), OPERATIONS_ON_ROOT_FIELD, "{}", root);
        }
    }

    #[test]
    fn test_iam_marker_on_root_field() {
        let output = transformer()
            .transform_schema(
                r#"
                type Query {
                    withIam: String @auth(rules: [{ allow: private, provider: iam }])
                    withDefault: String @auth(rules: [{ allow: private }])
                }
                "#,
            )
            .unwrap();

        assert_eq!(
            directive_names(&output.schema, "Query", Some("withIam")),
            vec!["auth", "aws_iam"]
        );
        assert_eq!(
            directive_names(&output.schema, "Query", Some("withDefault")),
            vec!["auth"]
        );
        assert!(directive_names(&output.schema, "Query", None).is_empty());
    }

    #[test]
    fn test_markers_deduplicated_per_node() {
        let output = transformer()
            .transform_schema(
                r#"
                type Post @model @auth(rules: [
                    { allow: owner },
                    { allow: private, provider: iam },
                    { allow: public, provider: iam },
                    { allow: public, provider: apiKey }
                ]) {
                    id: ID!
                }
                "#,
            )
            .unwrap();

        assert_eq!(
            directive_names(&output.schema, "Post", None),
            vec!["model", "auth", "aws_iam", "aws_api_key"]
        );
    }

    #[test]
    fn test_private_iam_function_produces_auth_policy_only() {
        let output = transformer()
            .transform_schema(
                r#"
                type Query {
                    echo(msg: String): String
                        @function(name: "echo-${env}")
                        @auth(rules: [{ allow: private, provider: iam }])
                }
                "#,
            )
            .unwrap();

        let names: Vec<&str> = output.resources.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["AuthRolePolicy01"]);
        assert_eq!(output.policies[0].resource_count(), 1);
        assert_eq!(
            output.resources["AuthRolePolicy01"]["Properties"]["PolicyDocument"]["Statement"][0]
                ["Resource"][0],
            "arn:aws:lambda:us-east-1:123456789012:function:echo-dev"
        );
    }

    #[test]
    fn test_public_iam_function_produces_both_policies() {
        let output = transformer()
            .transform_schema(
                r#"
                type Query {
                    echo(msg: String): String
                        @function(name: "echo-${env}")
                        @auth(rules: [{ allow: public, provider: iam }])
                }
                "#,
            )
            .unwrap();

        let names: Vec<&str> = output.resources.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["AuthRolePolicy01", "UnauthRolePolicy01"]);
        assert!(output.policies.iter().all(|p| p.resource_count() == 1));
    }

    #[test]
    fn test_unbound_root_field_produces_no_policy() {
        let output = transformer()
            .transform_schema(
                "type Query { echo: String @auth(rules: [{ allow: public, provider: iam }]) }",
            )
            .unwrap();
        assert!(output.resources.is_empty());
        assert_eq!(
            directive_names(&output.schema, "Query", Some("echo")),
            vec!["auth", "aws_iam"]
        );
    }

    #[test]
    fn test_second_run_is_rejected() {
        let transformer = transformer();
        let first = transformer
            .transform_schema(
                "type Query { echo: String @auth(rules: [{ allow: private, provider: iam }]) }",
            )
            .unwrap();

        let err = transformer.transform_schema(&first.schema).unwrap_err();
        match err {
            TransformError::DuplicateDirective { directive, node } => {
                assert_eq!(directive, "aws_iam");
                assert_eq!(node, "Query.echo");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_second_run_without_markers_is_unchanged() {
        let transformer = transformer();
        let first = transformer
            .transform_schema(
                r#"
                type Post @model @auth(rules: [{ allow: owner }]) { id: ID! }
                type Query { echo: String @auth(rules: [{ allow: private }]) }
                "#,
            )
            .unwrap();

        let second = transformer.transform_schema(&first.schema).unwrap();
        assert_eq!(second.schema, first.schema);
        assert!(!second.schema.contains("@aws_"));
    }

    #[test]
    fn test_auth_on_non_object_types_fails() {
        let schemas = [
            "interface Node @auth(rules: [{ allow: private, provider: iam }]) { id: ID! }",
            "input PostInput @auth(rules: [{ allow: private }]) { title: String }",
            "enum Color @auth(rules: [{ allow: private }]) { RED GREEN }",
            "union Item @auth(rules: [{ allow: private }]) = Post\ntype Post @model { id: ID! }",
            "type Post @model { id: ID! }\nextend interface Node @auth(rules: [{ allow: private }])",
        ];
        for schema in schemas {
            let err = transformer().transform_schema(schema).unwrap_err();
            assert_eq!(err.to_string(), AUTH_REQUIRES_MODEL, "{}", schema);
        }
    }

    #[test]
    fn test_auth_on_non_object_members_fails() {
        let schemas = [
            "input In { a: String @auth(rules: [{ allow: private, operations: [read] }]) }",
            "interface Node { id: ID! @auth(rules: [{ allow: private, provider: iam }]) }",
            "enum Color { RED @auth(rules: [{ allow: private }]) GREEN }",
        ];
        for schema in schemas {
            let err = transformer().transform_schema(schema).unwrap_err();
            assert!(matches!(err, TransformError::InvalidDirective(_)), "{}", schema);
            assert_eq!(err.to_string(), AUTH_ON_NON_OBJECT_MEMBER, "{}", schema);
        }
    }

    #[test]
    fn test_non_object_auth_leaves_document_untouched() {
        let source = r#"
            type Query { a: String @auth(rules: [{ allow: private, provider: iam }]) }
            interface Node { id: ID! @auth(rules: [{ allow: private }]) }
        "#;
        let mut document = parse_schema(source).unwrap();
        let before = print_schema(&document);

        assert!(transformer().transform_document(&mut document).is_err());
        assert_eq!(print_schema(&document), before);
    }

    #[test]
    fn test_failed_run_leaves_document_untouched() {
        let source = r#"
            type Query { a: String @auth(rules: [{ allow: private, provider: iam }]) }
            type Broken @auth(rules: [{ allow: private }]) { id: ID! }
        "#;
        let mut document = parse_schema(source).unwrap();
        let before = print_schema(&document);

        assert!(transformer().transform_document(&mut document).is_err());
        assert_eq!(print_schema(&document), before);
    }

    #[test]
    fn test_unconfigured_provider_fails() {
        let config = TransformerConfig {
            auth: AuthConfig::new(AuthProvider::UserPools),
            ..TransformerConfig::default()
        };
        let err = AuthTransformer::new(config)
            .unwrap()
            .transform_schema("type Query { a: String @auth(rules: [{ allow: public, provider: apiKey }]) }")
            .unwrap_err();
        assert!(matches!(err, TransformError::UnknownProvider { .. }));
    }

    #[test]
    fn test_policy_partitioning_across_fields() {
        let mut config = user_pools_with_iam();
        config.policy.max_resources_per_policy = 2;
        config.binding = BindingConfig::AppSync(AppSyncBindingConfig {
            api_id: "api".to_string(),
            region: "us-east-1".to_string(),
            account_id: "123456789012".to_string(),
        });
        let fields: String = (0..5)
            .map(|i| format!("f{}: String @auth(rules: [{{ allow: private, provider: iam }}])\n", i))
            .collect();
        let schema = format!("type Query {{\n{}}}", fields);

        let output = AuthTransformer::new(config)
            .unwrap()
            .transform_schema(&schema)
            .unwrap();

        let names: Vec<String> = output.policies.iter().map(PolicyDocument::name).collect();
        assert_eq!(
            names,
            vec!["AuthRolePolicy01", "AuthRolePolicy02", "AuthRolePolicy03"]
        );
        let counts: Vec<usize> = output.policies.iter().map(|p| p.resource_count()).collect();
        assert_eq!(counts, vec![2, 2, 1]);
        let first: Vec<&str> = output.policies[0].resources().collect();
        assert!(first[0].ends_with("/types/Query/fields/f0"));
        assert!(first[1].ends_with("/types/Query/fields/f1"));
    }

    #[test]
    fn test_same_resource_from_two_rules_is_granted_once() {
        let binding = StaticBinding::new().bind(
            "Mutation",
            "run",
            BoundResource::new("lambda:InvokeFunction", "arn:aws:lambda:us-east-1:1:function:run"),
        );
        let transformer = AuthTransformer::with_binding(user_pools_with_iam(), Box::new(binding)).unwrap();

        let output = transformer
            .transform_schema(
                r#"
                type Mutation {
                    run: String @auth(rules: [
                        { allow: private, provider: iam },
                        { allow: public, provider: iam }
                    ])
                }
                "#,
            )
            .unwrap();

        assert_eq!(output.policies.len(), 2);
        assert!(output.policies.iter().all(|p| p.resource_count() == 1));
    }

    #[test]
    fn test_model_field_accepts_operations() {
        let output = transformer()
            .transform_schema(
                r#"
                type Post @model {
                    id: ID!
                    secret: String @auth(rules: [{ allow: owner, operations: [read, update] }])
                }
                "#,
            )
            .unwrap();
        assert_eq!(
            directive_names(&output.schema, "Post", Some("secret")),
            vec!["auth"]
        );
    }

    #[test]
    fn test_extended_root_type() {
        let output = transformer()
            .transform_schema(
                r#"
                type Query { a: String }
                extend type Query {
                    b: String @function(name: "b") @auth(rules: [{ allow: private, provider: iam }])
                }
                "#,
            )
            .unwrap();
        assert_eq!(output.policies.len(), 1);
        assert!(output.schema.contains("@aws_iam"));
    }

    #[test]
    fn test_custom_root_type_names() {
        let err = transformer()
            .transform_schema(
                r#"
                schema { query: RootQuery }
                type RootQuery { a: String @auth(rules: [{ allow: private, operations: [read] }]) }
                "#,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), OPERATIONS_ON_ROOT_FIELD);
    }

    #[test]
    fn test_output_is_deterministic() {
        let schema = r#"
            type Post @model @auth(rules: [{ allow: public, provider: iam }, { allow: owner }]) { id: ID! }
            type Query {
                a: String @function(name: "a") @auth(rules: [{ allow: public, provider: iam }])
                b: String @function(name: "b") @auth(rules: [{ allow: private, provider: iam }])
            }
        "#;
        let first = transformer().transform_schema(schema).unwrap();
        let second = transformer().transform_schema(schema).unwrap();

        assert_eq!(first.schema, second.schema);
        assert_eq!(
            serde_json::to_string(&first.resources).unwrap(),
            serde_json::to_string(&second.resources).unwrap()
        );
    }
}
