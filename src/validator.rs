//! Structural and provider validation of `@auth` usage.
//!
//! Every node is classified as a type or as a field of a root operation type,
//! a model type or a bare type. Placement rules are checked first, then the
//! provider of every rule is checked against the API configuration.

use crate::config::AuthConfig;
use crate::error::{
    Result, TransformError, AUTH_REQUIRES_MODEL, OPERATIONS_ON_NON_MODEL_FIELD,
    OPERATIONS_ON_ROOT_FIELD,
};
use crate::parser::SchemaDocument;
use crate::rule::{AuthProvider, AuthRule};
use graphql_parser::schema::Definition;

/// Root operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootOperation {
    Query,
    Mutation,
    Subscription,
}

/// Names of the root operation types of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootTypes {
    pub query: String,
    pub mutation: String,
    pub subscription: String,
}

impl Default for RootTypes {
    fn default() -> Self {
        Self {
            query: "Query".to_string(),
            mutation: "Mutation".to_string(),
            subscription: "Subscription".to_string(),
        }
    }
}

impl RootTypes {
    /// Read the root names from a `schema { ... }` definition, falling back to
    /// the conventional names for operations it does not override.
    pub fn from_document(document: &SchemaDocument<'_>) -> Self {
        let mut roots = Self::default();
        for definition in &document.definitions {
            if let Definition::SchemaDefinition(schema) = definition {
                if let Some(query) = &schema.query {
                    roots.query = query.clone();
                }
                if let Some(mutation) = &schema.mutation {
                    roots.mutation = mutation.clone();
                }
                if let Some(subscription) = &schema.subscription {
                    roots.subscription = subscription.clone();
                }
            }
        }
        roots
    }

    pub fn classify(&self, type_name: &str) -> Option<RootOperation> {
        if type_name == self.query {
            Some(RootOperation::Query)
        } else if type_name == self.mutation {
            Some(RootOperation::Mutation)
        } else if type_name == self.subscription {
            Some(RootOperation::Subscription)
        } else {
            None
        }
    }
}

/// Kind of type enclosing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Root(RootOperation),
    Model,
    Bare,
}

impl ParentKind {
    pub fn of(root: Option<RootOperation>, has_model: bool) -> Self {
        match (root, has_model) {
            (Some(op), _) => Self::Root(op),
            (None, true) => Self::Model,
            (None, false) => Self::Bare,
        }
    }
}

/// Where an `@auth` directive sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Type {
        has_model: bool,
        root: Option<RootOperation>,
    },
    Field {
        parent: ParentKind,
    },
}

impl Placement {
    /// Root operation containers are never annotated with markers.
    pub fn is_root_type(&self) -> bool {
        matches!(self, Self::Type { root: Some(_), .. })
    }

    pub fn is_root_field(&self) -> bool {
        matches!(
            self,
            Self::Field {
                parent: ParentKind::Root(_)
            }
        )
    }
}

/// Check that the rules are legal at this placement.
pub fn validate_placement(placement: Placement, rules: &[AuthRule]) -> Result<()> {
    let has_operations = rules.iter().any(AuthRule::has_operations);

    match placement {
        Placement::Type {
            has_model: false, ..
        } => Err(TransformError::InvalidDirective(
            AUTH_REQUIRES_MODEL.to_string(),
        )),
        Placement::Type {
            has_model: true, ..
        } => Ok(()),
        Placement::Field {
            parent: ParentKind::Root(_),
        } if has_operations => Err(TransformError::InvalidDirective(
            OPERATIONS_ON_ROOT_FIELD.to_string(),
        )),
        Placement::Field {
            parent: ParentKind::Bare,
        } if has_operations => Err(TransformError::InvalidDirective(
            OPERATIONS_ON_NON_MODEL_FIELD.to_string(),
        )),
        Placement::Field { .. } => Ok(()),
    }
}

/// Check that every rule's provider is configured and can back its strategy.
pub fn validate_providers(rules: &[AuthRule], auth: &AuthConfig) -> Result<()> {
    let default = auth.default_provider();
    for rule in rules {
        let provider = rule.effective_provider(default);
        if !auth.is_configured(provider) {
            return Err(TransformError::UnknownProvider {
                provider: provider.rule_name().to_string(),
                provider_name: provider.display_name().to_string(),
            });
        }
        if !rule.allow.supports(provider) {
            return Err(TransformError::InvalidDirective(format!(
                "@auth directive with '{}' strategy only supports {} providers, but found '{}' assigned.",
                rule.allow,
                provider_list(rule.allow.supported_providers()),
                provider
            )));
        }
    }
    Ok(())
}

/// Run placement then provider checks.
pub fn validate_rules(placement: Placement, rules: &[AuthRule], auth: &AuthConfig) -> Result<()> {
    validate_placement(placement, rules)?;
    validate_providers(rules, auth)
}

fn provider_list(providers: &[AuthProvider]) -> String {
    let quoted: Vec<String> = providers
        .iter()
        .map(|p| format!("'{}'", p.rule_name()))
        .collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}
