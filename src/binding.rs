//! Root field to invokable resource bindings.
//!
//! The policy synthesizer asks a [`ResourceBinding`] which resource a root
//! field invokes. Fields without a binding contribute nothing to the policies.

use crate::config::{
    AppSyncBindingConfig, BindingConfig, FunctionBindingConfig, StaticBindingConfig,
};
use crate::parser::{directive_argument, find_directive, FUNCTION_DIRECTIVE};
use graphql_parser::schema::{Field, Value};
use indexmap::IndexMap;
use tracing::debug;

/// Action granted on AppSync field ARNs.
pub const APPSYNC_GRAPHQL_ACTION: &str = "appsync:GraphQL";
/// Action granted on Lambda function ARNs.
pub const LAMBDA_INVOKE_ACTION: &str = "lambda:InvokeFunction";

/// A resource a root field invokes, with the action needed to invoke it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundResource {
    pub action: String,
    pub arn: String,
}

impl BoundResource {
    pub fn new(action: impl Into<String>, arn: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            arn: arn.into(),
        }
    }
}

/// Resolves root fields to the resources they invoke.
pub trait ResourceBinding: Send + Sync {
    fn resolve(&self, type_name: &str, field: &Field<'_, String>) -> Option<BoundResource>;
}

/// Build the binding described by the configuration.
pub fn from_config(config: &BindingConfig) -> Box<dyn ResourceBinding> {
    match config {
        BindingConfig::None => Box::new(NoBinding),
        BindingConfig::AppSync(appsync) => Box::new(AppSyncFieldBinding::new(appsync)),
        BindingConfig::Function(function) => Box::new(FunctionDirectiveBinding::new(function)),
        BindingConfig::Static(bindings) => Box::new(StaticBinding::from_config(bindings)),
    }
}

/// Binds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBinding;

impl ResourceBinding for NoBinding {
    fn resolve(&self, _type_name: &str, _field: &Field<'_, String>) -> Option<BoundResource> {
        None
    }
}

/// Binds every root field to its AppSync field ARN.
#[derive(Debug, Clone)]
pub struct AppSyncFieldBinding {
    api_id: String,
    region: String,
    account_id: String,
}

impl AppSyncFieldBinding {
    pub fn new(config: &AppSyncBindingConfig) -> Self {
        Self {
            api_id: config.api_id.clone(),
            region: config.region.clone(),
            account_id: config.account_id.clone(),
        }
    }
}

impl ResourceBinding for AppSyncFieldBinding {
    fn resolve(&self, type_name: &str, field: &Field<'_, String>) -> Option<BoundResource> {
        Some(BoundResource::new(
            APPSYNC_GRAPHQL_ACTION,
            format!(
                "arn:aws:appsync:{}:{}:apis/{}/types/{}/fields/{}",
                self.region, self.account_id, self.api_id, type_name, field.name
            ),
        ))
    }
}

/// Binds root fields carrying `@function(name: "...")` to the Lambda function.
///
/// `${env}` in the function name is replaced with the configured environment.
/// With no environment configured the placeholder is kept so the template can
/// substitute it.
#[derive(Debug, Clone)]
pub struct FunctionDirectiveBinding {
    region: String,
    account_id: String,
    env: Option<String>,
}

impl FunctionDirectiveBinding {
    pub fn new(config: &FunctionBindingConfig) -> Self {
        Self {
            region: config.region.clone(),
            account_id: config.account_id.clone(),
            env: config.env.clone(),
        }
    }

    fn function_name(&self, raw: &str) -> String {
        match &self.env {
            Some(env) => raw.replace("${env}", env),
            None => raw.to_string(),
        }
    }
}

impl ResourceBinding for FunctionDirectiveBinding {
    fn resolve(&self, type_name: &str, field: &Field<'_, String>) -> Option<BoundResource> {
        let directive = find_directive(&field.directives, FUNCTION_DIRECTIVE)?;
        let name = match directive_argument(directive, "name") {
            Some(Value::String(name)) => name,
            _ => {
                debug!(
                    type_name = %type_name,
                    field = %field.name,
                    "@function without a string name, field left unbound"
                );
                return None;
            }
        };

        Some(BoundResource::new(
            LAMBDA_INVOKE_ACTION,
            format!(
                "arn:aws:lambda:{}:{}:function:{}",
                self.region,
                self.account_id,
                self.function_name(name)
            ),
        ))
    }
}

/// Explicit `Type.field` to resource map.
#[derive(Debug, Clone, Default)]
pub struct StaticBinding {
    resources: IndexMap<String, BoundResource>,
}

impl StaticBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &StaticBindingConfig) -> Self {
        let resources = config
            .resources
            .iter()
            .map(|(key, resource)| {
                (
                    key.clone(),
                    BoundResource::new(resource.action.clone(), resource.arn.clone()),
                )
            })
            .collect();
        Self { resources }
    }

    pub fn bind(mut self, type_name: &str, field: &str, resource: BoundResource) -> Self {
        self.resources
            .insert(format!("{}.{}", type_name, field), resource);
        self
    }
}

impl ResourceBinding for StaticBinding {
    fn resolve(&self, type_name: &str, field: &Field<'_, String>) -> Option<BoundResource> {
        self.resources
            .get(&format!("{}.{}", type_name, field.name))
            .cloned()
    }
}
