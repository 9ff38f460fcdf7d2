//! Transformer configuration.
//!
//! Field names follow the AppSync API configuration (`defaultAuthentication`,
//! `additionalAuthenticationProviders`, `authenticationType`) so an existing
//! API config can be fed in as-is.

use crate::error::{Result, TransformError};
use crate::rule::AuthProvider;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerConfig {
    /// Authorization providers of the API
    #[serde(default)]
    pub auth: AuthConfig,
    /// IAM policy synthesis settings
    #[serde(default)]
    pub policy: PolicyConfig,
    /// How root fields map to invokable resources
    #[serde(default)]
    pub binding: BindingConfig,
    /// Configuration version
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            policy: PolicyConfig::default(),
            binding: BindingConfig::default(),
            version: default_version(),
        }
    }
}

fn default_version() -> String {
    "1".to_string()
}

impl TransformerConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse file contents, choosing the format from the path's extension.
    /// Anything other than `.json` is read as YAML.
    pub fn from_file_contents(path: &Path, content: &str) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(content),
            _ => Self::from_yaml_str(content),
        }
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;

        if self.policy.max_resources_per_policy == 0 {
            return Err(TransformError::Config(
                "policy.maxResourcesPerPolicy must be greater than zero".to_string(),
            ));
        }
        if self.policy.max_policy_bytes == Some(0) {
            return Err(TransformError::Config(
                "policy.maxPolicyBytes must be greater than zero".to_string(),
            ));
        }

        if let BindingConfig::AppSync(appsync) = &self.binding {
            if appsync.api_id.trim().is_empty() {
                return Err(TransformError::Config(
                    "binding.apiId must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Authorization providers configured on the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub default_authentication: ProviderConfig,
    #[serde(default)]
    pub additional_authentication_providers: Vec<ProviderConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(AuthProvider::ApiKey)
    }
}

impl AuthConfig {
    pub fn new(default: AuthProvider) -> Self {
        Self {
            default_authentication: ProviderConfig::new(default),
            additional_authentication_providers: Vec::new(),
        }
    }

    pub fn with_additional(mut self, provider: AuthProvider) -> Self {
        self.additional_authentication_providers
            .push(ProviderConfig::new(provider));
        self
    }

    pub fn default_provider(&self) -> AuthProvider {
        self.default_authentication.authentication_type
    }

    /// Whether the provider is the default or one of the additional ones.
    pub fn is_configured(&self, provider: AuthProvider) -> bool {
        self.default_provider() == provider
            || self
                .additional_authentication_providers
                .iter()
                .any(|p| p.authentication_type == provider)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = vec![self.default_provider()];
        for additional in &self.additional_authentication_providers {
            let provider = additional.authentication_type;
            if seen.contains(&provider) {
                return Err(TransformError::Config(format!(
                    "authentication provider '{}' is configured more than once",
                    provider.authentication_type()
                )));
            }
            seen.push(provider);
        }
        Ok(())
    }
}

/// One authentication provider entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub authentication_type: AuthProvider,
}

impl ProviderConfig {
    pub fn new(authentication_type: AuthProvider) -> Self {
        Self {
            authentication_type,
        }
    }
}

/// IAM policy synthesis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Maximum number of resources per policy document
    #[serde(default = "default_max_resources")]
    pub max_resources_per_policy: usize,
    /// Optional cap on the serialized policy document size in bytes
    #[serde(default)]
    pub max_policy_bytes: Option<usize>,
    /// Template parameter naming the authenticated role
    #[serde(default = "default_auth_role_ref")]
    pub auth_role_ref: String,
    /// Template parameter naming the unauthenticated role
    #[serde(default = "default_unauth_role_ref")]
    pub unauth_role_ref: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_resources_per_policy: default_max_resources(),
            max_policy_bytes: None,
            auth_role_ref: default_auth_role_ref(),
            unauth_role_ref: default_unauth_role_ref(),
        }
    }
}

fn default_max_resources() -> usize {
    25
}

fn default_auth_role_ref() -> String {
    "authRoleName".to_string()
}

fn default_unauth_role_ref() -> String {
    "unauthRoleName".to_string()
}

/// How root fields resolve to invokable resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BindingConfig {
    /// No field is bound; no policies are produced
    #[default]
    None,
    /// Every root field is bound to its AppSync field ARN
    #[serde(rename = "appsync")]
    AppSync(AppSyncBindingConfig),
    /// Root fields carrying `@function(name:)` are bound to the Lambda function
    Function(FunctionBindingConfig),
    /// Explicit `Type.field` to resource map
    Static(StaticBindingConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSyncBindingConfig {
    pub api_id: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_account_id")]
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionBindingConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_account_id")]
    pub account_id: String,
    /// Value substituted for `${env}` in function names
    #[serde(default)]
    pub env: Option<String>,
}

impl Default for FunctionBindingConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            account_id: default_account_id(),
            env: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StaticBindingConfig {
    /// Keyed by `Type.field`
    #[serde(default)]
    pub resources: IndexMap<String, StaticResourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticResourceConfig {
    pub arn: String,
    #[serde(default = "default_static_action")]
    pub action: String,
}

fn default_region() -> String {
    "${AWS::Region}".to_string()
}

fn default_account_id() -> String {
    "${AWS::AccountId}".to_string()
}

fn default_static_action() -> String {
    "lambda:InvokeFunction".to_string()
}
