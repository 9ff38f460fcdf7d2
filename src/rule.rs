//! Typed model of a single `@auth` rule.
//!
//! Strategy, provider and operation names are closed enums so that every
//! provider/strategy combination is matched exhaustively by the validator and
//! the policy synthesizer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default field holding the owner identity on owner-based rules.
pub const DEFAULT_OWNER_FIELD: &str = "owner";
/// Default JWT claim compared against the owner field.
pub const DEFAULT_IDENTITY_CLAIM: &str = "username";
/// Default JWT claim listing the caller's groups.
pub const DEFAULT_GROUP_CLAIM: &str = "cognito:groups";

/// Authorization class of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    /// Only the record owner
    Owner,
    /// Members of static or dynamic groups
    Groups,
    /// Any authenticated identity
    Private,
    /// Any caller, including unauthenticated ones
    Public,
}

impl AuthStrategy {
    /// Parse the value of the `allow` argument.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "owner" => Some(Self::Owner),
            "groups" => Some(Self::Groups),
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Groups => "groups",
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    /// Providers that can back this strategy.
    pub fn supported_providers(&self) -> &'static [AuthProvider] {
        match self {
            Self::Owner | Self::Groups => &[AuthProvider::UserPools, AuthProvider::Oidc],
            Self::Private => &[
                AuthProvider::UserPools,
                AuthProvider::Iam,
                AuthProvider::Oidc,
            ],
            Self::Public => &[AuthProvider::ApiKey, AuthProvider::Iam],
        }
    }

    pub fn supports(&self, provider: AuthProvider) -> bool {
        self.supported_providers().contains(&provider)
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication mechanism backing a rule.
///
/// Serializes with the configuration names (`API_KEY`, `AWS_IAM`, ...); the
/// `@auth` argument names (`apiKey`, `iam`, ...) go through
/// [`AuthProvider::from_rule_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthProvider {
    #[serde(rename = "API_KEY")]
    ApiKey,
    #[serde(rename = "AWS_IAM")]
    Iam,
    #[serde(rename = "AMAZON_COGNITO_USER_POOLS")]
    UserPools,
    #[serde(rename = "OPENID_CONNECT")]
    Oidc,
}

impl AuthProvider {
    pub fn from_rule_name(name: &str) -> Option<Self> {
        match name {
            "apiKey" => Some(Self::ApiKey),
            "iam" => Some(Self::Iam),
            "userPools" => Some(Self::UserPools),
            "oidc" => Some(Self::Oidc),
            _ => None,
        }
    }

    /// Name used inside `@auth(rules: [{ provider: ... }])`.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Iam => "iam",
            Self::UserPools => "userPools",
            Self::Oidc => "oidc",
        }
    }

    /// Name used as `authenticationType` in the API configuration.
    pub fn authentication_type(&self) -> &'static str {
        match self {
            Self::ApiKey => "API_KEY",
            Self::Iam => "AWS_IAM",
            Self::UserPools => "AMAZON_COGNITO_USER_POOLS",
            Self::Oidc => "OPENID_CONNECT",
        }
    }

    /// Marker directive added to nodes reachable through this provider.
    pub fn marker_directive(&self) -> &'static str {
        match self {
            Self::ApiKey => "aws_api_key",
            Self::Iam => "aws_iam",
            Self::UserPools => "aws_cognito_user_pools",
            Self::Oidc => "aws_oidc",
        }
    }

    /// Human readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ApiKey => "API Key",
            Self::Iam => "IAM",
            Self::UserPools => "Cognito User Pools",
            Self::Oidc => "OpenID Connect",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rule_name())
    }
}

/// Model operation a rule can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl ModelOperation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ModelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of an `@auth(rules: [...])` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRule {
    pub allow: AuthStrategy,
    /// Explicit provider; `None` means the schema default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AuthProvider>,
    /// Explicit operations; `None` means the rule covers all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<BTreeSet<ModelOperation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_claim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_claim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_field: Option<String>,
}

impl AuthRule {
    /// Create a rule with only the strategy set.
    pub fn new(allow: AuthStrategy) -> Self {
        Self {
            allow,
            provider: None,
            operations: None,
            owner_field: None,
            identity_claim: None,
            group_claim: None,
            groups: None,
            groups_field: None,
        }
    }

    pub fn with_provider(mut self, provider: AuthProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_operations(mut self, operations: impl IntoIterator<Item = ModelOperation>) -> Self {
        self.operations = Some(operations.into_iter().collect());
        self
    }

    /// Provider after falling back to the schema default.
    pub fn effective_provider(&self, default: AuthProvider) -> AuthProvider {
        self.provider.unwrap_or(default)
    }

    pub fn has_operations(&self) -> bool {
        self.operations.is_some()
    }

    pub fn owner_field(&self) -> &str {
        self.owner_field.as_deref().unwrap_or(DEFAULT_OWNER_FIELD)
    }

    pub fn identity_claim(&self) -> &str {
        self.identity_claim
            .as_deref()
            .unwrap_or(DEFAULT_IDENTITY_CLAIM)
    }

    pub fn group_claim(&self) -> &str {
        self.group_claim.as_deref().unwrap_or(DEFAULT_GROUP_CLAIM)
    }
}
