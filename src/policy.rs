//! IAM policy synthesis for IAM-authorized root fields.
//!
//! Grants are collected per role in a [`PolicyAccumulator`] during the
//! document walk and partitioned into numbered [`PolicyDocument`]s once the
//! walk is complete.

use crate::binding::BoundResource;
use crate::config::PolicyConfig;
use crate::rule::{AuthProvider, AuthRule, AuthStrategy};
use indexmap::IndexSet;
use serde_json::{json, Value};
use std::fmt;
use tracing::debug;

pub const POLICY_VERSION: &str = "2012-10-17";

/// Execution role a policy attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleKind {
    /// Role assumed by authenticated identities
    Auth,
    /// Role assumed by unauthenticated identities
    Unauth,
}

impl RoleKind {
    pub fn policy_prefix(&self) -> &'static str {
        match self {
            Self::Auth => "AuthRolePolicy",
            Self::Unauth => "UnauthRolePolicy",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "auth"),
            Self::Unauth => write!(f, "unauth"),
        }
    }
}

/// Roles a rule grants its field's resource to.
///
/// Only IAM rules produce grants. Unauthenticated callers only ever get
/// `public` resources.
pub fn granted_roles(strategy: AuthStrategy, provider: AuthProvider) -> &'static [RoleKind] {
    match provider {
        AuthProvider::Iam => match strategy {
            AuthStrategy::Private => &[RoleKind::Auth],
            AuthStrategy::Public => &[RoleKind::Auth, RoleKind::Unauth],
            AuthStrategy::Owner | AuthStrategy::Groups => &[],
        },
        AuthProvider::ApiKey | AuthProvider::UserPools | AuthProvider::Oidc => &[],
    }
}

/// Size budget of a single policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyLimits {
    /// Maximum distinct resources per document
    pub max_resources: usize,
    /// Maximum length of the serialized policy document
    pub max_bytes: Option<usize>,
}

impl PolicyLimits {
    pub fn new(max_resources: usize) -> Self {
        Self {
            max_resources,
            max_bytes: None,
        }
    }
}

impl From<&PolicyConfig> for PolicyLimits {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            max_resources: config.max_resources_per_policy,
            max_bytes: config.max_policy_bytes,
        }
    }
}

/// Grants collected during one transformation run.
#[derive(Debug, Clone, Default)]
pub struct PolicyAccumulator {
    auth: IndexSet<BoundResource>,
    unauth: IndexSet<BoundResource>,
}

impl PolicyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the grants a rule implies for a bound root field.
    pub fn record(&mut self, rule: &AuthRule, default: AuthProvider, resource: &BoundResource) {
        for role in granted_roles(rule.allow, rule.effective_provider(default)) {
            self.grant(*role, resource.clone());
        }
    }

    /// Returns `false` when the role already had the resource.
    pub fn grant(&mut self, role: RoleKind, resource: BoundResource) -> bool {
        match role {
            RoleKind::Auth => self.auth.insert(resource),
            RoleKind::Unauth => self.unauth.insert(resource),
        }
    }

    pub fn resources(&self, role: RoleKind) -> &IndexSet<BoundResource> {
        match role {
            RoleKind::Auth => &self.auth,
            RoleKind::Unauth => &self.unauth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.auth.is_empty() && self.unauth.is_empty()
    }

    /// Partition the grants into numbered documents, authenticated role first.
    pub fn into_documents(self, limits: &PolicyLimits) -> Vec<PolicyDocument> {
        let mut documents = partition(RoleKind::Auth, &self.auth, limits);
        documents.extend(partition(RoleKind::Unauth, &self.unauth, limits));
        documents
    }
}

/// Resources sharing one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub action: String,
    pub resources: IndexSet<String>,
}

impl PolicyStatement {
    fn to_json(&self) -> Value {
        json!({
            "Effect": "Allow",
            "Action": [self.action],
            "Resource": self.resources.iter().map(|arn| resource_value(arn)).collect::<Vec<_>>(),
        })
    }
}

/// One numbered policy for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub role: RoleKind,
    /// 1-based ordinal within the role
    pub index: u32,
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(role: RoleKind, index: u32) -> Self {
        Self {
            role,
            index,
            statements: Vec::new(),
        }
    }

    /// Resource name, e.g. `AuthRolePolicy01`.
    pub fn name(&self) -> String {
        format!("{}{:02}", self.role.policy_prefix(), self.index)
    }

    pub fn resource_count(&self) -> usize {
        self.statements.iter().map(|s| s.resources.len()).sum()
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.statements
            .iter()
            .flat_map(|s| s.resources.iter().map(String::as_str))
    }

    fn insert(&mut self, resource: &BoundResource) {
        match self
            .statements
            .iter_mut()
            .find(|s| s.action == resource.action)
        {
            Some(statement) => {
                statement.resources.insert(resource.arn.clone());
            }
            None => {
                let mut resources = IndexSet::new();
                resources.insert(resource.arn.clone());
                self.statements.push(PolicyStatement {
                    action: resource.action.clone(),
                    resources,
                });
            }
        }
    }

    fn fits(&self, resource: &BoundResource, limits: &PolicyLimits) -> bool {
        if self.resource_count() + 1 > limits.max_resources {
            return false;
        }
        match limits.max_bytes {
            Some(max_bytes) => {
                let mut candidate = self.clone();
                candidate.insert(resource);
                candidate.serialized_len() <= max_bytes
            }
            None => true,
        }
    }

    /// The IAM policy document body.
    pub fn policy_json(&self) -> Value {
        json!({
            "Version": POLICY_VERSION,
            "Statement": self.statements.iter().map(PolicyStatement::to_json).collect::<Vec<_>>(),
        })
    }

    pub fn serialized_len(&self) -> usize {
        self.policy_json().to_string().len()
    }
}

/// ARNs with template placeholders are wrapped in `Fn::Sub`.
fn resource_value(arn: &str) -> Value {
    if arn.contains("${") {
        json!({ "Fn::Sub": arn })
    } else {
        json!(arn)
    }
}

/// Split one role's grants into documents within the limits.
///
/// A new document opens whenever the next resource would overflow the
/// current one. A resource too large for an empty document still gets one.
pub fn partition(
    role: RoleKind,
    resources: &IndexSet<BoundResource>,
    limits: &PolicyLimits,
) -> Vec<PolicyDocument> {
    let mut documents = Vec::new();
    let mut current = PolicyDocument::new(role, 1);

    for resource in resources {
        if current.resource_count() > 0 && !current.fits(resource, limits) {
            let next = PolicyDocument::new(role, current.index + 1);
            documents.push(std::mem::replace(&mut current, next));
        }
        current.insert(resource);
    }
    if current.resource_count() > 0 {
        documents.push(current);
    }

    debug!(
        role = %role,
        resources = resources.len(),
        documents = documents.len(),
        "Partitioned role policy"
    );
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn lambda(n: usize) -> BoundResource {
        BoundResource::new(
            "lambda:InvokeFunction",
            format!("arn:aws:lambda:us-east-1:123456789012:function:fn{}", n),
        )
    }

    #[test]
    fn test_granted_roles() {
        assert_eq!(
            granted_roles(AuthStrategy::Private, AuthProvider::Iam),
            &[RoleKind::Auth]
        );
        assert_eq!(
            granted_roles(AuthStrategy::Public, AuthProvider::Iam),
            &[RoleKind::Auth, RoleKind::Unauth]
        );
        assert!(granted_roles(AuthStrategy::Public, AuthProvider::ApiKey).is_empty());
        assert!(granted_roles(AuthStrategy::Private, AuthProvider::UserPools).is_empty());
        assert!(granted_roles(AuthStrategy::Owner, AuthProvider::Iam).is_empty());
    }

    #[test]
    fn test_record_private_and_public() {
        let mut acc = PolicyAccumulator::new();
        let rule = AuthRule::new(AuthStrategy::Private).with_provider(AuthProvider::Iam);
        acc.record(&rule, AuthProvider::UserPools, &lambda(1));
        assert_eq!(acc.resources(RoleKind::Auth).len(), 1);
        assert!(acc.resources(RoleKind::Unauth).is_empty());

        let rule = AuthRule::new(AuthStrategy::Public).with_provider(AuthProvider::Iam);
        acc.record(&rule, AuthProvider::UserPools, &lambda(1));
        assert_eq!(acc.resources(RoleKind::Auth).len(), 1);
        assert_eq!(acc.resources(RoleKind::Unauth).len(), 1);
    }

    #[test]
    fn test_default_iam_provider_records() {
        let mut acc = PolicyAccumulator::new();
        let rule = AuthRule::new(AuthStrategy::Private);
        acc.record(&rule, AuthProvider::Iam, &lambda(1));
        assert_eq!(acc.resources(RoleKind::Auth).len(), 1);
    }

    #[test]
    fn test_empty_accumulator_yields_no_documents() {
        let acc = PolicyAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.into_documents(&PolicyLimits::new(10)).is_empty());
    }

    #[test]
    fn test_partition_counts_and_names() {
        let cap = 4;
        let n = 10;
        let mut acc = PolicyAccumulator::new();
        for i in 0..n {
            acc.grant(RoleKind::Auth, lambda(i));
        }
        // duplicates are ignored
        assert!(!acc.grant(RoleKind::Auth, lambda(0)));

        let documents = acc.into_documents(&PolicyLimits::new(cap));

        assert_eq!(documents.len(), (n + cap - 1) / cap);
        let names: Vec<String> = documents.iter().map(PolicyDocument::name).collect();
        assert_eq!(
            names,
            vec!["AuthRolePolicy01", "AuthRolePolicy02", "AuthRolePolicy03"]
        );
        assert!(documents.iter().all(|d| d.resource_count() <= cap));

        let all: Vec<&str> = documents.iter().flat_map(|d| d.resources()).collect();
        let unique: HashSet<&str> = all.iter().copied().collect();
        assert_eq!(all.len(), n);
        assert_eq!(unique.len(), n);
        // discovery order is preserved
        assert!(all[0].ends_with("fn0"));
        assert!(all[n - 1].ends_with("fn9"));
    }

    #[test]
    fn test_roles_are_numbered_independently() {
        let mut acc = PolicyAccumulator::new();
        acc.grant(RoleKind::Auth, lambda(1));
        acc.grant(RoleKind::Auth, lambda(2));
        acc.grant(RoleKind::Unauth, lambda(1));

        let documents = acc.into_documents(&PolicyLimits::new(1));
        let names: Vec<String> = documents.iter().map(PolicyDocument::name).collect();
        assert_eq!(
            names,
            vec!["AuthRolePolicy01", "AuthRolePolicy02", "UnauthRolePolicy01"]
        );
    }

    #[test]
    fn test_statements_grouped_by_action() {
        let mut acc = PolicyAccumulator::new();
        acc.grant(RoleKind::Auth, lambda(1));
        acc.grant(
            RoleKind::Auth,
            BoundResource::new("appsync:GraphQL", "arn:aws:appsync:us-east-1:1:apis/a/types/Query/fields/f"),
        );
        acc.grant(RoleKind::Auth, lambda(2));

        let documents = acc.into_documents(&PolicyLimits::new(10));
        assert_eq!(documents.len(), 1);
        let statements = &documents[0].statements;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].action, "lambda:InvokeFunction");
        assert_eq!(statements[0].resources.len(), 2);
        assert_eq!(statements[1].action, "appsync:GraphQL");
    }

    #[test]
    fn test_byte_limit_opens_new_document() {
        let mut acc = PolicyAccumulator::new();
        for i in 0..3 {
            acc.grant(RoleKind::Auth, lambda(i));
        }
        let mut single = PolicyDocument::new(RoleKind::Auth, 1);
        single.insert(&lambda(0));
        let limits = PolicyLimits {
            max_resources: 100,
            max_bytes: Some(single.serialized_len() + 10),
        };

        let documents = acc.into_documents(&limits);
        assert_eq!(documents.len(), 3);
        assert!(documents.iter().all(|d| d.resource_count() == 1));
    }

    #[test]
    fn test_policy_json() {
        let mut document = PolicyDocument::new(RoleKind::Unauth, 1);
        document.insert(&lambda(1));
        document.insert(&BoundResource::new(
            "lambda:InvokeFunction",
            "arn:aws:lambda:${AWS::Region}:${AWS::AccountId}:function:echo",
        ));

        let policy = document.policy_json();
        assert_eq!(policy["Version"], "2012-10-17");
        let statement = &policy["Statement"][0];
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Action"][0], "lambda:InvokeFunction");
        assert_eq!(
            statement["Resource"][0],
            "arn:aws:lambda:us-east-1:123456789012:function:fn1"
        );
        assert_eq!(
            statement["Resource"][1]["Fn::Sub"],
            "arn:aws:lambda:${AWS::Region}:${AWS::AccountId}:function:echo"
        );
        assert_eq!(document.name(), "UnauthRolePolicy01");
    }
}
