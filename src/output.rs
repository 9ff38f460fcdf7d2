//! Output assembly: annotated schema text plus template resources.

use crate::config::PolicyConfig;
use crate::error::{Result, TransformError};
use crate::policy::{PolicyDocument, RoleKind};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const MANAGED_POLICY_TYPE: &str = "AWS::IAM::ManagedPolicy";

/// Result of one transformation run.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    /// Annotated schema IDL
    pub schema: String,
    /// Policy documents in naming order
    #[serde(skip)]
    pub policies: Vec<PolicyDocument>,
    /// Template resources keyed by logical name
    pub resources: IndexMap<String, Value>,
}

impl TransformOutput {
    pub fn new(schema: String, policies: Vec<PolicyDocument>, config: &PolicyConfig) -> Self {
        let resources = policy_resources(&policies, config);
        Self {
            schema,
            policies,
            resources,
        }
    }

    /// A template fragment holding only this run's resources.
    pub fn template(&self) -> Value {
        json!({ "Resources": self.resources })
    }
}

/// Render each policy as a managed policy resource.
pub fn policy_resources(
    policies: &[PolicyDocument],
    config: &PolicyConfig,
) -> IndexMap<String, Value> {
    policies
        .iter()
        .map(|policy| {
            let role_ref = match policy.role {
                RoleKind::Auth => &config.auth_role_ref,
                RoleKind::Unauth => &config.unauth_role_ref,
            };
            (policy.name(), policy_resource(policy, role_ref))
        })
        .collect()
}

pub fn policy_resource(policy: &PolicyDocument, role_ref: &str) -> Value {
    json!({
        "Type": MANAGED_POLICY_TYPE,
        "Properties": {
            "Roles": [{ "Ref": role_ref }],
            "PolicyDocument": policy.policy_json(),
        }
    })
}

/// Insert resources into an existing template's `Resources` map.
///
/// Nothing is inserted if any name is already taken.
pub fn merge_into_template(template: &mut Value, resources: &IndexMap<String, Value>) -> Result<()> {
    let Some(root) = template.as_object_mut() else {
        return Err(TransformError::Config(
            "template must be a JSON object".to_string(),
        ));
    };
    let existing = root
        .entry("Resources")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(existing) = existing.as_object_mut() else {
        return Err(TransformError::Config(
            "template 'Resources' must be a JSON object".to_string(),
        ));
    };

    if let Some(name) = resources.keys().find(|name| existing.contains_key(*name)) {
        return Err(TransformError::ResourceConflict(name.clone()));
    }
    for (name, resource) in resources {
        existing.insert(name.clone(), resource.clone());
    }
    Ok(())
}
