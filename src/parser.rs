//! Schema parsing and `@auth` argument extraction.
//!
//! Parsing and printing are delegated to `graphql-parser`; this module turns
//! the raw `@auth(rules: [...])` argument tree into [`AuthRule`] values.

use crate::error::{Result, TransformError};
use crate::rule::{AuthProvider, AuthRule, AuthStrategy, ModelOperation};
use graphql_parser::schema::{Directive, Document, Value};
use std::collections::BTreeSet;

/// Schema document as produced by `graphql-parser` with owned strings.
pub type SchemaDocument<'a> = Document<'a, String>;

pub const AUTH_DIRECTIVE: &str = "auth";
pub const MODEL_DIRECTIVE: &str = "model";
pub const FUNCTION_DIRECTIVE: &str = "function";

/// Keys accepted inside one `@auth` rule object.
const RULE_FIELDS: &[&str] = &[
    "allow",
    "provider",
    "operations",
    "ownerField",
    "identityClaim",
    "identityField",
    "groupClaim",
    "groups",
    "groupsField",
];

/// Parse schema IDL text.
pub fn parse_schema(source: &str) -> Result<SchemaDocument<'_>> {
    graphql_parser::parse_schema::<String>(source).map_err(|e| TransformError::Parse(e.to_string()))
}

/// Print a schema document back to IDL text.
pub fn print_schema(document: &SchemaDocument<'_>) -> String {
    document.to_string()
}

pub fn find_directive<'d, 'a>(
    directives: &'d [Directive<'a, String>],
    name: &str,
) -> Option<&'d Directive<'a, String>> {
    directives.iter().find(|d| d.name == name)
}

pub fn has_directive(directives: &[Directive<'_, String>], name: &str) -> bool {
    find_directive(directives, name).is_some()
}

/// Look up a named argument on a directive.
pub fn directive_argument<'d, 'a>(
    directive: &'d Directive<'a, String>,
    name: &str,
) -> Option<&'d Value<'a, String>> {
    directive
        .arguments
        .iter()
        .find(|(arg, _)| arg == name)
        .map(|(_, value)| value)
}

/// Extract the normalized rule list of the node's `@auth` directive.
///
/// Returns `Ok(None)` when the node has no `@auth`. `node` is only used to
/// name the node in errors. Does not modify the directives.
pub fn extract_auth_rules(
    directives: &[Directive<'_, String>],
    node: &str,
) -> Result<Option<Vec<AuthRule>>> {
    let mut auth = directives.iter().filter(|d| d.name == AUTH_DIRECTIVE);
    let Some(directive) = auth.next() else {
        return Ok(None);
    };
    if auth.next().is_some() {
        return Err(TransformError::DuplicateDirective {
            directive: AUTH_DIRECTIVE.to_string(),
            node: node.to_string(),
        });
    }

    let rules = match directive_argument(directive, "rules") {
        Some(Value::List(entries)) if !entries.is_empty() => entries,
        Some(Value::List(_)) | None | Some(Value::Null) => {
            return Err(missing_argument("rules", node));
        }
        Some(_) => {
            return Err(TransformError::invalid_argument(
                "rules",
                node,
                "expected a list of rule objects",
            ));
        }
    };

    rules
        .iter()
        .map(|entry| parse_rule(entry, node))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn parse_rule(entry: &Value<'_, String>, node: &str) -> Result<AuthRule> {
    let Value::Object(fields) = entry else {
        return Err(TransformError::invalid_argument(
            "rules",
            node,
            "each rule must be an object",
        ));
    };

    if let Some(key) = fields.keys().find(|key| !RULE_FIELDS.contains(&key.as_str())) {
        return Err(TransformError::invalid_argument(
            "rules",
            node,
            format!("unknown rule field '{}'", key),
        ));
    }

    let allow = match fields.get("allow") {
        None | Some(Value::Null) => return Err(missing_argument("allow", node)),
        Some(value) => {
            let name = enum_name(value, "allow", node)?;
            AuthStrategy::from_name(name).ok_or_else(|| {
                TransformError::invalid_argument(
                    "allow",
                    node,
                    format!("unknown strategy '{}'", name),
                )
            })?
        }
    };

    let mut rule = AuthRule::new(allow);

    if let Some(value) = non_null(fields.get("provider")) {
        let name = enum_name(value, "provider", node)?;
        rule.provider = Some(AuthProvider::from_rule_name(name).ok_or_else(|| {
            TransformError::invalid_argument("provider", node, format!("unknown provider '{}'", name))
        })?);
    }

    if let Some(value) = non_null(fields.get("operations")) {
        rule.operations = Some(parse_operations(value, node)?);
    }

    rule.owner_field = optional_string(fields.get("ownerField"), "ownerField", node)?;
    rule.identity_claim = match optional_string(fields.get("identityClaim"), "identityClaim", node)? {
        Some(claim) => Some(claim),
        None => optional_string(fields.get("identityField"), "identityField", node)?,
    };
    rule.group_claim = optional_string(fields.get("groupClaim"), "groupClaim", node)?;
    rule.groups_field = optional_string(fields.get("groupsField"), "groupsField", node)?;

    if let Some(value) = non_null(fields.get("groups")) {
        let Value::List(items) = value else {
            return Err(TransformError::invalid_argument(
                "groups",
                node,
                "expected a list of group names",
            ));
        };
        let groups = items
            .iter()
            .map(|item| match item {
                Value::String(group) => Ok(group.clone()),
                _ => Err(TransformError::invalid_argument(
                    "groups",
                    node,
                    "group names must be strings",
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        rule.groups = Some(groups);
    }

    Ok(rule)
}

fn parse_operations(value: &Value<'_, String>, node: &str) -> Result<BTreeSet<ModelOperation>> {
    let Value::List(items) = value else {
        return Err(TransformError::invalid_argument(
            "operations",
            node,
            "expected a list of operations",
        ));
    };
    if items.is_empty() {
        return Err(TransformError::invalid_argument(
            "operations",
            node,
            "must name at least one operation",
        ));
    }

    items
        .iter()
        .map(|item| {
            let name = enum_name(item, "operations", node)?;
            ModelOperation::from_name(name).ok_or_else(|| {
                TransformError::invalid_argument(
                    "operations",
                    node,
                    format!("unknown operation '{}'", name),
                )
            })
        })
        .collect()
}

/// Enum-typed arguments are written unquoted, but quoted strings are accepted too.
fn enum_name<'v>(value: &'v Value<'_, String>, argument: &str, node: &str) -> Result<&'v str> {
    match value {
        Value::Enum(name) | Value::String(name) => Ok(name.as_str()),
        _ => Err(TransformError::invalid_argument(
            argument,
            node,
            "expected an enum value",
        )),
    }
}

fn optional_string(
    value: Option<&Value<'_, String>>,
    argument: &str,
    node: &str,
) -> Result<Option<String>> {
    match non_null(value) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(TransformError::invalid_argument(
            argument,
            node,
            "expected a string",
        )),
    }
}

fn non_null<'v, 'a>(value: Option<&'v Value<'a, String>>) -> Option<&'v Value<'a, String>> {
    value.filter(|v| !matches!(v, Value::Null))
}

fn missing_argument(argument: &str, node: &str) -> TransformError {
    TransformError::MissingArgument {
        directive: AUTH_DIRECTIVE.to_string(),
        argument: argument.to_string(),
        node: node.to_string(),
    }
}
