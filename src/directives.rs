//! Provider marker synthesis.
//!
//! A rule whose provider differs from the API default needs the provider's
//! marker directive (`@aws_iam`, `@aws_api_key`, ...) on the node it guards.
//! Planning is separated from application so a whole document can be checked
//! before any node changes.

use crate::error::{Result, TransformError};
use crate::rule::{AuthProvider, AuthRule};
use graphql_parser::schema::Directive;
use graphql_parser::Pos;

/// Providers needing a marker on a node, in first-seen rule order.
pub fn plan_markers(rules: &[AuthRule], default: AuthProvider) -> Vec<AuthProvider> {
    let mut markers = Vec::new();
    for rule in rules {
        let provider = rule.effective_provider(default);
        if provider != default && !markers.contains(&provider) {
            markers.push(provider);
        }
    }
    markers
}

/// Fail if the node already carries one of the planned markers.
///
/// A present marker means the document was already transformed.
pub fn ensure_markers_absent(
    directives: &[Directive<'_, String>],
    markers: &[AuthProvider],
    node: &str,
) -> Result<()> {
    for provider in markers {
        let name = provider.marker_directive();
        if directives.iter().any(|d| d.name == name) {
            return Err(TransformError::DuplicateDirective {
                directive: name.to_string(),
                node: node.to_string(),
            });
        }
    }
    Ok(())
}

/// Append the marker directives after the existing ones.
pub fn apply_markers<'a>(
    directives: &mut Vec<Directive<'a, String>>,
    markers: &[AuthProvider],
    position: Pos,
) {
    directives.extend(
        markers
            .iter()
            .map(|provider| marker_directive(*provider, position)),
    );
}

pub fn marker_directive<'a>(provider: AuthProvider, position: Pos) -> Directive<'a, String> {
    Directive {
        position,
        name: provider.marker_directive().to_string(),
        arguments: Vec::new(),
    }
}
