//! `@auth` transformer for GraphQL schemas
//!
//! Statically analyzes `@auth` directives on a GraphQL IDL document, adds
//! provider marker directives for rules that do not use the API's default
//! authorization provider, and synthesizes IAM role policies for IAM-authorized
//! root fields.
//!
//! # Features
//!
//! - `@auth` rule extraction (owner, groups, private, public strategies)
//! - Placement validation (type vs. field, model vs. root operation types)
//! - Provider validation against the API's configured providers
//! - Provider markers (`@aws_iam`, `@aws_api_key`, `@aws_cognito_user_pools`, `@aws_oidc`)
//! - Size-bounded `AuthRolePolicyNN` / `UnauthRolePolicyNN` managed policies
//!
//! # Example
//!
//! ```ignore
//! use graphql_auth_transformer::{AuthTransformer, TransformerConfig};
//!
//! let transformer = AuthTransformer::new(TransformerConfig::default())?;
//! let output = transformer.transform_schema(schema)?;
//! println!("{}", output.schema);
//! ```

pub mod binding;
pub mod config;
pub mod directives;
pub mod error;
pub mod output;
pub mod parser;
pub mod policy;
pub mod rule;
pub mod transformer;
pub mod validator;

pub use binding::{BoundResource, ResourceBinding};
pub use config::{AuthConfig, TransformerConfig};
pub use error::{error_report, ErrorCode, TransformError};
pub use output::{merge_into_template, TransformOutput};
pub use policy::{PolicyDocument, RoleKind};
pub use rule::{AuthProvider, AuthRule, AuthStrategy, ModelOperation};
pub use transformer::AuthTransformer;
