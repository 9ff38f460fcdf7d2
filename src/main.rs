//! GraphQL `@auth` transformer binary.
//!
//! Run with: `graphql-auth-transformer --schema schema.graphql --config transform.yaml`
//!
//! Writes the annotated schema and the synthesized policy resources to the
//! output directory, or merges the resources into an existing template with
//! `--template`.

use anyhow::{Context, Result};
use clap::Parser;
use graphql_auth_transformer::{
    error_report, merge_into_template, AuthTransformer, TransformError, TransformOutput,
    TransformerConfig,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Compile `@auth` directives of a GraphQL schema.
///
/// Validates `@auth` usage, adds provider marker directives and synthesizes
/// IAM role policies for IAM-authorized root fields.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the GraphQL schema (IDL)
    #[arg(short, long)]
    schema: PathBuf,

    /// Path to configuration file (YAML, or JSON with a .json extension)
    #[arg(short, long, default_value = "transform.yaml")]
    config: PathBuf,

    /// Directory receiving schema.graphql and policies.json
    #[arg(short, long, default_value = "build")]
    output_dir: PathBuf,

    /// Existing template (JSON) to merge the policy resources into
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!(
        "Starting GraphQL @auth transformer v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Schema file: {}", args.schema.display());
    info!("Config file: {}", args.config.display());

    let config = load_config(&args.config).await?;
    let transformer = AuthTransformer::new(config).context("Invalid configuration")?;

    let source = tokio::fs::read_to_string(&args.schema)
        .await
        .with_context(|| format!("Failed to read schema {}", args.schema.display()))?;

    // The pass itself is synchronous; all I/O happens around it.
    let output = match transformer.transform_schema(&source) {
        Ok(output) => output,
        Err(err) => fail(&err),
    };

    if let Err(err) = write_artifacts(&output, args.template.as_deref(), &args.output_dir).await {
        if let Some(transform_err) = err.downcast_ref::<TransformError>() {
            fail(transform_err);
        }
        return Err(err);
    }

    Ok(())
}

/// Assemble the policy template, then write `schema.graphql` and `policies.json`.
///
/// Nothing is written unless the template was assembled.
async fn write_artifacts(
    output: &TransformOutput,
    template: Option<&Path>,
    output_dir: &Path,
) -> Result<()> {
    let template = match template {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            let mut template: serde_json::Value =
                serde_json::from_str(&content).map_err(TransformError::from)?;
            merge_into_template(&mut template, &output.resources)?;
            template
        }
        None => output.template(),
    };
    let rendered = serde_json::to_string_pretty(&template).context("Failed to render policies")?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .context("Failed to create output directory")?;

    let schema_path = output_dir.join("schema.graphql");
    tokio::fs::write(&schema_path, &output.schema)
        .await
        .context("Failed to write schema")?;
    info!("Wrote {}", schema_path.display());

    let policies_path = output_dir.join("policies.json");
    tokio::fs::write(&policies_path, rendered)
        .await
        .context("Failed to write policies")?;
    info!(
        policies = output.policies.len(),
        "Wrote {}",
        policies_path.display()
    );

    Ok(())
}

/// Load the configuration, falling back to defaults when the file is absent.
async fn load_config(path: &Path) -> Result<TransformerConfig> {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Ok(TransformerConfig::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .context("Failed to read config file")?;
    TransformerConfig::from_file_contents(path, &content).context("Failed to parse config file")
}

/// Print the error report to stdout and exit non-zero.
fn fail(err: &TransformError) -> ! {
    warn!(code = %err.code(), "Transformation failed: {}", err);
    let report = serde_json::to_string_pretty(&error_report(err)).unwrap_or_else(|_| err.to_string());
    println!("{}", report);
    std::process::exit(1);
}
