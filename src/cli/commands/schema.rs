use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::database::models::SchemaBinding;
use crate::schema::{JsonSchemaValidator, SchemaFetcher, SchemaValidationError, SchemaValidator};

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Fetch the schema for a version hash and validate a content file against it")]
    Check {
        #[arg(long, help = "Schema URL template containing {hash}")]
        template: String,
        #[arg(long, help = "Configuration version hash")]
        hash: String,
        #[arg(long, help = "JSON file holding the configuration content object")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: SchemaCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SchemaCommands::Check { template, hash, file } => {
            let raw = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let content: Value = serde_json::from_slice(&raw)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            if !content.is_object() {
                anyhow::bail!("configuration content must be a JSON object");
            }

            let binding = SchemaBinding {
                configuration_id: String::new(),
                url: template,
            };
            let url = SchemaFetcher::parse_url(&binding.resolve(&hash))?;
            let fetcher = SchemaFetcher::new(reqwest::Client::new(), None);
            let schema = fetcher.fetch(&url).await?;

            let errors = match JsonSchemaValidator::new().validate(&schema, &content) {
                Ok(()) => Vec::new(),
                Err(SchemaValidationError::Rejected(errors)) => errors,
                Err(e) => return Err(e.into()),
            };

            match output_format {
                OutputFormat::Json => println!(
                    "{}",
                    json!({ "schema": url.as_str(), "valid": errors.is_empty(), "errors": errors })
                ),
                OutputFormat::Text => {
                    if errors.is_empty() {
                        println!("✓ {} conforms to {}", file.display(), url);
                    } else {
                        println!("✗ {} does not conform to {}", file.display(), url);
                        for error in &errors {
                            println!("  - {}", error);
                        }
                    }
                }
            }

            if !errors.is_empty() {
                anyhow::bail!("{} validation error(s)", errors.len());
            }
            Ok(())
        }
    }
}
