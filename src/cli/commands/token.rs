use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{generate_jwt, Claims, TokenVerifier};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a session token with the configured secret")]
    Issue {
        #[arg(long, help = "Principal email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Verify a token and show its principal")]
    Inspect {
        #[arg(help = "Encoded JWT")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;

    match cmd {
        TokenCommands::Issue { email, name, hours } => {
            let hours = hours.unwrap_or(security.jwt_expiry_hours);
            let claims = Claims::new(email, name, hours)?;
            let token = generate_jwt(&claims, &security.jwt_secret).context("failed to sign token")?;

            match output_format {
                OutputFormat::Json => println!("{}", json!({ "token": token, "exp": claims.exp })),
                OutputFormat::Text => println!("{}", token),
            }
            Ok(())
        }
        TokenCommands::Inspect { token } => {
            let verifier = TokenVerifier::new(&security.jwt_secret, security.session_cookie.clone())?;
            let principal = verifier
                .verify_token(&token)
                .context("token is invalid, expired, or signed with another secret")?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&principal)?),
                OutputFormat::Text => match &principal.name {
                    Some(name) => println!("{} <{}>", name, principal.email),
                    None => println!("{}", principal.email),
                },
            }
            Ok(())
        }
    }
}
