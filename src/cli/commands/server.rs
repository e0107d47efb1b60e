use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, save_session};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at an API server")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:8080")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Show,

    #[command(about = "Check server health via /health")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid server URL '{}': {}", url, e))?;
            let normalized = parsed.as_str().trim_end_matches('/').to_string();
            if session.server_url != normalized {
                // Tokens belong to the old server
                session.sign_out();
            }
            session.server_url = normalized;
            save_session(&session)?;
            output_success(
                &output_format,
                &format!("Server set to {}", session.server_url),
                Some(json!({ "server_url": session.server_url })),
            )
        }
        ServerCommands::Show => output_success(
            &output_format,
            &format!("Server: {}", session.server_url),
            Some(json!({ "server_url": session.server_url })),
        ),
        ServerCommands::Health => {
            let client = ApiClient::new(&session.server_url);
            match client.health().await {
                Ok((status, body)) if status.is_success() => {
                    output_success(&output_format, &format!("{} is healthy", session.server_url), Some(body))
                }
                Ok((status, _)) => output_error(
                    &output_format,
                    &format!("{} is degraded ({})", session.server_url, status),
                    Some("DEGRADED"),
                ),
                Err(e) => output_error(
                    &output_format,
                    &format!("{} is unreachable: {}", session.server_url, e),
                    Some("UNREACHABLE"),
                ),
            }
        }
    }
}
