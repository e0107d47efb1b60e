use clap::Subcommand;
use reqwest::Method;
use serde_json::json;

use crate::cli::client::{token_pair_from, ApiClient};
use crate::cli::config::{load_session, save_session};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Create an account")]
    SignUp {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Sign in and store the token pair")]
    SignIn {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Revoke the stored token pair")]
    LogOut,

    #[command(about = "Rotate the stored token pair")]
    Refresh,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;
    let client = ApiClient::new(&session.server_url);

    match cmd {
        AuthCommands::SignUp { username, password } => {
            let data = client
                .call(
                    Method::POST,
                    "/sign-up",
                    Some(&json!({ "username": username, "password": password })),
                    None,
                )
                .await?;
            output_success(&output_format, &format!("User '{}' created", username), Some(data))
        }
        AuthCommands::SignIn { username, password } => {
            let data = client
                .call(
                    Method::POST,
                    "/sign-in",
                    Some(&json!({ "username": username, "password": password })),
                    None,
                )
                .await?;

            let (access, refresh) = token_pair_from(&data)?;

            session.sign_in(username.clone(), access, refresh);
            save_session(&session)?;
            output_success(&output_format, &format!("Signed in as '{}'", username), None)
        }
        AuthCommands::LogOut => {
            let result = client.call_authed(&mut session, Method::POST, "/log-out", None).await;
            // Forget the tokens locally even if the server already did
            session.sign_out();
            save_session(&session)?;
            result?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Refresh => {
            client.refresh(&mut session).await?;
            output_success(&output_format, "Token pair rotated", None)
        }
        AuthCommands::Status => {
            let message = match (&session.username, session.is_signed_in()) {
                (Some(user), true) => format!("Signed in as '{}' on {}", user, session.server_url),
                _ => format!("Not signed in ({})", session.server_url),
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "server_url": session.server_url,
                    "username": session.username,
                    "signed_in": session.is_signed_in(),
                    "signed_in_at": session.signed_in_at,
                })),
            )
        }
    }
}
