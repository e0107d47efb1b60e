use clap::Subcommand;
use reqwest::Method;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::load_session;
use crate::cli::utils::{format_note_line, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum NoteCommands {
    #[command(about = "Add a note")]
    Add {
        #[arg(help = "Note text")]
        text: String,
    },

    #[command(about = "List your notes")]
    List,

    #[command(about = "Replace the text of a note")]
    Update {
        #[arg(help = "Note id")]
        id: i32,
        #[arg(help = "New note text")]
        text: String,
    },

    #[command(about = "Delete a note")]
    Delete {
        #[arg(help = "Note id")]
        id: i32,
    },
}

pub async fn handle(cmd: NoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;
    let client = ApiClient::new(&session.server_url);

    match cmd {
        NoteCommands::Add { text } => {
            let data = client
                .call_authed(&mut session, Method::POST, "/add-note", Some(&json!({ "note": text })))
                .await?;
            let id = data["note_id"].as_i64().unwrap_or_default();
            output_success(&output_format, &format!("Added note {}", id), Some(data))
        }
        NoteCommands::List => {
            let data = client.call_authed(&mut session, Method::GET, "/get-all-notes", None).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
                OutputFormat::Text => {
                    let notes = data["notes"].as_array().cloned().unwrap_or_default();
                    if notes.is_empty() {
                        println!("No notes yet");
                    }
                    for note in notes.iter() {
                        println!("{}", format_note_line(note));
                    }
                }
            }
            Ok(())
        }
        NoteCommands::Update { id, text } => {
            let body: Value = json!({ "note_id": id, "new_note": text });
            client.call_authed(&mut session, Method::POST, "/update-note", Some(&body)).await?;
            output_success(&output_format, &format!("Updated note {}", id), None)
        }
        NoteCommands::Delete { id } => {
            client
                .call_authed(&mut session, Method::POST, "/delete-note", Some(&json!({ "note_id": id })))
                .await?;
            output_success(&output_format, &format!("Deleted note {}", id), None)
        }
    }
}
