use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

const SESSION_FILE: &str = "session.json";

/// Everything the CLI remembers between invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    pub username: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            username: None,
            access_token: None,
            refresh_token: None,
            signed_in_at: None,
        }
    }
}

impl Session {
    pub fn is_signed_in(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    pub fn sign_in(&mut self, username: String, access_token: String, refresh_token: String) {
        self.username = Some(username);
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
        self.signed_in_at = Some(Utc::now());
    }

    pub fn set_tokens(&mut self, access_token: String, refresh_token: String) {
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
    }

    pub fn sign_out(&mut self) {
        self.username = None;
        self.access_token = None;
        self.refresh_token = None;
        self.signed_in_at = None;
    }

    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let file = dir.join(SESSION_FILE);

        if !file.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(file)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, dir: &Path) -> anyhow::Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(SESSION_FILE), content)?;
        Ok(())
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(custom_dir) = std::env::var("CLEVER_NOTES_CLI_CONFIG_DIR") {
        return Ok(PathBuf::from(custom_dir));
    }

    let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
    Ok(PathBuf::from(home).join(".config").join("clever-notes").join("cli"))
}

pub fn load_session() -> anyhow::Result<Session> {
    Session::load_from(&get_config_dir()?)
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    session.save_to(&get_config_dir()?)
}
