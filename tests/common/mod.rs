#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    /// Spawn the server binary with extra environment on a free port
    pub fn spawn_with(env: &[(&str, &str)]) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_clever-notes"));
        cmd.env("NOTES_API_PORT", port.to_string())
            .env("SECURITY_BCRYPT_COST", "4")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in env {
            cmd.env(key, value);
        }

        // Inherit environment so the server can see DATABASE_URL / POSTGRES_* from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// True when /health reports a working database
    pub async fn database_ready(&self) -> bool {
        match reqwest::get(self.url("/health")).await {
            Ok(resp) if resp.status() == StatusCode::OK => true,
            _ => {
                eprintln!("skipping: database not available for {}", self.base_url);
                false
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawn a server owned by the calling test; it is killed when dropped
pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn_with(&[])?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

/// Create an account and sign in, returning the issued pair
pub async fn sign_up_and_in(client: &reqwest::Client, server: &TestServer, username: &str) -> Result<Tokens> {
    let creds = json!({ "username": username, "password": "correct horse" });

    let res = client.post(server.url("/sign-up")).json(&creds).send().await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "sign-up failed: {}", res.status());

    let res = client.post(server.url("/sign-in")).json(&creds).send().await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "sign-in failed: {}", res.status());

    let body = res.json::<Value>().await?;
    Ok(Tokens {
        access: body["data"]["access_token"].as_str().context("no access_token")?.to_string(),
        refresh: body["data"]["refresh_token"].as_str().context("no refresh_token")?.to_string(),
    })
}
