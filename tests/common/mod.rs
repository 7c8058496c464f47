#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Server process owned by one test; killed when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_markdown-editor-api"));
        cmd.arg("serve")
            .env("SERVER_HOST", "127.0.0.1")
            .env("SERVER_PORT", port.to_string())
            .env("BCRYPT_COST", "4")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Without a database the server still starts; keep health checks from hanging
        if std::env::var("DATABASE_CONNECTION_TIMEOUT").is_err() {
            cmd.env("DATABASE_CONNECTION_TIMEOUT", "3");
        }

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                // Listening; 503 only means the database is unreachable
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

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            eprintln!("failed to kill server {}: {}", self.child.id(), e);
        }
        // Reap so the process does not linger as a zombie holding the port
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Database-backed flows only run when a database is configured.
pub fn database_configured() -> bool {
    match std::env::var("DATABASE_URL") {
        Ok(url) => !url.trim().is_empty(),
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database-backed test");
            false
        }
    }
}

/// Username unique to this run, so reruns against the same database don't collide.
pub fn unique_username(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{}_{}_{}", prefix, std::process::id(), nanos)
}

/// Register a fresh account and return its bearer token.
pub async fn register(server: &TestServer, client: &reqwest::Client, prefix: &str) -> Result<String> {
    let res = client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "username": unique_username(prefix), "password": "password123" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register returned {}", res.status());

    let body: Value = res.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("register response has no token")
}
