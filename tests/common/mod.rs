#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();
static COUNTER: AtomicU64 = AtomicU64::new(0);

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

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/recipe-api-rust");
        cmd.env("RECIPE_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Consider server ready on any definitive health answer
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Whether the server has a working database behind it. Tests that need
/// Postgres call this first and skip (pass vacuously) when it is absent, so
/// the suite still runs in environments without DATABASE_URL.
pub async fn db_ready(server: &TestServer) -> bool {
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
    {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(_) => false,
    }
}

/// Unique email per call so tests can share one database
pub fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}@example.com", prefix, nanos, n)
}

pub async fn create_user(
    server: &TestServer,
    email: &str,
    password: &str,
    name: &str,
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/user/create", server.base_url))
        .json(&json!({ "email": email, "password": password, "name": name }))
        .send()
        .await?;
    Ok(res)
}

pub async fn get_token(server: &TestServer, email: &str, password: &str) -> Result<Option<String>> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/user/token", server.base_url))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;

    if res.status() != StatusCode::OK {
        return Ok(None);
    }

    let body = res.json::<Value>().await?;
    Ok(body["data"]["token"].as_str().map(|s| s.to_string()))
}

/// Register a fresh user and log them in, returning (email, token)
pub async fn register_and_login(server: &TestServer, prefix: &str) -> Result<(String, String)> {
    let email = unique_email(prefix);
    let password = "test-password-123";

    let res = create_user(server, &email, password, "Test User").await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "user creation failed: {}",
        res.status()
    );

    let token = get_token(server, &email, password)
        .await?
        .context("no token issued for fresh user")?;

    Ok((email, token))
}

pub async fn authed_get(server: &TestServer, token: &str, path: &str) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}{}", server.base_url, path))
        .bearer_auth(token)
        .send()
        .await?;
    Ok(res)
}

pub async fn authed_post(
    server: &TestServer,
    token: &str,
    path: &str,
    body: &Value,
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}{}", server.base_url, path))
        .bearer_auth(token)
        .json(body)
        .send()
        .await?;
    Ok(res)
}
