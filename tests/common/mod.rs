#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use roleplay_accounts::config::Config;
use roleplay_accounts::email::{Mail, Mailer};
use roleplay_accounts::models::{NewUser, User};
use roleplay_accounts::password;
use roleplay_accounts::store::{AccountStore, MemoryStore};

/// Records every message instead of delivering it.
#[derive(Default)]
pub struct TrapMailer {
    sent: Mutex<Vec<Mail>>,
}

impl TrapMailer {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for TrapMailer {
    async fn send(&self, mail: Mail) -> Result<(), String> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// Rejects every message, like an unreachable relay.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: Mail) -> Result<(), String> {
        Err("Failed to send email: connection refused".to_string())
    }
}

/// A running test server backed by its own empty store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: MemoryStore,
    pub mailer: Arc<TrapMailer>,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body, return (body, status).
    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// PUT a JSON body, return (body, status).
    pub async fn put_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn request_recovery(&self, email: &str, url: &str) -> (Value, StatusCode) {
        self.post_json(
            "/password-recovery",
            &json!({ "email": email, "resetPasswordUrl": url }),
        )
        .await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> (Value, StatusCode) {
        self.post_json(
            "/reset-password",
            &json!({ "token": token, "password": password }),
        )
        .await
    }

    /// Insert an account straight into the store.
    pub async fn create_user(&self, email: &str, username: &str, plain: &str) -> User {
        self.store
            .create_user(NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: password::hash(plain).unwrap(),
                avatar: None,
            })
            .await
            .expect("create user failed")
    }

    pub async fn reload(&self, user: &User) -> User {
        self.store
            .find_user_by_id(user.id)
            .await
            .unwrap()
            .expect("user vanished")
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        log_level: "warn".to_string(),
        mail_from: "no-reply@roleplay.com".to_string(),
        product_name: "Roleplay".to_string(),
        reset_token_ttl: chrono::Duration::hours(2),
        smtp: None,
    }
}

pub async fn spawn_app() -> TestApp {
    let mailer = Arc::new(TrapMailer::default());
    spawn_app_with(mailer.clone(), mailer).await
}

/// Spawn with `mailer` wired into the app; `trap` is what the test inspects.
pub async fn spawn_app_with(mailer: Arc<dyn Mailer>, trap: Arc<TrapMailer>) -> TestApp {
    let store = MemoryStore::new();
    let app = roleplay_accounts::build_app(Arc::new(store.clone()), mailer, test_config());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        store,
        mailer: trap,
        client: Client::new(),
    }
}

/// Pull the `token` query parameter out of a reset link.
pub fn token_from_link(html: &str) -> String {
    let start = html.find("token=").expect("no token in mail") + "token=".len();
    html[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}
