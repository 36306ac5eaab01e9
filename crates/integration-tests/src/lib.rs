//! Integration tests for MegaCart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p megacart-integration-tests
//! ```
//!
//! Each test starts its own [`MockBackend`] on an ephemeral port, so tests
//! run in parallel and need no external services.
//!
//! # Mock backend
//!
//! Serves the same routes as the real backend under `/api`, plus `/health`.
//! Accounts, issued tokens and canned catalog responses live in shared state
//! that tests adjust between calls.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use megacart_storefront::config::{ApiConfig, ConfigError};

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// JSON body with the given status.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::raw(status, &body.to_string())
    }

    /// Body sent verbatim, for malformed-response tests.
    #[must_use]
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.to_string(),
        }
    }

    /// `{"detail": detail}` with the given status.
    #[must_use]
    pub fn detail(status: u16, detail: &Value) -> Self {
        Self::json(status, &json!({ "detail": detail }))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}

/// Body shape of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterReply {
    /// `{access_token, token_type, user}`
    Token,
    /// `{message, user}`
    Wrapped,
    /// The user record alone
    UserOnly,
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    name: String,
    email: String,
    password: String,
}

impl Account {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "created_at": "2024-01-15T10:30:00.123456"
        })
    }
}

struct MockState {
    products: Reply,
    categories: Reply,
    healthy: bool,
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    register_reply: RegisterReply,
    login_override: Option<Reply>,
    hits: HashMap<&'static str, usize>,
}

type Shared = Arc<Mutex<MockState>>;

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A products list in the shape the real backend serves.
#[must_use]
pub fn sample_products_json() -> Value {
    json!([
        {"id": 1, "name": "Wireless Headphones", "description": "Noise cancelling",
         "price": 79.99, "category": "Electronics", "image": "🎧",
         "inStock": true, "rating": 4.5, "reviews": 128},
        {"id": 2, "name": "Running Shoes", "description": "Lightweight",
         "price": 45, "category": "Sports", "image": "👟",
         "inStock": true, "rating": 4.6, "reviews": 214},
        {"id": 3, "name": "Yoga Mat", "description": null,
         "price": "12.50", "category": "Sports", "image": null,
         "inStock": null, "rating": 7, "reviews": 97},
        {"id": 4, "name": "Coffee Maker", "price": 54.99, "category": "Home",
         "inStock": false}
    ])
}

// =============================================================================
// MockBackend
// =============================================================================

/// A MegaCart backend stand-in running on `127.0.0.1`.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend serving [`sample_products_json`] and two categories.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(MockState {
            products: Reply::json(200, &sample_products_json()),
            categories: Reply::json(200, &json!(["Electronics", {"name": "Sports"}, "Home"])),
            healthy: true,
            accounts: Vec::new(),
            tokens: HashMap::new(),
            register_reply: RegisterReply::Token,
            login_override: None,
            hits: HashMap::new(),
        }));

        let app = Router::new()
            .route("/health", get(health))
            .route("/api/products", get(products))
            .route("/api/products/{id}", get(product))
            .route("/api/categories", get(categories))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/me", get(me))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Endpoint configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated URL is rejected.
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        ApiConfig::new(&format!("http://{}/api", self.addr))
    }

    pub fn set_products(&self, reply: Reply) {
        lock(&self.state).products = reply;
    }

    pub fn set_categories(&self, reply: Reply) {
        lock(&self.state).categories = reply;
    }

    pub fn set_healthy(&self, healthy: bool) {
        lock(&self.state).healthy = healthy;
    }

    /// How a successful registration is answered.
    pub fn set_register_reply(&self, reply: RegisterReply) {
        lock(&self.state).register_reply = reply;
    }

    /// Answer every login with `reply` instead of checking credentials.
    pub fn fail_login_with(&self, reply: Reply) {
        lock(&self.state).login_override = Some(reply);
    }

    pub fn add_account(&self, name: &str, email: &str, password: &str) {
        let mut state = lock(&self.state);
        let id = format!("user-{}", state.accounts.len() + 1);
        state.accounts.push(Account {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
    }

    /// Invalidate every issued token, as a backend restart with a new
    /// signing key would.
    pub fn revoke_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// How many requests `route` has served, e.g. `"products"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        lock(&self.state).hits.get(route).copied().unwrap_or(0)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Endpoint configuration for a port nothing listens on.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn unreachable_api_config() -> std::io::Result<ApiConfig> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    ApiConfig::new(&format!("http://{addr}/api"))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
}

// =============================================================================
// Handlers
// =============================================================================

fn record(state: &mut MockState, route: &'static str) {
    *state.hits.entry(route).or_insert(0) += 1;
}

async fn health(State(state): State<Shared>) -> StatusCode {
    let mut state = lock(&state);
    record(&mut state, "health");
    if state.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn products(State(state): State<Shared>) -> Reply {
    let mut state = lock(&state);
    record(&mut state, "products");
    state.products.clone()
}

async fn product(State(state): State<Shared>, Path(id): Path<i64>) -> Reply {
    let mut state = lock(&state);
    record(&mut state, "product");
    let found = serde_json::from_str::<Value>(&state.products.body)
        .ok()
        .and_then(|body| {
            body.as_array()?
                .iter()
                .find(|p| p.get("id").and_then(Value::as_i64) == Some(id))
                .cloned()
        });
    found.map_or_else(
        || Reply::detail(404, &json!("Product not found")),
        |product| Reply::json(200, &product),
    )
}

async fn categories(State(state): State<Shared>) -> Reply {
    let mut state = lock(&state);
    record(&mut state, "categories");
    state.categories.clone()
}

fn field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str)
}

fn missing(fields: &[&str]) -> Reply {
    let errors: Vec<Value> = fields
        .iter()
        .map(|name| json!({"loc": ["body", name], "msg": "field required", "type": "missing"}))
        .collect();
    Reply::detail(422, &Value::Array(errors))
}

fn issue_token(state: &mut MockState, email: &str) -> String {
    let token = format!("token-{}-{}", state.tokens.len() + 1, email);
    state.tokens.insert(token.clone(), email.to_string());
    token
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = lock(&state);
    record(&mut state, "login");
    if let Some(reply) = &state.login_override {
        return reply.clone();
    }

    let (Some(email), Some(password)) = (field(&body, "email"), field(&body, "password")) else {
        return missing(&["email", "password"]);
    };

    let Some(account) = state
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
        .cloned()
    else {
        return Reply::detail(401, &json!("Incorrect email or password"));
    };

    let token = issue_token(&mut state, &account.email);
    Reply::json(
        200,
        &json!({"access_token": token, "token_type": "bearer", "user": account.to_json()}),
    )
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = lock(&state);
    record(&mut state, "register");

    let name = field(&body, "name");
    let email = field(&body, "email");
    let password = field(&body, "password");

    let mut errors = Vec::new();
    if name.is_none_or(str::is_empty) {
        errors.push(json!({"loc": ["body", "name"], "msg": "field required"}));
    }
    if !email.is_some_and(|e| e.contains('@')) {
        errors.push(json!({"loc": ["body", "email"], "msg": "value is not a valid email address"}));
    }
    if password.is_none_or(|p| p.len() < 6) {
        errors.push(
            json!({"loc": ["body", "password"], "msg": "ensure this value has at least 6 characters"}),
        );
    }
    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Reply::detail(422, &Value::Array(errors));
    };
    if !errors.is_empty() {
        return Reply::detail(422, &Value::Array(errors));
    }

    if state.accounts.iter().any(|a| a.email == email) {
        return Reply::detail(400, &json!("Email already registered"));
    }

    let account = Account {
        id: format!("user-{}", state.accounts.len() + 1),
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };
    state.accounts.push(account.clone());

    match state.register_reply {
        RegisterReply::Token => {
            let token = issue_token(&mut state, &account.email);
            Reply::json(
                201,
                &json!({"access_token": token, "token_type": "bearer", "user": account.to_json()}),
            )
        }
        RegisterReply::Wrapped => Reply::json(
            200,
            &json!({"message": "User registered successfully", "user": account.to_json()}),
        ),
        RegisterReply::UserOnly => Reply::json(201, &account.to_json()),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut state = lock(&state);
    record(&mut state, "me");

    let email = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| state.tokens.get(token))
        .cloned();

    let account = email.and_then(|email| state.accounts.iter().find(|a| a.email == email));
    account.map_or_else(
        || Reply::detail(401, &json!("Could not validate credentials")),
        |account| Reply::json(200, &account.to_json()),
    )
}
