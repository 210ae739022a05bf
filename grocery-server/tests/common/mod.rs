//! Shared harness: the fully layered router over an in-memory database

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use grocery_server::db::repository::profile::{self, NewProfile};
use grocery_server::{Config, ServerState, build_app};
use shared::models::{Profile, Role};

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
}

pub fn test_config() -> Config {
    let mut config = Config::with_overrides(":memory:");
    config.environment = "development".into();
    config.jwt.secret = "integration-test-secret-0123456789abcdef".into();
    config.delivery_fee = 10.0;
    config.free_delivery_threshold = 100.0;
    config.request_timeout_ms = 30_000;
    config.seed_demo_users = false;
    config
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let state = ServerState::initialize(&config)
            .await
            .expect("server state");
        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    /// A profile with `role` and a token for it
    pub async fn account(&self, email: &str, role: Role) -> (Profile, String) {
        let user = profile::create(
            self.state.pool(),
            NewProfile {
                email: email.into(),
                password_hash: "unused".into(),
                full_name: Some(email.split('@').next().unwrap_or_default().into()),
                phone: None,
                role,
            },
        )
        .await
        .expect("create profile");
        let token = self
            .state
            .get_jwt_service()
            .generate_token(&user)
            .expect("token");
        (user, token)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, token, None).await
    }

    /// Product created through the admin API
    pub async fn product(&self, admin: &str, name: &str, price: f64, stock: i64) -> i64 {
        let (status, body) = self
            .post(
                "/api/admin/products",
                Some(admin),
                json!({ "name": name, "price": price, "stock_quantity": stock }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().expect("product id")
    }

    pub async fn stock(&self, product_id: i64) -> i64 {
        let (_, body) = self
            .get(&format!("/api/products/{product_id}"), None)
            .await;
        body["stock_quantity"].as_i64().expect("stock")
    }
}

/// Checkout body with a fresh Dubai address
pub fn checkout_body(lines: &[(i64, i64)]) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(id, qty)| json!({ "product_id": id, "quantity": qty }))
        .collect();
    json!({
        "items": items,
        "customer": { "full_name": "Aisha Khan", "phone": "+971501234567" },
        "address": { "street": "Al Wasl Rd 12", "area": "Jumeirah" },
        "payment_method": "cod"
    })
}

pub fn code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or_default()
}
