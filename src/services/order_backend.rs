//! The order-submission/auth collaborator. Consumed, not specified: the
//! contract is `POST /auth/login`, `POST /orders` and `GET /orders/:id`.
//! [`LocalBackend`] is the build where the durable store stands in for the
//! backend; [`HttpBackend`] is the REST client wrapper.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::auth::LoginRequest;
use crate::dto::orders::{PlaceOrderRequest, PlacedOrder};
use crate::error::{AppError, AppResult};
use crate::models::{Order, Session, UserProfile};
use crate::store::{KvStore, KvStoreExt, ORDERS_KEY};

#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn login(&self, request: LoginRequest) -> AppResult<Session>;
    async fn place_order(&self, request: PlaceOrderRequest) -> AppResult<PlacedOrder>;
    /// `Ok(None)` for unknown ids; a miss on the confirmation screen is
    /// display-only, never a crash.
    async fn fetch_order(&self, order_id: &str) -> AppResult<Option<Order>>;
}

/// Mock backend over the durable store: orders are appended under the
/// `orders` key, login accepts any non-empty credentials and issues an opaque
/// token.
pub struct LocalBackend {
    store: Arc<dyn KvStore>,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrderBackend for LocalBackend {
    async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest("Invalid email or password".into()));
        }
        let email = request.email.trim().to_string();
        let name = email
            .split('@')
            .next()
            .unwrap_or("shopper")
            .to_string();
        Ok(Session {
            token: Uuid::new_v4().to_string(),
            user: UserProfile {
                id: Uuid::new_v4().to_string(),
                name,
                email,
                role: "user".into(),
            },
        })
    }

    async fn place_order(&self, request: PlaceOrderRequest) -> AppResult<PlacedOrder> {
        if request.items.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".into()));
        }
        let id = Uuid::new_v4();
        let order = Order {
            id: id.to_string(),
            invoice_number: build_invoice_number(id),
            items: request.items,
            shipping: request.shipping,
            payment_method: request.payment.method,
            coupon: request.coupon,
            discount: request.discount,
            total: request.total,
            status: "pending".into(),
            created_at: Utc::now(),
        };

        let mut orders: Vec<Order> = self.store.read(ORDERS_KEY)?.unwrap_or_default();
        orders.push(order.clone());
        self.store.write(ORDERS_KEY, &orders)?;

        tracing::info!(order_id = %order.id, invoice = %order.invoice_number, "checkout");
        Ok(PlacedOrder { order_id: order.id })
    }

    async fn fetch_order(&self, order_id: &str) -> AppResult<Option<Order>> {
        let orders: Vec<Order> = self.store.read(ORDERS_KEY)?.unwrap_or_default();
        Ok(orders.into_iter().find(|order| order.id == order_id))
    }
}

/// REST client against a configured base URL.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl OrderBackend for HttpBackend {
    async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn place_order(&self, request: PlaceOrderRequest) -> AppResult<PlacedOrder> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn fetch_order(&self, order_id: &str) -> AppResult<Option<Order>> {
        let response = self
            .client
            .get(format!("{}/orders/{order_id}", self.base_url))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json().await?))
    }
}

fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("INV-{date}-{short}")
}
