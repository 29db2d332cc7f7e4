//! Shared test doubles and fixtures for client unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use crate::config::StoreConfig;

use super::{ApiError, Method, Transport};

/// Scripted transport: pops one queued response per request.
#[derive(Clone)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, ApiError>>>>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl MockTransport {
    pub(crate) fn new(responses: Vec<Result<Value, ApiError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().collect())),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    async fn request(
        &self,
        _method: Method,
        _path: &str,
        _query: &[(String, String)],
        _body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("mock transport exhausted".to_owned())))
    }
}

pub(crate) fn test_config() -> StoreConfig {
    StoreConfig {
        api_base_url: "http://localhost:5000/"
            .parse()
            .expect("static URL parses"),
        app_name: "Clementine".to_owned(),
        per_page: 12,
        timeout: Duration::from_secs(10),
        retry: 1,
        cache_ttl: Duration::from_secs(300),
        cache_capacity: 1000,
        data_dir: None,
    }
}

pub(crate) fn product_json(id: i64, name: &str) -> Value {
    json!({ "id": id, "product_name": name, "price": 10.0 })
}

pub(crate) fn page_json(names: &[&str]) -> Value {
    let items: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| product_json(i64::try_from(i).unwrap_or(0) + 1, name))
        .collect();
    json!({
        "items": items,
        "page": 1,
        "per_page": 12,
        "total_pages": 1,
        "total_items": names.len(),
        "has_next": false,
        "has_prev": false,
    })
}

pub(crate) fn orders_json() -> Value {
    json!([{ "id": 1, "user_id": 9, "order_date": "2026-03-01T09:30:00" }])
}

pub(crate) fn order_json(id: i64) -> Value {
    json!({ "id": id, "user_id": 9, "order_date": "2026-03-01T09:30:00" })
}

pub(crate) fn user_json(name: &str) -> Value {
    json!({ "id": 9, "name": name, "email": "ada@example.com", "address": "1 Loop Way" })
}

pub(crate) fn login_json(token: &str) -> Value {
    json!({ "access_token": token, "user_id": 9, "name": "Ada" })
}
