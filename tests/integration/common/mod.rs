//! Shared fixtures: an in-memory app with one business, two staff members
//! and a 30-minute service.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use slotkeeper_server::{
    api,
    config::{AppConfig, StorageBackend},
    models::{Service, Staff},
    repository::{MemoryStore, Repository},
    services::Services,
    AppState,
};

pub struct TestApp {
    pub router: Router,
    pub business_id: Uuid,
    pub staff_ids: [Uuid; 2],
    pub service_id: Uuid,
    /// Service of another business
    pub foreign_service_id: Uuid,
}

fn staff(business_id: Uuid, first_name: &str) -> Staff {
    Staff {
        id: Uuid::new_v4(),
        business_id,
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        position: Some("Stylist".to_string()),
        is_active: true,
    }
}

pub async fn spawn_app() -> TestApp {
    let store = MemoryStore::new();
    let business_id = Uuid::new_v4();

    let alice = staff(business_id, "Alice");
    let bob = staff(business_id, "Bob");
    let staff_ids = [alice.id, bob.id];
    store.insert_staff(alice).await;
    store.insert_staff(bob).await;

    let service_id = Uuid::new_v4();
    store
        .insert_service(Service {
            id: service_id,
            business_id,
            location_id: None,
            name: "Haircut".to_string(),
            duration_minutes: 30,
        })
        .await;

    let foreign_service_id = Uuid::new_v4();
    store
        .insert_service(Service {
            id: foreign_service_id,
            business_id: Uuid::new_v4(),
            location_id: None,
            name: "Massage".to_string(),
            duration_minutes: 60,
        })
        .await;

    let mut config = AppConfig::default();
    config.database.backend = StorageBackend::Memory;

    let services = Services::new(Repository::in_memory(store), &config.scheduling).unwrap();
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    TestApp {
        router: api::create_router(state),
        business_id,
        staff_ids,
        service_id,
        foreign_service_id,
    }
}

impl TestApp {
    /// Send a request under /api/v1 and decode the JSON body (Null when empty)
    pub async fn call(&self, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(format!("/api/v1{}", path))
            .header(CONTENT_TYPE, "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.call(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, path, Some(body)).await
    }
}
