//! Shared harness for the HTTP-level tests.
//!
//! Builds the full router over in-memory stores with a manual cache clock,
//! and seeds one admin account.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use gallery_api::{create_router, hash_password, AppState, AuthConfig, GalleryConfig};
use gallery_core::AdminAccount;
use gallery_storage::{AdminStore, CatalogCache, InMemoryObjectStore, InMemoryStore, ManualClock};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "artist@gallery.test";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const TEST_SECRET: &str = "gallery-integration-test-secret-0123456789";
pub const MEDIA_BASE: &str = "https://media.gallery.test";
pub const WHATSAPP: &str = "15550001111";

const BOUNDARY: &str = "gallery-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub objects: Arc<InMemoryObjectStore>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<CatalogCache>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(GalleryConfig {
            whatsapp_number: WHATSAPP.to_string(),
            ..GalleryConfig::default()
        })
        .await
    }

    pub async fn with_config(config: GalleryConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let objects = Arc::new(InMemoryObjectStore::new(MEDIA_BASE));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));

        let hash = hash_password(ADMIN_PASSWORD).unwrap();
        store
            .insert_admin(&AdminAccount::new(ADMIN_EMAIL, hash))
            .await
            .unwrap();

        let cache = Arc::new(CatalogCache::with_clock(
            store.clone(),
            config.cache_config(),
            clock.clone(),
        ));
        let auth = AuthConfig::with_secret(TEST_SECRET).unwrap();

        let state = AppState::new(store.clone(), store.clone(), objects.clone(), auth, config)
            .with_cache(cache.clone());
        let router = create_router(state, None);

        Self {
            router,
            store,
            objects,
            clock,
            cache,
        }
    }

    /// Move the cache clock past the staleness window.
    pub fn expire_cache(&self) {
        self.clock.advance(Duration::seconds(
            self.cache.config().staleness_window.as_secs() as i64 + 1,
        ));
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_authed(&self, uri: &str, token: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn login(&self) -> String {
        let response = self
            .post_json(
                "/api/admin/login",
                serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        parts: &[Part<'_>],
    ) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(
            Request::delete(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Create a painting through the admin API and return its JSON.
    pub async fn create_painting(&self, token: &str, parts: &[Part<'_>]) -> Value {
        let response = self
            .multipart(Method::POST, "/api/admin/paintings", token, parts)
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.body
        );
        response.body
    }
}

// ============================================================================
// MULTIPART
// ============================================================================

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn image<'a>(name: &'a str, file_name: &'a str) -> Part<'a> {
    Part::File {
        name,
        file_name,
        content_type: "image/jpeg",
        data: b"\xff\xd8\xff\xe0fake-jpeg",
    }
}

/// Text fields for a valid painting, plus its main image.
pub fn painting_form<'a>(slug: &'a str, title: &'a str, status: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("title", title),
        Part::Text("slug", slug),
        Part::Text("medium", "OIL ON CANVAS"),
        Part::Text("dimensions", "90 x 120 cm"),
        Part::Text("year", "2024"),
        Part::Text("description", "Evening light over the backwaters"),
        Part::Text("status", status),
        Part::Text("price", "50000"),
        image("main_image", "front view.jpg"),
    ]
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
