#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use location_service::config::{LocationConfig, MongoConfig};
use location_service::models::LocationRecord;
use location_service::services::{InMemoryLocationStore, LocationStore};
use location_service::startup::{build_router, AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower::util::ServiceExt;

pub const STATIC_DIR: &str = "html";

/// A handful of North Carolina records around Fuquay-Varina plus a far one.
pub fn sample_records() -> Vec<LocationRecord> {
    vec![
        LocationRecord::new("10001", "NEW YORK", "NY", 40.750742, 73.99653),
        LocationRecord::new("27526", "FUQUAY VARINA", "NC", 35.579952, 78.780807),
        LocationRecord::new("27540", "HOLLY SPRINGS", "NC", 35.640287, 78.840012),
        LocationRecord::new("27592", "WILLOW SPRING", "NC", 35.550548, 78.672051),
        LocationRecord::new("27526", "DUPLICATE ZIP", "NC", 1.0, 2.0),
    ]
}

/// `count` records spread along a line, nearest to the origin first.
pub fn many_records(count: usize) -> Vec<LocationRecord> {
    (0..count)
        .map(|i| {
            let offset = i as f64 / 100.0;
            LocationRecord::new(&format!("{:05}", i), "TOWN", "ST", offset, offset)
        })
        .collect()
}

pub struct TestRouter {
    pub router: Router,
    pub state: AppState,
}

impl TestRouter {
    pub fn new(store: Arc<InMemoryLocationStore>) -> Self {
        let state = AppState::new(store);
        let router = build_router(state.clone(), STATIC_DIR);
        Self { router, state }
    }

    pub fn with_records(records: Vec<LocationRecord>) -> Self {
        Self::new(Arc::new(InMemoryLocationStore::new(records)))
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn list_items(&self) -> Vec<&str> {
        self.body
            .split("<li>")
            .skip(1)
            .filter_map(|item| item.split("</li>").next())
            .collect()
    }
}

/// A real listener on a random port, backed by the given store.
pub struct TestApp {
    pub address: String,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub async fn spawn(store: Arc<dyn LocationStore>) -> Self {
        let config = LocationConfig {
            common: CoreConfig {
                ip: Some("127.0.0.1".parse().unwrap()),
                port: 0,
            },
            mongodb: MongoConfig {
                host: "localhost".to_string(),
                port: 27017,
                database: "location_test".to_string(),
                collection: "zips".to_string(),
                username: None,
                password: None,
                auth_source: "admin".to_string(),
            },
            static_dir: STATIC_DIR.to_string(),
        };

        let app = Application::build_with_store(config, store)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        let handle = tokio::spawn(app.run_until_stopped());

        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(format!("{}/health", address)).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        TestApp { address, handle }
    }

    /// Client that reports redirects instead of following them.
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client")
    }
}
