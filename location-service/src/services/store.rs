use crate::config::MongoConfig;
use crate::models::LocationRecord;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, Credential, FindOptions, ServerAddress},
    Client as MongoClient, Collection,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Read-only access to the location collection.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Run `filter` and collect the matches in store order. `limit` of `None`
    /// returns every match.
    async fn find(
        &self,
        filter: Document,
        limit: Option<i64>,
    ) -> Result<Vec<LocationRecord>, AppError>;
}

#[derive(Clone)]
pub struct MongoLocationStore {
    client: MongoClient,
    collection: Collection<LocationRecord>,
}

impl MongoLocationStore {
    /// Open the connection and authenticate. The driver connects lazily, so a
    /// `ping` runs before returning to surface bad hosts or credentials here.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connecting to MongoDB"
        );

        let credential = config.username.as_ref().map(|username| {
            Credential::builder()
                .username(username.clone())
                .password(
                    config
                        .password
                        .as_ref()
                        .map(|p| p.expose_secret().clone()),
                )
                .source(config.auth_source.clone())
                .build()
        });

        let options = ClientOptions::builder()
            .hosts(vec![ServerAddress::Tcp {
                host: config.host.clone(),
                port: Some(config.port),
            }])
            .app_name("location-service".to_string())
            .credential(credential)
            .build();

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to configure MongoDB client: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        let store = Self {
            collection: client
                .database(&config.database)
                .collection(&config.collection),
            client,
        };
        store.health_check().await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Successfully connected to MongoDB"
        );
        Ok(store)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}

#[async_trait]
impl LocationStore for MongoLocationStore {
    async fn find(
        &self,
        filter: Document,
        limit: Option<i64>,
    ) -> Result<Vec<LocationRecord>, AppError> {
        let find_options = FindOptions::builder().limit(limit).build();

        let cursor = self
            .collection
            .find(filter, find_options)
            .await
            .map_err(|e| {
                tracing::debug!("Failed to query locations: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        cursor.try_collect::<Vec<LocationRecord>>().await.map_err(|e| {
            tracing::debug!("Failed to collect locations: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })
    }
}

/// In-memory store for tests and local runs without a database.
///
/// Understands the two filters the service issues: `{zip: ..}` equality and
/// `{loc: {$near: [y, x]}}`, the latter ordered by planar distance.
pub struct InMemoryLocationStore {
    records: Vec<LocationRecord>,
    available: bool,
    query_count: AtomicU64,
}

impl InMemoryLocationStore {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        Self {
            records,
            available: true,
            query_count: AtomicU64::new(0),
        }
    }

    /// A store whose every query fails.
    pub fn unavailable() -> Self {
        Self {
            records: Vec::new(),
            available: false,
            query_count: AtomicU64::new(0),
        }
    }

    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::SeqCst)
    }

    fn near_point(filter: &Document) -> Option<Result<(f64, f64), AppError>> {
        let near = filter.get_document("loc").ok()?.get_array("$near").ok()?;
        let coords: Vec<f64> = near.iter().filter_map(|v| v.as_f64()).collect();
        match coords.as_slice() {
            [y, x] if y.is_finite() && x.is_finite() => Some(Ok((*y, *x))),
            _ => Some(Err(AppError::DatabaseError(anyhow::anyhow!(
                "invalid $near point: {:?}",
                near
            )))),
        }
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn find(
        &self,
        filter: Document,
        limit: Option<i64>,
    ) -> Result<Vec<LocationRecord>, AppError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);

        if !self.available {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "in-memory store is unavailable"
            )));
        }

        let mut matches: Vec<LocationRecord> = if let Ok(zip) = filter.get_str("zip") {
            self.records
                .iter()
                .filter(|r| r.zip == zip)
                .cloned()
                .collect()
        } else if let Some(point) = Self::near_point(&filter) {
            let (y, x) = point?;
            let distance = |r: &LocationRecord| (r.loc.y - y).powi(2) + (r.loc.x - x).powi(2);
            let mut sorted = self.records.clone();
            sorted.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
            sorted
        } else {
            self.records.clone()
        };

        if let Some(limit) = limit.filter(|l| *l > 0) {
            matches.truncate(limit as usize);
        }

        tracing::debug!(matches = matches.len(), "[IN-MEMORY] Location query");
        Ok(matches)
    }
}
