#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use flavorpal_api::{
    clients::{
        AiEngine, CatalogProduct, ClientError, EMBEDDING_DIM, HealthAssessment, ImageStore,
        ProductCatalog, ProductIdentity, normalize,
    },
    config::JwtConfig,
    db::{create_orm_conn, run_migrations},
    state::AppState,
};
use http_body_util::BodyExt;
use jsonwebtoken::Algorithm;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

/// A tiny valid base64 payload ("hello").
pub const IMAGE: &str = "data:image/jpeg;base64,aGVsbG8=";

pub struct FakeAi {
    pub embedding: Vec<f32>,
    pub identity: ProductIdentity,
    pub assessment: HealthAssessment,
    pub calls: AtomicUsize,
}

impl FakeAi {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            identity: ProductIdentity {
                name: "Mystery Snack".into(),
                manufacturer: Some("Acme".into()),
                description: Some("Crunchy".into()),
            },
            assessment: HealthAssessment {
                conclusion: "unsafe".into(),
                rationale: "Contains peanuts".into(),
            },
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AiEngine for FakeAi {
    async fn encode_image(&self, _image_base64: &str) -> Result<Vec<f32>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embedding.clone())
    }

    async fn identify_product(&self, _image_base64: &str) -> Result<ProductIdentity, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.identity.clone())
    }

    async fn suggest_health_assessment(
        &self,
        _image_base64: &str,
        dietary_flags: &[String],
    ) -> Result<HealthAssessment, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut assessment = self.assessment.clone();
        if dietary_flags.is_empty() {
            assessment.conclusion = "unknown".into();
        }
        Ok(assessment)
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub uploads: AtomicUsize,
}

#[async_trait]
impl ImageStore for FakeStorage {
    async fn upload_image(&self, _image_base64: &str) -> Result<String, ClientError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://storage.test/products/{n}.jpg"))
    }
}

#[derive(Default)]
pub struct FakeCatalog {
    pub products: HashMap<String, CatalogProduct>,
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<CatalogProduct>, ClientError> {
        Ok(self.products.get(barcode).cloned())
    }
}

pub fn jwt() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".into(),
        algorithm: Algorithm::HS256,
        ttl_minutes: 30,
    }
}

pub fn state_with(
    orm: DatabaseConnection,
    ai: Arc<FakeAi>,
    storage: Arc<FakeStorage>,
    catalog: Arc<FakeCatalog>,
) -> AppState {
    AppState {
        orm,
        jwt: Arc::new(jwt()),
        ai,
        storage,
        catalog,
    }
}

/// State whose database is never reachable. Only paths that reject before
/// touching the database are meaningful against it.
pub fn offline_state() -> AppState {
    state_with(
        DatabaseConnection::Disconnected,
        Arc::new(FakeAi::new(unit_vector(1))),
        Arc::new(FakeStorage::default()),
        Arc::new(FakeCatalog::default()),
    )
}

/// Connects to the test database, or `None` when none is configured.
pub async fn test_db() -> anyhow::Result<Option<DatabaseConnection>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            return Ok(None);
        }
    };
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    Ok(Some(orm))
}

/// Deterministic pseudo-random unit vector; different seeds are near-orthogonal.
pub fn unit_vector(seed: u64) -> Vec<f32> {
    let mut x = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let raw = (0..EMBEDDING_DIM)
        .map(|_| {
            x = x
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((x >> 33) as f32 / (1u64 << 31) as f32) - 0.5
        })
        .collect();
    normalize(raw)
}

/// Unit vector whose cosine similarity to the unit vector `base` is exactly
/// `cos`, built by tilting `base` toward a direction orthogonal to it.
pub fn tilted(base: &[f32], seed: u64, cos: f64) -> Vec<f32> {
    let other = unit_vector(seed);
    let dot: f64 = base
        .iter()
        .zip(&other)
        .map(|(a, b)| f64::from(*a) * f64::from(*b))
        .sum();
    let orthogonal: Vec<f32> = base
        .iter()
        .zip(&other)
        .map(|(a, b)| (f64::from(*b) - dot * f64::from(*a)) as f32)
        .collect();
    let orthogonal = normalize(orthogonal);
    let sin = (1.0 - cos * cos).sqrt();
    let mixed = base
        .iter()
        .zip(&orthogonal)
        .map(|(a, o)| (cos * f64::from(*a) + sin * f64::from(*o)) as f32)
        .collect();
    normalize(mixed)
}

/// Random suffix for emails, barcodes and seeds so reruns never collide.
pub fn unique() -> u64 {
    let id = uuid::Uuid::new_v4();
    let (hi, lo) = id.as_u64_pair();
    hi ^ lo
}

pub fn unique_barcode() -> String {
    format!("{:013}", unique() % 10_000_000_000_000)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}
