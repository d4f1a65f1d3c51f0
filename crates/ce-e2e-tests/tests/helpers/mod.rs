//! Shared test harness for E2E integration tests.
//!
//! Wires the real router, pipeline and Bedrock-tier `QueryGenerator` to
//! stub collaborators: a scripted model client and a recording factor store.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use ce_cloud_api::db::{FactorStore, MemoryFactorStore, StoreError, StoreResult};
use ce_cloud_api::inference::bedrock::BedrockConfig;
use ce_cloud_api::inference::{
    ModelClient, ModelError, ModelRequest, QueryGenerator, SqlGenerator,
};
use ce_cloud_api::routes::build_router;
use ce_cloud_api::state::AppState;

pub const PETROL_GALLONS_SQL: &str = "SELECT kgco2e FROM uk_no_carbon_ai.emission_data WHERE fuel_or_emission_type = 'Petrol' AND unit = 'gallons'";

/// Model response body carrying `text` as its only content block.
pub fn model_body(text: &str) -> serde_json::Value {
    json!({ "content": [{ "type": "text", "text": text }] })
}

/// What the stub model does on every call.
pub enum ModelBehaviour {
    /// Replay these outcomes in order; fail with `Other` once exhausted.
    Script(Mutex<VecDeque<Result<serde_json::Value, ModelError>>>),
    /// Answer from the prompt: return the SQL of the first rule whose
    /// keyword appears in the prompt.
    ByKeyword(Vec<(&'static str, String)>),
}

/// Model client stub counting its invocations.
pub struct StubModel {
    behaviour: ModelBehaviour,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn returning(sql: &str) -> Arc<Self> {
        Self::scripted(vec![Ok(model_body(sql))])
    }

    pub fn scripted(outcomes: Vec<Result<serde_json::Value, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            behaviour: ModelBehaviour::Script(Mutex::new(outcomes.into())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn by_keyword(rules: Vec<(&'static str, String)>) -> Arc<Self> {
        Arc::new(Self {
            behaviour: ModelBehaviour::ByKeyword(rules),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for StubModel {
    async fn invoke(&self, request: &ModelRequest) -> Result<serde_json::Value, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            ModelBehaviour::Script(outcomes) => outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::Other("script exhausted".into()))),
            ModelBehaviour::ByKeyword(rules) => {
                // Match on the embedded caller text only; the rest of the
                // prompt lists every fuel type.
                let caller_text = request
                    .prompt
                    .split_once("request: \"")
                    .and_then(|(_, rest)| rest.split_once("\", generate"))
                    .map(|(text, _)| text.to_lowercase())
                    .unwrap_or_default();
                rules
                    .iter()
                    .find(|(keyword, _)| caller_text.contains(keyword))
                    .map(|(_, sql)| Ok(model_body(sql)))
                    .unwrap_or_else(|| Ok(json!({ "content": [] })))
            }
        }
    }
}

/// Factor store stub returning a fixed outcome and recording the SQL it ran.
pub struct StubStore {
    value: Result<Option<f64>, ()>,
    seen: Mutex<Vec<String>>,
}

impl StubStore {
    pub fn returning(value: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            value: Ok(value),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            value: Err(()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FactorStore for StubStore {
    async fn fetch_factor(&self, sql: &str) -> StoreResult<Option<f64>> {
        self.seen.lock().unwrap().push(sql.to_string());
        self.value
            .map_err(|_| StoreError::Unsupported("connection refused".into()))
    }

    fn backend_name(&self) -> &str {
        "stub"
    }
}

/// End-to-end harness: router over real pipeline + stub collaborators.
pub struct TestHarness {
    pub router: Router,
    pub state: AppState,
}

impl TestHarness {
    /// Bedrock-tier generator over `model`, lookups against `store`.
    pub fn with_model(model: Arc<StubModel>, store: Arc<dyn FactorStore>) -> Self {
        let generator = QueryGenerator::new(model, &BedrockConfig::default());
        Self::with_generator(Arc::new(generator), store)
    }

    pub fn with_generator(generator: Arc<dyn SqlGenerator>, store: Arc<dyn FactorStore>) -> Self {
        let state = AppState::new(generator, store);
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    /// Template generation over the in-memory sample table.
    pub fn with_sample_data() -> Self {
        let state = AppState::with_sample_data();
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    /// Bedrock-tier harness over the sample table.
    pub fn with_model_and_sample_table(model: Arc<StubModel>) -> Self {
        Self::with_model(model, Arc::new(MemoryFactorStore::with_sample_data()))
    }

    /// POST /calculate_emission. Returns (HTTP status code, response JSON body).
    pub async fn estimate(&self, query: &str) -> (StatusCode, serde_json::Value) {
        let body = json!({ "query": query });

        let response = self
            .router
            .clone()
            .oneshot(
                Request::post("/calculate_emission")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}
