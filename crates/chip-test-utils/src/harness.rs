// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the adapter registry, webhook pipeline, and axum
//! router around a [`MockAdapter`], and drives requests through the router
//! with `tower::ServiceExt::oneshot`, so no socket is bound.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chip_config::ChipConfig;
use chip_core::{ChipError, MessagingAdapter, ReplyGenerator};
use chip_dedup::DedupCache;
use chip_gateway::{
    AdapterRegistry, Collaborators, GatewayState, PipelineSettings, WebhookPipeline, build_router,
};
use chip_reply::{CatalogRetriever, MemberDirectory, SubmissionLog};
use serde_json::Value;
use tower::ServiceExt;

use crate::mock_adapter::MockAdapter;
use crate::mock_generator::MockReplyGenerator;

/// Upper bound on response bodies read by the harness.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: ChipConfig,
    adapter: MockAdapter,
    generator: Option<Arc<dyn ReplyGenerator>>,
    mock_generator: MockReplyGenerator,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: ChipConfig::default(),
            adapter: MockAdapter::new(),
            generator: None,
            mock_generator: MockReplyGenerator::new(),
        }
    }

    /// Use `config` for pipeline settings, dedup windows, the catalog, and
    /// the API prefix.
    pub fn with_config(mut self, config: ChipConfig) -> Self {
        self.config = config;
        self
    }

    /// Every generated reply is `text`.
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.mock_generator = MockReplyGenerator::always(text);
        self
    }

    /// Replace the mock generator, e.g. with one that fails or stalls.
    pub fn with_mock_generator(mut self, generator: MockReplyGenerator) -> Self {
        self.mock_generator = generator;
        self
    }

    /// Use a real generator instead of the mock.
    pub fn with_generator(mut self, generator: Arc<dyn ReplyGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.adapter = self.adapter.with_webhook_secret(secret);
        self
    }

    /// Make every outbound send fail with the error produced by `failure`.
    pub fn with_send_failure(
        mut self,
        failure: impl Fn() -> ChipError + Send + Sync + 'static,
    ) -> Self {
        self.adapter = self.adapter.failing_with(failure);
        self
    }

    pub fn build(self) -> TestHarness {
        let adapter = Arc::new(self.adapter);
        let mock_generator = Arc::new(self.mock_generator);
        let generator: Arc<dyn ReplyGenerator> = match self.generator {
            Some(generator) => generator,
            None => mock_generator.clone(),
        };

        let registry = Arc::new(AdapterRegistry::new());
        registry.register(adapter.clone());

        let dedup = Arc::new(DedupCache::new(
            Duration::from_secs(self.config.dedup.ttl_secs),
            Duration::from_secs(self.config.dedup.window_secs),
        ));
        let submissions = Arc::new(SubmissionLog::new());
        let collaborators = Collaborators {
            generator,
            retriever: Arc::new(CatalogRetriever::new(self.config.reply.catalog.clone())),
            users: Arc::new(MemberDirectory::new()),
            submissions: submissions.clone(),
        };
        let pipeline = WebhookPipeline::new(
            PipelineSettings::from_config(&self.config),
            dedup.clone(),
            collaborators,
        );

        let state = GatewayState {
            registry: registry.clone(),
            pipeline: Arc::new(pipeline),
            default_provider: adapter.name().to_string(),
        };
        let api_prefix = self.config.server.api_prefix.trim_end_matches('/').to_string();
        let router = build_router(state, &api_prefix);

        TestHarness {
            adapter,
            generator: mock_generator,
            registry,
            dedup,
            submissions,
            router,
            api_prefix,
        }
    }
}

/// An assembled gateway with a mock provider, ready for requests.
pub struct TestHarness {
    /// The mock provider, registered as `loop`.
    pub adapter: Arc<MockAdapter>,
    /// The mock generator (unused when a real generator was supplied).
    pub generator: Arc<MockReplyGenerator>,
    pub registry: Arc<AdapterRegistry>,
    pub dedup: Arc<DedupCache>,
    pub submissions: Arc<SubmissionLog>,
    router: Router,
    api_prefix: String,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A clone of the router, for driving requests directly.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// `path` under the configured API prefix.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_prefix)
    }

    /// POST a JSON webhook to the mock provider without credentials.
    pub async fn post_webhook(&self, body: &Value) -> (StatusCode, Value) {
        self.post_webhook_with_auth(body, None).await
    }

    pub async fn post_webhook_with_auth(
        &self,
        body: &Value,
        authorization: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.webhook_url())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        self.request(builder.body(Body::from(body.to_string()))).await
    }

    /// POST a form-encoded webhook body as-is.
    pub async fn post_form_webhook(&self, form: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.webhook_url())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()));
        self.request(request).await
    }

    /// POST to the outbound send API.
    pub async fn send_message(&self, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.url("/messages/send"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()));
        self.request(request).await
    }

    /// POST `{message}` to the agent test route.
    pub async fn test_agent(&self, message: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({ "message": message });
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.url("/test/agent"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()));
        self.request(request).await
    }

    pub async fn health(&self) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(self.url("/health"))
            .body(Body::empty());
        self.request(request).await
    }

    fn webhook_url(&self) -> String {
        self.url(&format!("/webhooks/{}", self.adapter.name()))
    }

    async fn request(
        &self,
        request: Result<Request<Body>, axum::http::Error>,
    ) -> (StatusCode, Value) {
        let request = match request {
            Ok(request) => request,
            Err(e) => panic!("invalid test request: {e}"),
        };
        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(e) => match e {},
        };
        let status = response.status();
        let body = match axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or(Value::Null),
            Err(e) => panic!("failed to read response body: {e}"),
        };
        (status, body)
    }
}
