use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use partnerdesk::config::AppConfig;
use partnerdesk::drafts::{DraftBackend, DraftError, DraftGenerator, DraftRequest, GeneratedDraft};
use partnerdesk::models::Publisher;
use partnerdesk::routes;
use partnerdesk::seed::SeedData;
use partnerdesk::state::AppState;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Draft backend that answers instantly (or after `delay`) and fails for a
/// fixed set of company names.
#[derive(Default)]
pub struct ScriptedBackend {
    failing: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DraftBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(
        &self,
        request: &DraftRequest,
        _prompt: &str,
    ) -> Result<GeneratedDraft, DraftError> {
        let company = request.context.company.clone();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(company.clone());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.contains(&company) {
            return Err(DraftError::Unavailable(format!("scripted failure for {company}")));
        }
        Ok(GeneratedDraft {
            subject: format!("Partnering with {company}"),
            body: format!("Hello {company}, let's work together."),
        })
    }
}

pub struct TestAppBuilder {
    config: AppConfig,
    failing: Vec<String>,
    delay: Duration,
}

impl TestAppBuilder {
    #[allow(dead_code)]
    pub fn failing(mut self, companies: &[&str]) -> Self {
        self.failing = companies.iter().map(|c| c.to_string()).collect();
        self
    }

    #[allow(dead_code)]
    pub fn draft_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[allow(dead_code)]
    pub fn config(mut self, update: impl FnOnce(&mut AppConfig)) -> Self {
        update(&mut self.config);
        self
    }

    pub fn build(self) -> TestApp {
        let backend = Arc::new(ScriptedBackend {
            failing: self.failing.into_iter().collect(),
            delay: self.delay,
            calls: Mutex::new(Vec::new()),
        });
        let drafts = DraftGenerator::new(backend.clone(), self.config.platform_name.clone());
        let state = AppState::new(self.config, SeedData::demo(), drafts);
        let router = routes::create_router(state.clone());
        TestApp {
            state,
            router,
            backend,
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    backend: Arc<ScriptedBackend>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestAppBuilder {
        let config = AppConfig {
            server_port: 0,
            bulk_dismiss_delay: Duration::from_millis(250),
            import_delay: Duration::ZERO,
            media_kit_delay: Duration::ZERO,
            ..AppConfig::default()
        };
        TestAppBuilder {
            config,
            failing: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    #[allow(dead_code)]
    pub fn backend(&self) -> Arc<ScriptedBackend> {
        self.backend.clone()
    }

    /// Inserts a copy of the last seeded publisher under a new id and name.
    #[allow(dead_code)]
    pub async fn insert_publisher(&self, id: &str, company: &str) -> Result<Publisher> {
        let mut store = self.state.store.write().await;
        let mut publisher = store
            .publishers()
            .last()
            .cloned()
            .ok_or_else(|| anyhow!("seed has no publishers"))?;
        publisher.id = id.to_string();
        publisher.company = company.to_string();
        store.add_publisher(publisher.clone());
        Ok(publisher)
    }

    #[allow(dead_code)]
    pub async fn sent_today(&self, profile_id: &str) -> Result<u32> {
        let store = self.state.store.read().await;
        store
            .sending_profiles()
            .iter()
            .find(|p| p.id == profile_id)
            .map(|p| p.sent_today)
            .ok_or_else(|| anyhow!("profile {profile_id} missing"))
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        self.send(request).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.json_request(Method::POST, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn post_empty(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())?;
        self.send(request).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.json_request(Method::PATCH, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(path)
            .body(Body::empty())?;
        self.send(request).await
    }

    /// Multipart upload with one `file` part per entry of
    /// `(filename, content_type, bytes)`. An empty content type omits the header.
    #[allow(dead_code)]
    pub async fn upload_files(
        &self,
        path: &str,
        files: &[(&str, &str, &[u8])],
    ) -> Result<hyper::Response<Body>> {
        let boundary = format!("boundary-{}", Uuid::new_v4());
        let mut body = Vec::new();
        for (filename, content_type, data) in files {
            body.extend(format!("--{boundary}\r\n").as_bytes());
            body.extend(
                format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            if !content_type.is_empty() {
                body.extend(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend(b"\r\n");
            body.extend(*data);
            body.extend(b"\r\n");
        }
        body.extend(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))?;
        self.send(request).await
    }

    /// Polls the bulk session until drafting has finished.
    #[allow(dead_code)]
    pub async fn wait_for_review(&self) -> Result<Value> {
        for _ in 0..200 {
            let response = self.get("/api/outreach").await?;
            if response.status() != StatusCode::OK {
                bail!("bulk session disappeared: {}", response.status());
            }
            let session = body_json(response).await?;
            if session["step"] == "review" {
                return Ok(session);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        bail!("drafting did not finish in time")
    }

    async fn json_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Result<hyper::Response<Body>> {
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn body_json(response: hyper::Response<Body>) -> Result<Value> {
    let bytes = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
