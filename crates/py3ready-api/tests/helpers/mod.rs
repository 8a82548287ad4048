//! Test helpers: build AppState and router for integration tests.
//!
//! Repositories are in memory and the model service is a stub, so these tests
//! need neither a database nor network access.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use py3ready_api::setup::routes;
use py3ready_api::AppState;
use py3ready_core::{AnalyzerConfig, Config, UploadConfig};
use py3ready_db::{InMemoryReportRepository, InMemoryUserRepository};
use py3ready_services::{
    AnalysisService, AnalyzerError, ModelClient, ModelIssue, ModelVerdict, RequestLimits,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-32-plus-chars";
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// What the stub model answers with.
#[derive(Clone)]
pub enum StubReply {
    Verdict(ModelVerdict),
    Unavailable,
}

/// Stand-in for the Gemini client. Records prompts.
pub struct StubModel {
    reply: StubReply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl ModelClient for StubModel {
    async fn generate(&self, prompt: &str) -> Result<ModelVerdict, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            StubReply::Verdict(verdict) => Ok(verdict.clone()),
            StubReply::Unavailable => Err(AnalyzerError::Status {
                status: 503,
                body: "overloaded".to_string(),
            }),
        }
    }
}

/// A verdict with two Python 2 issues, one of them carrying an off-vocabulary severity.
pub fn python2_verdict() -> ModelVerdict {
    ModelVerdict {
        is_valid_python3: false,
        issues: vec![
            ModelIssue {
                issue: "print statement".to_string(),
                severity: Some("high".to_string()),
                line_hint: "print 'hello'".to_string(),
                fix: "print('hello')".to_string(),
            },
            ModelIssue {
                issue: "dict.has_key".to_string(),
                severity: Some("critical".to_string()),
                line_hint: "d.has_key(k)".to_string(),
                fix: "k in d".to_string(),
            },
        ],
        summary: "Python 2 code".to_string(),
    }
}

pub fn clean_verdict() -> ModelVerdict {
    ModelVerdict {
        is_valid_python3: true,
        issues: Vec::new(),
        summary: "Already Python 3".to_string(),
    }
}

pub fn test_config() -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        environment: "test".to_string(),
        database_url: "postgres://unused/py3ready".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expiry_hours: 1,
        upload: UploadConfig {
            max_file_size_bytes: TEST_MAX_UPLOAD_BYTES,
            ..UploadConfig::default()
        },
        analyzer: AnalyzerConfig::default(),
    }
}

/// Test application: server plus handles on the in-memory backends.
pub struct TestApp {
    pub server: TestServer,
    pub users: InMemoryUserRepository,
    pub reports: InMemoryReportRepository,
    pub model: Option<Arc<StubModel>>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Register a user and return a bearer token for it.
    pub async fn register_and_login(&self, email: &str) -> String {
        self.server
            .post("/api/auth/register")
            .json(&json!({"email": email, "username": "tester", "password": "secret123"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let body: Value = self
            .server
            .post("/api/auth/login")
            .json(&json!({"email": email, "password": "secret123"}))
            .await
            .json();
        body["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }
}

pub fn setup_test_app(reply: Option<StubReply>) -> TestApp {
    let model = reply.map(StubModel::new);
    let client = model.clone().map(|m| m as Arc<dyn ModelClient>);
    let analysis = AnalysisService::new(client, RequestLimits::default());

    let users = InMemoryUserRepository::new();
    let reports = InMemoryReportRepository::new();
    let config = test_config();

    let state = AppState::new(
        config.clone(),
        Arc::new(users.clone()),
        Arc::new(reports.clone()),
        analysis,
    )
    .with_password_cost(4);

    let router = routes::setup_routes(&config, Arc::new(state)).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        users,
        reports,
        model,
    }
}

/// Build an in-memory zip archive from `(name, content)` pairs, in order.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, zip::write::FileOptions::default())
                .unwrap();
            continue;
        }
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Multipart form with one `file` field.
pub fn upload_form(filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data)
            .file_name(filename.to_string())
            .mime_type("application/octet-stream"),
    )
}
