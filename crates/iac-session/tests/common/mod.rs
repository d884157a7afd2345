//! Shared fixtures: an in-memory backend with scripted responses.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::FutureExt;
use iac_client::{AnalysisBackend, ClientError, Result};
use iac_model::{
    AiAnalysisResult, ArtifactReference, AuthenticityReport, KnownHashes, Metadata, RiskLevel,
    SimulationResult, UploadResult,
};
use iac_session::{Message, Session, Task};
use serde_json::json;

/// A request the backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload {
        file_name: String,
        known_sha256: Option<String>,
        known_md5: Option<String>,
    },
    AiAnalysis {
        metadata: Metadata,
    },
    Verification {
        file_name: String,
    },
    Simulation {
        file_name: String,
        edits: Metadata,
    },
}

/// One queued response, optionally delayed to force arrival order.
pub struct Reply<T> {
    delay: Duration,
    outcome: Result<T>,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(value),
        }
    }

    pub fn err(err: ClientError) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(err),
        }
    }

    pub fn after(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

/// Backend whose responses are queued per endpoint.
///
/// With `fallback` set, an empty queue answers with the default fixtures;
/// otherwise it answers with a network error.
#[derive(Default)]
pub struct ScriptedBackend {
    fallback: bool,
    uploads: Mutex<VecDeque<Reply<UploadResult>>>,
    analyses: Mutex<VecDeque<Reply<AiAnalysisResult>>>,
    verifications: Mutex<VecDeque<Reply<AuthenticityReport>>>,
    simulations: Mutex<VecDeque<Reply<SimulationResult>>>,
    upload_delays: Mutex<HashMap<String, u64>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that always succeeds with the default fixtures.
    pub fn succeeding() -> Self {
        Self {
            fallback: true,
            ..Self::default()
        }
    }

    pub fn push_upload(&self, reply: Reply<UploadResult>) {
        self.uploads.lock().expect("lock").push_back(reply);
    }

    /// Delay every upload of `file_name`, whatever reply it gets.
    pub fn delay_upload(&self, file_name: &str, millis: u64) {
        self.upload_delays
            .lock()
            .expect("lock")
            .insert(file_name.to_string(), millis);
    }

    pub fn push_ai_analysis(&self, reply: Reply<AiAnalysisResult>) {
        self.analyses.lock().expect("lock").push_back(reply);
    }

    pub fn push_verification(&self, reply: Reply<AuthenticityReport>) {
        self.verifications.lock().expect("lock").push_back(reply);
    }

    pub fn push_simulation(&self, reply: Reply<SimulationResult>) {
        self.simulations.lock().expect("lock").push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }

    fn next<T>(&self, queue: &Mutex<VecDeque<Reply<T>>>, fallback: impl FnOnce() -> T) -> Reply<T> {
        let queued = queue.lock().expect("lock").pop_front();
        match queued {
            Some(reply) => reply,
            None if self.fallback => Reply::ok(fallback()),
            None => Reply::err(ClientError::Network("connection refused".to_string())),
        }
    }
}

async fn respond<T>(reply: Reply<T>) -> Result<T> {
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    reply.outcome
}

impl AnalysisBackend for ScriptedBackend {
    async fn upload(&self, artifact: &ArtifactReference, known: &KnownHashes) -> Result<UploadResult> {
        self.record(Call::Upload {
            file_name: artifact.name().to_string(),
            known_sha256: known.sha256().map(str::to_string),
            known_md5: known.md5().map(str::to_string),
        });
        let mut reply = self.next(&self.uploads, || upload_result(artifact.local_sha256()));
        let delay = self.upload_delays.lock().expect("lock").get(artifact.name()).copied();
        if let Some(millis) = delay {
            reply = reply.after(millis);
        }
        respond(reply).await
    }

    async fn analyze_metadata(&self, metadata: &Metadata) -> Result<AiAnalysisResult> {
        self.record(Call::AiAnalysis {
            metadata: metadata.clone(),
        });
        let reply = self.next(&self.analyses, ai_result);
        respond(reply).await
    }

    async fn verify_authenticity(&self, file_name: &str) -> Result<AuthenticityReport> {
        self.record(Call::Verification {
            file_name: file_name.to_string(),
        });
        let reply = self.next(&self.verifications, || report(RiskLevel::Low));
        respond(reply).await
    }

    async fn simulate_metadata(&self, file_name: &str, edits: &Metadata) -> Result<SimulationResult> {
        self.record(Call::Simulation {
            file_name: file_name.to_string(),
            edits: edits.clone(),
        });
        let reply = self.next(&self.simulations, || simulation_result(edits, Vec::new()));
        respond(reply).await
    }

    async fn fetch_ela_asset(&self, _ela_filename: &str) -> Result<Vec<u8>> {
        Ok(b"ela".to_vec())
    }
}

pub fn artifact(name: &str) -> ArtifactReference {
    ArtifactReference::new(name, format!("bytes of {name}").into_bytes())
}

pub fn sample_metadata() -> Metadata {
    Metadata::from_value(json!({
        "File Name": "photo.jpg",
        "Camera Make": "Canon",
        "Software": "Camera Firmware",
        "GPS Latitude": "Could not retrieve",
        "Flags": ["Timestamp mismatch", "GPS missing"]
    }))
    .expect("metadata")
}

pub fn upload_result(sha256: &str) -> UploadResult {
    UploadResult {
        sha256: sha256.to_string(),
        md5: "def456".to_string(),
        sha_match: None,
        md5_match: None,
        metadata: sample_metadata(),
        ela_filename: "ela_photo.jpg".to_string(),
    }
}

pub fn ai_result() -> AiAnalysisResult {
    AiAnalysisResult {
        confidence_score: 82.0,
        verdict: "Likely authentic".to_string(),
        evidence: vec!["Camera Make present".to_string()],
    }
}

pub fn report(risk_level: RiskLevel) -> AuthenticityReport {
    AuthenticityReport {
        score: 40.0,
        flags: vec!["Software tag present".to_string()],
        risk_level,
        recommendation: "Treat with caution".to_string(),
    }
}

pub fn simulation_result(edits: &Metadata, simulated_flags: Vec<String>) -> SimulationResult {
    SimulationResult {
        original_metadata: sample_metadata(),
        simulated_metadata: edits.clone(),
        simulated_flags,
    }
}

/// Resolve every future of `task` immediately and feed the responses back.
///
/// Only valid for replies without a delay.
pub fn drive<B: AnalysisBackend>(session: &mut Session<B>, task: Task<Message>) {
    for future in task.into_futures() {
        let message = future
            .now_or_never()
            .expect("scripted reply should be immediate");
        let follow_up = session.update(message).expect("completion accepted");
        drive(session, follow_up);
    }
}

/// Select `name` and upload it with the default fixtures.
pub fn ready_session(backend: std::sync::Arc<ScriptedBackend>, name: &str) -> Session<ScriptedBackend> {
    let mut session = Session::new(backend);
    session
        .update(Message::select_file(artifact(name)))
        .expect("select");
    let task = session.update(Message::upload()).expect("upload accepted");
    drive(&mut session, task);
    assert!(session.store().is_ready());
    session
}
