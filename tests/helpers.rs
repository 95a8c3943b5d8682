// Shared test fakes for the analysis pipeline.
//
// Every collaborator the orchestrator talks to has an in-memory stand-in here,
// so integration tests can script each stage's outcome and timing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio::sync::{mpsc, Semaphore};

use seo_analyzer::error_handling::{GatewayError, LlmError, PerformanceError};
use seo_analyzer::gateway::{ContentGateway, GatewayResponse};
use seo_analyzer::llm::{ChatBackend, ChatHandle, StreamEvent, StreamHandle, TextCompletion};
use seo_analyzer::models::{ChatMessage, PsiDeviceData, PsiMetric};
use seo_analyzer::network::{DnsResolver, IpDetails, IpIntelligence, IpKind, RecordType};
use seo_analyzer::performance::{DeviceStrategy, PerformanceApi};
use seo_analyzer::Services;

pub const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Example Domain</title>
    <meta name="description" content="An example page used in tests.">
    <link rel="canonical" href="https://www.example.com/">
  </head>
  <body><h1>Example Domain</h1><h2>More</h2></body>
</html>"#;

/// A gate that lets tests hold a stage until they choose to release it.
#[derive(Clone)]
pub struct Gate(Arc<Semaphore>);

#[allow(dead_code)] // Not every test file holds stages
impl Gate {
    pub fn closed() -> Self {
        Gate(Arc::new(Semaphore::new(0)))
    }

    pub fn open() -> Self {
        Gate(Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)))
    }

    pub fn release(&self) {
        self.0.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    pub async fn pass(&self) {
        let _permit = self.0.acquire().await.expect("gate semaphore closed");
    }
}

/// Serves canned pages by URL; anything else fails in transport.
#[derive(Default)]
pub struct FakeGateway {
    pages: HashMap<String, (u16, String)>,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_string()));
        self
    }

    /// The example site: home page plus robots.txt.
    pub fn example_site(host: &str) -> Self {
        FakeGateway::default()
            .with_page(&format!("https://{host}"), 200, PAGE_HTML)
            .with_page(&format!("https://{host}/"), 200, PAGE_HTML)
            .with_page(&format!("https://{host}/robots.txt"), 200, "User-agent: *\nDisallow:")
    }
}

#[async_trait]
impl ContentGateway for FakeGateway {
    async fn fetch(&self, url: &str) -> Result<GatewayResponse, GatewayError> {
        let (status, body) = self
            .pages
            .get(url)
            .ok_or_else(|| GatewayError::Unreachable(url.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert("server", "nginx".parse().expect("valid header value"));
        Ok(GatewayResponse {
            status: StatusCode::from_u16(*status).expect("valid status"),
            headers,
            body: body.clone(),
        })
    }
}

pub struct FakeDns;

#[async_trait]
impl DnsResolver for FakeDns {
    async fn lookup(&self, _hostname: &str, record: RecordType) -> Option<String> {
        match record {
            RecordType::A => Some("203.0.113.7".to_string()),
            RecordType::Aaaa => None,
        }
    }
}

pub struct FakeIntel;

#[async_trait]
impl IpIntelligence for FakeIntel {
    async fn lookup(&self, ip: &str) -> Option<IpDetails> {
        Some(IpDetails {
            ip: ip.to_string(),
            kind: IpKind::IPv4,
            country: Some("United States".to_string()),
            country_code: Some("US".to_string()),
            region: None,
            city: None,
            timezone: None,
            isp: Some("Example Hosting".to_string()),
            org: None,
            asn: Some(64500),
        })
    }
}

pub fn device_data(score: u8) -> PsiDeviceData {
    PsiDeviceData {
        score,
        metrics: vec![PsiMetric {
            id: "largest-contentful-paint".to_string(),
            title: "Largest Contentful Paint".to_string(),
            display_value: "1.2 s".to_string(),
            score: 95,
        }],
    }
}

/// Scores each device strategy, or fails it, after passing the gate.
pub struct FakePerformance {
    pub mobile_ok: bool,
    pub desktop_ok: bool,
    pub gate: Gate,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakePerformance {
    pub fn new(mobile_ok: bool, desktop_ok: bool) -> Self {
        FakePerformance {
            mobile_ok,
            desktop_ok,
            gate: Gate::open(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }
}

#[async_trait]
impl PerformanceApi for FakePerformance {
    async fn assess(&self, _url: &str, strategy: DeviceStrategy) -> Result<PsiDeviceData, PerformanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;
        let ok = match strategy {
            DeviceStrategy::Mobile => self.mobile_ok,
            DeviceStrategy::Desktop => self.desktop_ok,
        };
        if ok {
            Ok(device_data(if strategy == DeviceStrategy::Mobile { 71 } else { 93 }))
        } else {
            Err(PerformanceError::Api("quota exceeded".to_string()))
        }
    }
}

/// One-shot completion returning a fixed reply or failing.
pub struct FakeCompletion {
    pub reply: Option<String>,
    pub gate: Gate,
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeCompletion {
    pub fn replying(reply: &str) -> Self {
        FakeCompletion {
            reply: Some(reply.to_string()),
            gate: Gate::open(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        FakeCompletion {
            reply: None,
            gate: Gate::open(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }
}

#[async_trait]
impl TextCompletion for FakeCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().expect("prompts lock").push(prompt.to_string());
        self.gate.pass().await;
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

/// Chat backend whose replies follow a script, one entry per message sent.
pub struct FakeChat {
    pub refuse_sessions: bool,
    pub scripts: Arc<Mutex<Vec<Vec<StreamEvent>>>>,
    pub gate: Gate,
    pub sessions: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

#[allow(dead_code)]
impl FakeChat {
    pub fn new() -> Self {
        FakeChat {
            refuse_sessions: false,
            scripts: Arc::new(Mutex::new(Vec::new())),
            gate: Gate::open(),
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn refusing() -> Self {
        FakeChat {
            refuse_sessions: true,
            ..FakeChat::new()
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Queues the events of the next reply.
    pub fn script(&self, events: Vec<StreamEvent>) {
        self.scripts.lock().expect("scripts lock").push(events);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().expect("sessions lock").len()
    }
}

#[async_trait]
impl ChatBackend for FakeChat {
    async fn create_session(
        &self,
        system_instruction: &str,
        history: Vec<ChatMessage>,
    ) -> Result<Arc<dyn ChatHandle>, LlmError> {
        if self.refuse_sessions {
            return Err(LlmError::MissingApiKey);
        }
        self.sessions
            .lock()
            .expect("sessions lock")
            .push((system_instruction.to_string(), history));
        Ok(Arc::new(FakeChatHandle {
            scripts: Arc::clone(&self.scripts),
            gate: self.gate.clone(),
        }))
    }
}

struct FakeChatHandle {
    scripts: Arc<Mutex<Vec<Vec<StreamEvent>>>>,
    gate: Gate,
}

#[async_trait]
impl ChatHandle for FakeChatHandle {
    async fn send_message_stream(&self, _text: &str) -> Result<StreamHandle, LlmError> {
        let events = {
            let mut scripts = self.scripts.lock().expect("scripts lock");
            if scripts.is_empty() {
                return Err(LlmError::EmptyResponse);
            }
            scripts.remove(0)
        };
        let (tx, rx) = mpsc::channel(16);
        let gate = self.gate.clone();
        tokio::spawn(async move {
            gate.pass().await;
            for event in events {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(StreamHandle::new(rx))
    }
}

/// Handles on the fakes behind a [`Services`] bundle.
#[allow(dead_code)]
pub struct Fakes {
    pub performance: Arc<FakePerformance>,
    pub completion: Arc<FakeCompletion>,
    pub chat: Arc<FakeChat>,
}

pub fn services(
    gateway: FakeGateway,
    performance: FakePerformance,
    completion: FakeCompletion,
    chat: FakeChat,
) -> (Services, Fakes) {
    let performance = Arc::new(performance);
    let completion = Arc::new(completion);
    let chat = Arc::new(chat);
    let services = Services {
        gateway: Arc::new(gateway),
        dns: Arc::new(FakeDns),
        intel: Arc::new(FakeIntel),
        performance: performance.clone(),
        completion: completion.clone(),
        chat: chat.clone(),
    };
    (
        services,
        Fakes {
            performance,
            completion,
            chat,
        },
    )
}

/// Services where every stage succeeds for www.example.com.
#[allow(dead_code)]
pub fn happy_services() -> (Services, Fakes) {
    services(
        FakeGateway::example_site("www.example.com"),
        FakePerformance::new(true, true),
        FakeCompletion::replying("1. Lengthen the meta description."),
        FakeChat::new(),
    )
}
