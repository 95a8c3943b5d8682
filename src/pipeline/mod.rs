//! Analysis orchestration.
//!
//! One call to [`AnalysisOrchestrator::start_analysis`] runs the whole
//! pipeline for a domain:
//!
//! 1. reset state and normalize the domain,
//! 2. run the core stage (page fetch, robots.txt, network info); its failure
//!    is fatal and ends the run,
//! 3. publish metadata and server details right away,
//! 4. probe performance and generate suggestions concurrently; either may
//!    fail on its own without touching the other,
//! 5. open the conversation session with whatever data is available.
//!
//! Progress is published as [`AnalysisSnapshot`]s over a `watch` channel.
//! Starting a new analysis cancels the previous run; anything the old run
//! still produces is discarded by run id.

mod state;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::app::normalize_domain;
use crate::chat::ConversationSession;
use crate::config::MSG_CHAT_FAILED;
use crate::error_handling::ChatError;
use crate::fetch::{analyze_url, CoreServices};
use crate::gateway::ContentGateway;
use crate::llm::{ChatBackend, StreamEvent, TextCompletion};
use crate::network::{DnsResolver, IpIntelligence};
use crate::performance::{fetch_psi_data, PerformanceApi};
use crate::suggestions::get_seo_suggestions;

pub use state::{apply, AnalysisSnapshot, PipelineEvent, PipelineState, Rejection, RunEvent, RunPhase};

/// The collaborators a run talks to.
#[derive(Clone)]
pub struct Services {
    pub gateway: Arc<dyn ContentGateway>,
    pub dns: Arc<dyn DnsResolver>,
    pub intel: Arc<dyn IpIntelligence>,
    pub performance: Arc<dyn PerformanceApi>,
    pub completion: Arc<dyn TextCompletion>,
    pub chat: Arc<dyn ChatBackend>,
}

/// Id and cancellation token of the newest run.
#[derive(Default)]
struct RunSlot {
    last_id: u64,
    token: Option<CancellationToken>,
}

/// Runs analyses and owns the published snapshot.
pub struct AnalysisOrchestrator {
    services: Services,
    snapshot: watch::Sender<AnalysisSnapshot>,
    current_run: Mutex<RunSlot>,
}

impl AnalysisOrchestrator {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            snapshot: watch::Sender::new(AnalysisSnapshot::default()),
            current_run: Mutex::new(RunSlot::default()),
        }
    }

    /// Receives every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisSnapshot> {
        self.snapshot.subscribe()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Applies an event and notifies subscribers if it was accepted.
    fn dispatch(&self, event: RunEvent) -> Result<(), Rejection> {
        let mut outcome = Ok(());
        self.snapshot.send_if_modified(|snapshot| {
            outcome = apply(snapshot, event);
            outcome.is_ok()
        });
        if let Err(Rejection::Stale) = &outcome {
            log::debug!("Discarded event from a superseded run");
        }
        outcome
    }

    /// Publishes a run event. Rejections only mean the run was superseded,
    /// which its caller has nothing to do about.
    fn publish(&self, run_id: u64, event: PipelineEvent) {
        let _ = self.dispatch(RunEvent::new(run_id, event));
    }

    /// Runs a full analysis of `domain` and returns the final snapshot.
    ///
    /// Never fails: fatal and stage errors are recorded in the snapshot.
    /// If another analysis starts meanwhile, this run stops early and the
    /// returned snapshot belongs to the newer run.
    pub async fn start_analysis(&self, domain: &str) -> AnalysisSnapshot {
        let token = CancellationToken::new();
        // Id allocation, token swap and the Started event happen under one
        // lock so the newest id always owns the live token.
        let run_id = {
            let mut current = self
                .current_run
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            current.last_id += 1;
            if let Some(previous) = current.token.replace(token.clone()) {
                previous.cancel();
            }
            log::info!("Starting analysis run {} for {}", current.last_id, domain);
            self.publish(
                current.last_id,
                PipelineEvent::Started {
                    domain: domain.to_string(),
                },
            );
            current.last_id
        };

        tokio::select! {
            _ = token.cancelled() => {
                log::info!("Analysis run {} superseded", run_id);
            }
            _ = self.run(run_id, domain) => {
                log::info!("Analysis run {} settled", run_id);
            }
        }
        self.snapshot()
    }

    async fn run(&self, run_id: u64, domain: &str) {
        let url = match normalize_domain(domain) {
            Ok(url) => url,
            Err(e) => {
                self.publish(run_id, PipelineEvent::Fatal(e.to_string()));
                return;
            }
        };

        let core = CoreServices {
            gateway: self.services.gateway.as_ref(),
            dns: self.services.dns.as_ref(),
            intel: self.services.intel.as_ref(),
        };
        let (meta_data, server_details) = match analyze_url(&core, &url).await {
            Ok(core_data) => core_data,
            Err(e) => {
                log::error!("Analysis of {} failed: {}", url, e);
                self.publish(run_id, PipelineEvent::Fatal(e.to_string()));
                return;
            }
        };

        self.publish(
            run_id,
            PipelineEvent::CoreReady {
                url: url.clone(),
                meta_data: meta_data.clone(),
                server_details: server_details.clone(),
            },
        );
        self.publish(run_id, PipelineEvent::BestEffortStarted);

        let performance = async {
            let outcome = fetch_psi_data(self.services.performance.as_ref(), &url).await;
            let psi_data = outcome.as_ref().ok().cloned();
            self.publish(
                run_id,
                PipelineEvent::PerformanceSettled(outcome.map_err(|e| e.to_string())),
            );
            psi_data
        };
        let suggestions = async {
            // Uses whatever performance data exists when generation starts
            let psi_now = self
                .snapshot
                .borrow()
                .result
                .as_ref()
                .and_then(|result| result.psi_data.clone());
            let outcome = get_seo_suggestions(
                self.services.completion.as_ref(),
                &meta_data,
                psi_now.as_ref(),
                &server_details,
                &url,
            )
            .await;
            self.publish(
                run_id,
                PipelineEvent::SuggestionsSettled(outcome.map_err(|e| e.to_string())),
            );
        };
        let (psi_data, ()) = futures::join!(performance, suggestions);

        match ConversationSession::open(
            self.services.chat.as_ref(),
            &url,
            &meta_data,
            &server_details,
            psi_data.as_ref(),
        )
        .await
        {
            Ok(session) => self.publish(run_id, PipelineEvent::SessionOpened(session)),
            Err(e) => {
                log::warn!("Could not open a conversation session for {}: {}", url, e);
                self.publish(run_id, PipelineEvent::SessionUnavailable(e.to_string()));
            }
        }
        self.publish(run_id, PipelineEvent::Settled);
    }

    /// Sends `text` to the current session and streams the reply into it.
    ///
    /// Returns once the reply has completed or failed. A failure while
    /// streaming is not an error: the placeholder turn is replaced with an
    /// apology and the session stays usable.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] when there is no ready session to send to.
    pub async fn send_chat_message(&self, text: &str) -> Result<(), ChatError> {
        let (run_id, handle) = {
            let snapshot = self.snapshot.borrow();
            let session = snapshot.session.as_ref().ok_or(ChatError::NoSession)?;
            (snapshot.run_id, session.handle())
        };

        match self.dispatch(RunEvent::new(run_id, PipelineEvent::ChatSent(text.to_string()))) {
            Ok(()) => {}
            Err(Rejection::Chat(e)) => return Err(e),
            Err(Rejection::Stale) => return Err(ChatError::Closed),
        }

        let mut stream = match handle.send_message_stream(text).await {
            Ok(stream) => stream,
            Err(e) => {
                log::error!("Error in chat session: {}", e);
                self.publish(run_id, PipelineEvent::ChatFailed(MSG_CHAT_FAILED.to_string()));
                return Ok(());
            }
        };

        loop {
            let event = match stream.next_event().await {
                Some(StreamEvent::Delta(fragment)) => PipelineEvent::ChatFragment(fragment),
                Some(StreamEvent::Completed) | None => PipelineEvent::ChatCompleted,
                Some(StreamEvent::Error(e)) => {
                    log::error!("Chat stream failed: {}", e);
                    PipelineEvent::ChatFailed(MSG_CHAT_FAILED.to_string())
                }
            };
            let finished = !matches!(event, PipelineEvent::ChatFragment(_));
            if self.dispatch(RunEvent::new(run_id, event)).is_err() {
                // The session was replaced by a newer analysis
                break;
            }
            if finished {
                break;
            }
        }
        Ok(())
    }
}
