//! Run bookkeeping and the reducer that mutates it.
//!
//! Every change to the published snapshot is an event applied by [`apply`].
//! Events carry the id of the run that produced them; anything from a run
//! other than the current one is dropped, so a superseded run can never
//! write into a newer one.

use crate::chat::ConversationSession;
use crate::error_handling::ChatError;
use crate::models::{AnalysisResult, ChatMessage, MetaData, PsiData, ServerDetails};

/// Stage flags plus the fatal error slot.
///
/// Each flag is raised when its stage starts and lowered exactly once when the
/// stage concludes, after the stage's data or error field has been written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub fetching: bool,
    pub resolving_performance: bool,
    pub generating_suggestions: bool,
    pub streaming_chat: bool,
    pub fatal_error: Option<String>,
}

impl PipelineState {
    /// Returns `true` while any stage is running.
    pub fn is_busy(&self) -> bool {
        self.fetching || self.resolving_performance || self.generating_suggestions || self.streaming_chat
    }
}

/// Where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// No analysis started yet
    #[default]
    Idle,
    /// Waiting on the primary page fetch
    FetchingCore,
    /// Metadata and server details are published
    PartialReady,
    /// Performance and suggestions are running
    BestEffortInFlight,
    /// The run is over (successfully or fatally)
    Settled,
}

/// What observers see after every update.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSnapshot {
    pub run_id: u64,
    pub phase: RunPhase,
    /// Input as typed by the user
    pub domain: String,
    pub result: Option<AnalysisResult>,
    pub state: PipelineState,
    pub session: Option<ConversationSession>,
    /// Why no chat is available for a run that got past the core stage
    pub chat_error: Option<String>,
}

impl AnalysisSnapshot {
    /// Chat turns of the current session; empty before the session opens.
    pub fn chat_turns(&self) -> &[ChatMessage] {
        self.session
            .as_ref()
            .map(ConversationSession::transcript)
            .unwrap_or_default()
    }
}

/// A state change, without its run tag.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A new run begins; resets everything and closes the old session
    Started { domain: String },
    /// The core stage failed
    Fatal(String),
    /// The core stage succeeded
    CoreReady {
        url: String,
        meta_data: MetaData,
        server_details: ServerDetails,
    },
    /// Performance probing and suggestion generation started
    BestEffortStarted,
    PerformanceSettled(Result<PsiData, String>),
    SuggestionsSettled(Result<String, String>),
    SessionOpened(ConversationSession),
    SessionUnavailable(String),
    /// Every stage of the run concluded
    Settled,
    /// The user sent a chat message
    ChatSent(String),
    ChatFragment(String),
    ChatCompleted,
    /// The reply failed; the placeholder becomes this message
    ChatFailed(String),
}

/// A [`PipelineEvent`] tagged with the run that produced it.
#[derive(Debug, Clone)]
pub struct RunEvent {
    pub run_id: u64,
    pub event: PipelineEvent,
}

impl RunEvent {
    pub fn new(run_id: u64, event: PipelineEvent) -> Self {
        Self { run_id, event }
    }
}

/// Why an event was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The event belongs to a superseded run (or the stage already concluded)
    Stale,
    /// The chat session refused the message
    Chat(ChatError),
}

/// Applies `event` to `snapshot`.
///
/// # Errors
///
/// Returns a [`Rejection`] and leaves the snapshot untouched when the event
/// is stale or the chat session refuses it.
pub fn apply(snapshot: &mut AnalysisSnapshot, event: RunEvent) -> Result<(), Rejection> {
    let RunEvent { run_id, event } = event;

    match event {
        PipelineEvent::Started { domain } => {
            if run_id <= snapshot.run_id {
                return Err(Rejection::Stale);
            }
            if let Some(session) = snapshot.session.as_mut() {
                session.close();
            }
            *snapshot = AnalysisSnapshot {
                run_id,
                phase: RunPhase::FetchingCore,
                domain,
                state: PipelineState {
                    fetching: true,
                    ..Default::default()
                },
                ..Default::default()
            };
        }
        _ if run_id != snapshot.run_id => return Err(Rejection::Stale),
        PipelineEvent::Fatal(message) => {
            if !snapshot.state.fetching {
                return Err(Rejection::Stale);
            }
            snapshot.state.fatal_error = Some(message);
            snapshot.state.fetching = false;
            snapshot.phase = RunPhase::Settled;
        }
        PipelineEvent::CoreReady {
            url,
            meta_data,
            server_details,
        } => {
            if !snapshot.state.fetching {
                return Err(Rejection::Stale);
            }
            snapshot.result = Some(AnalysisResult::partial(url, meta_data, server_details));
            snapshot.state.fetching = false;
            snapshot.phase = RunPhase::PartialReady;
        }
        PipelineEvent::BestEffortStarted => {
            if snapshot.phase != RunPhase::PartialReady {
                return Err(Rejection::Stale);
            }
            snapshot.state.resolving_performance = true;
            snapshot.state.generating_suggestions = true;
            snapshot.phase = RunPhase::BestEffortInFlight;
        }
        PipelineEvent::PerformanceSettled(outcome) => {
            let Some(result) = snapshot.result.as_mut() else {
                return Err(Rejection::Stale);
            };
            if !snapshot.state.resolving_performance {
                return Err(Rejection::Stale);
            }
            match outcome {
                Ok(psi) => {
                    result.psi_data = Some(psi);
                    result.psi_error = None;
                }
                Err(message) => {
                    result.psi_data = None;
                    result.psi_error = Some(message);
                }
            }
            snapshot.state.resolving_performance = false;
        }
        PipelineEvent::SuggestionsSettled(outcome) => {
            let Some(result) = snapshot.result.as_mut() else {
                return Err(Rejection::Stale);
            };
            if !snapshot.state.generating_suggestions {
                return Err(Rejection::Stale);
            }
            match outcome {
                Ok(text) => {
                    result.seo_suggestions = Some(text);
                    result.suggestions_error = None;
                }
                Err(message) => {
                    result.seo_suggestions = None;
                    result.suggestions_error = Some(message);
                }
            }
            snapshot.state.generating_suggestions = false;
        }
        PipelineEvent::SessionOpened(session) => {
            snapshot.session = Some(session);
            snapshot.chat_error = None;
        }
        PipelineEvent::SessionUnavailable(message) => {
            snapshot.session = None;
            snapshot.chat_error = Some(message);
        }
        PipelineEvent::Settled => {
            snapshot.phase = RunPhase::Settled;
        }
        PipelineEvent::ChatSent(text) => {
            let session = snapshot
                .session
                .as_mut()
                .ok_or(Rejection::Chat(ChatError::NoSession))?;
            session.begin_message(&text).map_err(Rejection::Chat)?;
            snapshot.state.streaming_chat = true;
        }
        PipelineEvent::ChatFragment(fragment) => {
            if !snapshot.state.streaming_chat {
                return Err(Rejection::Stale);
            }
            if let Some(session) = snapshot.session.as_mut() {
                session.apply_fragment(&fragment);
            }
        }
        PipelineEvent::ChatCompleted => {
            if !snapshot.state.streaming_chat {
                return Err(Rejection::Stale);
            }
            if let Some(session) = snapshot.session.as_mut() {
                session.complete();
            }
            snapshot.state.streaming_chat = false;
        }
        PipelineEvent::ChatFailed(message) => {
            if !snapshot.state.streaming_chat {
                return Err(Rejection::Stale);
            }
            if let Some(session) = snapshot.session.as_mut() {
                session.fail(&message);
            }
            snapshot.state.streaming_chat = false;
        }
    }
    Ok(())
}
