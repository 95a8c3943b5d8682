// Conversation session tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::config::MSG_CHAT_FAILED;
use crate::llm::StreamHandle;
use crate::models::{RobotsTxtStatus, TitleSource};

struct NullChat;

#[async_trait]
impl ChatHandle for NullChat {
    async fn send_message_stream(&self, _text: &str) -> Result<StreamHandle, LlmError> {
        Err(LlmError::EmptyResponse)
    }
}

#[derive(Default)]
struct RecordingBackend {
    created: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

#[async_trait]
impl ChatBackend for RecordingBackend {
    async fn create_session(
        &self,
        system_instruction: &str,
        history: Vec<ChatMessage>,
    ) -> Result<Arc<dyn ChatHandle>, LlmError> {
        self.created
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), history));
        Ok(Arc::new(NullChat))
    }
}

fn meta() -> MetaData {
    MetaData {
        title: "Example".to_string(),
        title_source: TitleSource::TitleTag,
        description: String::new(),
        canonical: None,
        og_title: None,
        og_description: None,
        og_image: None,
        twitter_card: None,
        twitter_title: None,
        twitter_description: None,
        twitter_image: None,
        headings: Vec::new(),
        favicon: None,
        robots_txt: None,
        robots_txt_status: RobotsTxtStatus::Error,
    }
}

fn ready_session() -> ConversationSession {
    let url = "https://www.example.com";
    ConversationSession::with_handle(
        url,
        Arc::new(NullChat),
        priming_history(url, &meta(), &ServerDetails::default(), None),
    )
}

#[tokio::test]
async fn test_open_seeds_backend_with_priming_turns() {
    let backend = RecordingBackend::default();
    let session = ConversationSession::open(
        &backend,
        "https://www.example.com",
        &meta(),
        &ServerDetails::default(),
        None,
    )
    .await
    .expect("session should open");

    let created = backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let (instruction, history) = &created[0];
    assert!(instruction.contains("https://www.example.com"));
    assert!(instruction.contains(OUT_OF_SCOPE_REPLY));
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ChatRole::User);
    assert!(history[0].content.contains("\"metaData\""));
    assert!(history[0].content.contains("\"psiData\":null"));
    assert_eq!(
        history[1].content,
        "Understood. I have the complete analysis for https://www.example.com. I am ready to answer your questions regarding its SEO and design."
    );

    // priming + greeting
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(session.transcript()[2].content, greeting("https://www.example.com"));
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_turn_accounting_over_several_messages() {
    let mut session = ready_session();
    for i in 0..3 {
        session.begin_message(&format!("question {i}")).expect("ready");
        session.apply_fragment("answer ");
        session.apply_fragment(&i.to_string());
        session.complete();
    }
    let turns = session.transcript();
    assert_eq!(turns.len(), 2 + 1 + 2 * 3);
    assert_eq!(turns[3], ChatMessage::user("question 0"));
    assert_eq!(turns[4], ChatMessage::model("answer 0"));
    assert_eq!(turns[8], ChatMessage::model("answer 2"));
}

#[test]
fn test_fragments_grow_placeholder_in_order() {
    let mut session = ready_session();
    session.begin_message("Is my title ok?").expect("ready");
    assert_eq!(session.state(), SessionState::AwaitingResponse);
    assert_eq!(session.transcript().last().map(|t| t.content.as_str()), Some(""));

    for fragment in ["Your ", "title ", "is fine."] {
        session.apply_fragment(fragment);
    }
    assert_eq!(
        session.transcript().last().map(|t| t.content.as_str()),
        Some("Your title is fine.")
    );
    session.complete();
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_failure_replaces_only_last_placeholder() {
    let mut session = ready_session();
    session.begin_message("first").expect("ready");
    session.apply_fragment("first answer");
    session.complete();

    session.begin_message("second").expect("ready");
    session.apply_fragment("partial");
    session.fail(MSG_CHAT_FAILED);

    let turns = session.transcript();
    assert_eq!(turns.len(), 7);
    assert_eq!(turns[4].content, "first answer");
    assert_eq!(turns[5], ChatMessage::user("second"));
    assert_eq!(turns[6].content, MSG_CHAT_FAILED);
    // still usable
    assert_eq!(session.state(), SessionState::Ready);
    session.begin_message("third").expect("session stays ready after a failure");
}

#[test]
fn test_begin_message_rejections() {
    let mut session = ready_session();
    assert_eq!(session.begin_message("   "), Err(ChatError::EmptyMessage));
    session.begin_message("one").expect("ready");
    assert_eq!(session.begin_message("two"), Err(ChatError::Busy));
    session.complete();
    session.close();
    assert_eq!(session.begin_message("three"), Err(ChatError::Closed));
}

#[test]
fn test_close_discards_turns_and_ignores_late_fragments() {
    let mut session = ready_session();
    session.begin_message("q").expect("ready");
    session.close();
    session.apply_fragment("late");
    session.complete();
    assert!(session.transcript().is_empty());
    assert_eq!(session.state(), SessionState::Closed);
}
