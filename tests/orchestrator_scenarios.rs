//! End-to-end routing scenarios driven through the conversation orchestrator.
//!
//! Every scenario runs against in-memory adapters with the keyword
//! classifier, so the routing outcome depends only on the message text.

use std::sync::Arc;

use futures::future::join_all;

use agent_handoff::adapters::ai::{KeywordIntentClassifier, RuleBasedContentAgent, TranscriptSummarizer};
use agent_handoff::adapters::channel::InMemoryTransport;
use agent_handoff::adapters::customers::InMemoryCustomerDirectory;
use agent_handoff::adapters::storage::{InMemoryConversationStore, InMemoryEscalationRepository};
use agent_handoff::application::{
    ContentAgents, ConversationOrchestrator, EscalationLedger, EscalationRequest, OrchestratorConfig,
    OrchestratorError,
};
use agent_handoff::domain::conversation::{AgentRole, DispatchState, MediaKind, MessageRole};
use agent_handoff::domain::customer::CustomerProfile;
use agent_handoff::domain::escalation::{EscalationStatus, TranscriptEntry, CUSTOMER_DISCONNECTED_NOTICE};
use agent_handoff::domain::foundation::{ThreadId, UserId};
use agent_handoff::domain::routing::replies::{
    DISCONNECT_CONFIRMED, DISCONNECT_PROMPT, HIGH_TRAFFIC, NO_ACTIVE_SESSION, SESSION_ENDED,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

const PHONE: &str = "+15550001234";

struct Harness {
    orchestrator: Arc<ConversationOrchestrator>,
    ledger: Arc<EscalationLedger>,
    transport: InMemoryTransport,
    customers: InMemoryCustomerDirectory,
}

fn harness() -> Harness {
    let transport = InMemoryTransport::new();
    let customers = InMemoryCustomerDirectory::new();
    let ledger = Arc::new(EscalationLedger::new(
        Arc::new(InMemoryEscalationRepository::new()),
        Arc::new(transport.clone()),
    ));
    let orchestrator = ConversationOrchestrator::new(
        Arc::new(InMemoryConversationStore::new()),
        Arc::new(KeywordIntentClassifier::new()),
        ContentAgents::new(Arc::new(RuleBasedContentAgent::new())),
        Arc::new(TranscriptSummarizer),
        Arc::new(customers.clone()),
        ledger.clone(),
    )
    .with_config(OrchestratorConfig {
        thread_link_base: Some("https://chat.example.com".to_string()),
        channel_identity: Some("8:acs:bot".to_string()),
        ..Default::default()
    });

    Harness {
        orchestrator: Arc::new(orchestrator),
        ledger,
        transport,
        customers,
    }
}

fn user() -> UserId {
    UserId::new(PHONE).unwrap()
}

fn jane() -> CustomerProfile {
    CustomerProfile {
        customer_id: "CUST-001".to_string(),
        phone_number: PHONE.to_string(),
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        policy_numbers: vec!["POL-1001".to_string()],
        customer_type: "standard".to_string(),
        preferred_language: "en".to_string(),
        relationship_manager: String::new(),
        last_contact: String::new(),
        notes: String::new(),
    }
}

async fn escalate(h: &Harness) -> ThreadId {
    let outcome = h.orchestrator.handle(&user(), "I need to speak to agent").await.unwrap();
    outcome.escalation_thread_id.expect("escalation opened")
}

// =============================================================================
// Full hand-off lifecycle
// =============================================================================

#[tokio::test]
async fn escalate_converse_and_disconnect() {
    let h = harness();
    h.customers.insert(jane()).await;

    // Escalation hands the conversation to the contact center.
    let outcome = h.orchestrator.handle(&user(), "I need to speak to agent").await.unwrap();
    assert_eq!(outcome.agent, AgentRole::HumanChannel);
    assert_eq!(outcome.dispatch, DispatchState::HumanOwned);
    let thread_id = outcome.escalation_thread_id.clone().unwrap();
    let handoff = outcome.response.clone().unwrap();
    assert!(handoff.starts_with("I'll connect you with our Contact Center Agent"));
    assert!(handoff.contains(&format!("https://chat.example.com?threadId={}", thread_id)));
    assert_eq!(
        outcome.display_text().unwrap(),
        format!("[Contact Center] {}", handoff)
    );

    let thread = h.transport.thread(&thread_id).await.unwrap();
    assert_eq!(thread.topic, "Escalated Chat - Customer Jane Doe - +1555000****");
    assert_eq!(thread.posts[0].sender_label, "Jane Doe");
    assert_eq!(thread.posts[0].text, "I need to speak to agent");

    // While a person owns the reply, ordinary messages pass through silently.
    let outcome = h.orchestrator.handle(&user(), "my claim was denied").await.unwrap();
    assert!(outcome.response.is_none());
    assert_eq!(outcome.dispatch, DispatchState::HumanOwned);

    // Escalation intents are not considered while human-owned.
    let outcome = h.orchestrator.handle(&user(), "speak to agent").await.unwrap();
    assert!(outcome.response.is_none());
    assert_eq!(h.transport.threads_created().await, 1);

    // "bye" asks for confirmation without leaving.
    let outcome = h.orchestrator.handle(&user(), "bye").await.unwrap();
    assert_eq!(outcome.response.as_deref(), Some(DISCONNECT_PROMPT));
    assert_eq!(outcome.agent, AgentRole::HumanChannel);

    // Confirmation ends the hand-off.
    let outcome = h.orchestrator.handle(&user(), "no thanks").await.unwrap();
    assert_eq!(outcome.response.as_deref(), Some(DISCONNECT_CONFIRMED));
    assert_eq!(outcome.agent, AgentRole::CustomerAgent);
    assert_eq!(outcome.dispatch, DispatchState::Automated);
    assert!(outcome.escalation_thread_id.is_none());

    let record = h.orchestrator.get_escalation(&thread_id).await.unwrap().unwrap();
    assert_eq!(record.status(), EscalationStatus::Disconnected);
    assert_eq!(
        record.messages().last().map(|m| m.text.as_str()),
        Some(CUSTOMER_DISCONNECTED_NOTICE)
    );

    let texts: Vec<String> = h
        .transport
        .thread(&thread_id)
        .await
        .unwrap()
        .posts
        .into_iter()
        .map(|p| p.text)
        .collect();
    assert!(texts.contains(&"my claim was denied".to_string()));
    assert!(texts.contains(&DISCONNECT_PROMPT.to_string()));
    assert_eq!(texts.last().map(String::as_str), Some(CUSTOMER_DISCONNECTED_NOTICE));
}

#[tokio::test]
async fn confirming_without_a_session_reports_no_active_session() {
    let h = harness();

    let outcome = h.orchestrator.handle(&user(), "no thanks").await.unwrap();
    assert_eq!(outcome.response.as_deref(), Some(NO_ACTIVE_SESSION));
    assert_eq!(outcome.agent, AgentRole::CustomerAgent);
    assert_eq!(h.transport.threads_created().await, 0);
}

#[tokio::test]
async fn relationship_manager_request_uses_vip_handoff() {
    let h = harness();

    let outcome = h
        .orchestrator
        .handle(&user(), "I'd like a portfolio review")
        .await
        .unwrap();

    assert_eq!(outcome.agent, AgentRole::RelationshipManager);
    assert_eq!(outcome.dispatch, DispatchState::HumanOwned);
    assert!(outcome.response.unwrap().starts_with("As a VIP customer"));
}

#[tokio::test]
async fn unknown_customer_is_named_customer_on_the_thread() {
    let h = harness();

    let thread_id = escalate(&h).await;

    let thread = h.transport.thread(&thread_id).await.unwrap();
    assert!(thread.topic.starts_with("Escalated Chat - Customer Customer - "));
    assert_eq!(thread.posts[0].sender_label, "Customer");
}

// =============================================================================
// Single active escalation per customer
// =============================================================================

#[tokio::test]
async fn concurrent_escalations_open_one_thread() {
    let h = harness();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let ledger = h.ledger.clone();
        tasks.push(tokio::spawn(async move {
            ledger
                .create_or_reuse(EscalationRequest {
                    customer_id: user(),
                    customer_display_name: "Jane Doe".to_string(),
                    recent_messages: vec![TranscriptEntry::customer(format!("message {}", i))],
                })
                .await
        }));
    }

    let mut thread_ids = Vec::new();
    for task in tasks {
        thread_ids.push(task.await.unwrap().unwrap().thread_id().clone());
    }

    assert_eq!(h.transport.threads_created().await, 1);
    assert!(thread_ids.iter().all(|id| id == &thread_ids[0]));
}

#[tokio::test]
async fn concurrent_turns_for_one_user_escalate_once() {
    let h = harness();

    let user_id = user();
    let turns = (0..4).map(|_| h.orchestrator.handle(&user_id, "talk to human"));
    for outcome in join_all(turns).await {
        outcome.unwrap();
    }

    assert_eq!(h.transport.threads_created().await, 1);
    let conversation = h.orchestrator.get_conversation(&user()).await.unwrap().unwrap();
    assert_eq!(conversation.dispatch(), DispatchState::HumanOwned);
}

#[tokio::test]
async fn active_escalation_is_reused_and_resynced() {
    let h = harness();
    let existing = h
        .ledger
        .create_or_reuse(EscalationRequest {
            customer_id: user(),
            customer_display_name: "Customer".to_string(),
            recent_messages: vec![TranscriptEntry::customer("earlier session")],
        })
        .await
        .unwrap();

    let thread_id = escalate(&h).await;

    assert_eq!(&thread_id, existing.thread_id());
    assert_eq!(h.transport.threads_created().await, 1);

    let record = h.orchestrator.get_escalation(&thread_id).await.unwrap().unwrap();
    let texts: Vec<&str> = record.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts[0], "I need to speak to agent");
    assert!(!texts.contains(&"earlier session"));
}

// =============================================================================
// Operator-side and administrative operations
// =============================================================================

#[tokio::test]
async fn disconnect_by_thread_is_idempotent() {
    let h = harness();
    let thread_id = escalate(&h).await;

    let first = h.orchestrator.disconnect_by_thread(&thread_id).await.unwrap();
    let second = h.orchestrator.disconnect_by_thread(&thread_id).await.unwrap();

    assert_eq!(first.status(), EscalationStatus::Disconnected);
    assert_eq!(second.status(), EscalationStatus::Disconnected);
    assert_eq!(first.messages().len(), second.messages().len());

    let notices = h
        .transport
        .thread(&thread_id)
        .await
        .unwrap()
        .posts
        .iter()
        .filter(|p| p.text == CUSTOMER_DISCONNECTED_NOTICE)
        .count();
    assert_eq!(notices, 1);

    let conversation = h.orchestrator.get_conversation(&user()).await.unwrap().unwrap();
    assert_eq!(conversation.current_agent(), AgentRole::CustomerAgent);
    assert!(conversation.escalation_thread_id().is_none());
}

#[tokio::test]
async fn disconnect_of_unknown_thread_is_not_found() {
    let h = harness();
    let missing = ThreadId::new("19:missing@thread.v2").unwrap();

    let result = h.orchestrator.disconnect_by_thread(&missing).await;

    assert!(matches!(result, Err(OrchestratorError::EscalationNotFound(_))));
}

#[tokio::test]
async fn close_then_purge_removes_thread_and_record() {
    let h = harness();
    let thread_id = escalate(&h).await;

    let record = h.orchestrator.close_escalation(&thread_id).await.unwrap();
    assert_eq!(record.status(), EscalationStatus::Closed);

    assert_eq!(h.orchestrator.purge_inactive().await.unwrap(), 1);
    assert!(h.orchestrator.get_escalation(&thread_id).await.unwrap().is_none());
    assert!(h.transport.thread(&thread_id).await.unwrap().deleted);

    // The customer can escalate again afterwards.
    let again = escalate(&h).await;
    assert_ne!(again, thread_id);
}

#[tokio::test]
async fn session_closed_out_of_band_returns_to_customer_agent() {
    let h = harness();
    let thread_id = escalate(&h).await;

    // Closed directly on the ledger; the conversation still points at it.
    h.ledger.close(&thread_id).await.unwrap();

    let outcome = h.orchestrator.handle(&user(), "are you still there?").await.unwrap();
    assert_eq!(outcome.response.as_deref(), Some(SESSION_ENDED));
    assert_eq!(outcome.agent, AgentRole::CustomerAgent);
    assert_eq!(outcome.dispatch, DispatchState::Automated);
}

#[tokio::test]
async fn operator_messages_are_relayed_to_the_customer() {
    let h = harness();
    let thread_id = escalate(&h).await;

    let relayed = h
        .orchestrator
        .relay_operator_message(&thread_id, Some("8:acs:operator-7"), "[Claims Desk - Dana]", "Hi Jane")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(relayed.customer_id, user());
    assert_eq!(relayed.text, "[Contact Center Agent] Dana: Hi Jane");

    let own = h
        .orchestrator
        .relay_operator_message(&thread_id, Some("8:acs:bot"), "Bot", "echo")
        .await
        .unwrap();
    assert!(own.is_none());

    let conversation = h.orchestrator.get_conversation(&user()).await.unwrap().unwrap();
    assert_eq!(
        conversation.messages().last().map(|m| m.text()),
        Some("[Contact Center Agent] Dana: Hi Jane")
    );
}

// =============================================================================
// Channel overload
// =============================================================================

#[tokio::test]
async fn rate_limited_escalation_stays_automated_and_can_retry() {
    let h = harness();
    h.transport.rate_limit_next().await;

    let outcome = h.orchestrator.handle(&user(), "I need to speak to agent").await.unwrap();
    assert_eq!(outcome.response.as_deref(), Some(HIGH_TRAFFIC));
    assert_eq!(outcome.dispatch, DispatchState::Automated);
    assert!(outcome.escalation_thread_id.is_none());
    assert_eq!(h.transport.threads_created().await, 0);

    let thread_id = escalate(&h).await;
    assert_eq!(h.transport.threads_created().await, 1);
    assert!(h.orchestrator.get_escalation(&thread_id).await.unwrap().is_some());
}

#[tokio::test]
async fn rate_limited_forward_keeps_the_session() {
    let h = harness();
    let thread_id = escalate(&h).await;
    h.transport.rate_limit_next().await;

    let outcome = h.orchestrator.handle(&user(), "hello?").await.unwrap();
    assert_eq!(outcome.response.as_deref(), Some(HIGH_TRAFFIC));
    assert_eq!(outcome.dispatch, DispatchState::HumanOwned);
    assert_eq!(outcome.escalation_thread_id, Some(thread_id.clone()));

    let record = h.orchestrator.get_escalation(&thread_id).await.unwrap().unwrap();
    assert!(record.is_active());
}

#[tokio::test]
async fn confirmed_disconnect_applies_while_channel_is_rate_limited() {
    let h = harness();
    let thread_id = escalate(&h).await;
    let prompt = h.orchestrator.handle(&user(), "bye").await.unwrap();
    assert_eq!(prompt.response.as_deref(), Some(DISCONNECT_PROMPT));

    h.transport.rate_limit_next().await;
    let outcome = h.orchestrator.handle(&user(), "no thanks").await.unwrap();

    assert_eq!(outcome.response.as_deref(), Some(DISCONNECT_CONFIRMED));
    assert_eq!(outcome.agent, AgentRole::CustomerAgent);
    assert_eq!(outcome.dispatch, DispatchState::Automated);
    assert!(outcome.escalation_thread_id.is_none());
    let record = h.orchestrator.get_escalation(&thread_id).await.unwrap().unwrap();
    assert_eq!(record.status(), EscalationStatus::Disconnected);
}

#[tokio::test]
async fn rate_limited_disconnect_prompt_reports_high_traffic() {
    let h = harness();
    let thread_id = escalate(&h).await;
    h.transport.rate_limit_next().await;

    let outcome = h.orchestrator.handle(&user(), "bye").await.unwrap();

    assert_eq!(outcome.response.as_deref(), Some(HIGH_TRAFFIC));
    assert_eq!(outcome.dispatch, DispatchState::HumanOwned);
    assert!(h.orchestrator.get_escalation(&thread_id).await.unwrap().unwrap().is_active());
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn history_records_every_turn_in_order() {
    let h = harness();
    let mut expected: Vec<(MessageRole, Option<AgentRole>, String)> = Vec::new();

    let greeting = h.orchestrator.handle(&user(), "hello").await.unwrap();
    expected.push((MessageRole::User, None, "hello".to_string()));
    expected.push((
        MessageRole::Agent,
        Some(AgentRole::CustomerAgent),
        greeting.response.unwrap(),
    ));

    let handoff = h.orchestrator.handle(&user(), "I need to speak to agent").await.unwrap();
    expected.push((MessageRole::User, None, "I need to speak to agent".to_string()));
    expected.push((MessageRole::Agent, Some(handoff.agent), handoff.response.unwrap()));

    let silent = h.orchestrator.handle(&user(), "is my claim approved yet").await.unwrap();
    assert!(silent.response.is_none());
    expected.push((MessageRole::User, None, "is my claim approved yet".to_string()));

    h.orchestrator.handle(&user(), "bye").await.unwrap();
    expected.push((MessageRole::User, None, "bye".to_string()));
    expected.push((
        MessageRole::Agent,
        Some(AgentRole::HumanChannel),
        DISCONNECT_PROMPT.to_string(),
    ));

    h.orchestrator.handle(&user(), "no thanks").await.unwrap();
    expected.push((MessageRole::User, None, "no thanks".to_string()));
    expected.push((
        MessageRole::Agent,
        Some(AgentRole::CustomerAgent),
        DISCONNECT_CONFIRMED.to_string(),
    ));

    let conversation = h.orchestrator.get_conversation(&user()).await.unwrap().unwrap();
    let actual: Vec<(MessageRole, Option<AgentRole>, String)> = conversation
        .messages()
        .iter()
        .map(|m| (m.role(), m.agent_role(), m.text().to_string()))
        .collect();
    assert_eq!(actual, expected);
}

// =============================================================================
// Media
// =============================================================================

#[tokio::test]
async fn media_escalates_an_automated_conversation() {
    let h = harness();

    let outcome = h
        .orchestrator
        .handle_media(&user(), MediaKind::Image, "media-123")
        .await
        .unwrap();

    assert_eq!(outcome.agent, AgentRole::HumanChannel);
    assert_eq!(h.transport.threads_created().await, 1);
    let conversation = h.orchestrator.get_conversation(&user()).await.unwrap().unwrap();
    assert_eq!(conversation.messages()[0].text(), "[Sent image]");
}

#[tokio::test]
async fn media_is_forwarded_while_human_owned() {
    let h = harness();
    let thread_id = escalate(&h).await;

    let outcome = h
        .orchestrator
        .handle_media(&user(), MediaKind::Document, "doc-9")
        .await
        .unwrap();

    assert_eq!(
        outcome.response.as_deref(),
        Some("I've received your document. A human agent will review it shortly.")
    );
    assert_eq!(h.transport.threads_created().await, 1);
    let posts = h.transport.thread(&thread_id).await.unwrap().posts;
    assert!(posts.iter().any(|p| p.text == "[Received document: doc-9]"));
}

// =============================================================================
// Automated answers
// =============================================================================

#[tokio::test]
async fn greeting_is_answered_by_content_agent() {
    let h = harness();
    h.customers.insert(jane()).await;

    let outcome = h.orchestrator.handle(&user(), "hello").await.unwrap();

    assert_eq!(outcome.response.as_deref(), Some("Hello Jane Doe! How can I help you today?"));
    assert_eq!(outcome.dispatch, DispatchState::Automated);
    assert_eq!(h.transport.threads_created().await, 0);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let h = harness();

    let result = h.orchestrator.handle(&user(), "   ").await;

    assert!(matches!(result, Err(OrchestratorError::Validation(_))));
    assert!(h.orchestrator.get_conversation(&user()).await.unwrap().is_none());
}
