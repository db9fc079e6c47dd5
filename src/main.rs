//! Agent Handoff server entry point
//!
//! Loads configuration, initialises tracing, wires adapters into the
//! conversation orchestrator and serves the HTTP API until ctrl-c.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use agent_handoff::adapters::ai::{
    KeywordIntentClassifier, LlmContentAgent, LlmIntentClassifier, LlmSummarizer, OpenAIConfig, OpenAIProvider,
    RuleBasedContentAgent, TranscriptSummarizer,
};
use agent_handoff::adapters::channel::{ChatTransportConfig, HttpChatTransport, InMemoryTransport};
use agent_handoff::adapters::customers::{InMemoryCustomerDirectory, JsonCustomerDirectory};
use agent_handoff::adapters::http::{api_router, AppState};
use agent_handoff::adapters::storage::{FileEscalationRepository, InMemoryConversationStore};
use agent_handoff::application::{ContentAgents, ConversationOrchestrator, EscalationLedger, OrchestratorConfig};
use agent_handoff::config::AppConfig;
use agent_handoff::ports::{
    AIProvider, ChannelTransport, ContentAgent, ConversationSummarizer, CustomerDirectory, IntentClassifier,
};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let orchestrator = Arc::new(build_orchestrator(&config).await?);
    let app = api_router(AppState::new(orchestrator), config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "Starting agent hand-off server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_orchestrator(config: &AppConfig) -> Result<ConversationOrchestrator, BoxError> {
    let (classifier, summarizer, content_agent) = build_ai(config)?;

    let transport: Arc<dyn ChannelTransport> = match (
        config.channel.endpoint.as_deref(),
        config.channel.identity.as_deref(),
        config.channel.access_key.as_deref(),
    ) {
        (Some(endpoint), Some(identity), Some(access_key)) if config.channel.is_configured() => {
            let transport_config = ChatTransportConfig::new(endpoint, identity, access_key)
                .with_api_version(config.channel.api_version.clone())
                .with_token_lifetime(config.channel.token_lifetime())
                .with_timeout(config.channel.timeout());
            Arc::new(HttpChatTransport::new(transport_config)?)
        }
        _ => {
            tracing::warn!("Channel not configured, hand-off threads are kept in memory");
            Arc::new(InMemoryTransport::new())
        }
    };

    let customers: Arc<dyn CustomerDirectory> = match JsonCustomerDirectory::load(&config.customers.directory_path).await {
        Ok(directory) => Arc::new(directory),
        Err(e) => {
            tracing::warn!(error = %e, "Customer directory unavailable, continuing without customer data");
            Arc::new(InMemoryCustomerDirectory::new())
        }
    };

    let repository = Arc::new(FileEscalationRepository::new(&config.ledger.data_dir));
    let ledger = Arc::new(EscalationLedger::new(repository, transport).with_seed_window(config.ledger.seed_window));

    let orchestrator = ConversationOrchestrator::new(
        Arc::new(InMemoryConversationStore::new()),
        classifier,
        ContentAgents::new(content_agent),
        summarizer,
        customers,
        ledger,
    )
    .with_config(OrchestratorConfig {
        context_window: config.ledger.context_window,
        summary_window: config.ledger.seed_window,
        thread_link_base: config.channel.thread_link_base.clone(),
        channel_identity: config.channel.identity.clone(),
    });

    Ok(orchestrator)
}

type AiAdapters = (
    Arc<dyn IntentClassifier>,
    Arc<dyn ConversationSummarizer>,
    Arc<dyn ContentAgent>,
);

fn build_ai(config: &AppConfig) -> Result<AiAdapters, BoxError> {
    let api_key = match config.ai.api_key.as_deref() {
        Some(key) if config.ai.is_configured() => key,
        _ => {
            tracing::warn!("AI provider not configured, using keyword classification and canned replies");
            return Ok((
                Arc::new(KeywordIntentClassifier::new()),
                Arc::new(TranscriptSummarizer),
                Arc::new(RuleBasedContentAgent::new()),
            ));
        }
    };

    let mut provider_config = OpenAIConfig::new(api_key)
        .with_model(config.ai.model.clone())
        .with_base_url(config.ai.base_url.clone())
        .with_timeout(config.ai.timeout());
    if let Some(version) = config.ai.azure_api_version.as_deref() {
        provider_config = provider_config.with_azure(version);
    }
    let provider: Arc<dyn AIProvider> = Arc::new(OpenAIProvider::new(provider_config)?);
    tracing::info!(model = %config.ai.model, "AI provider configured");

    Ok((
        Arc::new(LlmIntentClassifier::new(provider.clone())),
        Arc::new(LlmSummarizer::new(provider.clone())),
        Arc::new(LlmContentAgent::new(provider)),
    ))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
