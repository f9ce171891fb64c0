//! Console entry point for the lead agent
//!
//! Reads one visitor message per stdin line and prints the agent's replies.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use inmo_agent_agent::LeadAgent;
use inmo_agent_config::{load_settings, DialogueMode, Settings};
use inmo_agent_core::{BotRequest, LanguageModel, SourceType};
use inmo_agent_llm::{OpenAIBackend, OpenAIConfig};
use inmo_agent_persistence::{InMemoryLeadStore, InMemoryPropertyCatalog, InMemorySessionStore};

mod seed;

#[derive(Parser)]
#[command(name = "inmo-agent")]
#[command(about = "Real-estate lead qualification agent (console channel)", long_about = None)]
struct Cli {
    /// Visitor id the conversation runs under
    #[arg(long, default_value = "console-visitor")]
    visitor: String,

    /// Tenant (agency) id
    #[arg(long, default_value = "default")]
    tenant: String,

    /// Channel recorded on created leads
    #[arg(long, default_value = "web_chat", value_parser = parse_source)]
    source: SourceType,
}

fn parse_source(value: &str) -> Result<SourceType, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: env vars > config/{env}.* > config/default.* > defaults
    let env = std::env::var("INMO_AGENT_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);
    tracing::info!(
        environment = ?settings.environment,
        mode = ?settings.agent.mode,
        "Starting inmo-agent v{}",
        env!("CARGO_PKG_VERSION")
    );

    let agent = build_agent(&settings)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let request = BotRequest::new(&cli.visitor, line, &cli.tenant, cli.source);
        let reply = agent.bot_reply(&request).await;
        for message in &reply.messages {
            println!("{}", message);
        }
        if let Some(handoff) = reply.handoff {
            println!("[handoff] {}", handoff.summary);
        }
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}

fn build_agent(settings: &Settings) -> Result<LeadAgent> {
    let catalog = InMemoryPropertyCatalog::new();
    if let Some(ref path) = settings.catalog.seed_path {
        let loaded = seed::seed_catalog(&catalog, &settings.catalog.tenant_id, Path::new(path))?;
        tracing::info!(
            tenant_id = %settings.catalog.tenant_id,
            properties = loaded,
            path = %path,
            "Catalog seeded"
        );
    } else {
        tracing::warn!("No catalog seed configured; searches will return no listings");
    }

    let mut builder = LeadAgent::builder()
        .settings(settings)
        .sessions(Arc::new(InMemorySessionStore::new()))
        .leads(Arc::new(InMemoryLeadStore::new()))
        .catalog(Arc::new(catalog));

    if settings.agent.mode == DialogueMode::Model {
        let backend = OpenAIBackend::new(OpenAIConfig::from(&settings.llm))
            .context("initializing model backend")?;
        tracing::info!(
            model = backend.model_name(),
            endpoint = %settings.llm.endpoint,
            "Model backend ready"
        );
        builder = builder.model(Arc::new(backend));
    }

    builder.build().context("wiring agent")
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("inmo_agent={}", level).into()
    });

    // Replies go to stdout; keep logs on stderr
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
