//! Rebuilds the vector store from a flat `{"question": "answer"}` JSON file.
//!
//! Usage: `kb-indexer [path/to/knowledge_base.json]`
//!
//! A knowledge base with no usable pairs is rejected and the existing index is
//! left as it was; it is never replaced by an empty collection.

use std::path::PathBuf;
use std::sync::Arc;

use ai_llm_service::{
    LlmServiceProfiles, config_embedding_from_env, config_generation_from_env, telemetry,
};
use anyhow::Context;
use rag_store::{
    IndicatifProgress, LlmEmbedder, RagConfig, open_writer, read_knowledge_base, rebuild_index,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_KB_FILE: &str = "knowledge_base.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter(telemetry::DEFAULT_FILTER))
        .with(telemetry::layer())
        .init();

    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("KB_JSON_FILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KB_FILE));

    let entries = read_knowledge_base(&path)
        .with_context(|| format!("reading knowledge base {}", path.display()))?;
    info!(pairs = entries.len(), path = %path.display(), "knowledge base loaded");

    let cfg = RagConfig::from_env()?;
    let llm = Arc::new(LlmServiceProfiles::new(
        config_generation_from_env()?,
        config_embedding_from_env()?,
        None,
    )?);
    let embedder = LlmEmbedder::new(llm, cfg.embedding_dim);

    let mut writer = open_writer(&cfg)?;
    let progress = IndicatifProgress::bar(entries.len() as u64);
    let report = rebuild_index(&cfg, &entries, &embedder, writer.as_mut(), &progress)
        .await
        .context("index rebuild failed")?;

    println!(
        "Indexed {} Q/A pairs into '{}' (dim {})",
        report.indexed, cfg.collection, report.dim
    );
    println!("Collection count: {}", report.collection_count);
    Ok(())
}
