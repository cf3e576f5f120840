//! Policy RAG server binary
//!
//! Run with: cargo run -p policy-rag --bin policy-rag-server

use policy_rag::{
    config::{RagConfig, CONFIG_PATH_ENV},
    server::RagServer,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                       Policy RAG                          ║
║         Ask questions about your insurance policy         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Provider: {}", config.provider.base_url);
    tracing::info!("  - Embedding model: {}", config.provider.embed_model);
    tracing::info!("  - Default chat model: {}", config.provider.default_chat_model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Default top-k: {}", config.retrieval.default_top_k);

    // Create and start server
    let server = RagServer::from_config(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload - Upload a policy document");
    println!("  POST /api/query  - Ask a question (streamed)");
    println!("  POST /api/chat   - Chat without retrieval (streamed)");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
