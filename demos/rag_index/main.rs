//! # RAG Index Example
//!
//! Splits a markdown file on its headers, embeds every chunk with the local
//! embedding server and upserts the vectors into Pinecone.
//!
//! Requires `PINECONE_APIKEY`, `PINECONE_HOST` and an OpenAI-compatible
//! embeddings endpoint (`OPENAI_EMBEDDING_BASE_URL`, default `http://localhost:6666`).
//!
//! Run: `cargo run -p ragkit-demos --example rag_index -- [file.md] [start_id]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ragkit_rag::{Indexer, PipelineConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ragkit_demos::init("rag-index");

    let mut args = std::env::args().skip(1);
    let path = args.next().map(PathBuf::from).unwrap_or_else(ragkit_demos::manual_path);
    let start_id: usize = match args.next() {
        Some(raw) => raw.parse::<usize>().with_context(|| format!("start_id must be a number, got {raw:?}"))?,
        None => 0,
    };

    let config = PipelineConfig::from_env()?;
    let embedder = Arc::new(ragkit_demos::embedder(config.embedding_dimension));
    let store = Arc::new(ragkit_demos::pinecone(config.embedding_dimension)?);

    info!(path = %path.display(), start_id, "indexing");
    let count = Indexer::new(embedder, store)
        .with_start_id(start_id)
        .index_file(&path)
        .await
        .with_context(|| format!("failed to index {}", path.display()))?;

    println!("Successfully upserted {count} vector(s)!");
    Ok(())
}
