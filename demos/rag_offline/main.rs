//! # Offline RAG Example
//!
//! Indexes the bundled manual into an `InMemoryVectorStore` with the
//! `HashingEmbedder`, then answers with an echoing mock model so the merged
//! prompt is visible. **Zero API keys.**
//!
//! Run: `cargo run -p ragkit-demos --example rag_offline`

use std::collections::HashMap;
use std::sync::Arc;

use ragkit_model::MockChatModel;
use ragkit_rag::{
    HashingEmbedder, InMemoryVectorStore, Indexer, InvokeOptions, Pipeline, PipelineConfig,
    RetrieveOptions,
};
use tokio_util::sync::CancellationToken;

const DIMENSIONS: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ragkit_demos::init("rag-offline");

    // -- 1. Index the manual ----------------------------------------------
    let embedder = Arc::new(HashingEmbedder::new(DIMENSIONS));
    let store = Arc::new(InMemoryVectorStore::new(DIMENSIONS));
    let count = Indexer::new(embedder.clone(), store.clone())
        .index_file(ragkit_demos::manual_path())
        .await?;
    println!("Indexed {count} chunks\n");

    // -- 2. Build the pipeline --------------------------------------------
    let config = PipelineConfig::builder().embedding_dimension(DIMENSIONS).build()?;
    let pipeline = Pipeline::builder()
        .config(config)
        .embedder(embedder)
        .vector_store(store)
        .chat_model(Arc::new(MockChatModel::echo("echo")))
        .build()?;

    // -- 3. Inspect retrieval ---------------------------------------------
    let question = "What is the customer service contact phone?";
    let hits = pipeline.retriever().retrieve_scored(question, RetrieveOptions::with_top_k(3)).await?;
    println!("Top matches for {question:?}:");
    for hit in &hits {
        println!("  [{}] score={:.3} {:?}", hit.document.id, hit.score, first_line(&hit.document.content));
    }

    // -- 4. Run the pipeline ----------------------------------------------
    let input = HashMap::from([("task".to_string(), question.to_string())]);
    let reply =
        pipeline.invoke(&input, InvokeOptions::with_top_k(3), &CancellationToken::new()).await?;
    println!("\nPrompt the model received:\n{}", reply.content);

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
