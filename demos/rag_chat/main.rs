//! # RAG Chat Example
//!
//! Answers a customer-service question from knowledge stored in Pinecone.
//! Retrieval and message pass-through run concurrently, the retrieved
//! context is merged into the user turn, and an OpenAI-compatible model
//! writes the answer. Ctrl-C cancels the invocation.
//!
//! Requires `OPENAI_API_KEY` (plus optional `OPENAI_BASE_URL`,
//! `OPENAI_MODEL_NAME`), `PINECONE_APIKEY`, `PINECONE_HOST`, and the local
//! embedding server. Index the manual first with the `rag_index` example.
//!
//! Run: `cargo run -p ragkit-demos --example rag_chat -- "your question"`

use std::collections::HashMap;
use std::sync::Arc;

use ragkit_model::{OpenAIChatModel, OpenAIConfig};
use ragkit_rag::{InvokeOptions, Pipeline, PipelineConfig, TASK_KEY};
use tokio_util::sync::CancellationToken;
use tracing::warn;

const DEFAULT_QUESTION: &str =
    "I need to reach OmniPort Manufacturing's customer service. What is their phone number?";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ragkit_demos::init("rag-chat");

    let question = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_QUESTION.to_string());

    let config = PipelineConfig::from_env()?;
    let model = OpenAIChatModel::new(OpenAIConfig::from_env()?.with_temperature(config.temperature))?;
    let pipeline = Pipeline::builder()
        .embedder(Arc::new(ragkit_demos::embedder(config.embedding_dimension)))
        .vector_store(Arc::new(ragkit_demos::pinecone(config.embedding_dimension)?))
        .chat_model(Arc::new(model))
        .config(config)
        .build()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let input = HashMap::from([(TASK_KEY.to_string(), question)]);
    let reply = pipeline.invoke(&input, InvokeOptions::with_top_k(5), &cancel).await?;

    println!("{}", reply.content);
    Ok(())
}
