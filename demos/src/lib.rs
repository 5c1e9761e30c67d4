//! Shared setup for the ragkit demo programs.

use std::path::PathBuf;

use ragkit_rag::{OpenAIEmbedder, PineconeVectorStore};

/// Embedding server used when `OPENAI_EMBEDDING_BASE_URL` is unset.
pub const LOCAL_EMBEDDING_URL: &str = "http://localhost:6666";

/// The bundled product manual.
pub fn manual_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("manual.md")
}

/// An embedder pointed at the local embedding server unless overridden.
pub fn embedder(dimensions: usize) -> OpenAIEmbedder {
    let embedder = OpenAIEmbedder::from_env().with_dimensions(dimensions);
    if std::env::var("OPENAI_EMBEDDING_BASE_URL").is_ok() {
        embedder
    } else {
        embedder.with_base_url(LOCAL_EMBEDDING_URL)
    }
}

/// The Pinecone index named by `PINECONE_APIKEY` and `PINECONE_HOST`.
pub fn pinecone(dimensions: usize) -> ragkit_rag::Result<PineconeVectorStore> {
    PineconeVectorStore::from_env(dimensions)
}

/// Load `.env` and install logging.
pub fn init(service: &str) {
    dotenvy::dotenv().ok();
    // A subscriber may already be installed by the host.
    let _ = ragkit_telemetry::init_telemetry(service);
}
