//! RAG chat pipeline orchestrator.
//!
//! The [`Pipeline`] runs a fixed sequence of stages for every invocation:
//!
//! ```text
//! TemplateRender ──► ParallelFanout ──► Merge ──► Generate
//!                     ├─ retrieve: user query → Retriever → knowledge
//!                     └─ pass-through: messages unchanged
//! ```
//!
//! The two fanout branches run as separate tokio tasks and are joined into a
//! typed [`FanoutResult`] before merging. Any branch error aborts the
//! invocation; partial results are never returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit_rag::{InMemoryVectorStore, HashingEmbedder, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .vector_store(Arc::new(store))
//!     .chat_model(Arc::new(model))
//!     .build()?;
//!
//! let input = HashMap::from([("task".to_string(), "What is the phone number?".to_string())]);
//! let reply = pipeline.invoke(&input, InvokeOptions::default(), &CancellationToken::new()).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use ragkit_core::{ChatModel, ChatRequest, GenerationConfig, Message};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::merger::{PromptMerger, user_message_index};
use crate::retriever::{RetrieveOptions, Retriever};
use crate::template::ChatTemplate;
use crate::vectorstore::VectorStore;

/// The input variable holding the user's task.
pub const TASK_KEY: &str = "task";

/// System prompt of the default template.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a customer service agent.";

/// Template variables for one invocation. Must contain [`TASK_KEY`].
pub type PipelineInput = HashMap<String, String>;

/// The stages of a pipeline invocation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    /// Substitute input variables into the chat template.
    TemplateRender,
    /// Retrieve knowledge and pass messages through, concurrently.
    ParallelFanout,
    /// Merge knowledge into the user message.
    Merge,
    /// Call the chat model.
    Generate,
}

impl PipelineStage {
    /// Snake-case stage name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::TemplateRender => "template_render",
            PipelineStage::ParallelFanout => "parallel_fanout",
            PipelineStage::Merge => "merge",
            PipelineStage::Generate => "generate",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The joined output of the fanout stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FanoutResult {
    /// Retrieved document contents joined by newlines.
    pub knowledge: String,
    /// The conversation, unchanged.
    pub messages: Vec<Message>,
}

/// Per-invocation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Options forwarded to the retriever.
    pub retrieve: RetrieveOptions,
}

impl InvokeOptions {
    /// Override the retrieved document count for this invocation.
    pub fn with_top_k(top_k: usize) -> Self {
        Self { retrieve: RetrieveOptions::with_top_k(top_k) }
    }
}

/// The RAG chat pipeline.
///
/// Cheap to share behind an `Arc`; concurrent invocations own their messages
/// and never observe each other. Construct one via [`Pipeline::builder()`].
pub struct Pipeline {
    config: PipelineConfig,
    template: ChatTemplate,
    retriever: Arc<Retriever>,
    merger: PromptMerger,
    chat_model: Arc<dyn ChatModel>,
}

impl Pipeline {
    /// Create a new [`PipelineBuilder`].
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Return a reference to the retriever.
    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// Render the template from `input` and run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first component error unchanged, [`RagError::Cancelled`]
    /// if `cancel` fires, or [`RagError::Timeout`] if a stage exceeds the
    /// configured budget.
    pub async fn invoke(
        &self,
        input: &PipelineInput,
        options: InvokeOptions,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        let invocation_id = Uuid::new_v4();
        self.render_and_run(input, options, cancel)
            .instrument(info_span!("rag_pipeline", %invocation_id))
            .await
    }

    /// Run the pipeline on an already rendered conversation.
    ///
    /// The conversation must start with a System message and contain a User
    /// message; the last User message is the query.
    pub async fn invoke_messages(
        &self,
        messages: Vec<Message>,
        options: InvokeOptions,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        let invocation_id = Uuid::new_v4();
        self.run(messages, options, cancel)
            .instrument(info_span!("rag_pipeline", %invocation_id))
            .await
    }

    async fn render_and_run(
        &self,
        input: &PipelineInput,
        options: InvokeOptions,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        if cancel.is_cancelled() {
            return Err(RagError::Cancelled);
        }
        if !input.contains_key(TASK_KEY) {
            return Err(RagError::Template(format!("input is missing '{TASK_KEY}'")));
        }

        let messages = self.template.render(input)?;
        debug!(
            stage = %PipelineStage::TemplateRender,
            message_count = messages.len(),
            "stage completed"
        );

        self.run(messages, options, cancel).await
    }

    async fn run(
        &self,
        messages: Vec<Message>,
        options: InvokeOptions,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        let started = Instant::now();

        // 1. Fan out: retrieve knowledge while passing messages through
        let fanout = self
            .stage(PipelineStage::ParallelFanout, cancel, self.fanout(messages, options, cancel))
            .await?;
        debug!(
            stage = %PipelineStage::ParallelFanout,
            knowledge_len = fanout.knowledge.len(),
            "stage completed"
        );

        // 2. Merge knowledge into the user message
        let merged = self.merger.merge(fanout.messages, &fanout.knowledge).inspect_err(|e| {
            error!(stage = %PipelineStage::Merge, error = %e, "merge failed");
        })?;

        // 3. Generate
        let request = ChatRequest::new(merged).with_config(GenerationConfig {
            temperature: Some(self.config.temperature),
            ..Default::default()
        });
        let reply = self
            .stage(PipelineStage::Generate, cancel, self.chat_model.generate(request))
            .await?;

        info!(
            model = self.chat_model.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline completed"
        );
        Ok(reply)
    }

    /// Run one stage under the cancellation token and the stage timeout.
    async fn stage<T, F>(&self, stage: PipelineStage, cancel: &CancellationToken, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let limit = self.config.stage_timeout();
        let timed = async {
            match limit {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(RagError::Timeout { stage: stage.as_str(), after: limit }),
                },
                None => fut.await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RagError::Cancelled),
            result = timed => result,
        };

        match &result {
            Err(RagError::Cancelled) => warn!(stage = %stage, "stage cancelled"),
            Err(e) => error!(stage = %stage, error = %e, "stage failed"),
            Ok(_) => {}
        }
        result
    }

    async fn fanout(
        &self,
        messages: Vec<Message>,
        options: InvokeOptions,
        cancel: &CancellationToken,
    ) -> Result<FanoutResult> {
        // Cancels both branches if this future is dropped (timeout or outer cancel).
        let branch_cancel = cancel.child_token();
        let _guard = branch_cancel.clone().drop_guard();

        let retriever = Arc::clone(&self.retriever);
        let rag_messages = messages.clone();
        let rag_cancel = branch_cancel.clone();
        let retrieve = async move {
            tokio::select! {
                biased;
                _ = rag_cancel.cancelled() => Err(RagError::Cancelled),
                result = retrieve_knowledge(&retriever, &rag_messages, options.retrieve) => result,
            }
        };

        let pass_cancel = branch_cancel.clone();
        let pass_through = async move {
            if pass_cancel.is_cancelled() {
                return Err(RagError::Cancelled);
            }
            Ok(messages)
        };

        // Spawned tasks start with no span; keep them inside the invocation.
        let rag_branch: JoinHandle<Result<String>> = tokio::spawn(retrieve.in_current_span());
        let pass_branch: JoinHandle<Result<Vec<Message>>> =
            tokio::spawn(pass_through.in_current_span());

        let (knowledge, messages) =
            tokio::try_join!(join_branch("retrieve", rag_branch), join_branch("pass_through", pass_branch))?;

        Ok(FanoutResult { knowledge, messages })
    }
}

/// Extract the user query, retrieve documents, and join their contents.
async fn retrieve_knowledge(
    retriever: &Retriever,
    messages: &[Message],
    options: RetrieveOptions,
) -> Result<String> {
    let index = user_message_index(messages)?;
    let documents = retriever.retrieve(&messages[index].content, options).await?;
    Ok(documents.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join("\n"))
}

async fn join_branch<T>(name: &'static str, handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await.map_err(|e| RagError::Pipeline(format!("{name} branch failed: {e}")))?
}

/// Builder for constructing a [`Pipeline`].
///
/// `config`, `embedder`, `vector_store`, and `chat_model` are required; the
/// template defaults to a customer-service system prompt followed by `{task}`.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .embedder(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .chat_model(Arc::new(model))
///     .template(ChatTemplate::new().system("You are terse.").user("{task}"))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chat_model: Option<Arc<dyn ChatModel>>,
    template: Option<ChatTemplate>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the chat model used in the generate stage.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Replace the default chat template.
    pub fn template(mut self, template: ChatTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Build the [`Pipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or the
    /// config is invalid, and [`RagError::DimensionMismatch`] if the embedder
    /// or store dimension differs from `embedding_dimension`.
    pub fn build(self) -> Result<Pipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        config.validate()?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let chat_model =
            self.chat_model.ok_or_else(|| RagError::Config("chat_model is required".to_string()))?;

        for actual in [embedder.dimensions(), vector_store.dimensions()] {
            if actual != config.embedding_dimension {
                return Err(RagError::DimensionMismatch {
                    expected: config.embedding_dimension,
                    actual,
                });
            }
        }

        let template = self
            .template
            .unwrap_or_else(|| ChatTemplate::new().system(DEFAULT_SYSTEM_PROMPT).user("{task}"));
        let retriever = Retriever::new(embedder, vector_store).with_default_top_k(config.top_k);

        Ok(Pipeline {
            config,
            template,
            retriever: Arc::new(retriever),
            merger: PromptMerger::new(),
            chat_model,
        })
    }
}
