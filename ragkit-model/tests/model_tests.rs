use std::sync::Arc;

use ragkit_core::{ChatModel, ChatRequest, GenerationConfig, Message};
use ragkit_model::MockChatModel;

#[tokio::test]
async fn test_mock_model_behind_trait_object() {
    let mock = Arc::new(MockChatModel::new("mock-model").with_text_reply("hello"));
    let model: Arc<dyn ChatModel> = mock.clone();

    let reply = model.generate(ChatRequest::new(vec![Message::user("hi")])).await.unwrap();

    assert_eq!(model.name(), "mock-model");
    assert_eq!(reply.content, "hello");
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_mock_model_records_generation_config() {
    let mock = MockChatModel::echo("echo");
    let request = ChatRequest::new(vec![Message::system("s"), Message::user("q")])
        .with_config(GenerationConfig { temperature: Some(0.7), max_output_tokens: None });

    mock.generate(request).await.unwrap();

    let recorded = mock.last_request().unwrap();
    assert_eq!(recorded.config.and_then(|c| c.temperature), Some(0.7));
}

#[cfg(feature = "openai")]
#[test]
fn test_openai_model_creation() {
    use ragkit_model::{OpenAIChatModel, OpenAIConfig};

    let model = OpenAIChatModel::new(OpenAIConfig::new("test-api-key", "gpt-4o-mini").with_temperature(0.7))
        .unwrap();
    assert_eq!(model.name(), "gpt-4o-mini");
    assert_eq!(model.config().temperature, Some(0.7));
}
