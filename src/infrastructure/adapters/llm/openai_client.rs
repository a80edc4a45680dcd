//! OpenAI Compatible Client - 调用 OpenAI 协议的大模型服务
//!
//! 实现 GenerationBackendPort 与 EmbeddingPort，基于 async-openai。
//! 凭据（base_url / api_key / model）按请求传入，每次调用构造一个轻量 Client。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    CreateChatCompletionStreamResponse,
};
use async_openai::types::embeddings::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use futures_util::StreamExt;

use crate::application::ports::{
    EmbeddingPort, GenerationBackendPort, LlmError, ModelCredential, StreamSink,
};

/// 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    /// 阻塞式请求超时（秒）
    pub timeout_secs: u64,
    /// 流式请求超时（秒），覆盖整个流的读取
    pub stream_timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OpenAiClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            stream_timeout_secs: 600,
            temperature: 0.7,
            max_tokens: 8192,
        }
    }
}

/// OpenAI 兼容客户端
pub struct OpenAiCompatibleClient {
    config: OpenAiClientConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: OpenAiClientConfig) -> Self {
        Self { config }
    }

    fn client_for(model: &ModelCredential) -> Client<OpenAIConfig> {
        Client::with_config(api_config(model))
    }

    // 兼容服务普遍只认 max_tokens
    #[allow(deprecated)]
    fn chat_request(
        &self,
        model: &ModelCredential,
        prompt: &str,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()];

        CreateChatCompletionRequestArgs::default()
            .model(model.model_name.as_str())
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build()
    }

    /// 读取流，逐段回调 `on_delta`，返回完整文本
    async fn stream_text(
        &self,
        model: &ModelCredential,
        prompt: &str,
        sink: &dyn StreamSink,
    ) -> Result<String, LlmError> {
        let request = self.chat_request(model, prompt).map_err(map_openai_error)?;
        let client = Self::client_for(model);
        let mut stream = client
            .chat()
            .create_stream(request)
            .await
            .map_err(map_openai_error)?;

        let mut full_text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_openai_error)?;
            if let Some(delta) = delta_text(chunk) {
                full_text.push_str(&delta);
                sink.on_delta(&delta).await;
            }
        }
        Ok(full_text)
    }
}

fn api_config(model: &ModelCredential) -> OpenAIConfig {
    OpenAIConfig::new()
        .with_api_base(model.base_url.trim_end_matches('/'))
        .with_api_key(model.api_key.as_str())
}

/// 流式分片的文本增量，空增量（例如仅含 role 的首帧）返回 None
fn delta_text(chunk: CreateChatCompletionStreamResponse) -> Option<String> {
    let content: String = chunk
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();
    (!content.is_empty()).then_some(content)
}

async fn within<T, F>(limit: Duration, fut: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| LlmError::Timeout)?
}

fn map_openai_error(e: OpenAIError) -> LlmError {
    match e {
        OpenAIError::Reqwest(e) if e.is_timeout() => LlmError::Timeout,
        OpenAIError::Reqwest(e) => LlmError::Network(e.to_string()),
        OpenAIError::ApiError(e) => LlmError::Service(e.to_string()),
        e @ OpenAIError::JSONDeserialize(..) => LlmError::InvalidResponse(e.to_string()),
        other => LlmError::Service(other.to_string()),
    }
}

#[async_trait]
impl GenerationBackendPort for OpenAiCompatibleClient {
    async fn complete(&self, model: &ModelCredential, prompt: &str) -> Result<String, LlmError> {
        let request = self.chat_request(model, prompt).map_err(map_openai_error)?;
        let client = Self::client_for(model);
        tracing::debug!(base_url = %model.base_url, model = %model.model_name, "Sending completion request");

        let response = within(Duration::from_secs(self.config.timeout_secs), async {
            client.chat().create(request).await.map_err(map_openai_error)
        })
        .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Empty choices".to_string()))?;

        tracing::info!(
            model = %model.model_name,
            prompt_len = prompt.chars().count(),
            output_len = text.chars().count(),
            "Model completion finished"
        );
        Ok(text)
    }

    async fn stream(&self, model: &ModelCredential, prompt: &str, sink: Arc<dyn StreamSink>) {
        let limit = Duration::from_secs(self.config.stream_timeout_secs);
        match within(limit, self.stream_text(model, prompt, sink.as_ref())).await {
            Ok(full_text) => sink.on_complete(full_text).await,
            Err(e) => {
                tracing::error!(model = %model.model_name, error = %e, "Model stream failed");
                sink.on_error(e).await
            }
        }
    }
}

#[async_trait]
impl EmbeddingPort for OpenAiCompatibleClient {
    async fn embed(&self, model: &ModelCredential, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(model.model_name.as_str())
            .input(text)
            .build()
            .map_err(map_openai_error)?;
        let client = Self::client_for(model);

        let response = within(Duration::from_secs(self.config.timeout_secs), async {
            client.embeddings().create(request).await.map_err(map_openai_error)
        })
        .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| LlmError::InvalidResponse("Empty embedding data".to_string()))
    }
}
