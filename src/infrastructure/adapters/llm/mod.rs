//! LLM Adapter - OpenAI 兼容协议客户端

mod openai_client;

pub use openai_client::{OpenAiClientConfig, OpenAiCompatibleClient};
