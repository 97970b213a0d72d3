//! Provider 流式中继模块
//!
//! 把不同 LLM Provider 的流式 chat-completion 协议（OpenAI 兼容的
//! `delta.content`/`delta.reasoning_content`、Anthropic 兼容的
//! `content_block_delta`）归一化为与 Provider 无关的下游 SSE 协议，
//! 并用 `<think>…</think>` 标记区分模型的思考内容与正文。

pub mod adapter;
pub mod events;
pub mod relay;

pub use adapter::{ProviderConfig, ProviderKind, ReasoningState};
pub use events::NormalizedEvent;
pub use relay::relay_stream;
