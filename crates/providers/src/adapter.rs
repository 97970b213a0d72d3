//! Provider 协议适配
//!
//! 两种上游线格式，由 `ProviderKind` 选择：
//!
//! | | OpenAI 兼容 | Anthropic 兼容 |
//! |---|---|---|
//! | Endpoint | `POST {baseUrl}/chat/completions` | `POST {baseUrl}/messages` |
//! | 认证头 | `Authorization: Bearer {key}` | `x-api-key` + `anthropic-version` |
//! | delta | `choices[0].delta.{content, reasoning_content}` | `content_block_delta` 的 `delta.text` |
//! | 终止 | `data: [DONE]` 行 | 连接关闭 |
//!
//! 共享的行缓冲与标记注入逻辑在 `relay` 模块；这里只负责请求构造和
//! 单条 delta 的文本提取。

use serde_json::Value;
use std::time::Duration;

/// 上游协议类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAiCompatible,
    AnthropicCompatible,
}

impl ProviderKind {
    /// 按配置的 provider 名称判定协议类型
    ///
    /// `anthropic` / `antigravity` 走 Anthropic 线格式，其余
    /// （deepseek、openai、自建网关等）一律按 OpenAI 兼容处理。
    pub fn from_provider_name(name: &str) -> Self {
        match name {
            "anthropic" | "antigravity" => Self::AnthropicCompatible,
            _ => Self::OpenAiCompatible,
        }
    }
}

/// 单次中继所需的 Provider 配置，调用期间不可变
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// 相邻上游 chunk 之间的空闲超时；`None` 表示不限（默认）
    pub idle_timeout: Option<Duration>,
}

impl ProviderConfig {
    /// 上游 endpoint（容忍 baseUrl 的尾部斜杠）
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.kind {
            ProviderKind::OpenAiCompatible => format!("{base}/chat/completions"),
            ProviderKind::AnthropicCompatible => format!("{base}/messages"),
        }
    }

    /// 构造流式请求体
    pub fn build_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        match self.kind {
            ProviderKind::OpenAiCompatible => serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system_prompt },
                    { "role": "user", "content": user_prompt },
                ],
                "temperature": 0.7,
                "max_tokens": 16384,
                "stream": true,
            }),
            ProviderKind::AnthropicCompatible => serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "user",
                      "content": format!("{system_prompt}\n\nUser Input:\n{user_prompt}") },
                ],
                "system": system_prompt,
                "max_tokens": 4096,
                "stream": true,
            }),
        }
    }

    /// 追加认证头
    ///
    /// OpenAI 兼容：`Authorization: Bearer`（apiKey 为空时省略，本地
    /// llama.cpp 一类网关不要求认证）。Anthropic 兼容：`x-api-key` +
    /// `anthropic-version`，不带 `Authorization`。
    pub fn apply_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.kind {
            ProviderKind::OpenAiCompatible => {
                if self.api_key.is_empty() {
                    req
                } else {
                    req.header("Authorization", format!("Bearer {}", self.api_key))
                }
            }
            ProviderKind::AnthropicCompatible => req
                .header("x-api-key", self.api_key.clone())
                .header("anthropic-version", "2023-06-01"),
        }
    }
}

/// 思考片段标记状态，归单次中继调用所有
///
/// 显式传递，不挂在任何共享对象上，请求之间不可能串台。
#[derive(Debug, Clone, Copy, Default)]
pub struct ReasoningState {
    /// 是否已注入 `<think>`
    pub started: bool,
    /// 是否已注入 `</think>`
    pub ended: bool,
}

impl ReasoningState {
    /// 流自然结束时是否还欠一个闭合标记
    pub fn needs_close(&self) -> bool {
        self.started && !self.ended
    }
}

/// 从一条已解析的 delta JSON 中提取归一化文本
///
/// OpenAI 兼容：同一条 delta 里 `reasoning_content` 与 `content` 可能
/// 同时出现。首个 reasoning 前注入 `<think>`；首个 content 且思考已
/// 开始时注入 `</think>`，之后 `ended` 保持为 true——即使后续 delta
/// 再出现 reasoning_content 也不再注入标记。
///
/// Anthropic 兼容：只取 `content_block_delta` 的 `delta.text`，从不
/// 注入标记。
pub fn extract_delta_text(
    kind: ProviderKind,
    json: &Value,
    state: &mut ReasoningState,
) -> Option<String> {
    match kind {
        ProviderKind::AnthropicCompatible => {
            if json.get("type").and_then(|v| v.as_str()) == Some("content_block_delta") {
                json.get("delta")
                    .and_then(|d| d.get("text"))
                    .and_then(|t| t.as_str())
                    .filter(|t| !t.is_empty())
                    .map(|t| t.to_string())
            } else {
                None
            }
        }
        ProviderKind::OpenAiCompatible => {
            let delta = json
                .get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("delta"))?;

            let mut text = String::new();

            if let Some(reasoning) = delta.get("reasoning_content").and_then(|v| v.as_str()) {
                if !reasoning.is_empty() {
                    if !state.started {
                        state.started = true;
                        text.push_str("<think>");
                    }
                    text.push_str(reasoning);
                }
            }

            if let Some(content) = delta.get("content").and_then(|v| v.as_str()) {
                if !content.is_empty() {
                    if state.started && !state.ended {
                        state.ended = true;
                        text.push_str("</think>");
                    }
                    text.push_str(content);
                }
            }

            (!text.is_empty()).then_some(text)
        }
    }
}
