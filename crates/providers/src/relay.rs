//! 流式中继
//!
//! 每次调用打开恰好一个上游连接，实时产出 `NormalizedEvent` 序列。
//! 状态机：`Connecting → Streaming → {Completed, Failed}`。
//!
//! ## 终止语义（对实现者的明确约定）
//!
//! 正常完成路径以 `Done` 收尾；但上游拒绝（非 2xx）与中途传输错误
//! 只发一个 `Error` 事件后直接结束流，**不发 `Done`**。这是对
//! "总是以 Done 结束"规则的有意偏离：客户端把 `error` 字段视为
//! 终止并丢弃连接，补发 `[DONE]` 只会掩盖失败。
//!
//! ## 容错
//!
//! - 单条 `data:` 行 JSON 解析失败：丢弃该行并记 debug 日志，流继续
//!   （Provider 偶发半行/心跳行不应中断整个报告生成）。
//! - 上游只输出思考、未输出正文就结束（截断/限流）：合成一个带
//!   `</think>` 的 `Text` 事件把思考片段闭合，附一句给用户看的提示，
//!   然后正常 `Done`——这是内容质量问题，不是系统失败。
//! - 跨 chunk 的残行：中间代理可能把一行劈在两个 chunk 里，这里维护
//!   残行缓冲，不假设 chunk 与行边界对齐。

use crate::adapter::{extract_delta_text, ProviderConfig, ProviderKind, ReasoningState};
use crate::events::NormalizedEvent;
use async_stream::stream;
use bytes::BytesMut;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

/// 思考截断时附在闭合标记后的提示
const REASONING_TRUNCATED_NOTE: &str = "\n\n（模型输出在思考阶段结束，未返回正文内容，可能已被截断，请重试或缩短输入）";

/// 跨 chunk 的行缓冲
///
/// `push` 返回本次 chunk 补齐后的所有完整行；末尾未带换行的部分
/// 留在缓冲里等下一个 chunk。
struct SseLineBuffer {
    buf: BytesMut,
}

impl SseLineBuffer {
    fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw = self.buf.split_to(pos + 1);
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        lines
    }

    /// 流结束后取出最后一个不带换行的残行
    fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            let raw = self.buf.split();
            Some(String::from_utf8_lossy(&raw).into_owned())
        }
    }
}

/// 处理一条 SSE 行，返回归一化文本
///
/// 空行、`event:` 行、`[DONE]` 哨兵、无法解析的 JSON 都返回 `None`。
fn process_line(kind: ProviderKind, line: &str, state: &mut ReasoningState) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let payload = trimmed.strip_prefix("data: ")?.trim();
    if payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(json) => extract_delta_text(kind, &json, state),
        Err(e) => {
            debug!("丢弃无法解析的 SSE 行: {e}");
            None
        }
    }
}

/// 流自然结束时的收尾文本
fn closing_text(state: &ReasoningState) -> Option<String> {
    state
        .needs_close()
        .then(|| format!("</think>{REASONING_TRUNCATED_NOTE}"))
}

/// 打开上游流式请求并中继为归一化事件流
///
/// 返回的流是冷的：首次 poll 才发起上游连接。客户端断开时下游丢弃
/// 这个流，生成器连同 reqwest 响应一并 drop，上游连接随之中断——
/// 取消传播不需要额外的令牌。
pub fn relay_stream(
    client: reqwest::Client,
    config: ProviderConfig,
    system_prompt: String,
    user_prompt: String,
) -> impl Stream<Item = NormalizedEvent> + Send {
    stream! {
        // Connecting
        let body = config.build_body(&system_prompt, &user_prompt);
        let request = config
            .apply_headers(client.post(config.endpoint()))
            .json(&body);

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("上游连接失败: {e}");
                yield NormalizedEvent::Error(format!("上游连接失败: {e}"));
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!("上游返回 {status}: {error_body}");
            yield NormalizedEvent::Error(format!(
                "AI API Error: {} {}",
                status.as_u16(),
                error_body
            ));
            return;
        }

        // Streaming
        let mut upstream = response.bytes_stream();
        let mut lines = SseLineBuffer::new();
        let mut state = ReasoningState::default();

        loop {
            let item = match config.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, upstream.next()).await {
                    Ok(item) => item,
                    Err(_) => {
                        warn!("上游 {} 秒无数据，中断中继", limit.as_secs());
                        yield NormalizedEvent::Error("上游响应空闲超时".to_string());
                        return;
                    }
                },
                None => upstream.next().await,
            };

            match item {
                Some(Ok(chunk)) => {
                    for line in lines.push(&chunk) {
                        if let Some(text) = process_line(config.kind, &line, &mut state) {
                            yield NormalizedEvent::Text(text);
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("上游流中断: {e}");
                    yield NormalizedEvent::Error(format!("上游流中断: {e}"));
                    return;
                }
                None => break,
            }
        }

        if let Some(line) = lines.take_remainder() {
            if let Some(text) = process_line(config.kind, &line, &mut state) {
                yield NormalizedEvent::Text(text);
            }
        }

        // Completed
        if let Some(text) = closing_text(&state) {
            yield NormalizedEvent::Text(text);
        }
        yield NormalizedEvent::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 模拟"上游字节流自然结束"的同步收尾路径，与 `relay_stream`
    /// 的 Streaming/Completed 阶段逐行使用相同的函数
    fn run_transcript(kind: ProviderKind, chunks: &[&[u8]]) -> Vec<NormalizedEvent> {
        let mut lines = SseLineBuffer::new();
        let mut state = ReasoningState::default();
        let mut events = Vec::new();

        for chunk in chunks {
            for line in lines.push(chunk) {
                if let Some(text) = process_line(kind, &line, &mut state) {
                    events.push(NormalizedEvent::Text(text));
                }
            }
        }
        if let Some(line) = lines.take_remainder() {
            if let Some(text) = process_line(kind, &line, &mut state) {
                events.push(NormalizedEvent::Text(text));
            }
        }
        if let Some(text) = closing_text(&state) {
            events.push(NormalizedEvent::Text(text));
        }
        events.push(NormalizedEvent::Done);
        events
    }

    fn texts(events: &[NormalizedEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                NormalizedEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_line_buffer_splits_lines() {
        let mut buf = SseLineBuffer::new();
        assert_eq!(buf.push(b"a\nb\n"), vec!["a\n", "b\n"]);
        assert!(buf.take_remainder().is_none());
    }

    #[test]
    fn test_line_buffer_carries_partial_line() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(b"data: {\"cho").is_empty());
        let lines = buf.push(b"ices\":[]}\ndata: x");
        assert_eq!(lines, vec!["data: {\"choices\":[]}\n"]);
        assert_eq!(buf.take_remainder().as_deref(), Some("data: x"));
    }

    #[test]
    fn test_process_line_skips_done_sentinel() {
        let mut state = ReasoningState::default();
        assert_eq!(
            process_line(ProviderKind::OpenAiCompatible, "data: [DONE]", &mut state),
            None
        );
        assert_eq!(
            process_line(ProviderKind::OpenAiCompatible, "  data: [DONE]  \r", &mut state),
            None
        );
    }

    #[test]
    fn test_process_line_skips_non_data_lines() {
        let mut state = ReasoningState::default();
        assert_eq!(
            process_line(
                ProviderKind::AnthropicCompatible,
                "event: content_block_delta",
                &mut state
            ),
            None
        );
        assert_eq!(
            process_line(ProviderKind::OpenAiCompatible, ": keep-alive", &mut state),
            None
        );
        assert_eq!(
            process_line(ProviderKind::OpenAiCompatible, "", &mut state),
            None
        );
    }

    #[test]
    fn test_process_line_swallows_malformed_json() {
        let mut state = ReasoningState::default();
        assert_eq!(
            process_line(ProviderKind::OpenAiCompatible, "data: {not json", &mut state),
            None
        );
    }

    #[test]
    fn test_reasoning_then_content_scenario() {
        // 系统提示 "S"、用户输入 "write a haiku" 的标准场景
        let events = run_transcript(
            ProviderKind::OpenAiCompatible,
            &[
                b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"thinking...\"}}]}\n\n",
                b"data: {\"choices\":[{\"delta\":{\"content\":\"haiku text\"}}]}\n\n",
                b"data: [DONE]\n\n",
            ],
        );

        assert_eq!(
            events,
            vec![
                NormalizedEvent::Text("<think>thinking...".to_string()),
                NormalizedEvent::Text("</think>haiku text".to_string()),
                NormalizedEvent::Done,
            ]
        );
    }

    #[test]
    fn test_reasoning_only_stream_gets_synthetic_close() {
        let events = run_transcript(
            ProviderKind::OpenAiCompatible,
            &[
                b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"r1\"}}]}\n",
                b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"r2\"}}]}\n",
            ],
        );

        let texts = texts(&events);
        assert_eq!(texts[0], "<think>r1");
        assert_eq!(texts[1], "r2");
        // 恰好一个合成闭合事件，带用户可读的提示
        let closers: Vec<_> = texts.iter().filter(|t| t.contains("</think>")).collect();
        assert_eq!(closers.len(), 1);
        assert!(closers[0].starts_with("</think>"));
        assert_eq!(events.last(), Some(&NormalizedEvent::Done));
    }

    #[test]
    fn test_completed_stream_has_no_extra_close() {
        let events = run_transcript(
            ProviderKind::OpenAiCompatible,
            &[
                b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"r\"}}]}\n",
                b"data: {\"choices\":[{\"delta\":{\"content\":\"c\"}}]}\n",
                b"data: [DONE]\n",
            ],
        );
        let all: String = texts(&events).concat();
        assert_eq!(all.matches("</think>").count(), 1);
    }

    #[test]
    fn test_malformed_line_between_valid_lines() {
        let events = run_transcript(
            ProviderKind::OpenAiCompatible,
            &[
                b"data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n",
                b"data: {broken!!\n",
                b"data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n",
            ],
        );
        assert_eq!(texts(&events), vec!["A", "B"]);
    }

    #[test]
    fn test_anthropic_concatenation_no_markers() {
        let events = run_transcript(
            ProviderKind::AnthropicCompatible,
            &[
                b"event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n",
                b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"\xe4\xbd\xa0\"}}\n\n",
                b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"\xe5\xa5\xbd\"}}\n\n",
                b"event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            ],
        );

        assert_eq!(texts(&events), vec!["你", "好"]);
        let all: String = texts(&events).concat();
        assert!(!all.contains("<think>"));
        assert_eq!(events.last(), Some(&NormalizedEvent::Done));
    }

    #[test]
    fn test_trailing_line_without_newline_still_processed() {
        let events = run_transcript(
            ProviderKind::OpenAiCompatible,
            &[b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}"],
        );
        assert_eq!(texts(&events), vec!["tail"]);
    }

    mod chunk_split_invariance {
        use super::*;
        use proptest::prelude::*;

        const TRANSCRIPT: &[u8] = b"data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"\xe6\x80\x9d\xe8\x80\x83\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"reasoning_content\":\"step2\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"\xe6\xad\xa3\xe6\x96\x87\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}\n\ndata: [DONE]\n\n";

        proptest! {
            /// 任意重新分片不改变归一化事件序列
            #[test]
            fn prop_rechunking_is_invariant(
                mut cuts in prop::collection::vec(0..TRANSCRIPT.len(), 0..8)
            ) {
                cuts.sort_unstable();
                cuts.dedup();

                let mut chunks: Vec<&[u8]> = Vec::new();
                let mut start = 0;
                for &cut in &cuts {
                    chunks.push(&TRANSCRIPT[start..cut]);
                    start = cut;
                }
                chunks.push(&TRANSCRIPT[start..]);

                let rechunked = run_transcript(ProviderKind::OpenAiCompatible, &chunks);
                let baseline = run_transcript(ProviderKind::OpenAiCompatible, &[TRANSCRIPT]);
                prop_assert_eq!(rechunked, baseline);
            }
        }
    }
}
