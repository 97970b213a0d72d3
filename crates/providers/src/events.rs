//! 下游归一化事件
//!
//! 中继产出的事件序列是有限且不可重启的：每次调用恰好产生一个终止
//! 事件。正常完成以 `Done` 结束；`Error` 本身就是终止事件，之后不再
//! 有任何事件（特别地，**没有** `Done`）。

use bytes::Bytes;

/// 归一化事件
///
/// 下游 SSE 编码（客户端按 `data: ` 前缀解析）：
/// - `Text`  → `data: {"text":"…"}\n\n`
/// - `Error` → `data: {"error":"…"}\n\n`
/// - `Done`  → `data: [DONE]\n\n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedEvent {
    /// 文本增量（可能含 `<think>`/`</think>` 标记）
    Text(String),
    /// 错误，流到此为止
    Error(String),
    /// 正常结束哨兵
    Done,
}

impl NormalizedEvent {
    /// 编码为下游 SSE 帧
    pub fn to_sse(&self) -> Bytes {
        let frame = match self {
            Self::Text(text) => format!("data: {}\n\n", serde_json::json!({ "text": text })),
            Self::Error(message) => {
                format!("data: {}\n\n", serde_json::json!({ "error": message }))
            }
            Self::Done => "data: [DONE]\n\n".to_string(),
        };
        Bytes::from(frame)
    }
}
