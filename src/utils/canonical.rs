//! 载荷规范化
//!
//! 字段名递归转为 snake_case，顶层按键排序，序列化为 JSON 后整体转小写。
//! 嵌套对象只改写键名，保持原有顺序。

use serde_json::{Map, Value};

use crate::{
    domain::payload::SigningPayload,
    error::{Result, SigningError},
};

/// 驼峰/帕斯卡/混合写法转 snake_case
///
/// 单词边界：小写→大写、字母↔数字、连续大写后接小写（`ABCDef` → `abc_def`），
/// 以及任何非字母数字字符。
pub fn snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric() && c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.map(|n| n.is_lowercase()).unwrap_or(false));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn snake_case_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(snake_case(k), snake_case_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(snake_case_keys).collect()),
        other => other.clone(),
    }
}

/// 任意 JSON 载荷的规范字符串
pub fn canonical_string(value: &Value) -> String {
    let rewritten = snake_case_keys(value);

    let sorted = match rewritten {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        other => other,
    };

    sorted.to_string().to_lowercase()
}

/// 按载荷类型规范化；sign_states 只取 timestamp
pub fn canonicalize_payload(payload: &SigningPayload) -> Result<String> {
    let value = match payload {
        SigningPayload::SignStates(p) => serde_json::json!({ "timestamp": p.timestamp }),
        other => other
            .to_value()
            .map_err(|e| SigningError::Signing(format!("payload serialization: {}", e)))?,
    };
    Ok(canonical_string(&value))
}

/// 待签名消息 `"{kind},{canonical}"`
pub fn signable_message(payload: &SigningPayload) -> Result<String> {
    Ok(format!(
        "{},{}",
        payload.kind().name(),
        canonicalize_payload(payload)?
    ))
}
