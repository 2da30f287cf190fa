//! 节点位置（Position）与 JSON 路径格式化

use std::fmt;

use serde::{Deserialize, Serialize};

/// 位置中的一段：对象字段名或数组下标
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

/// 节点在文档中的位置，空序列表示文档根
///
/// 按值比较：重建后的节点是全新实例，只能靠结构相等找回
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(Vec<PathSegment>);

impl Position {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 追加一段，返回子节点位置
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment.into());
        Self(segments)
    }

    /// 前 `len` 段组成的位置（超出长度时返回自身副本）
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }
}

impl From<Vec<PathSegment>> for Position {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for Position {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(self))
    }
}

/// 将位置格式化为 `$["customer"][0]["name"]` 形式的路径表达式
///
/// 数字段原样输出，字符串段加双引号；键名里的 `"`、`\` 与控制字符按 JSON 字符串规则转义，
/// 因而结果同时是合法的 RFC 9535 JSONPath。
pub fn format_path(position: &Position) -> String {
    if position.is_root() {
        return "$".to_string();
    }
    let mut out = String::with_capacity(2 + position.len() * 8);
    out.push('$');
    for segment in position.segments() {
        out.push('[');
        match segment {
            PathSegment::Index(index) => out.push_str(&index.to_string()),
            PathSegment::Key(key) => push_quoted(&mut out, key),
        }
        out.push(']');
    }
    out
}

fn push_quoted(out: &mut String, key: &str) {
    out.push('"');
    for ch in key.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04x}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
