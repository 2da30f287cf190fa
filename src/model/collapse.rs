//! 行折叠：把节点的行列表还原成一段可编辑的文本

use serde_json::{Map, Value};

use crate::model::shadow_tree::Field;

/// 将节点的行折叠为规范文本
///
/// - 没有行：`{}`
/// - 恰好一行且无键：该值的原始文本（字符串不加引号）
/// - 其余情况：所有带键的标量行组成对象，按2空格缩进序列化；数组/对象行由子节点表示，这里丢弃
pub fn collapse_fields(fields: &[Field]) -> String {
    match fields {
        [] => "{}".to_string(),
        [only] if only.key.is_none() => raw_text(&only.value),
        _ => {
            let mut obj = Map::new();
            for field in fields.iter().filter(|f| !f.kind.is_container()) {
                if let Some(key) = &field.key {
                    obj.insert(key.clone(), field.value.clone());
                }
            }
            // Map 的序列化不会失败
            serde_json::to_string_pretty(&Value::Object(obj)).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
