//! 文档核心：按位置回写编辑值，以及按路径表达式读取

use jsonpath_rust::JsonPath; // 提供 query 扩展
use serde_json::Value;
use thiserror::Error;

use crate::model::position::{format_path, PathSegment, Position};

#[derive(Error, Debug)]
pub enum EditError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("编辑内容不是合法的JSON: {0}")]
    InvalidReplacement(#[source] serde_json::Error),
    #[error("当前文档无法解析: {0}")]
    Document(#[source] serde_json::Error),
    #[error("路径不存在: {path}")]
    PathNotFound { path: String },
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
    #[error("节点树重建失败: {0}")]
    Rebuild(String),
    #[error("节点树重建超时: {waited_ms}ms")]
    RebuildTimedOut { waited_ms: u64 },
    #[error("状态错误: {0}")]
    State(String),
}

/// 将 `replacement` 解析后写入 `document` 中 `position` 处，返回新的文档文本（2空格缩进）
///
/// 根位置直接整体替换；其余位置在文档的独占副本上修改，任何一步失败都不会产生部分写入。
pub fn apply_edit(
    document: &str,
    position: &Position,
    replacement: &str,
) -> Result<String, EditError> {
    let replacement: Value =
        serde_json::from_str(replacement).map_err(EditError::InvalidReplacement)?;

    let Some((last, parents)) = position.segments().split_last() else {
        return Ok(serde_json::to_string_pretty(&replacement)?);
    };

    let mut root: Value = serde_json::from_str(document).map_err(EditError::Document)?;
    let not_found = |depth: usize| EditError::PathNotFound {
        path: format_path(&position.prefix(depth)),
    };

    let mut target = &mut root;
    for (depth, segment) in parents.iter().enumerate() {
        target = descend(target, segment).ok_or_else(|| not_found(depth + 1))?;
    }

    match (target, last) {
        (Value::Object(map), PathSegment::Key(key)) => {
            map.insert(key.clone(), replacement);
        }
        (Value::Array(items), PathSegment::Index(index)) => {
            // 只替换已有元素，不做越界扩展
            let slot = items
                .get_mut(*index)
                .ok_or_else(|| not_found(position.len()))?;
            *slot = replacement;
        }
        _ => return Err(not_found(position.len())),
    }

    Ok(serde_json::to_string_pretty(&root)?)
}

fn descend<'a>(value: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
        (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

/// 按 JSONPath 提取第一个匹配节点的 pretty 字符串
pub fn query_path(document: &str, json_path: &str) -> Result<String, EditError> {
    let dom: Value = serde_json::from_str(document).map_err(EditError::Document)?;
    let hits: Vec<&Value> = dom
        .query(json_path)
        .map_err(|e| EditError::JsonPath(e.to_string()))?;
    let first = hits
        .into_iter()
        .next()
        .ok_or_else(|| EditError::JsonPath(format!("未匹配到任何节点: {}", json_path)))?;
    Ok(serde_json::to_string_pretty(first)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(segments: Vec<PathSegment>) -> Position {
        Position::new(segments)
    }

    fn parsed(text: &str) -> Value {
        serde_json::from_str(text).expect("输出应是合法JSON")
    }

    #[test]
    fn test_root_replaces_whole_document() {
        let out = apply_edit(r#"{"old": [1, 2]}"#, &Position::root(), r#"{"x":1}"#).unwrap();
        assert_eq!(out, "{\n  \"x\": 1\n}");
    }

    #[test]
    fn test_root_replace_ignores_broken_document() {
        // 整体替换不读取旧文档
        let out = apply_edit("{ broken", &Position::root(), "[true]").unwrap();
        assert_eq!(parsed(&out), json!([true]));
    }

    #[test]
    fn test_update_nested_field() {
        let doc = r#"{"a":{"b":1,"c":2}}"#;
        let out = apply_edit(doc, &at(vec!["a".into(), "b".into()]), "42").unwrap();
        assert_eq!(parsed(&out), json!({"a": {"b": 42, "c": 2}}));
        // 字段顺序保持不变
        assert_eq!(out, "{\n  \"a\": {\n    \"b\": 42,\n    \"c\": 2\n  }\n}");
    }

    #[test]
    fn test_update_array_element() {
        let doc = r#"{"items": ["第一项", "第二项", "第三项"]}"#;
        let out = apply_edit(doc, &at(vec!["items".into(), 1usize.into()]), r#""更新的第二项""#)
            .unwrap();
        assert_eq!(parsed(&out), json!({"items": ["第一项", "更新的第二项", "第三项"]}));
    }

    #[test]
    fn test_update_node_type_change() {
        let doc = r#"{"data": {"value": "原始字符串"}}"#;
        let out = apply_edit(
            doc,
            &at(vec!["data".into(), "value".into()]),
            r#"{"name": "新对象", "id": 123}"#,
        )
        .unwrap();
        assert_eq!(
            parsed(&out),
            json!({"data": {"value": {"name": "新对象", "id": 123}}})
        );
    }

    #[test]
    fn test_new_key_is_created() {
        let out = apply_edit(r#"{"a":{}}"#, &at(vec!["a".into(), "fresh".into()]), "null").unwrap();
        assert_eq!(parsed(&out), json!({"a": {"fresh": null}}));
    }

    #[test]
    fn test_invalid_replacement() {
        let doc = r#"{"data": "原始值"}"#;
        let err = apply_edit(doc, &at(vec!["data".into()]), "not json").unwrap_err();
        assert!(matches!(err, EditError::InvalidReplacement(_)));
        assert!(err.to_string().starts_with("编辑内容不是合法的JSON"));
    }

    #[test]
    fn test_missing_intermediate_segment() {
        let err = apply_edit("{}", &at(vec!["missing".into(), "x".into()]), "1").unwrap_err();
        match err {
            EditError::PathNotFound { path } => assert_eq!(path, r#"$["missing"]"#),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_index_is_not_found() {
        let doc = r#"{"items":[1,2,3]}"#;
        let err = apply_edit(doc, &at(vec!["items".into(), 3usize.into()]), "4").unwrap_err();
        match err {
            EditError::PathNotFound { path } => assert_eq!(path, r#"$["items"][3]"#),
            other => panic!("unexpected error: {other:?}"),
        }
        let err = apply_edit(doc, &at(vec!["items".into(), 9usize.into(), "x".into()]), "4")
            .unwrap_err();
        assert!(matches!(err, EditError::PathNotFound { .. }));
    }

    #[test]
    fn test_segment_kind_mismatch_is_not_found() {
        // 数组上用键名、对象上用下标、标量上继续下钻
        let doc = r#"{"items":[1],"obj":{"0":1},"n":5}"#;
        for position in [
            at(vec!["items".into(), "0".into()]),
            at(vec!["obj".into(), 0usize.into()]),
            at(vec!["n".into(), "x".into()]),
        ] {
            let err = apply_edit(doc, &position, "1").unwrap_err();
            assert!(matches!(err, EditError::PathNotFound { .. }), "{position}");
        }
    }

    #[test]
    fn test_broken_document_is_reported() {
        let err = apply_edit("{ broken", &at(vec!["a".into()]), "1").unwrap_err();
        assert!(matches!(err, EditError::Document(_)));
    }

    #[test]
    fn test_query_formatted_path() {
        let doc = r#"{"customer": [{"name": "张三"}]}"#;
        let path = format_path(&at(vec!["customer".into(), 0usize.into(), "name".into()]));
        assert_eq!(query_path(doc, &path).unwrap(), r#""张三""#);
        assert_eq!(query_path(doc, "$").unwrap(), serde_json::to_string_pretty(&parsed(doc)).unwrap());
    }

    #[test]
    fn test_query_missing_path() {
        let err = query_path(r#"{"a": 1}"#, r#"$["b"]"#).unwrap_err();
        assert!(matches!(err, EditError::JsonPath(_)));
    }
}
