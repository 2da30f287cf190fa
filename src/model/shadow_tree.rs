//! 影子树（Shadow Tree）：把文档拆成带位置的节点，每个节点只携带自身的标量行

use serde::Serialize;
use serde_json::Value;

use crate::model::data_core::EditError;
use crate::model::position::{PathSegment, Position};
use crate::model::store::{RebuildSignal, TreeStore};

/// JSON 节点类型（与 UI 展示解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl NodeKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => NodeKind::Object,
            Value::Array(_) => NodeKind::Array,
            Value::String(_) => NodeKind::String,
            Value::Number(_) => NodeKind::Number,
            Value::Bool(_) => NodeKind::Bool,
            Value::Null => NodeKind::Null,
        }
    }

    /// 数组与对象的内容由子节点表示，不属于本节点的可编辑文本
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }
}

/// 节点的一行：可选键名、值（嵌套容器只存占位预览）、类型
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: Option<String>,
    pub value: Value,
    pub kind: NodeKind,
}

impl Field {
    pub fn new(key: Option<String>, value: Value, kind: NodeKind) -> Self {
        Self { key, value, kind }
    }

    /// 从文档中的值生成一行；容器值替换为 `{..} (n keys)` / `[..] (n items)` 占位
    pub fn from_value(key: Option<String>, value: &Value) -> Self {
        let kind = NodeKind::of(value);
        let value = match value {
            Value::Object(m) => Value::String(format!("{{..}} ({} keys)", m.len())),
            Value::Array(a) => Value::String(format!("[..] ({} items)", a.len())),
            scalar => scalar.clone(),
        };
        Self { key, value, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// 节点在文档中的位置（用于精确寻址与回写）
    pub position: Position,
    /// 节点自身的行，嵌套内容只以占位行出现
    pub fields: Vec<Field>,
}

/// 从根 Value 构建全树节点列表
///
/// - 对象：一个节点，键值逐行展开；嵌套的对象/数组另起子节点
/// - 数组：自身不产生节点，元素按下标展开
/// - 标量（根或数组元素）：一个无键的单行节点
pub fn build_shadow_tree(root: &Value) -> Vec<Node> {
    let mut out = Vec::with_capacity(64);
    fn walk(out: &mut Vec<Node>, v: &Value, position: Position) {
        match v {
            Value::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(k, child)| Field::from_value(Some(k.clone()), child))
                    .collect();
                out.push(Node {
                    position: position.clone(),
                    fields,
                });
                for (k, child) in map {
                    if NodeKind::of(child).is_container() {
                        walk(out, child, position.child(PathSegment::Key(k.clone())));
                    }
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    walk(out, child, position.child(PathSegment::Index(idx)));
                }
            }
            scalar => out.push(Node {
                position,
                fields: vec![Field::from_value(None, scalar)],
            }),
        }
    }

    walk(&mut out, root, Position::root());
    out
}

/// 内存中的节点树，充当 [`TreeStore`]
#[derive(Debug, Clone, Default)]
pub struct ShadowTree {
    nodes: Vec<Node>,
    selected: Option<Node>,
}

impl ShadowTree {
    /// 解析文档文本并构建节点树
    pub fn from_document(text: &str) -> Result<Self, EditError> {
        let root: Value = serde_json::from_str(text).map_err(EditError::Document)?;
        Ok(Self {
            nodes: build_shadow_tree(&root),
            selected: None,
        })
    }

    /// 按位置选中节点，找不到时保持原选中状态
    pub fn select(&mut self, position: &Position) -> bool {
        match self.nodes.iter().find(|n| &n.position == position) {
            Some(node) => {
                self.selected = Some(node.clone());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl TreeStore for ShadowTree {
    fn selected_node(&self) -> Option<Node> {
        self.selected.clone()
    }

    fn nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn find_node(&self, position: &Position) -> Option<Node> {
        self.nodes.iter().find(|n| &n.position == position).cloned()
    }

    fn set_selected_node(&mut self, node: Node) {
        self.selected = Some(node);
    }

    /// 同步重建，返回时信号已就绪
    fn rebuild_from(&mut self, document: &str) -> RebuildSignal {
        let (notifier, signal) = RebuildSignal::channel();
        match serde_json::from_str::<Value>(document) {
            Ok(root) => {
                self.nodes = build_shadow_tree(&root);
                tracing::debug!("节点树重建完成: {} 个节点", self.nodes.len());
                notifier.complete();
            }
            Err(e) => {
                tracing::error!("节点树重建失败: {}", e);
                notifier.fail(e.to_string());
            }
        }
        signal
    }
}
