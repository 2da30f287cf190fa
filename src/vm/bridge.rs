//! VM桥接层：编辑会话到对话框展示的投影
//!
//! 展示层只渲染这里给出的文本，并把用户输入转交回会话

use serde::Serialize;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_EDITING: &str = "编辑中";
pub const STATUS_CANCELLED: &str = "已取消编辑";
pub const STATUS_WRITE_BACK_SUCCESS: &str = "回写成功";
pub const STATUS_WRITE_BACK_STALE: &str = "回写成功，节点树尚未刷新";
pub const STATUS_NODE_MISSING: &str = "回写成功，重建后未找到该节点";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// 节点对话框需要展示的全部内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDialogView {
    /// 查看时为折叠后的只读文本，编辑时为编辑缓冲区
    pub content: String,
    /// JSON 路径，如 `$["items"][2]`
    pub path: String,
    pub editing: bool,
    pub status: String,
}
